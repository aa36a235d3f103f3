//! CLI subprocess integration tests.
//!
//! These tests invoke the `envmanifest` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability.

use std::path::{Path, PathBuf};
use std::process::Command;

fn envmanifest_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_envmanifest"));
    // Keep a developer's personal lint config out of the tests.
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd.env_remove("ENVMANIFEST_LOG");
    cmd
}

fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("environment.yml");
    std::fs::write(&path, content).unwrap();
    path
}

const CANONICAL: &str = "name: esmvaltool
channels:
  - conda-forge

dependencies:
  # Python packages that cannot be installed from PyPI:
  - esmpy
  - iris>=2.2.1
  - matplotlib<3  # Can't install it with pip
";

#[test]
fn cli_version_exits_zero() {
    let output = envmanifest_bin().arg("--version").output().unwrap();
    assert!(output.status.success(), "envmanifest --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("envmanifest"), "{stdout}");
}

#[test]
fn cli_help_lists_commands() {
    let output = envmanifest_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["check", "fmt", "inspect", "id"] {
        assert!(stdout.contains(cmd), "help must list '{cmd}'");
    }
}

#[test]
fn cli_check_valid_manifest() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(project.path(), CANONICAL);

    let output = envmanifest_bin()
        .args(["check", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "check must exit 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("'esmvaltool' ok"), "{stdout}");
}

#[test]
fn cli_check_json_reports_warnings() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        project.path(),
        "name: x\nchannels:\n  - conda-forge\ndependencies:\n  - python==3.7\n",
    );

    let output = envmanifest_bin()
        .args(["--json", "check", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "x");
    assert_eq!(json["dependencies"], 1);
    assert_eq!(json["warnings"][0]["kind"], "unusual_operator");
    assert_eq!(json["warnings"][0]["package"], "python");
}

#[test]
fn cli_check_deny_warnings_exits_three() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        project.path(),
        "name: x\nchannels:\n  - a\n  - a\n",
    );

    let output = envmanifest_bin()
        .args(["check", "--deny-warnings", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate_channel"), "{stderr}");
}

#[test]
fn cli_check_respects_lint_config() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        project.path(),
        "name: x\nchannels:\n  - a\n  - a\n",
    );
    let config = project.path().join("lint.toml");
    std::fs::write(&config, "allow = [\"duplicate_channel\"]\n").unwrap();

    let output = envmanifest_bin()
        .args([
            "--config",
            &config.to_string_lossy(),
            "check",
            "--deny-warnings",
            &manifest.to_string_lossy(),
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_check_duplicate_package_exits_two() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        project.path(),
        "name: x\nchannels:\n  - c\ndependencies:\n  - numpy\n  - numpy>=1.15\n",
    );

    let output = envmanifest_bin()
        .args(["check", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate package 'numpy'"), "{stderr}");
    assert!(stderr.contains("line 6"), "{stderr}");
}

#[test]
fn cli_check_missing_file_exits_two() {
    let project = tempfile::tempdir().unwrap();
    let output = envmanifest_bin()
        .args(["check", &project.path().join("nope.yml").to_string_lossy()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_fmt_check_accepts_canonical_file() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(project.path(), CANONICAL);

    let output = envmanifest_bin()
        .args(["fmt", "--check", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn cli_fmt_rewrites_and_check_detects() {
    let project = tempfile::tempdir().unwrap();
    let messy = "---\nname: esmvaltool\nchannels:\n- conda-forge\ndependencies:\n    # Python packages that cannot be installed from PyPI:\n    - esmpy\n    - iris >=2.2.1\n    - matplotlib <3   #  Can't install it with pip\n";
    let manifest = write_manifest(project.path(), messy);

    let check = envmanifest_bin()
        .args(["fmt", "--check", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert_eq!(check.status.code(), Some(1));
    assert_eq!(std::fs::read_to_string(&manifest).unwrap(), messy);

    let fmt = envmanifest_bin()
        .args(["--json", "fmt", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(fmt.status.success());
    let json: serde_json::Value = serde_json::from_slice(&fmt.stdout).unwrap();
    assert_eq!(json["status"], "reformatted");
    assert_eq!(std::fs::read_to_string(&manifest).unwrap(), CANONICAL);
}

#[test]
fn cli_fmt_keeps_header_channel_and_trailing_comments() {
    let project = tempfile::tempdir().unwrap();
    let messy = "# Environment for the nightly tests.\nname: nightly\nchannels:\n- conda-forge   #  primary\ndependencies:\n- git\n# add new tools above\n";
    let manifest = write_manifest(project.path(), messy);

    let output = envmanifest_bin()
        .args(["fmt", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        std::fs::read_to_string(&manifest).unwrap(),
        "# Environment for the nightly tests.\nname: nightly\nchannels:\n  - conda-forge  # primary\n\ndependencies:\n  - git\n  # add new tools above\n"
    );
}

#[test]
fn cli_fmt_refuses_to_drop_comments() {
    let project = tempfile::tempdir().unwrap();
    let messy = "name: x  # dev only\nchannels:\n- c\n";
    let manifest = write_manifest(project.path(), messy);

    let output = envmanifest_bin()
        .args(["fmt", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("refusing to reformat"), "{stderr}");
    assert!(stderr.contains("dev only"), "{stderr}");
    assert_eq!(std::fs::read_to_string(&manifest).unwrap(), messy);
}

#[test]
fn cli_inspect_json_shape() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(project.path(), CANONICAL);

    let output = envmanifest_bin()
        .args(["--json", "inspect", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "esmvaltool");
    assert_eq!(json["channels"][0], "conda-forge");
    let iris = &json["dependencies"][1];
    assert_eq!(iris["package"], "iris");
    assert_eq!(iris["constraints"][0]["operator"], ">=");
    assert_eq!(iris["constraints"][0]["version"], "2.2.1");
    assert_eq!(
        json["dependencies"][2]["comment"],
        "Can't install it with pip"
    );
}

#[test]
fn cli_inspect_human_output() {
    let project = tempfile::tempdir().unwrap();
    let manifest = write_manifest(project.path(), CANONICAL);

    let output = envmanifest_bin()
        .args(["inspect", &manifest.to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("esmvaltool"));
    assert!(stdout.contains("iris>=2.2.1"));
    assert!(stdout.contains("# Python packages"));
}

#[test]
fn cli_id_is_order_independent() {
    let a_dir = tempfile::tempdir().unwrap();
    let b_dir = tempfile::tempdir().unwrap();
    let a = write_manifest(
        a_dir.path(),
        "name: x\nchannels:\n  - c\ndependencies:\n  - git\n  - cmake>=3\n",
    );
    let b = write_manifest(
        b_dir.path(),
        "name: x\nchannels:\n  - c\ndependencies:\n  # build\n  - cmake >=3\n  - git\n",
    );

    let id = |path: &Path| -> serde_json::Value {
        let output = envmanifest_bin()
            .args(["--json", "id", &path.to_string_lossy()])
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    };
    let (ia, ib) = (id(&a), id(&b));
    assert_eq!(ia["env_id"], ib["env_id"]);
    assert_eq!(ia["short_id"].as_str().unwrap().len(), 12);
}

#[test]
fn cli_completions_bash() {
    let output = envmanifest_bin()
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("envmanifest"));
}

#[test]
fn cli_man_pages_written() {
    let out = tempfile::tempdir().unwrap();
    let output = envmanifest_bin()
        .args(["man-pages", &out.path().to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(out.path().join("envmanifest.1").exists());
    assert!(out.path().join("envmanifest-check.1").exists());
}
