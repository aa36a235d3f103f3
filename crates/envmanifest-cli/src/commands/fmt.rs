use super::{json_pretty, write_atomic, EXIT_FAILURE, EXIT_SUCCESS};
use envmanifest_schema::{dropped_comments, parse_manifest_str, render_manifest};
use std::path::Path;
use tracing::debug;

pub fn run(manifest_path: &Path, check: bool, json: bool) -> Result<u8, String> {
    let original = std::fs::read_to_string(manifest_path).map_err(|e| {
        format!(
            "failed to read manifest {}: {e}",
            manifest_path.display()
        )
    })?;
    let env = parse_manifest_str(&original)
        .map_err(|e| format!("manifest error: {}: {e}", manifest_path.display()))?;
    let rendered = render_manifest(&env);
    let canonical = rendered == original;
    debug!("{} canonical: {canonical}", manifest_path.display());

    let (status, code) = match (canonical, check) {
        (true, _) => ("unchanged", EXIT_SUCCESS),
        (false, true) => ("needs_formatting", EXIT_FAILURE),
        (false, false) => {
            let dropped = dropped_comments(&original, &rendered);
            if !dropped.is_empty() {
                return Err(format!(
                    "refusing to reformat {}: {} comment(s) would be lost: {}",
                    manifest_path.display(),
                    dropped.len(),
                    dropped.join("; ")
                ));
            }
            write_atomic(manifest_path, &rendered)?;
            ("reformatted", EXIT_SUCCESS)
        }
    };

    if json {
        let payload = serde_json::json!({
            "manifest": manifest_path,
            "status": status,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        match status {
            "unchanged" => println!("{} is already formatted", manifest_path.display()),
            "needs_formatting" => println!("would reformat {}", manifest_path.display()),
            _ => println!("reformatted {}", manifest_path.display()),
        }
    }
    Ok(code)
}
