pub mod check;
pub mod completions;
pub mod fmt;
pub mod id;
pub mod inspect;
pub mod man_pages;

use envmanifest_schema::{parse_manifest_file, Environment, LintConfig, Warning};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_WARNINGS: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn load_manifest(path: &Path) -> Result<Environment, String> {
    parse_manifest_file(path).map_err(|e| format!("manifest error: {}: {e}", path.display()))
}

pub fn load_lint_config(path: Option<&Path>) -> Result<LintConfig, String> {
    match path {
        Some(p) => LintConfig::load(p),
        None => LintConfig::load_default(),
    }
    .map_err(|e| format!("lint config error: {e}"))
}

pub fn write_atomic(dest: &Path, content: &str) -> Result<(), String> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| format!("write temp file: {e}"))?;
    use std::io::Write;
    tmp.write_all(content.as_bytes())
        .map_err(|e| format!("write temp file: {e}"))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| format!("fsync temp file: {e}"))?;
    tmp.persist(dest)
        .map_err(|e| format!("persist manifest: {}", e.error))?;
    Ok(())
}

pub fn style_warning(warning: &Warning) -> String {
    use console::Style;
    format!(
        "{} {warning}",
        Style::new().yellow().bold().apply_to("warning:")
    )
}
