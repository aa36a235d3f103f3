use super::{
    json_pretty, load_lint_config, load_manifest, style_warning, EXIT_SUCCESS, EXIT_WARNINGS,
};
use envmanifest_schema::validate_with;
use std::path::Path;
use tracing::info;

pub fn run(
    manifest_path: &Path,
    config_path: Option<&Path>,
    deny_warnings: bool,
    json: bool,
) -> Result<u8, String> {
    let config = load_lint_config(config_path)?;
    let env = load_manifest(manifest_path)?;
    let warnings = validate_with(&env, &config);
    info!(
        "checked {}: {} warnings",
        manifest_path.display(),
        warnings.len()
    );

    if json {
        let payload = serde_json::json!({
            "manifest": manifest_path,
            "name": env.name(),
            "channels": env.channels().len(),
            "dependencies": env.dependencies().len(),
            "warnings": &warnings,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        for w in &warnings {
            eprintln!("{}", style_warning(w));
        }
        println!(
            "{}: '{}' ok ({} channels, {} dependencies, {} warnings)",
            manifest_path.display(),
            env.name(),
            env.channels().len(),
            env.dependencies().len(),
            warnings.len()
        );
    }

    if deny_warnings && !warnings.is_empty() {
        return Ok(EXIT_WARNINGS);
    }
    Ok(EXIT_SUCCESS)
}
