use super::{json_pretty, load_manifest, EXIT_SUCCESS};
use envmanifest_schema::compute_env_id;
use std::path::Path;

pub fn run(manifest_path: &Path, json: bool) -> Result<u8, String> {
    let env = load_manifest(manifest_path)?;
    let identity =
        compute_env_id(&env.normalize()).map_err(|e| format!("fingerprint failed: {e}"))?;
    if json {
        println!("{}", json_pretty(&identity)?);
    } else {
        println!("env_id:    {}", identity.env_id);
        println!("short_id:  {}", identity.short_id);
    }
    Ok(EXIT_SUCCESS)
}
