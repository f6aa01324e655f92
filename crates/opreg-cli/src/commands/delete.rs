use super::{json_pretty, manifest_error, EXIT_SUCCESS};
use opreg_manifest::remove_manifest;
use std::path::Path;

pub fn run(registry_dir: &Path, package_id: &str, json: bool) -> Result<u8, String> {
    let removed = remove_manifest(registry_dir, package_id).map_err(|e| manifest_error(&e))?;
    if json {
        let payload = serde_json::json!({
            "package": package_id,
            "removed": removed,
        });
        println!("{}", json_pretty(&payload)?);
    } else if removed {
        println!("deleted manifest for package '{package_id}'");
    } else {
        println!("no manifest for package '{package_id}'");
    }
    Ok(EXIT_SUCCESS)
}
