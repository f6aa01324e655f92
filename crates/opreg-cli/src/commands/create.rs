use super::{json_pretty, load_package, manifest_error, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use opreg_manifest::{Manifest, ManifestBuilder, ManifestOptions};
use opreg_schema::ClusterServiceVersion;
use std::path::Path;
use tracing::warn;

pub fn run(
    package_file: &Path,
    registry_dir: &Path,
    options: ManifestOptions,
    json: bool,
) -> Result<u8, String> {
    let package = load_package(package_file)?;

    let pb = if json {
        None
    } else {
        Some(spinner(&format!(
            "creating manifest for {}...",
            package.package_id()
        )))
    };

    let mut manifest = ManifestBuilder::new(&package, registry_dir).with_options(options);
    if let Err(e) = manifest.create() {
        if let Some(ref pb) = pb {
            spin_fail(pb, "manifest creation failed");
        }
        if let Err(cleanup) = manifest.delete() {
            warn!("cleanup of partial manifest failed: {cleanup}");
        }
        return Err(manifest_error(&e));
    }
    if let Some(ref pb) = pb {
        spin_ok(pb, "manifest created");
    }

    let manifest_dir = manifest
        .manifest_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let versions: Vec<_> = package
        .cluster_service_versions
        .iter()
        .filter_map(ClusterServiceVersion::version)
        .collect();
    if json {
        let payload = serde_json::json!({
            "package": package.package_id(),
            "manifest_dir": manifest_dir,
            "bundles": versions,
            "status": "created"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "created manifest for package '{}' ({} bundles)",
            package.package_id(),
            versions.len()
        );
        println!("manifest_dir: {manifest_dir}");
    }
    Ok(EXIT_SUCCESS)
}
