use super::{json_pretty, manifest_error, EXIT_SUCCESS};
use opreg_manifest::read_manifest;
use opreg_schema::CustomResourceDefinition;
use std::path::Path;

pub fn run(manifest_dir: &Path, json: bool) -> Result<u8, String> {
    let tree = read_manifest(manifest_dir).map_err(|e| manifest_error(&e))?;
    if json {
        let bundles: Vec<_> = tree
            .bundles
            .iter()
            .map(|b| {
                serde_json::json!({
                    "version": b.version,
                    "csv": b.csv.name(),
                    "crds": b.crds.iter().map(CustomResourceDefinition::name).collect::<Vec<_>>(),
                })
            })
            .collect();
        let payload = serde_json::json!({
            "package": tree.package_id(),
            "default_channel": tree.package.default_channel,
            "channels": tree.package.channels,
            "bundles": bundles,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("package:         {}", tree.package_id());
        println!(
            "default_channel: {}",
            tree.package.default_channel.as_deref().unwrap_or("(none)")
        );
        for channel in &tree.package.channels {
            println!("channel:         {} -> {}", channel.name, channel.current_csv);
        }
        for bundle in &tree.bundles {
            println!("bundle {}: {}", bundle.version, bundle.csv.name());
            for crd in &bundle.crds {
                println!("  crd {}", crd.name());
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
