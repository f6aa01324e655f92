use crate::document::read_document;
use crate::layout::{ManifestLayout, CRD_SUFFIX, CSV_SUFFIX};
use crate::{IoOp, ManifestError};
use opreg_schema::{
    ClusterServiceVersion, CustomResourceDefinition, OperatorPackage, PackageManifest,
};
use semver::Version;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The documents found in one bundle directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleContents {
    pub version: String,
    pub csv: ClusterServiceVersion,
    pub crds: Vec<CustomResourceDefinition>,
}

/// A manifest tree as loaded back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestTree {
    pub package: PackageManifest,
    /// Bundles ordered by semantic version; directories that are not semver
    /// follow in name order.
    pub bundles: Vec<BundleContents>,
}

impl ManifestTree {
    pub fn package_id(&self) -> &str {
        &self.package.package_name
    }

    /// Rebuild the package model, keeping the first copy of each CRD.
    pub fn into_package(self) -> OperatorPackage {
        let mut seen = HashSet::new();
        let mut package = OperatorPackage::new(self.package);
        for bundle in self.bundles {
            for crd in bundle.crds {
                if seen.insert(crd.key()) {
                    package.custom_resource_definitions.push(crd);
                }
            }
            package.cluster_service_versions.push(bundle.csv);
        }
        package
    }
}

/// Load the manifest rooted at `manifest_dir` (`<registry_dir>/<package_id>`).
pub fn read_manifest(manifest_dir: &Path) -> Result<ManifestTree, ManifestError> {
    let layout =
        ManifestLayout::for_manifest_dir(manifest_dir).ok_or_else(|| ManifestError::InvalidLayout {
            path: manifest_dir.to_path_buf(),
            reason: "not a package directory".to_owned(),
        })?;

    let package: PackageManifest = read_document(&layout.package_file())?;
    if package.package_name != layout.package_id() {
        return Err(ManifestError::InvalidLayout {
            path: layout.package_file(),
            reason: format!(
                "packageName '{}' does not match directory '{}'",
                package.package_name,
                layout.package_id()
            ),
        });
    }

    let mut bundles = Vec::new();
    for path in sorted_entries(manifest_dir)? {
        if path.is_dir() {
            bundles.push(read_bundle(&path)?);
        }
    }
    bundles.sort_by_cached_key(|b| version_order(&b.version));
    debug!(
        "read manifest {} with {} bundles",
        manifest_dir.display(),
        bundles.len()
    );

    Ok(ManifestTree { package, bundles })
}

fn read_bundle(bundle_dir: &Path) -> Result<BundleContents, ManifestError> {
    let version = file_name(bundle_dir).to_owned();
    let mut csvs: Vec<ClusterServiceVersion> = Vec::new();
    let mut crds = Vec::new();

    for path in sorted_entries(bundle_dir)? {
        let name = file_name(&path);
        if name.ends_with(CSV_SUFFIX) {
            csvs.push(read_document(&path)?);
        } else if name.ends_with(CRD_SUFFIX) {
            crds.push(read_document(&path)?);
        }
    }

    if csvs.len() != 1 {
        return Err(ManifestError::InvalidLayout {
            path: bundle_dir.to_path_buf(),
            reason: format!("expected exactly one {CSV_SUFFIX} file, found {}", csvs.len()),
        });
    }
    let csv = csvs.remove(0);
    if csv.version() != Some(version.as_str()) {
        return Err(ManifestError::InvalidLayout {
            path: bundle_dir.to_path_buf(),
            reason: format!(
                "CSV '{}' has version {:?}, expected '{version}'",
                csv.name(),
                csv.version()
            ),
        });
    }

    Ok(BundleContents { version, csv, crds })
}

fn version_order(version: &str) -> (bool, Option<Version>, String) {
    let parsed = Version::parse(version).ok();
    (parsed.is_none(), parsed, version.to_owned())
}

/// Directory entries sorted by name, skipping hidden files such as stale temporaries.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let read_err = |source| ManifestError::Io {
        op: IoOp::ReadDir,
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}
