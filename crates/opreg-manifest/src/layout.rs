use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Suffix of the package descriptor, e.g. `etcd.package.yaml`.
pub const PACKAGE_SUFFIX: &str = ".package.yaml";
/// Suffix of a CSV document inside a bundle directory.
pub const CSV_SUFFIX: &str = ".csv.yaml";
/// Suffix of a CRD document inside a bundle directory.
pub const CRD_SUFFIX: &str = ".crd.yaml";

/// Directory layout of one package in the operator-registry manifest format.
///
/// ```text
/// <registry_dir>/<package_id>/
///     <package_id>.package.yaml
///     <version>/
///         <csv_name>.csv.yaml
///         <crd_name>.crd.yaml
/// ```
///
/// Paths are computed only; nothing here touches the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLayout {
    registry_dir: PathBuf,
    package_id: String,
}

impl ManifestLayout {
    pub fn new(registry_dir: impl Into<PathBuf>, package_id: impl Into<String>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
            package_id: package_id.into(),
        }
    }

    /// Recover the layout from an existing package directory.
    pub fn for_manifest_dir(manifest_dir: &Path) -> Option<Self> {
        let package_id = manifest_dir.file_name().and_then(OsStr::to_str)?;
        let registry_dir = manifest_dir.parent()?;
        Some(Self::new(registry_dir, package_id))
    }

    #[inline]
    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    #[inline]
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    #[inline]
    pub fn manifest_dir(&self) -> PathBuf {
        self.registry_dir.join(&self.package_id)
    }

    #[inline]
    pub fn package_file(&self) -> PathBuf {
        self.manifest_dir()
            .join(format!("{}{PACKAGE_SUFFIX}", self.package_id))
    }

    #[inline]
    pub fn bundle_dir(&self, version: &str) -> PathBuf {
        self.manifest_dir().join(version)
    }

    #[inline]
    pub fn csv_file(&self, version: &str, csv_name: &str) -> PathBuf {
        self.bundle_dir(version).join(format!("{csv_name}{CSV_SUFFIX}"))
    }

    #[inline]
    pub fn crd_file(&self, version: &str, crd_name: &str) -> PathBuf {
        self.bundle_dir(version).join(format!("{crd_name}{CRD_SUFFIX}"))
    }
}
