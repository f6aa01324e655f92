use crate::bundle::BundleMaterializer;
use crate::document::{create_dir, remove_tree, write_document};
use crate::layout::ManifestLayout;
use crate::{validate_component, ManifestError, ManifestOptions};
use opreg_schema::OperatorPackage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Creates and removes the on-disk manifest of one operator package.
///
/// See <https://github.com/operator-framework/operator-registry#manifest-format>
/// for the layout being produced.
pub trait Manifest {
    /// Generate the package directory, package descriptor and every bundle.
    ///
    /// Returns on the first error without trying to produce a partially valid
    /// manifest: if CSV v1 is fine but CSV v2 is not, the call fails and the
    /// caller must invoke [`delete`](Self::delete) to clean up.
    fn create(&mut self) -> Result<(), ManifestError>;

    /// Remove everything `create` wrote. A no-op if nothing was created.
    fn delete(&mut self) -> Result<(), ManifestError>;
}

/// [`Manifest`] implementation writing a directory tree under a registry directory.
pub struct ManifestBuilder<'a> {
    package: &'a OperatorPackage,
    registry_dir: PathBuf,
    options: ManifestOptions,
    manifest_dir: Option<PathBuf>,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(package: &'a OperatorPackage, registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            package,
            registry_dir: registry_dir.into(),
            options: ManifestOptions::default(),
            manifest_dir: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ManifestOptions) -> Self {
        self.options = options;
        self
    }

    /// The package directory, once `create` has made it.
    pub fn manifest_dir(&self) -> Option<&Path> {
        self.manifest_dir.as_deref()
    }

    fn create_manifest_dir(&mut self, layout: &ManifestLayout) -> Result<(), ManifestError> {
        let dir = layout.manifest_dir();
        create_dir(&dir).map_err(ManifestError::into_configuration)?;
        self.manifest_dir = Some(dir);
        Ok(())
    }

    fn create_package_file(&self, layout: &ManifestLayout) -> Result<(), ManifestError> {
        write_document(&self.package.package, &layout.package_file(), self.options)
    }

    fn create_bundles(&self, layout: &ManifestLayout) -> Result<(), ManifestError> {
        let bundles = BundleMaterializer::new(layout, self.package.crd_map(), self.options);
        for csv in &self.package.cluster_service_versions {
            bundles.materialize(csv)?;
        }
        Ok(())
    }
}

impl Manifest for ManifestBuilder<'_> {
    fn create(&mut self) -> Result<(), ManifestError> {
        let package = self.package;
        let package_id = package.package_id();
        validate_component("package id", package_id)?;
        let layout = ManifestLayout::new(&self.registry_dir, package_id);
        info!(
            "creating manifest for package {package_id} in {}",
            self.registry_dir.display()
        );

        let result = self
            .create_manifest_dir(&layout)
            .and_then(|()| self.create_package_file(&layout))
            .and_then(|()| self.create_bundles(&layout));

        match &result {
            Ok(()) => info!(
                "created manifest {} with {} bundles",
                layout.manifest_dir().display(),
                package.cluster_service_versions.len()
            ),
            Err(e) => warn!("manifest creation for package {package_id} failed: {e}"),
        }
        result
    }

    fn delete(&mut self) -> Result<(), ManifestError> {
        let Some(dir) = self.manifest_dir.as_deref() else {
            debug!("no manifest directory was created; nothing to delete");
            return Ok(());
        };
        if remove_tree(dir)? {
            info!("removed manifest {}", dir.display());
        }
        Ok(())
    }
}

/// Remove `<registry_dir>/<package_id>` regardless of who created it.
///
/// Returns `false` if the directory did not exist.
pub fn remove_manifest(registry_dir: &Path, package_id: &str) -> Result<bool, ManifestError> {
    validate_component("package id", package_id)?;
    let dir = ManifestLayout::new(registry_dir, package_id).manifest_dir();
    let removed = remove_tree(&dir)?;
    if removed {
        info!("removed manifest {}", dir.display());
    }
    Ok(removed)
}
