use crate::document::{create_dir, write_document};
use crate::layout::ManifestLayout;
use crate::{validate_component, ManifestError, ManifestOptions};
use opreg_schema::{ClusterServiceVersion, CrdMap, CustomResourceDefinition};
use std::path::PathBuf;
use tracing::debug;

/// Writes the bundle directory of a single CSV.
///
/// A bundle is `<manifest_dir>/<version>/` holding one `.crd.yaml` per owned
/// CRD and the CSV itself. The CRDs are written first so a complete-looking
/// CSV file never lacks its owned definitions.
pub struct BundleMaterializer<'a> {
    layout: &'a ManifestLayout,
    crds: CrdMap<'a>,
    options: ManifestOptions,
}

impl<'a> BundleMaterializer<'a> {
    pub fn new(layout: &'a ManifestLayout, crds: CrdMap<'a>, options: ManifestOptions) -> Self {
        Self {
            layout,
            crds,
            options,
        }
    }

    /// Materialize `csv` and return its bundle directory.
    pub fn materialize(&self, csv: &ClusterServiceVersion) -> Result<PathBuf, ManifestError> {
        let name = csv.name();
        validate_component("CSV name", name)?;
        let version = csv.version().ok_or_else(|| ManifestError::MissingVersion {
            csv: name.to_owned(),
        })?;
        validate_component("CSV version", version).map_err(|e| e.in_bundle(name))?;

        let bundle_dir = self.layout.bundle_dir(version);
        create_dir(&bundle_dir).map_err(|e| e.in_bundle(name))?;

        let owned = self.resolve_owned(csv)?;
        for crd in &owned {
            validate_component("CRD name", crd.name()).map_err(|e| e.in_bundle(name))?;
            write_document(*crd, &self.layout.crd_file(version, crd.name()), self.options)
                .map_err(|e| e.in_bundle(name))?;
        }

        write_document(csv, &self.layout.csv_file(version, name), self.options)
            .map_err(|e| e.in_bundle(name))?;

        debug!(
            "materialized bundle {name} at {} with {} owned CRDs",
            bundle_dir.display(),
            owned.len()
        );
        Ok(bundle_dir)
    }

    /// Look up every owned CRD of `csv`. Each key must match exactly one definition.
    pub fn resolve_owned(
        &self,
        csv: &ClusterServiceVersion,
    ) -> Result<Vec<&'a CustomResourceDefinition>, ManifestError> {
        csv.owned_crd_keys()
            .into_iter()
            .map(|key| match self.crds.get(&key).map(Vec::as_slice) {
                Some([crd]) => Ok(*crd),
                None | Some([]) => Err(ManifestError::UnresolvedReference {
                    csv: csv.name().to_owned(),
                    key,
                }),
                Some(matches) => Err(ManifestError::AmbiguousReference {
                    csv: csv.name().to_owned(),
                    key,
                    count: matches.len(),
                }),
            })
            .collect()
    }
}
