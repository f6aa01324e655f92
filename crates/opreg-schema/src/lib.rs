//! Operator package model for the operator-registry manifest format.
//!
//! This crate defines the documents a package is made of: the package
//! descriptor (`PackageManifest`), one `ClusterServiceVersion` per release and
//! the `CustomResourceDefinition`s those releases own, grouped into an
//! `OperatorPackage`. Documents keep fields they do not model so that
//! serializing them back out is lossless.

pub mod crd;
pub mod csv;
pub mod object;
pub mod package;

pub use crd::{crd_map, CrdKey, CrdMap, CrdNames, CrdSpec, CustomResourceDefinition};
pub use csv::{ClusterServiceVersion, CrdDescription, CsvSpec, CustomResourceDefinitions};
pub use object::{ExtraFields, ObjectMeta};
pub use package::{
    parse_package_file, parse_package_str, OperatorPackage, PackageChannel, PackageManifest,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read package file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse package: {0}")]
    ParseYaml(#[from] serde_yaml_ng::Error),
    #[error("package.packageName must not be empty")]
    EmptyPackageName,
}
