//! On-disk materialization of operator packages in the operator-registry
//! manifest format.
//!
//! `ManifestBuilder` turns an `OperatorPackage` into a directory tree: one
//! package directory holding the package descriptor and one subdirectory per
//! CSV version holding the CSV and the CRDs it owns. Construction is fail-fast;
//! on any error the caller cleans up with [`Manifest::delete`]. `ManifestLayout`
//! computes the paths, `document` holds the directory and atomic YAML writers,
//! `bundle` materializes a single CSV, and `reader` loads a tree back.

pub mod builder;
pub mod bundle;
pub mod document;
pub mod layout;
pub mod reader;

pub use builder::{remove_manifest, Manifest, ManifestBuilder};
pub use bundle::BundleMaterializer;
pub use document::{create_dir, read_document, remove_tree, write_document};
pub use layout::{ManifestLayout, CRD_SUFFIX, CSV_SUFFIX, PACKAGE_SUFFIX};
pub use reader::{read_manifest, BundleContents, ManifestTree};

use opreg_schema::CrdKey;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Knobs for how documents reach the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Fsync every written file and its parent directory.
    pub durable: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self { durable: true }
    }
}

/// Fsync a directory so that a preceding `rename()` into it is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

/// File-system operation that failed, recorded in [`ManifestError::Io`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    CreateDir,
    WriteFile,
    ReadFile,
    ReadDir,
    RemoveDir,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoOp::CreateDir => write!(f, "create directory"),
            IoOp::WriteFile => write!(f, "write file"),
            IoOp::ReadFile => write!(f, "read file"),
            IoOp::ReadDir => write!(f, "read directory"),
            IoOp::RemoveDir => write!(f, "remove directory"),
        }
    }
}

/// Coarse classification of a [`ManifestError`], stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidName,
    MissingVersion,
    UnresolvedReference,
    AmbiguousReference,
    Serialization,
    Io,
    InvalidLayout,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot create manifest directory '{}': {source}", path.display())]
    Configuration { path: PathBuf, source: io::Error },
    #[error("invalid {what} '{value}': must be a single, non-empty path component")]
    InvalidName { what: &'static str, value: String },
    #[error("unable to create bundle directory: CSV '{csv}' is missing a version")]
    MissingVersion { csv: String },
    #[error("owned CRD {key} for CSV '{csv}' not found")]
    UnresolvedReference { csv: String, key: CrdKey },
    #[error("owned CRD {key} for CSV '{csv}' matches {count} definitions, expected exactly one")]
    AmbiguousReference {
        csv: String,
        key: CrdKey,
        count: usize,
    },
    #[error("failed to convert '{}' to or from YAML: {source}", path.display())]
    Serialization {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("failed to {op} '{}': {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid manifest layout at '{}': {reason}", path.display())]
    InvalidLayout { path: PathBuf, reason: String },
    #[error("bundle for CSV '{csv}': {source}")]
    Bundle {
        csv: String,
        source: Box<ManifestError>,
    },
}

impl ManifestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ManifestError::Configuration { .. } => ErrorKind::Configuration,
            ManifestError::InvalidName { .. } => ErrorKind::InvalidName,
            ManifestError::MissingVersion { .. } => ErrorKind::MissingVersion,
            ManifestError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            ManifestError::AmbiguousReference { .. } => ErrorKind::AmbiguousReference,
            ManifestError::Serialization { .. } => ErrorKind::Serialization,
            ManifestError::Io { .. } => ErrorKind::Io,
            ManifestError::InvalidLayout { .. } => ErrorKind::InvalidLayout,
            ManifestError::Bundle { source, .. } => source.kind(),
        }
    }

    /// Name of the CSV whose bundle failed, if the error is bundle-scoped.
    pub fn csv(&self) -> Option<&str> {
        match self {
            ManifestError::MissingVersion { csv }
            | ManifestError::UnresolvedReference { csv, .. }
            | ManifestError::AmbiguousReference { csv, .. }
            | ManifestError::Bundle { csv, .. } => Some(csv.as_str()),
            _ => None,
        }
    }

    /// The underlying OS error kind, looking through bundle wrapping.
    pub fn io_error_kind(&self) -> Option<io::ErrorKind> {
        match self {
            ManifestError::Configuration { source, .. } | ManifestError::Io { source, .. } => {
                Some(source.kind())
            }
            ManifestError::Bundle { source, .. } => source.io_error_kind(),
            _ => None,
        }
    }

    /// Attach the CSV name unless the error already carries it.
    pub(crate) fn in_bundle(self, csv: &str) -> Self {
        match self {
            ManifestError::MissingVersion { .. }
            | ManifestError::UnresolvedReference { .. }
            | ManifestError::AmbiguousReference { .. }
            | ManifestError::Bundle { .. } => self,
            other => ManifestError::Bundle {
                csv: csv.to_owned(),
                source: Box::new(other),
            },
        }
    }

    /// A failure to create the package root means the registry directory is unusable.
    pub(crate) fn into_configuration(self) -> Self {
        match self {
            ManifestError::Io {
                op: IoOp::CreateDir,
                path,
                source,
            } => ManifestError::Configuration { path, source },
            other => other,
        }
    }
}

/// Reject names that would not land as exactly one entry inside their parent,
/// or whose directory entry would differ from the document text.
pub fn validate_component(what: &'static str, value: &str) -> Result<(), ManifestError> {
    let invalid = value.is_empty()
        || value.trim() != value
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ManifestError::InvalidName {
            what,
            value: value.to_owned(),
        });
    }
    Ok(())
}
