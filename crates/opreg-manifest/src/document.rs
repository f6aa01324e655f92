use crate::{fsync_dir, IoOp, ManifestError, ManifestOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Mode of every directory in a manifest tree: owner only.
pub const DIR_MODE: u32 = 0o700;
/// Mode of every document in a manifest tree: owner read/write, others read.
pub const FILE_MODE: u32 = 0o644;

fn io_error(op: IoOp, path: &Path) -> impl Fn(io::Error) -> ManifestError + '_ {
    move |source| ManifestError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}

/// Create exactly one directory. The parent must exist and `path` must be free.
pub fn create_dir(path: &Path) -> Result<(), ManifestError> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
        .create(path)
        .map_err(io_error(IoOp::CreateDir, path))?;
    debug!("created directory {}", path.display());
    Ok(())
}

/// Serialize `value` as YAML and make it the complete content of `path`.
///
/// The document is rendered before anything is written, and the bytes go to a
/// temporary file in the destination directory that is renamed over `path`,
/// so the destination is never left truncated.
pub fn write_document<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
    options: ManifestOptions,
) -> Result<(), ManifestError> {
    let content = serde_yaml_ng::to_string(value).map_err(|source| {
        ManifestError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = io_error(IoOp::WriteFile, path);

    let mut tmp = NamedTempFile::new_in(dir).map_err(&write_err)?;
    tmp.write_all(content.as_bytes()).map_err(&write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(FILE_MODE))
            .map_err(&write_err)?;
    }
    if options.durable {
        tmp.as_file().sync_all().map_err(&write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    if options.durable {
        fsync_dir(dir).map_err(&write_err)?;
    }

    debug!("wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
    let content = fs::read_to_string(path).map_err(io_error(IoOp::ReadFile, path))?;
    serde_yaml_ng::from_str(&content).map_err(|source| ManifestError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively remove `path`. Returns `false` if there was nothing to remove.
pub fn remove_tree(path: &Path) -> Result<bool, ManifestError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error(IoOp::RemoveDir, path)(e)),
    }
}
