//! Safe file I/O: permission-preserving reads and atomic writes.
//!
//! Every write in this crate goes through [`atomic_write`]: tempfile in the
//! target's directory, fsync, set permissions, rename. A concurrent reader
//! sees either the complete old file or the complete new file, never an
//! intermediate state.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("file not found: {path}. Use search_files to find the correct path")]
    NotFound { path: PathBuf },

    #[error("path is a directory, not a file: {path}")]
    IsDirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("file is not valid UTF-8 text: {path}")]
    NotUtf8 { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    fn from_io(path: &Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FsError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Read a file's content along with its permission bits.
///
/// The permissions are captured up front so a later [`atomic_write`] can
/// restore them on the replacement file.
pub fn read_with_perms(path: &Path) -> Result<(String, fs::Permissions), FsError> {
    let meta = fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
    if meta.is_dir() {
        return Err(FsError::IsDirectory {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|e| FsError::from_io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|_| FsError::NotUtf8 {
        path: path.to_path_buf(),
    })?;

    Ok((text, meta.permissions()))
}

/// Atomically replace `path` with `content`, restoring `perms`.
///
/// The temporary file is created in the same directory as the target so the
/// final rename stays on one filesystem. On any failure before the rename
/// the temp file is dropped and the target is untouched.
pub fn atomic_write(path: &Path, content: &[u8], perms: fs::Permissions) -> Result<(), FsError> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).ok_or_else(|| FsError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ),
    })?;

    let mut temp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| FsError::from_io(path, e))?;

    temp.write_all(content)
        .map_err(|e| FsError::from_io(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| FsError::from_io(path, e))?;
    fs::set_permissions(temp.path(), perms).map_err(|e| FsError::from_io(path, e))?;

    temp.persist(path)
        .map_err(|e| FsError::from_io(path, e.error))?;

    // Bump mtime so incremental tooling notices the change. The rename has
    // already landed, so a failure here is advisory, not an error.
    if let Err(e) = filetime::set_file_mtime(path, filetime::FileTime::now()) {
        debug!(path = %path.display(), error = %e, "mtime refresh failed after rename");
    }

    Ok(())
}
