//! In-memory source file moving through the edit state machine:
//! loaded -> validated -> formatted -> committed. Any gate failure leaves the
//! on-disk file byte-for-byte unchanged.

use crate::fsio;
use crate::patch::errors::PatchError;
use crate::patch::format;
use crate::syntax::validate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source file read into memory together with its permission bits.
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    perms: fs::Permissions,
}

impl SourceFile {
    /// Load a file, capturing its permissions for the eventual write-back.
    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let (text, perms) = fsio::read_with_perms(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            perms,
        })
    }

    /// Replace the byte range `[start, end)` with `replacement`, returning
    /// the candidate content. Pure; the file is not touched.
    pub fn splice(&self, start: usize, end: usize, replacement: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + replacement.len());
        out.push_str(&self.text[..start]);
        out.push_str(replacement);
        out.push_str(&self.text[end..]);
        out
    }

    /// Validate, format, and atomically write `candidate` over this file.
    ///
    /// Both syntax gates must pass before anything is written. Formatting is
    /// cosmetic: if rustfmt is unavailable or rejects the content, the
    /// unformatted-but-valid candidate is written instead.
    pub fn commit(self, candidate: &str) -> Result<(), PatchError> {
        validate::validate_source(candidate).map_err(PatchError::Rejected)?;

        let formatted = format::canonical(candidate);
        debug!(path = %self.path.display(), bytes = formatted.len(), "committing edit");
        fsio::atomic_write(&self.path, formatted.as_bytes(), self.perms)?;
        Ok(())
    }
}
