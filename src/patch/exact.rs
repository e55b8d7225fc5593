//! Exact-text replacement: the ad hoc edit strategy.
//!
//! The caller supplies the old text with enough surrounding context that it
//! occurs exactly once. Zero occurrences or more than one are hard failures —
//! the engine never guesses which occurrence was intended.

use crate::patch::errors::PatchError;
use crate::patch::source::SourceFile;

/// Compute the candidate content for an exact-text replacement.
///
/// An empty `new_text` deletes the matched text.
pub fn replace_exact(
    file: &SourceFile,
    old_text: &str,
    new_text: &str,
) -> Result<(String, String), PatchError> {
    if old_text.is_empty() {
        return Err(PatchError::EmptyField { field: "old_string" });
    }

    let count = file.text.matches(old_text).count();
    match count {
        0 => Err(PatchError::TextNotFound {
            path: file.path.clone(),
        }),
        1 => {
            let start = file
                .text
                .find(old_text)
                .expect("occurrence was counted above");
            let candidate = file.splice(start, start + old_text.len(), new_text);
            let message = if new_text.is_empty() {
                "Deleted 1 occurrence of the provided text".to_string()
            } else {
                "Replaced 1 occurrence of the provided text".to_string()
            };
            Ok((candidate, message))
        }
        n => Err(PatchError::AmbiguousMatch {
            count: n,
            path: file.path.clone(),
        }),
    }
}
