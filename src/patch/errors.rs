use crate::fsio::FsError;
use crate::syntax::SyntaxError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while planning or applying an edit.
///
/// Every message is written for an autonomous caller: it states what was
/// wrong and what to do next. No variant ever corresponds to a partially
/// applied edit — the target file is untouched whenever one of these is
/// returned.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error(
        "old text not found in {path}. Re-read the file and provide the exact \
         text to replace, including whitespace and indentation"
    )]
    TextNotFound { path: PathBuf },

    #[error(
        "old text appears {count} times in {path}; include more surrounding \
         context so the match is unique"
    )]
    AmbiguousMatch { count: usize, path: PathBuf },

    #[error(
        "line range {start_line}..={end_line} is invalid for a file with \
         {total_lines} lines (lines are 1-indexed and end_line must be >= start_line)"
    )]
    InvalidRange {
        start_line: usize,
        end_line: usize,
        total_lines: usize,
    },

    #[error(
        "import '{import_path}' is part of a grouped `use` declaration; use the \
         exact-text edit tool to restructure the group"
    )]
    GroupedImport { import_path: String },

    #[error("'{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("at least one of 'var_type' and 'var_value' must be provided")]
    MissingTypeAndValue,

    #[error("'{import_path}' is not a valid import path: {message}")]
    BadImportPath {
        import_path: String,
        message: String,
    },

    #[error("'{name}' is not a valid identifier")]
    BadIdentifier { name: String },

    #[error("the edit would leave the file syntactically invalid, so it was rejected: {0}")]
    Rejected(SyntaxError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Fs(#[from] FsError),
}
