//! Source patcher: mutate a single Rust file with syntax-safety guarantees.
//!
//! Two strategies, both ending in the same validate -> format -> atomic
//! commit pipeline ([`SourceFile::commit`]):
//!
//! - exact-text replacement for ad hoc edits where the caller supplies
//!   surrounding context ([`exact`]);
//! - structured declaration-level operations where the parse tree supplies
//!   the spans ([`structured`]).
//!
//! The file on disk is never touched until the candidate content has passed
//! both syntax gates; a rejected edit is a no-op.

pub mod errors;
pub mod exact;
pub mod format;
pub mod source;
pub mod structured;

pub use errors::PatchError;
pub use source::SourceFile;

use std::path::PathBuf;
use tracing::info;

/// One edit operation, decoded once at the tool boundary.
#[derive(Debug, Clone)]
pub enum EditRequest {
    ReplaceExact {
        path: PathBuf,
        old_text: String,
        new_text: String,
    },
    ReplaceLineRange {
        path: PathBuf,
        start_line: usize,
        end_line: usize,
        new_text: String,
    },
    AddImport {
        path: PathBuf,
        import_path: String,
        alias: Option<String>,
    },
    RemoveImport {
        path: PathBuf,
        import_path: String,
    },
    AddDeclaration {
        path: PathBuf,
        name: String,
        declared_type: Option<String>,
        value_expr: Option<String>,
        is_const: bool,
    },
    AddFunction {
        path: PathBuf,
        source_code: String,
    },
}

impl EditRequest {
    pub fn path(&self) -> &PathBuf {
        match self {
            EditRequest::ReplaceExact { path, .. }
            | EditRequest::ReplaceLineRange { path, .. }
            | EditRequest::AddImport { path, .. }
            | EditRequest::RemoveImport { path, .. }
            | EditRequest::AddDeclaration { path, .. }
            | EditRequest::AddFunction { path, .. } => path,
        }
    }
}

/// Result of a completed edit. `changed` is false for idempotent no-ops
/// ("already exists", "not found"), which leave the file byte-identical.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub message: String,
    pub changed: bool,
}

/// A planned edit: the loaded file plus the candidate content.
///
/// Planning performs all input validation and span computation but does not
/// touch the disk; [`EditPlan::commit`] runs the syntax gates and the atomic
/// write. `candidate` is `None` for idempotent no-ops.
pub struct EditPlan {
    pub file: SourceFile,
    pub candidate: Option<String>,
    pub message: String,
}

impl EditPlan {
    pub fn commit(self) -> Result<EditOutcome, PatchError> {
        match self.candidate {
            Some(candidate) => {
                self.file.commit(&candidate)?;
                Ok(EditOutcome {
                    message: self.message,
                    changed: true,
                })
            }
            None => Ok(EditOutcome {
                message: self.message,
                changed: false,
            }),
        }
    }
}

/// Plan an edit without writing anything.
pub fn plan(req: &EditRequest) -> Result<EditPlan, PatchError> {
    let file = SourceFile::load(req.path())?;

    let (candidate, message) = match req {
        EditRequest::ReplaceExact {
            old_text, new_text, ..
        } => {
            let (candidate, message) = exact::replace_exact(&file, old_text, new_text)?;
            (Some(candidate), message)
        }
        EditRequest::ReplaceLineRange {
            start_line,
            end_line,
            new_text,
            ..
        } => structured::replace_line_range(&file, *start_line, *end_line, new_text)?,
        EditRequest::AddImport {
            import_path, alias, ..
        } => structured::add_import(&file, import_path, alias.as_deref())?,
        EditRequest::RemoveImport { import_path, .. } => {
            structured::remove_import(&file, import_path)?
        }
        EditRequest::AddDeclaration {
            name,
            declared_type,
            value_expr,
            is_const,
            ..
        } => structured::add_declaration(
            &file,
            name,
            declared_type.as_deref(),
            value_expr.as_deref(),
            *is_const,
        )?,
        EditRequest::AddFunction { source_code, .. } => {
            structured::add_function(&file, source_code)?
        }
    };

    Ok(EditPlan {
        file,
        candidate,
        message,
    })
}

/// Plan and commit an edit in one step.
pub fn apply(req: &EditRequest) -> Result<EditOutcome, PatchError> {
    let outcome = plan(req)?.commit()?;
    info!(
        path = %req.path().display(),
        changed = outcome.changed,
        "{}",
        outcome.message
    );
    Ok(outcome)
}
