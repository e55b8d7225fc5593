//! Codescout: concurrent file search and safe Rust source patching
//!
//! Two engines behind one tool surface: a parallel file-search engine and a
//! syntax-validated source patcher, designed for autonomous coding agents
//! that locate code before they change it.
//!
//! # Architecture
//!
//! All patch operations compile down to a single primitive: a byte-span
//! splice on the file's current content. Intelligence lives in span
//! acquisition (exact-text matching, tree-sitter declaration inventory), not
//! in the application logic. Search shares nothing with patching except the
//! filesystem; searches may run concurrently with an edit.
//!
//! # Safety
//!
//! - Candidate content passes two independent syntax gates (syn and
//!   tree-sitter) before anything is written
//! - Atomic file writes (tempfile + fsync + rename) preserving permissions
//! - A rejected or no-op edit leaves the file byte-identical
//! - Structured operations are idempotent
//!
//! # Example
//!
//! ```no_run
//! use codescout::patch::{self, EditRequest};
//! use codescout::search::{self, SearchRequest};
//! use std::path::PathBuf;
//!
//! let req = SearchRequest::new("src").content("fn main");
//! for found in search::search(&req)? {
//!     println!("{}", found.path.display());
//! }
//!
//! let edit = EditRequest::AddImport {
//!     path: PathBuf::from("src/main.rs"),
//!     import_path: "std::fs".to_string(),
//!     alias: None,
//! };
//! let outcome = patch::apply(&edit)?;
//! println!("{}", outcome.message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod fsio;
pub mod patch;
pub mod pool;
pub mod search;
pub mod syntax;
pub mod tool;

// Re-exports
pub use fsio::FsError;
pub use patch::{EditOutcome, EditPlan, EditRequest, PatchError, SourceFile};
pub use search::{
    CancelToken, FileMatch, SearchError, SearchOutcome, SearchRequest,
};
pub use syntax::{DeclInventory, ParsedSource, RustParser, SyntaxError};
pub use tool::ToolSpec;
