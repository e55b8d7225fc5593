//! Rust syntax services: parsing, declaration inventory, validation gates.
//!
//! Span location is CST-based (tree-sitter) so edits can splice bytes without
//! losing comments or formatting; fragment and whole-file validation is
//! AST-based (syn). The two toolchains are deliberately independent — see
//! [`validate`] for why both run before any write.

pub mod errors;
pub mod inventory;
pub mod parser;
pub mod validate;

pub use errors::SyntaxError;
pub use inventory::{DeclInventory, NamedDecl, UseDecl};
pub use parser::{ParsedSource, RustParser};
