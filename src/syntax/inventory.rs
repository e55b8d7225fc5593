//! Top-level declaration inventory for a parsed Rust file.
//!
//! Structured edits need precise byte spans for existing declarations: where
//! the import block ends, which functions and consts already exist, where the
//! first real item starts. This walks only the direct children of
//! `source_file` — nested items inside modules or functions are deliberately
//! ignored, matching the "top-level declaration" contract of the edit
//! operations.

use crate::syntax::parser::ParsedSource;

/// A top-level `use` declaration with its full byte span.
#[derive(Debug, Clone)]
pub struct UseDecl {
    pub byte_start: usize,
    pub byte_end: usize,
    /// The declaration text, e.g. `use std::fs;`.
    pub text: String,
}

/// A named top-level declaration (fn, const, static).
#[derive(Debug, Clone)]
pub struct NamedDecl {
    pub name: String,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Inventory of the top-level declarations in one source file.
#[derive(Debug, Clone, Default)]
pub struct DeclInventory {
    pub uses: Vec<UseDecl>,
    pub functions: Vec<NamedDecl>,
    pub consts: Vec<NamedDecl>,
    pub statics: Vec<NamedDecl>,
    /// Byte offset of the first item that is not an inner attribute, inner
    /// doc comment, or shebang. Imports inserted into a file with no existing
    /// `use` block go here. `None` for files with no items at all.
    pub first_item_start: Option<usize>,
}

impl DeclInventory {
    /// Build the inventory from a parsed source file.
    pub fn collect(parsed: &ParsedSource<'_>) -> Self {
        let mut inv = DeclInventory::default();
        let root = parsed.root_node();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let kind = child.kind();

            if inv.first_item_start.is_none() && !is_prelude(kind, parsed.node_text(child)) {
                inv.first_item_start = Some(child.start_byte());
            }

            match kind {
                "use_declaration" => inv.uses.push(UseDecl {
                    byte_start: child.start_byte(),
                    byte_end: child.end_byte(),
                    text: parsed.node_text(child).to_string(),
                }),
                "function_item" | "const_item" | "static_item" => {
                    let Some(name_node) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let decl = NamedDecl {
                        name: parsed.node_text(name_node).to_string(),
                        byte_start: child.start_byte(),
                        byte_end: child.end_byte(),
                    };
                    match kind {
                        "function_item" => inv.functions.push(decl),
                        "const_item" => inv.consts.push(decl),
                        _ => inv.statics.push(decl),
                    }
                }
                _ => {}
            }
        }

        inv
    }

    pub fn function(&self, name: &str) -> Option<&NamedDecl> {
        self.functions.iter().find(|d| d.name == name)
    }

    pub fn const_item(&self, name: &str) -> Option<&NamedDecl> {
        self.consts.iter().find(|d| d.name == name)
    }

    pub fn static_item(&self, name: &str) -> Option<&NamedDecl> {
        self.statics.iter().find(|d| d.name == name)
    }

    /// Byte offset just past the last top-level `use` declaration.
    pub fn use_block_end(&self) -> Option<usize> {
        self.uses.iter().map(|u| u.byte_end).max()
    }
}

/// Nodes that must stay at the very top of the file: shebangs, inner
/// attributes, inner doc comments, and plain comments. Outer doc comments
/// (`///`, `/**`) attach to the item below them, so an insertion anchored at
/// `first_item_start` must land above them, not between doc and item.
fn is_prelude(kind: &str, text: &str) -> bool {
    match kind {
        "shebang" | "inner_attribute_item" => true,
        "line_comment" => !text.starts_with("///"),
        "block_comment" => !text.starts_with("/**"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::RustParser;

    const SOURCE: &str = r#"//! Module docs.
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf as FilePath;

const LIMIT: usize = 10;
static NAME: &str = "x";

fn helper() -> i32 {
    const INNER: i32 = 1;
    INNER
}
"#;

    #[test]
    fn collects_top_level_declarations() {
        let mut parser = RustParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let inv = DeclInventory::collect(&parsed);

        assert_eq!(inv.uses.len(), 2);
        assert_eq!(inv.uses[0].text, "use std::fs;");
        assert_eq!(inv.functions.len(), 1);
        assert_eq!(inv.functions[0].name, "helper");
        assert!(inv.const_item("LIMIT").is_some());
        assert!(inv.static_item("NAME").is_some());
    }

    #[test]
    fn nested_items_are_ignored() {
        let mut parser = RustParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let inv = DeclInventory::collect(&parsed);

        // INNER lives inside helper() and must not appear.
        assert!(inv.const_item("INNER").is_none());
    }

    #[test]
    fn first_item_skips_inner_attributes_and_docs() {
        let mut parser = RustParser::new().unwrap();
        let parsed = parser.parse_with_source(SOURCE).unwrap();
        let inv = DeclInventory::collect(&parsed);

        let start = inv.first_item_start.unwrap();
        assert!(SOURCE[start..].starts_with("use std::fs;"));
    }

    #[test]
    fn outer_doc_comment_anchors_with_its_item() {
        let mut parser = RustParser::new().unwrap();
        let source = "// Plain header comment.\n\n/// Entry point.\nfn main() {}\n";
        let parsed = parser.parse_with_source(source).unwrap();
        let inv = DeclInventory::collect(&parsed);

        // The outer doc belongs to fn main; the plain comment does not.
        let start = inv.first_item_start.unwrap();
        assert!(source[start..].starts_with("/// Entry point."));
    }

    #[test]
    fn empty_file_has_no_anchor() {
        let mut parser = RustParser::new().unwrap();
        let parsed = parser.parse_with_source("//! Only docs.\n").unwrap();
        let inv = DeclInventory::collect(&parsed);

        assert!(inv.first_item_start.is_none());
        assert!(inv.use_block_end().is_none());
    }
}
