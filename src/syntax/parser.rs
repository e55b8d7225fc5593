use crate::syntax::errors::SyntaxError;
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper for Rust source code.
pub struct RustParser {
    parser: Parser,
}

impl RustParser {
    pub fn new() -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|_| SyntaxError::ParserInit)?;
        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser
            .parse(source, None)
            .ok_or(SyntaxError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, SyntaxError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        has_error_nodes(self.tree.root_node())
    }

    /// Location and context of the first ERROR or MISSING node, if any.
    pub fn first_error(&self) -> Option<ErrorNode> {
        first_error_node(self.tree.root_node()).map(|node| {
            let start = node.start_position();
            let byte_start = node.start_byte();
            let byte_end = node.end_byte();

            let context_start = byte_start.saturating_sub(20);
            let context_end = (byte_end + 20).min(self.source.len());
            let context = self
                .source
                .get(context_start..context_end)
                .unwrap_or("")
                .replace('\n', "\\n");

            ErrorNode {
                line: start.row + 1,
                column: start.column + 1,
                context,
            }
        })
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Location of the first error node in a parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub line: usize,
    pub column: usize,
    pub context: String,
}

fn has_error_nodes(node: tree_sitter::Node<'_>) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }
    if !node.has_error() {
        return false;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_error_nodes(child) {
            return true;
        }
    }

    false
}

fn first_error_node(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_rust() {
        let mut parser = RustParser::new().unwrap();
        let source = "fn main() { println!(\"hello\"); }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "source_file");
    }

    #[test]
    fn parse_invalid_rust() {
        let mut parser = RustParser::new().unwrap();
        let source = "fn main( { }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(parsed.has_errors());
        assert!(parsed.first_error().is_some());
    }
}
