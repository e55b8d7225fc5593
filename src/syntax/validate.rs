//! Validation gates for edited source content.
//!
//! Hard rule: no content reaches the disk without passing two independent
//! checks — a `syn` whole-file parse and a tree-sitter ERROR-node scan. A
//! structurally sound splice can still serialize into invalid text, so the
//! gates run on the final candidate content, not on the mutation inputs.

use crate::pool;
use crate::syntax::errors::SyntaxError;

/// Validate that `content` is a syntactically complete Rust file.
///
/// Gate 1 is `syn::parse_file`; gate 2 is a tree-sitter parse checked for
/// ERROR and MISSING nodes. Both must pass.
pub fn validate_source(content: &str) -> Result<(), SyntaxError> {
    syn::parse_file(content).map_err(|e| SyntaxError::NotRust {
        message: e.to_string(),
    })?;

    pool::with_parser(|parser| {
        let parsed = parser.parse_with_source(content)?;
        if let Some(err) = parsed.first_error() {
            return Err(SyntaxError::Invalid {
                line: err.line,
                column: err.column,
                context: err.context,
            });
        }
        Ok(())
    })?
}

/// Validate that a fragment parses as one or more complete Rust items.
///
/// Used for `replace_code_block` payloads: partial snippets (a bare `if`, an
/// unclosed function) are rejected here, before the file is touched.
pub fn validate_items_fragment(code: &str) -> Result<syn::File, SyntaxError> {
    syn::parse_file(code).map_err(|e| SyntaxError::Fragment {
        message: format!(
            "{e}. The code must be one or more complete declarations \
             (a full `fn`, `struct`, `const`, ... from first token to closing brace)"
        ),
    })
}

/// Validate that a fragment is exactly one function item and return it.
pub fn parse_function_fragment(code: &str) -> Result<syn::ItemFn, SyntaxError> {
    let file = syn::parse_file(code).map_err(|e| SyntaxError::Fragment {
        message: format!("{e}. Provide a complete `fn` declaration"),
    })?;

    if file.items.len() != 1 {
        return Err(SyntaxError::Fragment {
            message: format!(
                "expected exactly one function declaration, found {} items",
                file.items.len()
            ),
        });
    }

    match file.items.into_iter().next() {
        Some(syn::Item::Fn(f)) => Ok(f),
        _ => Err(SyntaxError::Fragment {
            message: "the code is not a function declaration".to_string(),
        }),
    }
}

/// Validate that `code` parses as a standalone Rust expression.
pub fn validate_expr(code: &str) -> Result<(), SyntaxError> {
    syn::parse_str::<syn::Expr>(code)
        .map(|_| ())
        .map_err(|e| SyntaxError::Expression {
            message: e.to_string(),
        })
}

/// Validate that `code` parses as a Rust type.
pub fn validate_type(code: &str) -> Result<(), SyntaxError> {
    syn::parse_str::<syn::Type>(code)
        .map(|_| ())
        .map_err(|e| SyntaxError::Expression {
            message: format!("not a valid type: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_file_passes_both_gates() {
        assert!(validate_source("fn main() { println!(\"hi\"); }\n").is_ok());
    }

    #[test]
    fn syn_gate_rejects_broken_file() {
        let result = validate_source("fn main( { }\n");
        assert!(result.is_err());
    }

    #[test]
    fn items_fragment_accepts_multiple_items() {
        let file = validate_items_fragment("fn a() {}\nfn b() {}\n").unwrap();
        assert_eq!(file.items.len(), 2);
    }

    #[test]
    fn items_fragment_rejects_bare_statement() {
        // A lone `if` is not a declaration.
        assert!(validate_items_fragment("if x { return; }").is_err());
    }

    #[test]
    fn function_fragment_must_be_single_fn() {
        assert!(parse_function_fragment("fn solo() {}").is_ok());
        assert!(parse_function_fragment("fn a() {}\nfn b() {}").is_err());
        assert!(parse_function_fragment("struct NotAFn;").is_err());
    }

    #[test]
    fn function_fragment_reports_name() {
        let f = parse_function_fragment("fn compute(x: i32) -> i32 { x * 2 }").unwrap();
        assert_eq!(f.sig.ident.to_string(), "compute");
    }

    #[test]
    fn expressions_validate_standalone() {
        assert!(validate_expr("1 + 2").is_ok());
        assert!(validate_expr("Vec::new()").is_ok());
        assert!(validate_expr("fn nope() {}").is_err());
    }

    #[test]
    fn types_validate_standalone() {
        assert!(validate_type("Vec<String>").is_ok());
        assert!(validate_type("&'static str").is_ok());
        assert!(validate_type("not a type!!").is_err());
    }
}
