use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("failed to initialize tree-sitter parser")]
    ParserInit,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error at line {line}, column {column}: near `{context}`")]
    Invalid {
        line: usize,
        column: usize,
        context: String,
    },

    #[error("content does not parse as Rust: {message}")]
    NotRust { message: String },

    #[error("invalid code fragment: {message}")]
    Fragment { message: String },

    #[error("invalid expression: {message}")]
    Expression { message: String },
}
