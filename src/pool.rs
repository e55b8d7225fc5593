//! Per-thread parser reuse.
//!
//! Every edit validates its candidate and every structured operation takes a
//! declaration inventory, so tree-sitter parses happen constantly, including
//! on scan worker threads. Grammar setup is the expensive part; each thread
//! keeps one [`RustParser`] in a thread-local slot and reuses it for the life
//! of the thread.

use crate::syntax::{RustParser, SyntaxError};
use std::cell::RefCell;

thread_local! {
    static PARSER_SLOT: RefCell<Option<RustParser>> = const { RefCell::new(None) };
}

/// Run `f` against the calling thread's parser, initializing it on first use.
pub fn with_parser<F, R>(f: F) -> Result<R, SyntaxError>
where
    F: FnOnce(&mut RustParser) -> R,
{
    PARSER_SLOT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = Some(RustParser::new()?);
        }
        let parser = slot.as_mut().expect("slot filled on the line above");
        Ok(f(parser))
    })
}
