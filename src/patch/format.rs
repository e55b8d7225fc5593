//! Canonical formatting via rustfmt.
//!
//! Formatting runs after validation and must never fail an edit: when
//! rustfmt is missing from the environment or rejects the input, the
//! unformatted-but-valid content is used as-is.

use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Format `content` with rustfmt, falling back to the input on any failure.
pub fn canonical(content: &str) -> String {
    match run_rustfmt(content) {
        Ok(formatted) => formatted,
        Err(e) => {
            debug!(error = %e, "rustfmt unavailable or failed; writing unformatted content");
            content.to_string()
        }
    }
}

fn run_rustfmt(content: &str) -> std::io::Result<String> {
    let mut child = Command::new("rustfmt")
        .args(["--edition", "2021", "--emit", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(content.as_bytes())?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(std::io::Error::other(format!(
            "rustfmt exited with {}",
            output.status
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| std::io::Error::other("rustfmt produced non-UTF-8 output"))
}
