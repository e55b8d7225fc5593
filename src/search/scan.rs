//! Concurrent content scanning: bounded worker pool, job fan-out, result
//! fan-in.
//!
//! Workers are scoped threads fed from a job channel and drained through a
//! result channel; the scope is the join barrier, so no worker can outlive
//! the search call that spawned it. Results are sorted by path before
//! returning — deterministic within a run, though callers must not rely on
//! any particular order across runs.

use crate::search::FileMatch;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// How many bytes to probe when deciding whether a file is binary.
const BINARY_PROBE_LEN: usize = 8192;

/// Context lines on each side of a matched line in a snippet.
const CONTEXT_LINES: usize = 2;

/// Cooperative cancellation signal shared between a caller and the workers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Scan `files` for lines matching `pattern` using a worker pool sized to
/// the available parallelism.
pub fn scan_concurrently(
    files: Vec<PathBuf>,
    pattern: &Regex,
    cancel: &CancelToken,
) -> Vec<FileMatch> {
    if files.is_empty() {
        return Vec::new();
    }

    let workers = num_cpus::get().min(files.len()).max(1);
    debug!(files = files.len(), workers, "starting content scan");

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<PathBuf>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<FileMatch>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for path in job_rx.iter() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    if let Some(found) = scan_file(path, pattern) {
                        // The receiver outlives the scope; send cannot fail
                        // while any job remains.
                        let _ = result_tx.send(found);
                    }
                }
            });
        }
        // The spawning thread keeps no receiver or sender beyond the loop:
        // dropping job_tx closes the queue, and the scope joins every worker.
        drop(job_rx);
        drop(result_tx);

        for file in files {
            let _ = job_tx.send(file);
        }
        drop(job_tx);
    });

    let mut matches: Vec<FileMatch> = result_rx.into_iter().collect();
    matches.sort_by(|a, b| a.path.cmp(&b.path));
    matches
}

/// Scan one file, returning its aggregated match or `None` when the file is
/// unreadable, binary, or has no matching line.
fn scan_file(path: PathBuf, pattern: &Regex) -> Option<FileMatch> {
    let content = fs::read(&path).ok()?;

    if looks_binary(&content) {
        return None;
    }

    let text = String::from_utf8_lossy(&content);
    let lines: Vec<&str> = text.lines().collect();

    let mut matched_lines = Vec::new();
    let mut snippets = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if pattern.is_match(line) {
            matched_lines.push(index + 1);
            snippets.push(build_snippet(&lines, index));
        }
    }

    if matched_lines.is_empty() {
        return None;
    }

    Some(FileMatch {
        path,
        matched_lines,
        snippets,
        total_lines: lines.len(),
    })
}

/// A file is treated as binary when its leading bytes contain a NUL.
fn looks_binary(content: &[u8]) -> bool {
    let probe = &content[..content.len().min(BINARY_PROBE_LEN)];
    probe.contains(&0u8)
}

/// Build a context block around `index` (0-based), clamped to file bounds,
/// with the matched line marked.
fn build_snippet(lines: &[&str], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_LINES);
    let end = (index + CONTEXT_LINES + 1).min(lines.len());

    (start..end)
        .map(|j| {
            let marker = if j == index { "→ " } else { "  " };
            format!("{marker}{:>4}| {}", j + 1, lines[j])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn matches_report_one_indexed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.txt", "zero\nneedle here\ntwo\n");

        let re = Regex::new("needle").unwrap();
        let found = scan_file(path, &re).unwrap();
        assert_eq!(found.matched_lines, vec![2]);
        assert_eq!(found.total_lines, 3);
    }

    #[test]
    fn snippet_marks_matched_line_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.txt", "l1\nl2\nl3 needle\nl4\nl5\nl6\n");

        let re = Regex::new("needle").unwrap();
        let found = scan_file(path, &re).unwrap();
        let snippet = &found.snippets[0];

        assert!(snippet.contains("→    3| l3 needle"));
        assert!(snippet.contains("   1| l1"));
        assert!(snippet.contains("   5| l5"));
        assert!(!snippet.contains("l6"));
        assert_eq!(snippet.lines().count(), 5);
    }

    #[test]
    fn binary_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin");
        fs::write(&path, b"ELF\x00\x01needle").unwrap();

        let re = Regex::new("needle").unwrap();
        assert!(scan_file(path, &re).is_none());
    }

    #[test]
    fn no_match_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.txt", "nothing to see\n");

        let re = Regex::new("needle").unwrap();
        assert!(scan_file(path, &re).is_none());
    }

    #[test]
    fn concurrent_scan_finds_all_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..20 {
            let content = if i % 2 == 0 { "has needle\n" } else { "nope\n" };
            files.push(write(dir.path(), &format!("f{i:02}.txt"), content));
        }

        let re = Regex::new("needle").unwrap();
        let matches = scan_concurrently(files, &re, &CancelToken::new());

        assert_eq!(matches.len(), 10);
        let paths: Vec<_> = matches.iter().map(|m| m.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn cancelled_scan_returns_without_hanging() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<_> = (0..50)
            .map(|i| write(dir.path(), &format!("f{i}.txt"), "needle\n"))
            .collect();

        let cancel = CancelToken::new();
        cancel.cancel();
        let re = Regex::new("needle").unwrap();
        let matches = scan_concurrently(files, &re, &cancel);

        // Everything may have been skipped, but the pool must have drained.
        assert!(matches.len() <= 50);
    }

    proptest! {
        // Snippets always stay within file bounds and span at most
        // 2*CONTEXT_LINES + 1 lines regardless of where the match lands.
        #[test]
        fn snippet_window_is_always_clamped(line_count in 1usize..40, index in 0usize..40) {
            let index = index.min(line_count - 1);
            let owned: Vec<String> = (0..line_count).map(|i| format!("line {i}")).collect();
            let lines: Vec<&str> = owned.iter().map(|s| s.as_str()).collect();

            let snippet = build_snippet(&lines, index);
            let rendered = snippet.lines().count();

            prop_assert!(rendered <= 2 * CONTEXT_LINES + 1);
            prop_assert!(rendered >= 1);
            let marker = format!("→ {:>4}| line {}", index + 1, index);
            prop_assert!(snippet.contains(&marker));
        }
    }
}
