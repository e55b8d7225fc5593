//! Candidate collection: one pruned directory walk, optionally narrowed by a
//! glob.
//!
//! Skipped directories are never descended into — that is a correctness
//! guarantee as much as a performance one, since symlink loops inside a
//! skipped subtree can never cause an unbounded walk. Filesystem races
//! (entries that disappear mid-walk) are expected and silently skipped.

use crate::search::scan::CancelToken;
use crate::search::SearchError;
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// Directory base names that are never descended into: version-control
/// metadata, dependency/vendor trees, build output, IDE state.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "vendor",
    "node_modules",
    "target",
    ".venv",
    "__pycache__",
    ".idea",
    ".vscode",
];

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIP_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Compile a glob with recursive `**` semantics and literal path
/// separators. Compilation happens before any filesystem access so a
/// malformed pattern fails fast.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, SearchError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| SearchError::InvalidPattern {
            kind: "glob",
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Gather all candidate files under `root`, pruning the skip-list and
/// applying `matcher` (against the path relative to the root) when present.
pub fn collect_candidates(
    root: &Path,
    matcher: Option<&GlobMatcher>,
    cancel: &CancelToken,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker {
        if cancel.is_cancelled() {
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            // Races with concurrent deletion and unreadable subtrees are
            // expected; skip rather than fail the whole search.
            Err(e) => {
                trace!(error = %e, "skipping unreadable walk entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(matcher) = matcher {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if !matcher.is_match(relative) {
                continue;
            }
        }

        files.push(entry.path().to_path_buf());
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content\n").unwrap();
    }

    #[test]
    fn walk_collects_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.rs"));
        touch(&dir.path().join("sub/b.rs"));

        let files = collect_candidates(dir.path(), None, &CancelToken::new());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn skip_list_prunes_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.rs"));
        touch(&dir.path().join(".git/objects/pack"));
        touch(&dir.path().join("node_modules/pkg/index.js"));
        touch(&dir.path().join("target/debug/binary"));

        let files = collect_candidates(dir.path(), None, &CancelToken::new());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.rs"));
    }

    #[test]
    fn glob_narrows_by_extension_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.rs"));
        touch(&dir.path().join("sub/deep/b.rs"));
        touch(&dir.path().join("sub/c.txt"));

        let matcher = compile_glob("**/*.rs").unwrap();
        let files = collect_candidates(dir.path(), Some(&matcher), &CancelToken::new());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "rs"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let result = compile_glob("a{b");
        assert!(matches!(result, Err(SearchError::InvalidPattern { .. })));
    }

    #[test]
    fn cancelled_walk_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.rs"));

        let cancel = CancelToken::new();
        cancel.cancel();
        let files = collect_candidates(dir.path(), None, &cancel);
        assert!(files.is_empty());
    }
}
