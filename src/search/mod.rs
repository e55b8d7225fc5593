//! Concurrent file-search engine.
//!
//! Locates files under a root directory by glob, path regex, and content
//! regex. Name criteria are resolved by a single pruned directory walk
//! ([`collect`]); content matching fans out across a worker pool and fans
//! back in before returning ([`scan`]). The engine only reads — concurrent
//! searches, and searches concurrent with an atomic edit, are safe.

pub mod collect;
pub mod scan;

pub use scan::CancelToken;

use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("directory '{path}' does not exist")]
    RootNotFound { path: PathBuf },

    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("invalid {kind} pattern '{pattern}': {message}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        message: String,
    },
}

/// What to search for and where.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Root directory; must exist.
    pub root: PathBuf,
    /// Optional glob with recursive `**` semantics, relative to the root.
    pub glob: Option<String>,
    /// Optional regex applied to the full candidate path.
    pub path_filter: Option<String>,
    /// Optional regex matched against individual lines of each file.
    pub content: Option<String>,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            glob: None,
            path_filter: None,
            content: None,
        }
    }

    pub fn glob(mut self, pattern: impl Into<String>) -> Self {
        self.glob = Some(pattern.into());
        self
    }

    pub fn path_filter(mut self, pattern: impl Into<String>) -> Self {
        self.path_filter = Some(pattern.into());
        self
    }

    pub fn content(mut self, pattern: impl Into<String>) -> Self {
        self.content = Some(pattern.into());
        self
    }
}

/// One matching file. `matched_lines` and `snippets` are populated only for
/// content searches; otherwise the match degenerates to a bare path.
#[derive(Debug, Clone)]
pub struct FileMatch {
    pub path: PathBuf,
    /// 1-indexed, ascending, unique.
    pub matched_lines: Vec<usize>,
    /// One context block per matched line, matched line marked with `→`.
    pub snippets: Vec<String>,
    pub total_lines: usize,
}

impl FileMatch {
    fn bare(path: PathBuf) -> Self {
        Self {
            path,
            matched_lines: Vec::new(),
            snippets: Vec::new(),
            total_lines: 0,
        }
    }
}

/// Search result plus whether the run was cut short by cancellation.
#[derive(Debug)]
pub struct SearchOutcome {
    pub matches: Vec<FileMatch>,
    pub cancelled: bool,
}

/// Run a search to completion.
pub fn search(req: &SearchRequest) -> Result<Vec<FileMatch>, SearchError> {
    search_with_cancel(req, &CancelToken::new()).map(|outcome| outcome.matches)
}

/// Run a search, checking `cancel` between files. A cancelled search returns
/// the matches collected so far with `cancelled` set.
pub fn search_with_cancel(
    req: &SearchRequest,
    cancel: &CancelToken,
) -> Result<SearchOutcome, SearchError> {
    // Compile all patterns before any filesystem work so malformed input
    // fails fast.
    let glob = req.glob.as_deref().map(collect::compile_glob).transpose()?;
    let path_filter = compile_regex(req.path_filter.as_deref(), "filter")?;
    let content = compile_regex(req.content.as_deref(), "contains")?;

    let meta = std::fs::metadata(&req.root).map_err(|_| SearchError::RootNotFound {
        path: req.root.clone(),
    })?;
    if !meta.is_dir() {
        return Err(SearchError::NotADirectory {
            path: req.root.clone(),
        });
    }

    let mut candidates = collect::collect_candidates(&req.root, glob.as_ref(), cancel);
    debug!(root = %req.root.display(), candidates = candidates.len(), "collected candidates");

    if let Some(re) = &path_filter {
        candidates.retain(|p| re.is_match(&p.to_string_lossy()));
    }

    let matches = match &content {
        Some(re) => scan::scan_concurrently(candidates, re, cancel),
        None => {
            candidates.sort();
            candidates.into_iter().map(FileMatch::bare).collect()
        }
    };

    Ok(SearchOutcome {
        matches,
        cancelled: cancel.is_cancelled(),
    })
}

fn compile_regex(
    pattern: Option<&str>,
    kind: &'static str,
) -> Result<Option<Regex>, SearchError> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|e| SearchError::InvalidPattern {
                kind,
                pattern: p.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}
