//! End-to-end tests for the search engine against realistic directory trees.

use codescout::search::{search, search_with_cancel, CancelToken, SearchRequest};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small project tree with source, docs, and ignorable directories.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "src/main.rs",
        "fn main() {\n    run();\n}\n\nfn run() {\n    println!(\"hello\");\n}\n",
    );
    write(
        root,
        "src/config.rs",
        "pub struct Config {\n    pub verbose: bool,\n}\n",
    );
    write(root, "docs/guide.md", "# Guide\n\nHow to run the tool.\n");
    write(root, "README.md", "readme\n");
    write(root, ".git/HEAD", "ref: refs/heads/main\n");
    write(root, "target/debug/app.d", "build output\n");
    write(root, "node_modules/pkg/index.js", "function run() {}\n");

    dir
}

#[test]
fn bare_search_lists_every_file_outside_skip_dirs() {
    let dir = project();

    let matches = search(&SearchRequest::new(dir.path())).unwrap();
    let names: Vec<String> = matches
        .iter()
        .map(|m| m.path.to_string_lossy().into_owned())
        .collect();

    assert_eq!(matches.len(), 4);
    assert!(names.iter().any(|n| n.ends_with("src/main.rs")));
    assert!(names.iter().all(|n| !n.contains(".git")));
    assert!(names.iter().all(|n| !n.contains("target")));
    assert!(names.iter().all(|n| !n.contains("node_modules")));
}

#[test]
fn glob_restricts_to_matching_extensions() {
    let dir = project();

    let matches = search(&SearchRequest::new(dir.path()).glob("**/*.rs")).unwrap();

    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.path.extension().unwrap() == "rs"));
}

#[test]
fn top_level_glob_does_not_cross_directories() {
    let dir = project();

    // literal separators: *.md matches README.md but not docs/guide.md
    let matches = search(&SearchRequest::new(dir.path()).glob("*.md")).unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("README.md"));
}

#[test]
fn content_search_reports_lines_and_snippets() {
    let dir = project();

    let matches =
        search(&SearchRequest::new(dir.path()).glob("**/*.rs").content("fn run")).unwrap();

    assert_eq!(matches.len(), 1);
    let found = &matches[0];
    assert!(found.path.ends_with("src/main.rs"));
    assert_eq!(found.matched_lines, vec![5]);
    assert_eq!(found.snippets.len(), 1);

    // 2 context lines each side: at most 5 rendered lines.
    let snippet = &found.snippets[0];
    assert!(snippet.lines().count() <= 5);
    assert!(snippet.contains("→    5| fn run() {"));
    assert!(snippet.contains("   3| }"));
}

#[test]
fn all_three_criteria_compose() {
    let dir = project();

    let req = SearchRequest::new(dir.path())
        .glob("**/*.rs")
        .path_filter("src/")
        .content("struct");
    let matches = search(&req).unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("src/config.rs"));
}

#[test]
fn path_filter_applies_where_globs_cannot() {
    let dir = project();

    // Matches both .md files regardless of depth.
    let matches = search(&SearchRequest::new(dir.path()).path_filter(r"\.md$")).unwrap();

    assert_eq!(matches.len(), 2);
}

#[test]
fn content_match_in_multiple_files_is_sorted_by_path() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.txt", "needle\n");
    write(dir.path(), "a.txt", "needle\n");
    write(dir.path(), "c.txt", "nothing\n");

    let matches = search(&SearchRequest::new(dir.path()).content("needle")).unwrap();

    assert_eq!(matches.len(), 2);
    assert!(matches[0].path.ends_with("a.txt"));
    assert!(matches[1].path.ends_with("b.txt"));
}

#[test]
fn binary_files_never_match_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), b"\x00\x01needle\x02").unwrap();
    write(dir.path(), "plain.txt", "needle\n");

    let matches = search(&SearchRequest::new(dir.path()).content("needle")).unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("plain.txt"));
}

#[test]
fn repeated_matches_in_one_file_aggregate_into_one_result() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "log.txt", "err one\nok\nerr two\nok\nerr three\n");

    let matches = search(&SearchRequest::new(dir.path()).content("err")).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].matched_lines, vec![1, 3, 5]);
    assert_eq!(matches[0].snippets.len(), 3);
    assert_eq!(matches[0].total_lines, 5);
}

#[test]
fn cancelled_search_reports_cancellation() {
    let dir = project();

    let cancel = CancelToken::new();
    cancel.cancel();
    let outcome = search_with_cancel(&SearchRequest::new(dir.path()), &cancel).unwrap();

    assert!(outcome.cancelled);
}

#[test]
fn large_tree_content_search_is_exhaustive() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..200 {
        let content = if i % 4 == 0 {
            format!("line\nmarker {i}\nline\n")
        } else {
            "just lines\n".to_string()
        };
        write(dir.path(), &format!("d{}/f{i}.txt", i % 7), &content);
    }

    let matches = search(&SearchRequest::new(dir.path()).content("marker")).unwrap();

    assert_eq!(matches.len(), 50);
    assert!(matches.iter().all(|m| m.matched_lines == vec![2]));
}
