mod helpers;

use helpers::*;
use ferrum::diff::{load_file_diff, UNTRACKED_PREVIEW_LINES};
use ferrum::git::{open_repo, ShellGit};
use ferrum::ops;
use ferrum::types::{ContentKind, LineKind};

#[test]
fn test_open_repo() {
    let (dir, _repo) = create_temp_repo();
    assert!(open_repo(dir.path()).is_ok(), "open_repo should succeed on a valid git repo");
}

#[test]
fn test_clean_file_has_no_lines() {
    let (dir, repo) = create_temp_repo();
    commit_file(&repo, "hello.txt", "hello world\n");

    let git = ShellGit::new(dir.path());
    let lines = load_file_diff(&git, "hello.txt", false).unwrap();
    assert!(lines.is_empty(), "clean file should have no diff lines");
}

#[test]
fn test_modified_file_lines() {
    let (dir, repo) = create_temp_repo();
    commit_file(&repo, "file.txt", "line 1\nline 2\nline 3\n");
    write_file(&repo, "file.txt", "line 1\nline 2 modified\nline 3\n");

    let git = ShellGit::new(dir.path());
    let lines = load_file_diff(&git, "file.txt", false).unwrap();
    let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LineKind::HunkHeader,
            LineKind::Context,
            LineKind::Deletion,
            LineKind::Addition,
            LineKind::Context,
        ]
    );
    assert_eq!(lines[2].text, "line 2");
    assert_eq!(lines[3].text, "line 2 modified");
    assert!(lines.iter().all(|l| !l.is_staged));
}

#[test]
fn test_cached_diff_reads_index() {
    let (dir, repo) = create_temp_repo();
    commit_file(&repo, "file.txt", "a\n");
    write_file(&repo, "file.txt", "b\n");
    git(dir.path(), &["add", "file.txt"]);

    let runner = ShellGit::new(dir.path());
    assert!(load_file_diff(&runner, "file.txt", false).unwrap().is_empty());
    let cached = load_file_diff(&runner, "file.txt", true).unwrap();
    assert!(cached.iter().any(|l| l.kind == LineKind::Addition && l.text == "b"));
}

#[test]
fn test_untracked_file_preview_is_capped() {
    let (dir, repo) = create_temp_repo();
    let content: String = (0..80).map(|i| format!("line {i}\n")).collect();
    write_file(&repo, "big.txt", &content);

    let git = ShellGit::new(dir.path());
    let lines = load_file_diff(&git, "big.txt", false).unwrap();
    assert_eq!(lines[0].kind, LineKind::HunkHeader);
    assert_eq!(lines.len(), UNTRACKED_PREVIEW_LINES + 1);
    assert!(lines[1..].iter().all(|l| l.kind == LineKind::Addition));
}

#[test]
fn test_commit_content_classification() {
    let (dir, repo) = create_temp_repo();
    commit_file(&repo, "file.txt", "hello\n");

    let runner = ShellGit::new(dir.path());
    let hash = git(dir.path(), &["rev-parse", "--short", "HEAD"]);
    let lines = ops::load_commit_content(&runner, hash.trim()).unwrap();

    assert!(lines.iter().any(|l| l.kind == ContentKind::Header));
    assert!(lines.iter().any(|l| l.kind == ContentKind::Addition && l.text == "+hello"));
}

#[test]
fn test_branch_log_content() {
    let (dir, repo) = create_temp_repo();
    commit_file(&repo, "file.txt", "hello\n");

    let runner = ShellGit::new(dir.path());
    let branch = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    let lines = ops::load_branch_content(&runner, branch.trim()).unwrap();

    let headers = lines
        .iter()
        .filter(|l| l.kind == ContentKind::CommitHeader)
        .count();
    assert_eq!(headers, 2);
}
