mod helpers;

use ferrum::git::ShellGit;
use ferrum::staging::{StagingModel, Unstaged};
use ferrum::types::{DiffLine, LineKind};

const COMMITTED: &str = "a\nb\nc\nd\ne\nf\ng\nh\ni\nj\nk\nl\n";

fn find(lines: &[DiffLine], kind: LineKind, text: &str) -> usize {
    lines
        .iter()
        .position(|l| l.kind == kind && l.text == text)
        .unwrap_or_else(|| panic!("no {kind:?} line {text:?}"))
}

#[test]
fn test_stage_one_change_of_two() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("b\n", "B\n").replace("k\n", "K\n"));

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    let del = find(model.lines(), LineKind::Deletion, "b");
    let add = find(model.lines(), LineKind::Addition, "B");
    assert!(model.toggle_line(del));
    assert!(model.toggle_line(add));
    assert_eq!(model.staged_count(), 2);

    assert!(model.apply_staged_changes(&git).unwrap());

    let cached = helpers::git(dir.path(), &["diff", "--cached"]);
    assert!(cached.contains("-b\n"));
    assert!(cached.contains("+B\n"));
    assert!(!cached.contains("+K"));

    let unstaged = helpers::git(dir.path(), &["diff"]);
    assert!(unstaged.contains("+K\n"));
    assert!(!unstaged.contains("+B"));

    // The working tree is never touched.
    assert_eq!(
        helpers::read_file(&repo, "letters.txt"),
        COMMITTED.replace("b\n", "B\n").replace("k\n", "K\n")
    );
}

#[test]
fn test_stage_addition_without_its_deletion_keeps_old_line() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("b\n", "B\n"));

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    let add = find(model.lines(), LineKind::Addition, "B");
    model.toggle_line(add);
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":letters.txt"]);
    assert_eq!(index_version, COMMITTED.replace("b\n", "b\nB\n"));
}

#[test]
fn test_stage_deletion_only() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("b\n", "B\n"));

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    let del = find(model.lines(), LineKind::Deletion, "b");
    model.toggle_line(del);
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":letters.txt"]);
    assert_eq!(index_version, COMMITTED.replace("b\n", ""));
}

#[test]
fn test_stage_part_of_new_file() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::write_file(&repo, "notes.txt", "one\ntwo\nthree\n");

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "notes.txt").unwrap();
    assert!(model.is_new_file());
    model.toggle_line(find(model.lines(), LineKind::Addition, "one"));
    model.toggle_line(find(model.lines(), LineKind::Addition, "three"));
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":notes.txt"]);
    assert_eq!(index_version, "one\nthree\n");
}

#[test]
fn test_apply_with_nothing_selected_is_a_no_op() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("c\n", "C\n"));

    let git = ShellGit::new(dir.path());
    let model = StagingModel::load(&git, "letters.txt").unwrap();
    assert!(!model.apply_staged_changes(&git).unwrap());
    assert!(helpers::git(dir.path(), &["diff", "--cached"]).is_empty());
}

#[test]
fn test_context_and_headers_are_not_selectable() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("c\n", "C\n"));

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    assert_eq!(model.lines()[0].kind, LineKind::HunkHeader);
    assert!(!model.toggle_line(0));
    let context = find(model.lines(), LineKind::Context, "a");
    assert!(!model.toggle_line(context));
    assert!(!model.has_pending());
}

#[test]
fn test_staged_pane_shows_index_then_unstages_whole_file() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("c\n", "C\n"));
    helpers::git(dir.path(), &["add", "letters.txt"]);

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    assert!(model.lines().is_empty());
    let staged = model.staged_view().clone();
    let added = find(&staged.lines, LineKind::Addition, "C");

    assert_eq!(model.unstage_line(&git, added).unwrap(), Unstaged::Index);
    assert!(helpers::git(dir.path(), &["diff", "--cached"]).is_empty());
    assert!(helpers::git(dir.path(), &["diff"]).contains("+C\n"));
}

#[test]
fn test_unstage_pending_selection_in_memory() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("c\n", "C\n"));

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    model.toggle_line(find(model.lines(), LineKind::Addition, "C"));
    let staged_index = find(&model.staged_view().lines, LineKind::Addition, "C");

    assert_eq!(
        model.unstage_line(&git, staged_index).unwrap(),
        Unstaged::InMemory
    );
    assert!(!model.has_pending());
    assert!(helpers::git(dir.path(), &["diff", "--cached"]).is_empty());
}

#[test]
fn test_reset_drops_selection_but_keeps_index() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "letters.txt", COMMITTED);
    helpers::write_file(&repo, "letters.txt", &COMMITTED.replace("c\n", "C\n"));

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "letters.txt").unwrap();
    model.toggle_line(find(model.lines(), LineKind::Addition, "C"));
    model.reset_staged_changes();

    assert_eq!(model.staged_count(), 0);
    assert!(model.staged_view().is_empty());
}

#[test]
fn test_stage_line_of_crlf_file() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "w.txt", "a\r\nb\r\nc\r\n");
    helpers::write_file(&repo, "w.txt", "a\r\nB\r\nc\r\n");

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "w.txt").unwrap();
    let del = find(model.lines(), LineKind::Deletion, "b\r");
    let add = find(model.lines(), LineKind::Addition, "B\r");
    model.toggle_line(del);
    model.toggle_line(add);
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":w.txt"]);
    assert_eq!(index_version, "a\r\nB\r\nc\r\n");
}

#[test]
fn test_stage_addition_after_line_without_newline() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "n.txt", "a\nb");
    helpers::write_file(&repo, "n.txt", "a\nb\nc\n");

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "n.txt").unwrap();
    let add = find(model.lines(), LineKind::Addition, "c");
    model.toggle_line(add);
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":n.txt"]);
    assert_eq!(index_version, "a\nb\nc\n");
}

#[test]
fn test_stage_change_keeping_missing_newline() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "n.txt", "a\nb");
    helpers::write_file(&repo, "n.txt", "A\nb");

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "n.txt").unwrap();
    let del = find(model.lines(), LineKind::Deletion, "a");
    let add = find(model.lines(), LineKind::Addition, "A");
    model.toggle_line(del);
    model.toggle_line(add);
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":n.txt"]);
    assert_eq!(index_version, "A\nb");
}

#[test]
fn test_stage_untracked_file_without_final_newline() {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::write_file(&repo, "x.txt", "one\ntwo");

    let git = ShellGit::new(dir.path());
    let mut model = StagingModel::load(&git, "x.txt").unwrap();
    assert!(model.is_new_file());
    let one = find(model.lines(), LineKind::Addition, "one");
    let two = find(model.lines(), LineKind::Addition, "two");
    model.toggle_line(one);
    model.toggle_line(two);
    assert!(model.apply_staged_changes(&git).unwrap());

    let index_version = helpers::git(dir.path(), &["show", ":x.txt"]);
    assert_eq!(index_version, "one\ntwo");
}
