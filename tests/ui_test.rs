mod helpers;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use ferrum::app::ViewerSession;
use ferrum::highlight::Highlighter;
use ferrum::modal::Modal;
use ferrum::types::ViewMode;
use ferrum::ui;

/// Render the UI into a TestBackend buffer and return the buffer content as a string.
fn render_to_string(width: u16, height: u16, session: &mut ViewerSession) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    let highlighter = Highlighter::new();

    terminal
        .draw(|frame| ui::render(frame, session, &highlighter))
        .unwrap();

    let buffer = terminal.backend().buffer().clone();
    let mut output = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            output.push_str(buffer[(x, y)].symbol());
        }
        output.push('\n');
    }
    output
}

fn sample_session() -> (tempfile::TempDir, ViewerSession) {
    let (dir, repo) = helpers::create_temp_repo();
    helpers::commit_file(&repo, "src/main.rs", "fn main() {\n    println!(\"hi\");\n}\n");
    helpers::write_file(
        &repo,
        "src/main.rs",
        "fn main() {\n    println!(\"hello\");\n}\n",
    );
    helpers::write_file(&repo, "notes.txt", "todo\n");
    let (session, _calls) = helpers::session_for(dir.path());
    (dir, session)
}

#[test]
fn test_all_panes_render() {
    let (_dir, mut session) = sample_session();
    let output = render_to_string(120, 40, &mut session);

    assert!(output.contains("Ferrum: 1=files"));
    assert!(output.contains(" 1. Files "));
    assert!(output.contains(" 3. Branches (1/1) "));
    assert!(output.contains(" 4. Commits (1/2) "));
    assert!(output.contains(" 5. Stashes (0) "));
    assert!(output.contains("No stashes available"));
    assert!(output.contains("src/main.rs"));
    assert!(output.contains("notes.txt"));
    assert!(output.contains("Add src/main.rs"));
}

#[test]
fn test_preview_shows_selected_diff() {
    let (_dir, mut session) = sample_session();
    session.selected_file = session.snapshot.file_index("src/main.rs").unwrap();
    session.update_preview();
    let output = render_to_string(120, 40, &mut session);

    assert!(output.contains(" 2. src/main.rs "));
    assert!(output.contains("println!(\"hello\");"));
}

#[test]
fn test_status_bar_keybindings_and_message() {
    let (_dir, mut session) = sample_session();
    let output = render_to_string(120, 40, &mut session);
    assert!(output.contains("Stage: <space> | Stage All: a | Stash: s | Commit: c"));

    session.set_message("Stash created");
    let output = render_to_string(120, 40, &mut session);
    assert!(output.contains("Stash created"));
    assert!(!output.contains("Stage All: a"));
}

#[test]
fn test_split_view_records_viewport_heights() {
    let (_dir, mut session) = sample_session();
    session.selected_file = session.snapshot.file_index("src/main.rs").unwrap();
    session.enter_view();
    assert_eq!(session.mode, ViewMode::FileView { split: true });

    let output = render_to_string(120, 40, &mut session);
    assert!(output.contains("Unstaged: src/main.rs"));
    assert!(output.contains("Staged (index)"));
    assert!(output.contains("Nothing staged"));
    // content pane is 37 rows tall; each half loses two rows to borders
    assert_eq!(session.viewport_height + session.staged_viewport_height, 33);
    assert!(session.viewport_height >= 16);
    assert!(session.staged_viewport_height >= 16);
}

#[test]
fn test_error_popup() {
    let (_dir, mut session) = sample_session();
    session.modal = Some(Modal::error("Failed to push"));
    let output = render_to_string(120, 40, &mut session);
    assert!(output.contains(" Error "));
    assert!(output.contains("Failed to push"));
    assert!(output.contains("Press any key to continue"));
}

#[test]
fn test_help_overlay() {
    let (_dir, mut session) = sample_session();
    session.show_help = true;
    let output = render_to_string(120, 40, &mut session);
    assert!(output.contains("Keyboard Shortcuts"));
    assert!(output.contains("Line staging"));
}

#[test]
fn test_search_overlay() {
    let (_dir, mut session) = sample_session();
    session.open_search();
    session.search.as_mut().unwrap().overlay.push_char('n');
    let output = render_to_string(120, 40, &mut session);
    assert!(output.contains(" Find File "));
    assert!(output.contains("matches"));
}

#[test]
fn test_tiny_terminal_does_not_panic() {
    let (_dir, mut session) = sample_session();
    render_to_string(10, 4, &mut session);
    render_to_string(1, 1, &mut session);
}
