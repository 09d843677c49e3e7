//! Key dispatch. Dialogs and overlays get the key first; otherwise it goes
//! to the handler of the current view mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{BlockingOp, KeyOutcome, ViewerSession};
use crate::modal::ModalAction;
use crate::ops::{ResetKind, StashAction};
use crate::types::{Pane, ViewMode};

pub fn handle_key(session: &mut ViewerSession, key: KeyEvent) -> KeyOutcome {
    session.message = None;

    if let Some(mut modal) = session.modal.take() {
        return match modal.handle_key(key) {
            ModalAction::Continue => {
                session.modal = Some(modal);
                KeyOutcome::Continue
            }
            ModalAction::Cancel => KeyOutcome::Continue,
            ModalAction::Submit => session.submit_modal(modal),
        };
    }

    if session.search.is_some() {
        handle_search(session, key);
        return KeyOutcome::Continue;
    }

    if session.show_help {
        session.show_help = false;
        return KeyOutcome::Continue;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return handle_control(session, key.code);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return KeyOutcome::Quit,
        KeyCode::Char('?') => {
            session.show_help = true;
            return KeyOutcome::Continue;
        }
        KeyCode::Char('1') => {
            session.jump_to(ViewMode::FileList);
            return KeyOutcome::Continue;
        }
        KeyCode::Char('2') => {
            session.jump_to(ViewMode::FileView { split: false });
            return KeyOutcome::Continue;
        }
        KeyCode::Char('3') => {
            session.jump_to(ViewMode::BranchList);
            return KeyOutcome::Continue;
        }
        KeyCode::Char('4') => {
            session.jump_to(ViewMode::CommitList);
            return KeyOutcome::Continue;
        }
        KeyCode::Char('5') => {
            session.jump_to(ViewMode::StashList);
            return KeyOutcome::Continue;
        }
        _ => {}
    }

    match session.mode {
        ViewMode::FileList => handle_file_list(session, key.code),
        ViewMode::FileView { split } => handle_file_view(session, key.code, split),
        ViewMode::CommitList => handle_commit_list(session, key.code),
        ViewMode::CommitView => handle_commit_view(session, key.code),
        ViewMode::BranchList => handle_branch_list(session, key.code),
        ViewMode::BranchView => handle_branch_view(session, key.code),
        ViewMode::StashList => handle_stash_list(session, key.code),
        ViewMode::StashView => handle_stash_view(session, key.code),
    }
}

/// Ctrl-C quits; Ctrl-U / Ctrl-D move half a page in the content views.
/// Other control chords are ignored so they never trigger list actions.
fn handle_control(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    let delta = match code {
        KeyCode::Char('c') => return KeyOutcome::Quit,
        KeyCode::Char('u') => -session.half_page(),
        KeyCode::Char('d') => session.half_page(),
        _ => return KeyOutcome::Continue,
    };
    match session.mode {
        ViewMode::FileView { split: true } => session.move_cursor(delta),
        ViewMode::FileView { split: false }
        | ViewMode::CommitView
        | ViewMode::BranchView
        | ViewMode::StashView => session.scroll_content(delta),
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_search(session: &mut ViewerSession, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => session.search = None,
        KeyCode::Enter => session.accept_search(),
        code => {
            let Some(search) = session.search.as_mut() else {
                return;
            };
            let overlay = &mut search.overlay;
            match code {
                KeyCode::Up => overlay.select_prev(),
                KeyCode::Down => overlay.select_next(),
                KeyCode::Char('k' | 'p') if ctrl => overlay.select_prev(),
                KeyCode::Char('j' | 'n') if ctrl => overlay.select_next(),
                KeyCode::Backspace => overlay.pop_char(),
                KeyCode::Char(c) if !ctrl => overlay.push_char(c),
                _ => {}
            }
        }
    }
    session.dirty = true;
}

fn handle_file_list(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc => return KeyOutcome::Quit,
        KeyCode::Char('k') | KeyCode::Up => session.move_selection(-1),
        KeyCode::Char('j') | KeyCode::Down => session.move_selection(1),
        KeyCode::Char(' ') => session.toggle_mark(),
        KeyCode::Char('a') | KeyCode::Char('A') => session.toggle_all_marks(),
        KeyCode::Char('s') | KeyCode::Char('S') => session.start_stash(),
        KeyCode::Char('c') | KeyCode::Char('C') => session.start_commit(),
        KeyCode::Tab => session.jump_to(ViewMode::CommitList),
        KeyCode::Char('/') => session.open_search(),
        KeyCode::Enter => session.enter_view(),
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_file_view(session: &mut ViewerSession, code: KeyCode, split: bool) -> KeyOutcome {
    if !split {
        match code {
            KeyCode::Esc | KeyCode::Tab => session.set_mode(ViewMode::FileList),
            KeyCode::Char(' ') => session.scroll_content(session.full_page()),
            code => scroll_keys(session, code),
        }
        return KeyOutcome::Continue;
    }

    match code {
        KeyCode::Esc => {
            session.active_pane = Pane::Unstaged;
            session.set_mode(ViewMode::FileList);
        }
        KeyCode::Char(' ') => session.toggle_at_cursor(),
        KeyCode::Tab => session.switch_pane(),
        KeyCode::Char('a') => session.apply_staging(),
        KeyCode::Char('r') => session.reset_staging(),
        KeyCode::Char('k') | KeyCode::Up => session.move_cursor(-1),
        KeyCode::Char('j') | KeyCode::Down => session.move_cursor(1),
        KeyCode::PageUp => session.move_cursor(-session.full_page()),
        KeyCode::PageDown => session.move_cursor(session.full_page()),
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_commit_list(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc | KeyCode::Tab => session.jump_to(ViewMode::FileList),
        KeyCode::Char('k') | KeyCode::Up => session.move_selection(-1),
        KeyCode::Char('j') | KeyCode::Down => session.move_selection(1),
        KeyCode::Enter => session.enter_view(),
        KeyCode::Char('P') => {
            if !session.snapshot.commits.is_empty() {
                return session.start_push();
            }
        }
        KeyCode::Char('p') => return KeyOutcome::Deferred(BlockingOp::Pull),
        KeyCode::Char('r') => session.request_reset(ResetKind::Soft),
        KeyCode::Char('R') => session.request_reset(ResetKind::Hard),
        KeyCode::Char('a') | KeyCode::Char('A') => session.start_amend(),
        KeyCode::Char('/') => session.open_search(),
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_commit_view(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc | KeyCode::Tab => session.set_mode(ViewMode::CommitList),
        code => scroll_keys(session, code),
    }
    KeyOutcome::Continue
}

fn handle_branch_list(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc | KeyCode::Tab => session.jump_to(ViewMode::FileList),
        KeyCode::Char('k') | KeyCode::Up => session.move_selection(-1),
        KeyCode::Char('j') | KeyCode::Down => session.move_selection(1),
        KeyCode::Enter => session.enter_view(),
        KeyCode::Char('c') => session.checkout_selected(),
        KeyCode::Char('n') => session.start_new_branch(),
        KeyCode::Char('r') => session.start_rename_branch(),
        KeyCode::Char('d') => session.start_delete_branch(),
        KeyCode::Char('p') => return session.pull_selected_branch(),
        KeyCode::Char('/') => session.open_search(),
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_branch_view(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc | KeyCode::Tab => session.set_mode(ViewMode::BranchList),
        code => scroll_keys(session, code),
    }
    KeyOutcome::Continue
}

fn handle_stash_list(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc | KeyCode::Tab => session.jump_to(ViewMode::FileList),
        KeyCode::Char('k') | KeyCode::Up => session.move_selection(-1),
        KeyCode::Char('j') | KeyCode::Down => session.move_selection(1),
        KeyCode::Enter => session.enter_view(),
        KeyCode::Char(' ') => session.stash_action(StashAction::Apply),
        KeyCode::Char('g') | KeyCode::Char('G') => session.stash_action(StashAction::Pop),
        KeyCode::Char('d') | KeyCode::Char('D') => session.stash_action(StashAction::Drop),
        KeyCode::Char('/') => session.open_search(),
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_stash_view(session: &mut ViewerSession, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Esc | KeyCode::Tab => session.set_mode(ViewMode::StashList),
        code => scroll_keys(session, code),
    }
    KeyOutcome::Continue
}

/// Scrolling shared by the read-only content views.
fn scroll_keys(session: &mut ViewerSession, code: KeyCode) {
    match code {
        KeyCode::Char('k') | KeyCode::Up => session.scroll_content(-1),
        KeyCode::Char('j') | KeyCode::Down => session.scroll_content(1),
        KeyCode::PageUp => session.scroll_content(-session.full_page()),
        KeyCode::PageDown | KeyCode::Char(' ') => session.scroll_content(session.full_page()),
        KeyCode::Home => session.content_scroll = 0,
        KeyCode::End => session.scroll_content(isize::MAX / 2),
        _ => {}
    }
    session.dirty = true;
}
