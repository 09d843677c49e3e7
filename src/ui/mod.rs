pub mod branch_list;
pub mod commit_list;
pub mod content_view;
pub mod file_list;
pub mod help_overlay;
pub mod modal;
pub mod search_overlay;
pub mod stash_list;
pub mod status_bar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::app::ViewerSession;
use crate::highlight::Highlighter;
use crate::types::ViewMode;
use theme::Theme;

/// Screen areas of every pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub header: Rect,
    pub files: Rect,
    pub branches: Rect,
    pub commits: Rect,
    pub stashes: Rect,
    pub content: Rect,
    pub status: Rect,
}

/// Split the terminal into panes.
///
/// Row 0 is a one-line header. The left column takes 40% of the width and
/// stacks files (30% of the available height), branches (20%), commits
/// (30%) and stashes (the rest), one row apart. The content pane fills the
/// right column and the status bar (5% of the height, at least one row)
/// spans the bottom.
pub fn pane_layout(area: Rect) -> PaneLayout {
    let width = area.width;
    let height = area.height;
    let left = width * 2 / 5;
    let status_height = (height / 20).max(1);
    let available = height.saturating_sub(1 + status_height);

    let files_height = available * 3 / 10;
    let commits_height = available * 3 / 10;
    let branches_height = available / 5;
    let stashes_height = available
        .saturating_sub(files_height + commits_height + branches_height)
        .saturating_sub(3);

    let x = area.x;
    let y = area.y;
    let files_y = y + 1;
    let branches_y = files_y + files_height + 1;
    let commits_y = branches_y + branches_height + 1;
    let stashes_y = commits_y + commits_height + 1;

    PaneLayout {
        header: Rect::new(x, y, width, height.min(1)),
        files: Rect::new(x, files_y, left, files_height),
        branches: Rect::new(x, branches_y, left, branches_height),
        commits: Rect::new(x, commits_y, left, commits_height),
        stashes: Rect::new(x, stashes_y, left, stashes_height),
        content: Rect::new(
            x + left + 1,
            files_y,
            width.saturating_sub(left + 1),
            available,
        ),
        status: Rect::new(
            x,
            y + 1 + available,
            width,
            status_height.min(height.saturating_sub(1 + available)),
        ),
    }
}

/// Rounded box with a title, highlighted when the pane is active.
pub fn pane_block<'a>(title: String, active: bool, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(active))
        .title_style(theme.title_style(active))
}

/// A `width` x `height` rect centered within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn header_text(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::FileList => {
            "Ferrum: 1=files 2=view 3=branches 4=commits 5=stashes | j/k=nav Space=mark a=all s=stash c=commit | ?=help q=quit"
        }
        ViewMode::FileView { .. } => {
            "Ferrum: 1=files 2=view 3=branches 4=commits 5=stashes | j/k=scroll Ctrl+U/D=page | ?=help q=quit"
        }
        _ => {
            "Ferrum: 1=files 2=view 3=branches 4=commits 5=stashes | j/k=nav P=push r/R=reset a=amend | ?=help q=quit"
        }
    }
}

/// Render the full TUI.
pub fn render(frame: &mut Frame, session: &mut ViewerSession, highlighter: &Highlighter) {
    let area = frame.area();
    let layout = pane_layout(area);
    let mode = session.mode;
    let theme = session.theme.clone();

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            header_text(mode),
            Style::default().fg(theme.header_fg),
        ))),
        layout.header,
    );

    file_list::render(
        frame,
        layout.files,
        &session.snapshot.files,
        session.selected_file,
        mode == ViewMode::FileList,
        &theme,
    );
    branch_list::render(
        frame,
        layout.branches,
        &session.snapshot.branches,
        session.selected_branch,
        mode == ViewMode::BranchList,
        session.branch_sync.as_ref(),
        &theme,
    );
    commit_list::render(
        frame,
        layout.commits,
        &session.snapshot.commits,
        session.selected_commit,
        mode == ViewMode::CommitList,
        &theme,
    );
    stash_list::render(
        frame,
        layout.stashes,
        &session.snapshot.stashes,
        session.selected_stash,
        mode == ViewMode::StashList,
        &theme,
    );

    content_view::render(frame, layout.content, session, highlighter, &theme);

    status_bar::render(
        frame,
        layout.status,
        mode,
        session.message.as_deref(),
        &session.indicator,
        &theme,
    );

    if let Some(search) = session.search.as_mut() {
        search_overlay::render(frame, area, search, &theme);
    }
    if let Some(modal) = &session.modal {
        modal::render(frame, area, modal, &theme);
    }
    if session.show_help {
        help_overlay::render(frame, area, &theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_proportions_100x40() {
        let layout = pane_layout(Rect::new(0, 0, 100, 40));
        // status = 2 rows, available = 37
        assert_eq!(layout.status, Rect::new(0, 38, 100, 2));
        assert_eq!(layout.files, Rect::new(0, 1, 40, 11));
        assert_eq!(layout.branches, Rect::new(0, 13, 40, 7));
        assert_eq!(layout.commits, Rect::new(0, 21, 40, 11));
        assert_eq!(layout.stashes, Rect::new(0, 33, 40, 5));
        assert_eq!(layout.content, Rect::new(41, 1, 59, 37));
    }

    #[test]
    fn test_layout_small_terminal_has_status_row() {
        let layout = pane_layout(Rect::new(0, 0, 20, 10));
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 9);
        assert_eq!(layout.content.height, 8);
    }

    #[test]
    fn test_layout_tiny_terminal_does_not_underflow() {
        let layout = pane_layout(Rect::new(0, 0, 3, 2));
        assert_eq!(layout.stashes.height, 0);
        assert_eq!(layout.content.height, 0);
    }
}
