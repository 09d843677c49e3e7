use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};

use crate::types::{ChangedFileEntry, FileStatus};
use crate::ui::pane_block;
use crate::ui::theme::Theme;

/// Render the changed files panel.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    files: &[ChangedFileEntry],
    selected: usize,
    active: bool,
    theme: &Theme,
) {
    let block = pane_block(" 1. Files ".to_string(), active, theme);

    let items: Vec<ListItem> = files.iter().map(|file| file_item(file, theme)).collect();

    let mut state = ListState::default();
    if !files.is_empty() {
        state.select(Some(selected));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut state);
}

fn file_item<'a>(file: &ChangedFileEntry, theme: &Theme) -> ListItem<'a> {
    let mark = if file.marked_for_commit { "*" } else { " " };
    let staged = if file.has_staged_changes { "●" } else { " " };
    let name_style = if file.marked_for_commit {
        Style::default().fg(theme.marked_fg)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(vec![
        Span::styled(
            mark,
            Style::default()
                .fg(theme.marked_fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(file.status.symbol(), status_style(file.status, theme)),
        Span::styled(staged, Style::default().fg(theme.staged_fg)),
        Span::raw(" "),
        Span::styled(file.filename.clone(), name_style),
    ]))
}

fn status_style(status: FileStatus, theme: &Theme) -> Style {
    match status {
        FileStatus::Modified => Style::default().fg(theme.info_fg),
        FileStatus::Added => Style::default().fg(theme.addition_fg),
        FileStatus::Deleted => Style::default().fg(theme.deletion_fg),
        FileStatus::Untracked => Style::default().fg(theme.muted_fg),
    }
}
