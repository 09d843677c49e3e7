use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};

use crate::types::CommitEntry;
use crate::ui::pane_block;
use crate::ui::theme::Theme;

/// Pane title with a position counter, e.g. " 4. Commits (3/50) ".
pub fn counted_title(number: u8, label: &str, selected: usize, len: usize) -> String {
    if len == 0 {
        format!(" {number}. {label} (0) ")
    } else {
        format!(" {number}. {label} ({}/{len}) ", selected + 1)
    }
}

/// Render the commit history panel. Hashes of commits that are not on the
/// upstream yet are drawn in the unpushed color.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    commits: &[CommitEntry],
    selected: usize,
    active: bool,
    theme: &Theme,
) {
    let block = pane_block(
        counted_title(4, "Commits", selected, commits.len()),
        active,
        theme,
    );

    let items: Vec<ListItem> = commits
        .iter()
        .map(|commit| {
            let hash_color = if commit.is_pushed {
                theme.info_fg
            } else {
                theme.unpushed_fg
            };
            ListItem::new(Line::from(vec![
                Span::styled(commit.short_hash.clone(), Style::default().fg(hash_color)),
                Span::raw(" "),
                Span::styled(
                    commit.author_initials.clone(),
                    Style::default().fg(theme.header_fg),
                ),
                Span::raw(" "),
                Span::raw(commit.title.clone()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if !commits.is_empty() {
        state.select(Some(selected));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_title() {
        assert_eq!(counted_title(4, "Commits", 0, 0), " 4. Commits (0) ");
        assert_eq!(counted_title(4, "Commits", 2, 50), " 4. Commits (3/50) ");
    }
}
