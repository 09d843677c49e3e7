use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::types::StashEntry;
use crate::ui::commit_list::counted_title;
use crate::ui::pane_block;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    stashes: &[StashEntry],
    selected: usize,
    active: bool,
    theme: &Theme,
) {
    let block = pane_block(
        counted_title(5, "Stashes", selected, stashes.len()),
        active,
        theme,
    );

    if stashes.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "No stashes available",
            Style::default().fg(theme.muted_fg),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = stashes
        .iter()
        .map(|stash| ListItem::new(Line::raw(stash.description.clone())))
        .collect();

    let mut state = ListState::default();
    state.select(Some(selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut state);
}
