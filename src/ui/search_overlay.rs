use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::ActiveSearch;
use crate::search::SearchKind;
use crate::types::ViewMode;
use crate::ui::centered_rect;
use crate::ui::theme::Theme;

fn title(search: &ActiveSearch) -> &'static str {
    match (search.overlay.kind, search.list) {
        (SearchKind::Fuzzy, _) => " Find File ",
        (_, ViewMode::CommitList) => " Search Commits ",
        (_, ViewMode::BranchList) => " Search Branches ",
        (_, ViewMode::StashList) => " Search Stashes ",
        _ => " Search ",
    }
}

/// Render the query box and ranked results over the middle of the screen.
pub fn render(frame: &mut Frame, area: Rect, search: &mut ActiveSearch, theme: &Theme) {
    let width = (area.width * 3 / 5).max(30).min(area.width);
    let height = (area.height * 3 / 5).max(8).min(area.height);
    let overlay = centered_rect(width, height, area);
    frame.render_widget(Clear, overlay);

    // Borders, query row and separator.
    let visible = height.saturating_sub(4) as usize;
    search.overlay.ensure_visible(visible);

    let overlay_state = &search.overlay;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.info_fg)),
            Span::raw(overlay_state.query.clone()),
            Span::styled("█", Style::default().fg(theme.muted_fg)),
        ]),
        Line::styled(
            format!("{} matches", overlay_state.results.len()),
            Style::default().fg(theme.muted_fg),
        ),
    ];

    lines.extend(
        overlay_state
            .results
            .iter()
            .enumerate()
            .skip(overlay_state.scroll)
            .take(visible)
            .map(|(row, (item, _))| {
                let label = overlay_state.label(*item).to_string();
                if row == overlay_state.selected {
                    Line::styled(format!("▶ {label}"), theme.selected_style())
                } else {
                    Line::raw(format!("  {label}"))
                }
            }),
    );

    let block = Block::default()
        .title(title(search))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_active))
        .title_style(
            Style::default()
                .fg(theme.border_active)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}
