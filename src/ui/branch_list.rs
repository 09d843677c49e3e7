use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::app::BranchSync;
use crate::types::BranchEntry;
use crate::ui::commit_list::counted_title;
use crate::ui::pane_block;
use crate::ui::theme::Theme;

/// Ahead/behind marker shown next to a branch name, empty when in sync.
pub fn divergence_label(branch: &BranchEntry) -> String {
    let mut label = String::new();
    if branch.commits_ahead > 0 {
        label.push_str(&format!(" ↑{}", branch.commits_ahead));
    }
    if branch.commits_behind > 0 {
        label.push_str(&format!(" ↓{}", branch.commits_behind));
    }
    label
}

/// Render the local branches panel. The branch named by `sync` gets its own
/// push/pull animation after the name.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    branches: &[BranchEntry],
    selected: usize,
    active: bool,
    sync: Option<&BranchSync>,
    theme: &Theme,
) {
    let block = pane_block(
        counted_title(3, "Branches", selected, branches.len()),
        active,
        theme,
    );

    if branches.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "No branches available",
            Style::default().fg(theme.muted_fg),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = branches
        .iter()
        .map(|branch| {
            let (marker, name_style) = if branch.is_current {
                (
                    "* ",
                    Style::default()
                        .fg(theme.addition_fg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default())
            };
            let mut spans = vec![
                Span::styled(marker, name_style),
                Span::styled(branch.name.clone(), name_style),
                Span::styled(divergence_label(branch), Style::default().fg(theme.info_fg)),
            ];
            if let Some(sync) = sync.filter(|s| s.name == branch.name)
                && let Some((text, done)) = sync.indicator.display()
            {
                let color = if done { theme.success_fg } else { theme.progress_fg };
                spans.push(Span::styled(format!(" {text}"), Style::default().fg(color)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut state);
}
