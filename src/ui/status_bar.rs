use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::animation::SyncIndicator;
use crate::types::ViewMode;
use crate::ui::theme::Theme;

/// Key hints for the list that currently has focus.
pub fn keybindings(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::FileList => "Stage: <space> | Stage All: a | Stash: s | Commit: c",
        ViewMode::CommitList => "Push: P | Pull: p | Reset: r/R | Amend: a | Nav: j/k",
        ViewMode::StashList => "Apply: <space> | Pop: g | Drop: d | Nav: j/k",
        ViewMode::BranchList => {
            "View: Enter | Checkout: c | New: n | Rename: r | Delete: d | Pull: p | Nav: j/k"
        }
        ViewMode::FileView { split: true } => {
            "Toggle: <space> | Pane: Tab | Apply: a | Reset: r | Back: Esc"
        }
        _ => "Scroll: j/k | Page: Ctrl+U/D | Back: Esc",
    }
}

/// Render the bottom bar: a message (or the key hints) on the left and the
/// global sync animation on the right.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    mode: ViewMode,
    message: Option<&str>,
    indicator: &SyncIndicator,
    theme: &Theme,
) {
    if area.height == 0 {
        return;
    }
    let style = theme.status_bar_style();

    let left = message.unwrap_or_else(|| keybindings(mode));
    frame.render_widget(
        Paragraph::new(Line::from(Span::raw(format!(" {left}")))).style(style),
        area,
    );

    if let Some((text, done)) = indicator.display() {
        let color = if done { theme.success_fg } else { theme.progress_fg };
        let right = Paragraph::new(Line::from(Span::styled(
            format!("{text} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(right, Rect::new(area.x, area.y, area.width, 1));
    }
}
