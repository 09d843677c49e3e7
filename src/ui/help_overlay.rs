use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::ui::centered_rect;
use crate::ui::theme::Theme;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "── Global ──",
        &[
            ("1-5", "Files / view / branches / commits / stashes"),
            ("/", "Search the current list"),
            ("Ctrl+u / Ctrl+d", "Half-page up / down"),
            ("?", "Toggle this help"),
            ("q / Ctrl+c", "Quit"),
        ],
    ),
    (
        "── Files ──",
        &[
            ("Space / a", "Mark file / mark all"),
            ("c", "Commit marked files"),
            ("s", "Stash changes"),
            ("Enter", "Line staging view"),
        ],
    ),
    (
        "── Line staging ──",
        &[
            ("Space", "Stage or unstage line"),
            ("Tab", "Switch unstaged / staged pane"),
            ("a", "Apply staged lines to the index"),
            ("r / Esc", "Discard selections / back"),
        ],
    ),
    (
        "── Commits & branches ──",
        &[
            ("P / p", "Push / pull"),
            ("r / R", "Soft / hard reset of the newest commit"),
            ("a", "Amend HEAD"),
            ("c / n / r / d", "Checkout / new / rename / delete branch"),
            ("Space / g / d", "Apply / pop / drop stash"),
        ],
    ),
];

/// Render a centered help overlay listing all keybindings.
pub fn render(frame: &mut Frame, area: Rect, theme: &Theme) {
    let width = 64u16.min(area.width.saturating_sub(4));
    let height = 30u16.min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    frame.render_widget(Clear, overlay);

    let title_style = theme.header_style();
    let key_style = Style::default()
        .fg(theme.info_fg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default()
        .fg(theme.addition_fg)
        .add_modifier(Modifier::BOLD);
    let footer_style = Style::default()
        .fg(theme.muted_fg)
        .add_modifier(Modifier::ITALIC);

    let inner_width = width.saturating_sub(2) as usize;

    let mut lines = vec![
        centered_line("Keyboard Shortcuts", title_style, inner_width),
        Line::from(""),
    ];
    for (section, keys) in SECTIONS {
        lines.push(centered_line(section, section_style, inner_width));
        lines.extend(
            keys.iter()
                .map(|(key, desc)| key_line(key, desc, key_style, desc_style)),
        );
        lines.push(Line::from(""));
    }
    lines.push(centered_line("Press any key to close", footer_style, inner_width));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.header_fg))
        .title(" Help ")
        .title_style(title_style);

    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}

fn key_line<'a>(key: &'a str, desc: &'a str, key_style: Style, desc_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {key:<18}"), key_style),
        Span::styled(desc, desc_style),
    ])
}

fn centered_line(text: &str, style: Style, width: usize) -> Line<'static> {
    let text_len = text.chars().count();
    let padding = width.saturating_sub(text_len) / 2;
    Line::from(Span::styled(
        format!("{}{text}", " ".repeat(padding)),
        style,
    ))
}
