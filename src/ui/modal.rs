use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::modal::{
    CommitField, CommitModal, ConfirmModal, DeleteBranchModal, InputModal, Modal, TextInput,
};
use crate::ops::DeleteTarget;
use crate::ui::centered_rect;
use crate::ui::theme::Theme;

fn dialog_block<'a>(title: String, style: Style) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style)
        .title_style(style.add_modifier(Modifier::BOLD))
}

/// The input text with the cursor cell drawn reversed.
pub fn input_line(input: &TextInput, focused: bool) -> Line<'static> {
    let text = input.display();
    if !focused {
        return Line::raw(text);
    }
    let cursor = input.cursor();
    let before: String = text.chars().take(cursor).collect();
    let at: String = text.chars().skip(cursor).take(1).collect();
    let after: String = text.chars().skip(cursor + 1).collect();
    let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
    Line::from(vec![
        Span::raw(before),
        Span::styled(if at.is_empty() { " ".to_string() } else { at }, cursor_style),
        Span::raw(after),
    ])
}

fn footer(text: &str, theme: &Theme) -> Line<'static> {
    Line::styled(text.to_string(), Style::default().fg(theme.muted_fg))
}

/// Draw whichever dialog is open.
pub fn render(frame: &mut Frame, area: Rect, modal: &Modal, theme: &Theme) {
    match modal {
        Modal::Input(m) => render_input(frame, area, m, theme),
        Modal::Confirm(m) => render_confirm(frame, area, m, theme),
        Modal::DeleteBranch(m) => render_delete(frame, area, m, theme),
        Modal::Commit(m) => render_commit(frame, area, m, theme),
        Modal::Error(message) => render_error(frame, area, message, theme),
    }
}

fn render_input(frame: &mut Frame, area: Rect, modal: &InputModal, theme: &Theme) {
    let width = 60u16.min(area.width);
    let height = (6 + modal.suggestions.len() as u16).min(area.height);
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let mut lines = vec![
        Line::styled(modal.prompt.clone(), theme.info_style()),
        input_line(&modal.input, true),
    ];
    if !modal.suggestions.is_empty() {
        lines.push(Line::raw(""));
        lines.extend(modal.suggestions.iter().enumerate().map(|(i, s)| {
            if modal.suggestion == Some(i) {
                Line::styled(format!("▶ {s}"), theme.selected_style())
            } else {
                Line::styled(format!("  {s}"), Style::default().fg(theme.muted_fg))
            }
        }));
    }
    lines.push(footer("Enter: confirm | Esc: cancel", theme));

    let block = dialog_block(modal.title.clone(), Style::default().fg(theme.border_active));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn render_confirm(frame: &mut Frame, area: Rect, modal: &ConfirmModal, theme: &Theme) {
    let width = 64u16.min(area.width);
    let height = (modal.lines.len() as u16 + 4).min(area.height);
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let mut lines: Vec<Line> = modal.lines.iter().map(|l| Line::raw(l.clone())).collect();
    lines.push(Line::raw(""));
    lines.push(footer("y/Enter: confirm | n/Esc: cancel", theme));

    let block = dialog_block(modal.title.clone(), Style::default().fg(theme.deletion_fg));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        rect,
    );
}

fn render_delete(frame: &mut Frame, area: Rect, modal: &DeleteBranchModal, theme: &Theme) {
    let width = 50u16.min(area.width);
    let height = 9u16.min(area.height);
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Branch: "),
            Span::styled(modal.branch.clone(), theme.info_style()),
        ]),
        Line::raw(""),
    ];
    lines.extend(DeleteTarget::ALL.iter().enumerate().map(|(i, target)| {
        let key = match target {
            DeleteTarget::Local => 'l',
            DeleteTarget::Remote => 'r',
            DeleteTarget::Both => 'b',
        };
        if i == modal.selected {
            Line::styled(format!("> [{key}] {}", target.label()), theme.selected_style())
        } else {
            Line::raw(format!("  [{key}] {}", target.label()))
        }
    }));
    lines.push(Line::raw(""));
    lines.push(footer("Enter: select | Esc: cancel", theme));

    let block = dialog_block(" Delete Branch ".to_string(), Style::default().fg(theme.deletion_fg));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn render_commit(frame: &mut Frame, area: Rect, modal: &CommitModal, theme: &Theme) {
    let width = (area.width * 4 / 5).min(area.width);
    let height = 21u16.min(area.height);
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let heading = if modal.amend { " Amend Commit " } else { " Commit " };
    let outer = dialog_block(heading.to_string(), Style::default().fg(theme.border_active));
    let inner = outer.inner(rect);
    frame.render_widget(outer, rect);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let title_active = modal.field == CommitField::Title;
    let title_box = Paragraph::new(input_line(&modal.title, title_active)).block(
        Block::default()
            .title(" Title ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style(title_active)),
    );
    frame.render_widget(title_box, parts[0]);

    let mut body: Vec<Line> = modal.body.split('\n').map(|l| Line::raw(l.to_string())).collect();
    if !title_active && let Some(last) = body.last_mut() {
        last.spans.push(Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    let body_box = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Message ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style(!title_active)),
    );
    frame.render_widget(body_box, parts[1]);

    frame.render_widget(
        Paragraph::new(footer(
            "Tab: switch field | Enter: commit (title) / newline (message) | Esc: cancel",
            theme,
        )),
        parts[2],
    );
}

fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let width = 70u16.min(area.width);
    let height = (message.lines().count() as u16 + 4).clamp(5, 20).min(area.height);
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let mut lines: Vec<Line> = message.lines().map(|l| Line::raw(l.to_string())).collect();
    lines.push(Line::raw(""));
    lines.push(footer("Press any key to continue", theme));

    let block = dialog_block(" Error ".to_string(), Style::default().fg(theme.deletion_fg));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        rect,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_input_line_masks_value() {
        let mut input = TextInput::masked();
        for c in "secret".chars() {
            input.insert(c);
        }
        let line = input_line(&input, true);
        assert_eq!(text_of(&line), "****** ");
    }

    #[test]
    fn test_input_line_cursor_mid_text() {
        let mut input = TextInput::with_value("abc");
        input.backspace();
        input.insert('x');
        // "abx" with cursor at the end
        let line = input_line(&input, true);
        assert_eq!(line.spans[0].content, "abx");
        assert_eq!(line.spans[1].content, " ");
    }
}
