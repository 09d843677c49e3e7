use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;

use crate::app::ViewerSession;
use crate::highlight::Highlighter;
use crate::types::{ContentKind, ContentLine, DiffLine, LineKind, Pane, ViewMode};
use crate::ui::pane_block;
use crate::ui::theme::Theme;

/// A long line is split into at most this many screen rows; the rest is cut.
pub const MAX_WRAP_PIECES: usize = 10;

/// Hard-wrap styled spans into rows at most `width` columns wide. A wide
/// character that would cross the edge starts the next row.
pub fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![Line::from(spans)];
    }
    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    'spans: for span in spans {
        let mut piece = String::new();
        for c in span.content.chars() {
            let cols = c.width().unwrap_or(0);
            if used > 0 && used + cols > width {
                if !piece.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut piece), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut row)));
                used = 0;
                if rows.len() == MAX_WRAP_PIECES {
                    break 'spans;
                }
            }
            piece.push(c);
            used += cols;
        }
        if !piece.is_empty() {
            row.push(Span::styled(piece, span.style));
        }
    }

    if rows.len() < MAX_WRAP_PIECES && (!row.is_empty() || rows.is_empty()) {
        rows.push(Line::from(row));
    }
    rows
}

/// Wrap every source line starting at `scroll` until `height` rows are
/// filled. `row_style` gives an optional background per source index.
fn fill_rows<T>(
    items: &[T],
    scroll: usize,
    width: usize,
    height: usize,
    mut to_spans: impl FnMut(&T) -> Vec<Span<'static>>,
    row_style: impl Fn(usize) -> Option<Style>,
) -> Vec<Line<'static>> {
    let mut out = Vec::with_capacity(height);
    for (index, item) in items.iter().enumerate().skip(scroll) {
        if out.len() >= height {
            break;
        }
        let style = row_style(index);
        for row in wrap_spans(to_spans(item), width) {
            if out.len() >= height {
                break;
            }
            out.push(match style {
                Some(style) => row.style(style),
                None => row,
            });
        }
    }
    out
}

fn content_style(kind: ContentKind, theme: &Theme) -> Style {
    match kind {
        ContentKind::Header => theme.header_style(),
        ContentKind::Addition => theme.addition_style(),
        ContentKind::Deletion => theme.deletion_style(),
        ContentKind::Stat => Style::default().fg(theme.stat_fg),
        ContentKind::CommitHeader => theme.info_style().add_modifier(Modifier::BOLD),
        ContentKind::Info => Style::default().fg(theme.header_fg),
        ContentKind::Plain => Style::default(),
    }
}

fn content_spans(line: &ContentLine, theme: &Theme) -> Vec<Span<'static>> {
    vec![Span::styled(line.text.clone(), content_style(line.kind, theme))]
}

/// Gutter, staged marker, prefix and highlighted text of one diff line.
fn diff_spans(
    line: &DiffLine,
    path: &str,
    highlighter: &Highlighter,
    theme: &Theme,
) -> Vec<Span<'static>> {
    if line.kind == LineKind::HunkHeader {
        return highlighter.highlight(path, &line.text, line.kind, theme);
    }
    let number = match line.kind {
        LineKind::Deletion => line.old_line_no,
        _ => line.new_line_no,
    };
    let gutter = number.map_or_else(|| "     ".to_string(), |n| format!("{n:>4} "));
    let marker = if line.is_staged { "●" } else { " " };
    let prefix_style = match line.kind {
        LineKind::Addition => theme.addition_style(),
        LineKind::Deletion => theme.deletion_style(),
        _ => theme.context_style(),
    };

    let mut spans = vec![
        Span::styled(gutter, Style::default().fg(theme.muted_fg)),
        Span::styled(marker, Style::default().fg(theme.staged_fg)),
        Span::styled(line.kind.prefix(), prefix_style),
    ];
    let text = line.text.strip_suffix('\r').unwrap_or(&line.text);
    spans.extend(highlighter.highlight(path, text, line.kind, theme));
    spans
}

fn preview_title(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::FileList | ViewMode::FileView { .. } => "Diff",
        ViewMode::CommitList | ViewMode::CommitView => "Commit",
        ViewMode::BranchList | ViewMode::BranchView => "Branch log",
        ViewMode::StashList | ViewMode::StashView => "Stash",
    }
}

fn is_view(mode: ViewMode) -> bool {
    matches!(
        mode,
        ViewMode::FileView { .. } | ViewMode::CommitView | ViewMode::BranchView | ViewMode::StashView
    )
}

/// Render the right-hand pane and record its inner heights on the session
/// so paging keys know how far to move.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    session: &mut ViewerSession,
    highlighter: &Highlighter,
    theme: &Theme,
) {
    let mode = session.mode;
    let active = is_view(mode);

    if mode == (ViewMode::FileView { split: true }) {
        render_split(frame, area, session, highlighter, theme);
        return;
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(2) as usize;
    session.viewport_height = inner_height;

    let (title, rows) = match mode {
        ViewMode::FileList | ViewMode::FileView { .. } => match &session.staging {
            Some(model) => {
                let path = model.path();
                let rows = fill_rows(
                    model.lines(),
                    session.content_scroll,
                    width,
                    inner_height,
                    |line| diff_spans(line, path, highlighter, theme),
                    |_| None,
                );
                (format!(" 2. {path} "), rows)
            }
            None => (
                " 2. Diff ".to_string(),
                vec![Line::styled("No changes", Style::default().fg(theme.muted_fg))],
            ),
        },
        _ => (
            format!(" 2. {} ", preview_title(mode)),
            fill_rows(
                &session.content,
                session.content_scroll,
                width,
                inner_height,
                |line| content_spans(line, theme),
                |_| None,
            ),
        ),
    };

    let paragraph = Paragraph::new(rows).block(pane_block(title, active, theme));
    frame.render_widget(paragraph, area);
}

fn render_split(
    frame: &mut Frame,
    area: Rect,
    session: &mut ViewerSession,
    highlighter: &Highlighter,
    theme: &Theme,
) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let (top, bottom) = (halves[0], halves[1]);
    session.viewport_height = top.height.saturating_sub(2) as usize;
    session.staged_viewport_height = bottom.height.saturating_sub(2) as usize;

    let Some(model) = &session.staging else {
        frame.render_widget(
            Paragraph::new(Line::styled("No changes", Style::default().fg(theme.muted_fg)))
                .block(pane_block(" 2. Diff ".to_string(), true, theme)),
            area,
        );
        return;
    };

    let path = model.path();
    let cursor_style = Style::default().bg(theme.cursor_bg);
    let unstaged_active = session.active_pane == Pane::Unstaged;

    let file_cursor = session.file_cursor;
    let unstaged_rows = fill_rows(
        model.lines(),
        session.file_scroll,
        top.width.saturating_sub(2) as usize,
        session.viewport_height,
        |line| diff_spans(line, path, highlighter, theme),
        |i| (unstaged_active && i == file_cursor).then_some(cursor_style),
    );
    let unstaged_title = format!(" Unstaged: {path} ({} selected) ", model.staged_count());
    frame.render_widget(
        Paragraph::new(unstaged_rows).block(pane_block(unstaged_title, unstaged_active, theme)),
        top,
    );

    let staged = model.staged_view();
    let staged_cursor = session.staged_cursor;
    let staged_rows = if staged.is_empty() {
        vec![Line::styled(
            "Nothing staged",
            Style::default().fg(theme.muted_fg),
        )]
    } else {
        fill_rows(
            &staged.lines,
            session.staged_scroll,
            bottom.width.saturating_sub(2) as usize,
            session.staged_viewport_height,
            |line| diff_spans(line, path, highlighter, theme),
            |i| (!unstaged_active && i == staged_cursor).then_some(cursor_style),
        )
    };
    let staged_title = if model.has_pending() {
        " Staged (pending, a to apply) ".to_string()
    } else {
        " Staged (index) ".to_string()
    };
    frame.render_widget(
        Paragraph::new(staged_rows).block(pane_block(staged_title, !unstaged_active, theme)),
        bottom,
    );
}
