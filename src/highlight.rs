use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::types::LineKind;
use crate::ui::theme::Theme;

/// Syntax highlighting for the text of file view lines.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Pick a syntax from the file extension without touching the disk.
    fn syntax_for(&self, path: &str) -> &SyntaxReference {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    pub fn detect_syntax(&self, path: &str) -> &str {
        self.syntax_for(path).name.as_str()
    }

    /// Style the text of one diff line.
    ///
    /// Context and addition lines get syntax colors; additions are tinted
    /// bold so they stand out from context. Deletions and headers use the
    /// flat palette colors.
    pub fn highlight(
        &self,
        path: &str,
        text: &str,
        kind: LineKind,
        theme: &Theme,
    ) -> Vec<Span<'static>> {
        let flat = |style: Style| vec![Span::styled(text.to_string(), style)];
        match kind {
            LineKind::HunkHeader => return flat(theme.header_style()),
            LineKind::Deletion => return flat(theme.deletion_style()),
            LineKind::Context | LineKind::Addition => {}
        }

        let fallback = match kind {
            LineKind::Addition => theme.addition_style(),
            _ => theme.context_style(),
        };
        let Some(syntect_theme) = self.theme_set.themes.get(theme.syntect_theme) else {
            return flat(fallback);
        };

        let mut h = HighlightLines::new(self.syntax_for(path), syntect_theme);
        let line_with_newline = format!("{text}\n");
        match h.highlight_line(&line_with_newline, &self.syntax_set) {
            Ok(ranges) => ranges
                .iter()
                .filter_map(|(style, piece)| {
                    let piece = piece.trim_end_matches('\n');
                    if piece.is_empty() {
                        return None;
                    }
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    let mut span_style = Style::default().fg(fg);
                    if style.font_style.contains(FontStyle::BOLD) || kind == LineKind::Addition {
                        span_style = span_style.add_modifier(Modifier::BOLD);
                    }
                    if style.font_style.contains(FontStyle::ITALIC) {
                        span_style = span_style.add_modifier(Modifier::ITALIC);
                    }
                    Some(Span::styled(piece.to_string(), span_style))
                })
                .collect(),
            Err(_) => flat(fallback),
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
