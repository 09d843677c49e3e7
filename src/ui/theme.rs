use clap::ValueEnum;
use ratatui::style::{Color, Modifier, Style};

/// `--theme` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    #[default]
    Auto,
}

/// Which color variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

/// Colors for every pane. Built once at startup and passed by reference to
/// the renderers.
#[derive(Debug, Clone)]
pub struct Theme {
    pub variant: ThemeVariant,

    pub addition_fg: Color,
    pub deletion_fg: Color,
    pub header_fg: Color,
    pub info_fg: Color,
    pub stat_fg: Color,
    pub context_fg: Color,

    pub selected_fg: Color,
    pub selected_bg: Color,
    pub cursor_bg: Color,

    pub staged_fg: Color,
    pub marked_fg: Color,
    pub unpushed_fg: Color,
    pub muted_fg: Color,

    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
    pub success_fg: Color,
    pub progress_fg: Color,

    pub border_active: Color,
    pub border_inactive: Color,

    /// The syntect theme name to use for syntax highlighting.
    pub syntect_theme: &'static str,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            variant: ThemeVariant::Dark,

            addition_fg: Color::Green,
            deletion_fg: Color::Red,
            header_fg: Color::Cyan,
            info_fg: Color::Yellow,
            stat_fg: Color::Magenta,
            context_fg: Color::Gray,

            selected_fg: Color::Yellow,
            selected_bg: Color::Rgb(40, 40, 80),
            cursor_bg: Color::Rgb(50, 50, 50),

            staged_fg: Color::Green,
            marked_fg: Color::Green,
            unpushed_fg: Color::Yellow,
            muted_fg: Color::DarkGray,

            status_bar_fg: Color::Black,
            status_bar_bg: Color::Cyan,
            success_fg: Color::Green,
            progress_fg: Color::Yellow,

            border_active: Color::Yellow,
            border_inactive: Color::DarkGray,

            syntect_theme: "base16-ocean.dark",
        }
    }

    pub fn light() -> Self {
        Self {
            variant: ThemeVariant::Light,

            addition_fg: Color::Rgb(0, 120, 0),
            deletion_fg: Color::Rgb(180, 0, 0),
            header_fg: Color::Rgb(0, 130, 130),
            info_fg: Color::Rgb(150, 100, 0),
            stat_fg: Color::Rgb(160, 0, 160),
            context_fg: Color::DarkGray,

            selected_fg: Color::Rgb(150, 100, 0),
            selected_bg: Color::Rgb(200, 210, 240),
            cursor_bg: Color::Rgb(225, 225, 225),

            staged_fg: Color::Rgb(0, 140, 0),
            marked_fg: Color::Rgb(0, 140, 0),
            unpushed_fg: Color::Rgb(180, 130, 0),
            muted_fg: Color::Gray,

            status_bar_fg: Color::Black,
            status_bar_bg: Color::Rgb(150, 220, 220),
            success_fg: Color::Rgb(0, 120, 0),
            progress_fg: Color::Rgb(150, 100, 0),

            border_active: Color::Rgb(150, 100, 0),
            border_inactive: Color::Gray,

            syntect_theme: "InspiredGitHub",
        }
    }

    /// Resolve a `--theme` choice. Auto reads `COLORFGBG` ("fg;bg"), where a
    /// background of 8 or more usually means a light terminal.
    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
            ThemeChoice::Auto => {
                let colorfgbg = std::env::var("COLORFGBG").ok();
                if background_is_light(colorfgbg.as_deref()) {
                    Self::light()
                } else {
                    Self::dark()
                }
            }
        }
    }

    pub fn addition_style(&self) -> Style {
        Style::default().fg(self.addition_fg)
    }

    pub fn deletion_style(&self) -> Style {
        Style::default().fg(self.deletion_fg)
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info_fg)
    }

    pub fn context_style(&self) -> Style {
        Style::default().fg(self.context_fg)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().fg(self.status_bar_fg).bg(self.status_bar_bg)
    }

    pub fn border_style(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.border_active)
        } else {
            Style::default().fg(self.border_inactive)
        }
    }

    pub fn title_style(&self, active: bool) -> Style {
        let style = self.border_style(active);
        if active {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

fn background_is_light(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|val| val.rsplit(';').next())
        .and_then(|bg| bg.parse::<u8>().ok())
        .is_some_and(|bg| bg >= 8)
}
