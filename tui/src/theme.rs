//! Colors and glyphs for the EndoCalc TUI.
//!
//! The default scheme is a muted slate-and-teal; `high_contrast` swaps in
//! named terminal colors so the theme survives limited palettes.

use ratatui::style::{Color, Modifier, Style};

use endocalc_types::UiOptions;

mod colors {
    use super::Color;

    pub const SLATE_900: Color = Color::Rgb(18, 24, 31);
    pub const SLATE_800: Color = Color::Rgb(27, 35, 45);
    pub const SLATE_700: Color = Color::Rgb(39, 50, 63);
    pub const SLATE_500: Color = Color::Rgb(78, 94, 112);

    pub const CHART_WHITE: Color = Color::Rgb(226, 232, 236);
    pub const CHART_GRAY: Color = Color::Rgb(176, 186, 194);
    pub const FADED: Color = Color::Rgb(110, 122, 133);

    pub const TEAL: Color = Color::Rgb(72, 187, 170);
    pub const TEAL_DIM: Color = Color::Rgb(96, 150, 142);
    pub const SKY: Color = Color::Rgb(110, 170, 220);

    pub const NORMAL: Color = Color::Rgb(128, 196, 120);
    pub const BORDERLINE: Color = Color::Rgb(232, 190, 100);
    pub const ABNORMAL: Color = Color::Rgb(232, 98, 92);
    pub const AMBER: Color = Color::Rgb(240, 158, 84);
}

/// Resolved colors for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Key names in hint lines and the update banner.
    pub key: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::SLATE_900,
            bg_panel: colors::SLATE_800,
            bg_highlight: colors::SLATE_700,
            bg_border: colors::SLATE_500,
            text_primary: colors::CHART_WHITE,
            text_secondary: colors::CHART_GRAY,
            text_muted: colors::FADED,
            primary: colors::TEAL,
            primary_dim: colors::TEAL_DIM,
            accent: colors::SKY,
            success: colors::NORMAL,
            warning: colors::BORDERLINE,
            error: colors::ABNORMAL,
            key: colors::AMBER,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::Gray,
            primary: Color::Cyan,
            primary_dim: Color::Gray,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            key: Color::Yellow,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// Glyph set, chosen once per frame from `ascii_only`.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub selected: &'static str,
    pub bullet: &'static str,
    pub back: &'static str,
    pub dismiss: &'static str,
    pub online: &'static str,
    pub offline: &'static str,
    pub error: &'static str,
    pub cursor: &'static str,
    pub choice_prev: &'static str,
    pub choice_next: &'static str,
    pub arrows: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            selected: ">",
            bullet: "*",
            back: "<-",
            dismiss: "x",
            online: "*",
            offline: "o",
            error: "X",
            cursor: "_",
            choice_prev: "<",
            choice_next: ">",
            arrows: "Up/Down",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            selected: "▸",
            bullet: "•",
            back: "←",
            dismiss: "×",
            online: "●",
            offline: "○",
            error: "✗",
            cursor: "▏",
            choice_prev: "‹",
            choice_next: "›",
            arrows: "↑↓",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Shared styles for titles, focus, buttons and key hints.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn heading(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .bg(palette.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn button(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.bg_dark)
            .bg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.key)
            .add_modifier(Modifier::BOLD)
    }
}
