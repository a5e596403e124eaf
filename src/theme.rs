use ratatui::style::Color;

/// Light/dark display mode. Lives only for the session; never written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub completed: Color,
    pub danger: Color,
    pub success: Color,
    pub warning: Color,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Caption for the toggle button: names the mode it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark",
            Theme::Dark => "Light",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                selected_bg: Color::Blue,
                selected_fg: Color::White,
                completed: Color::DarkGray,
                danger: Color::Red,
                success: Color::Green,
                warning: Color::Rgb(180, 120, 0),
            },
            Theme::Dark => Palette {
                bg: Color::Rgb(30, 30, 40),
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                selected_bg: Color::Rgb(60, 60, 110),
                selected_fg: Color::White,
                completed: Color::Gray,
                danger: Color::LightRed,
                success: Color::LightGreen,
                warning: Color::Yellow,
            },
        }
    }
}
