use catalog_core::Theme;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
}

pub(crate) fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Day => Palette {
            bg: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(10, 10, 20),
            dim: Color::DarkGray,
            accent: Color::Blue,
        },
        Theme::Night => Palette {
            bg: Color::Rgb(10, 10, 20),
            fg: Color::Rgb(255, 255, 255),
            dim: Color::Gray,
            accent: Color::Yellow,
        },
    }
}
