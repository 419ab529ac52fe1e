use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Dracula,
    Nord,
}

impl Theme {
    pub fn as_str(&self) -> &str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Dracula => "dracula",
            Theme::Nord => "nord",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => Theme::Light,
            "dracula" => Theme::Dracula,
            "nord" => Theme::Nord,
            _ => Theme::Dark,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dracula,
            Theme::Dracula => Theme::Nord,
            Theme::Nord => Theme::Dark,
        }
    }

    pub fn primary(&self) -> Color {
        match self {
            Theme::Dark | Theme::Nord => Color::Cyan,
            Theme::Light => Color::Blue,
            Theme::Dracula => Color::Magenta,
        }
    }

    pub fn text(&self) -> Color {
        match self {
            Theme::Light => Color::Black,
            _ => Color::White,
        }
    }

    pub fn text_muted(&self) -> Color {
        match self {
            Theme::Light => Color::DarkGray,
            Theme::Nord => Color::LightBlue,
            _ => Color::Gray,
        }
    }

    pub fn border(&self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
            Theme::Dracula => Color::Rgb(68, 71, 90),
            Theme::Nord => Color::Rgb(76, 86, 106),
        }
    }

    pub fn highlight(&self) -> Color {
        match self {
            Theme::Dark => Color::Yellow,
            Theme::Light => Color::Cyan,
            Theme::Dracula => Color::Rgb(255, 121, 198),
            Theme::Nord => Color::Rgb(136, 192, 208),
        }
    }

    /// Foreground for a component colour under this theme
    pub fn component(&self, color: ComponentColor) -> Color {
        match color {
            ComponentColor::Default => self.text(),
            ComponentColor::Primary => self.primary(),
            ComponentColor::Secondary => self.text_muted(),
            ComponentColor::Success => Color::Green,
            ComponentColor::Warning => Color::Yellow,
            ComponentColor::Danger => Color::Red,
        }
    }
}

/// Semantic colour of a button-like component
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ComponentColor {
    #[default]
    Default,
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
}

/// Component size, expressed as horizontal padding in cells
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ComponentSize {
    ExtraSmall,
    #[default]
    Small,
    Medium,
    Large,
}

impl ComponentSize {
    pub fn padding(&self) -> u16 {
        match self {
            ComponentSize::ExtraSmall => 0,
            ComponentSize::Small => 1,
            ComponentSize::Medium => 2,
            ComponentSize::Large => 3,
        }
    }
}

/// Dropdown menu palettes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MenuColor {
    #[default]
    Sapphire,
    Amethyst,
    Malachite,
    Onyx,
}

impl MenuColor {
    pub fn background(&self) -> Color {
        match self {
            MenuColor::Sapphire => Color::Rgb(34, 58, 112),
            MenuColor::Amethyst => Color::Rgb(81, 50, 133),
            MenuColor::Malachite => Color::Rgb(27, 94, 72),
            MenuColor::Onyx => Color::Rgb(32, 32, 40),
        }
    }

    pub fn item(&self) -> Style {
        Style::default().fg(Color::White).bg(self.background())
    }

    pub fn selected(&self) -> Style {
        self.item().add_modifier(Modifier::BOLD)
    }

    pub fn highlighted(&self) -> Style {
        Style::default().fg(self.background()).bg(Color::White)
    }

    pub fn divider(&self) -> Style {
        Style::default().fg(Color::Gray).bg(self.background())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_round_trip_names() {
        let mut theme = Theme::Dark;
        for _ in 0..4 {
            assert_eq!(Theme::from_str(theme.as_str()), theme);
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Dark);
        assert_eq!(Theme::from_str("solarized"), Theme::Dark);
    }
}
