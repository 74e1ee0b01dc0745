use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user asked for. `System` defers to the device appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

/// What is actually rendered. Never `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme value: {0:?}")]
pub struct ParseThemeError(pub String);

impl ThemePreference {
    pub const ALL: [ThemePreference; 3] = [Self::Light, Self::Dark, Self::System];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Derive the rendered mode given the live device reading.
    pub const fn active_mode(self, device: ActiveMode) -> ActiveMode {
        match self {
            Self::Light => ActiveMode::Light,
            Self::Dark => ActiveMode::Dark,
            Self::System => device,
        }
    }

    pub const fn follows_device(self) -> bool {
        matches!(self, Self::System)
    }
}

impl ActiveMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn theme(self) -> &'static AppTheme {
        match self {
            Self::Light => &LIGHT_THEME,
            Self::Dark => &DARK_THEME,
        }
    }
}

impl FromStr for ThemePreference {
    type Err = ParseThemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

impl FromStr for ActiveMode {
    type Err = ParseThemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ActiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Brand colors shared by both tables.
mod base {
    pub const PRIMARY: &str = "#6dab3c";
    pub const SECONDARY: &str = "#464f5a";
    pub const ACCENT: &str = "#ff8c00";
    pub const DANGER: &str = "#D32F2F";
    pub const WHITE: &str = "#ffffff";
    pub const LIGHT_GRAY: &str = "#e0e0e0";
    pub const MEDIUM_GRAY: &str = "#888888";
    pub const DARK_GRAY: &str = "#333333";
    pub const SHADOW_LIGHT: &str = "rgba(0, 0, 0, 0.1)";
    pub const SHADOW_DARK: &str = "rgba(255, 255, 255, 0.08)";
}

/// Semantic color table. Only [`LIGHT_THEME`] and [`DARK_THEME`] exist.
#[derive(Debug, PartialEq, Eq)]
pub struct AppTheme {
    pub mode: ActiveMode,
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub secondary_text: &'static str,
    pub separator: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub danger: &'static str,
    pub success: &'static str,
    pub success_background: &'static str,
    pub button_text: &'static str,
    pub header_background: &'static str,
    pub header_text: &'static str,
    pub tab_bar_active: &'static str,
    pub tab_bar_inactive: &'static str,
    pub shadow_color: &'static str,
    pub input_background: &'static str,
    pub input_border: &'static str,
    pub placeholder_text: &'static str,
}

pub static LIGHT_THEME: AppTheme = AppTheme {
    mode: ActiveMode::Light,
    background: "#f4f6f8",
    card: base::WHITE,
    text: base::DARK_GRAY,
    secondary_text: base::MEDIUM_GRAY,
    separator: base::LIGHT_GRAY,
    primary: base::PRIMARY,
    secondary: base::SECONDARY,
    accent: base::ACCENT,
    danger: base::DANGER,
    success: "#4caf50",
    success_background: "#e8f5e8",
    button_text: base::WHITE,
    header_background: base::PRIMARY,
    header_text: base::WHITE,
    tab_bar_active: base::PRIMARY,
    tab_bar_inactive: base::MEDIUM_GRAY,
    shadow_color: base::SHADOW_LIGHT,
    input_background: base::WHITE,
    input_border: base::LIGHT_GRAY,
    placeholder_text: base::MEDIUM_GRAY,
};

pub static DARK_THEME: AppTheme = AppTheme {
    mode: ActiveMode::Dark,
    background: "#121212",
    card: "#1e1e1e",
    text: "#e0e0e0",
    secondary_text: "#a0a0a0",
    separator: "#303030",
    primary: base::PRIMARY,
    secondary: "#5a6f80",
    accent: base::ACCENT,
    danger: base::DANGER,
    success: "#66bb6a",
    success_background: "#1b5e20",
    button_text: base::WHITE,
    header_background: "#1f1f1f",
    header_text: base::WHITE,
    tab_bar_active: base::PRIMARY,
    tab_bar_inactive: "#707070",
    shadow_color: base::SHADOW_DARK,
    input_background: "#2c2c2c",
    input_border: "#404040",
    placeholder_text: base::MEDIUM_GRAY,
};

impl AppTheme {
    /// Look a color up by its semantic token name (`inputBorder`, `card`, ...).
    pub fn token(&self, name: &str) -> Option<&'static str> {
        self.tokens()
            .into_iter()
            .find_map(|(token, value)| (token == name).then_some(value))
    }

    pub fn tokens(&self) -> [(&'static str, &'static str); 20] {
        [
            ("background", self.background),
            ("card", self.card),
            ("text", self.text),
            ("secondaryText", self.secondary_text),
            ("separator", self.separator),
            ("primary", self.primary),
            ("secondary", self.secondary),
            ("accent", self.accent),
            ("danger", self.danger),
            ("success", self.success),
            ("successBackground", self.success_background),
            ("buttonText", self.button_text),
            ("headerBackground", self.header_background),
            ("headerText", self.header_text),
            ("tabBarActive", self.tab_bar_active),
            ("tabBarInactive", self.tab_bar_inactive),
            ("shadowColor", self.shadow_color),
            ("inputBackground", self.input_background),
            ("inputBorder", self.input_border),
            ("placeholderText", self.placeholder_text),
        ]
    }
}
