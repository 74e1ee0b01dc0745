use clap::Parser;

use crate::locale::Language;
use crate::theme::{ActiveMode, ParseThemeError, ThemePreference};

/// Resolve and print the theme for a student, optionally choosing a new one.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "campus-companion")]
#[command(version)]
pub struct CliOptions {
    /// Signed-in user id; omit to run signed out
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Device appearance to assume instead of detecting it
    #[arg(long, value_name = "light|dark", value_parser = parse_device)]
    pub device: Option<ActiveMode>,

    /// Theme preference to choose and persist
    #[arg(long, value_name = "light|dark|system", value_parser = parse_theme)]
    pub theme: Option<ThemePreference>,

    /// Interface language to remember
    #[arg(long = "lang", value_name = "pl|en", value_parser = parse_language)]
    pub language: Option<Language>,
}

fn parse_device(raw: &str) -> Result<ActiveMode, ParseThemeError> {
    raw.trim().parse()
}

fn parse_theme(raw: &str) -> Result<ThemePreference, ParseThemeError> {
    raw.trim().parse()
}

fn parse_language(raw: &str) -> Result<Language, String> {
    Language::from_tag(raw).ok_or_else(|| format!("unknown language: {raw:?}"))
}
