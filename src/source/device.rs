use std::process::{Command, Stdio};

use crate::theme::ActiveMode;

const GSETTINGS_COMMAND: &str = "gsettings";
const GNOME_INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";
const COLOR_SCHEME_KEY: &str = "color-scheme";

/// Best-effort reading of the host light/dark setting. Light when unknown.
pub fn detect_device_mode() -> ActiveMode {
    if let Some(mode) = std::env::var("GTK_THEME")
        .ok()
        .and_then(|value| mode_from_gtk_theme(&value))
    {
        return mode;
    }

    match Command::new(GSETTINGS_COMMAND)
        .args(["get", GNOME_INTERFACE_SCHEMA, COLOR_SCHEME_KEY])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => {
            mode_from_color_scheme(&String::from_utf8_lossy(&output.stdout))
                .unwrap_or(ActiveMode::Light)
        }
        Ok(output) => {
            tracing::debug!(status = %output.status, "gsettings color-scheme lookup failed");
            ActiveMode::Light
        }
        Err(err) => {
            tracing::debug!(?err, "gsettings unavailable; assuming light appearance");
            ActiveMode::Light
        }
    }
}

fn mode_from_gtk_theme(value: &str) -> Option<ActiveMode> {
    value
        .trim()
        .ends_with(":dark")
        .then_some(ActiveMode::Dark)
}

fn mode_from_color_scheme(output: &str) -> Option<ActiveMode> {
    match output.trim().trim_matches('\'') {
        "prefer-dark" => Some(ActiveMode::Dark),
        "prefer-light" | "default" => Some(ActiveMode::Light),
        _ => None,
    }
}
