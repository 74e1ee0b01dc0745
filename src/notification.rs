use crate::locale::Language;

const APP_NAME: &str = "Campus Companion";

/// One-shot messages the theme engine surfaces to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PreferenceLoadFailed,
    PreferenceSaveFailed,
}

impl Notice {
    pub const fn title(self, language: Language) -> &'static str {
        match language {
            Language::Polish => "Błąd",
            Language::English => "Error",
        }
    }

    pub const fn body(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::PreferenceLoadFailed, Language::Polish) => {
                "Nie udało się załadować ustawień motywu."
            }
            (Self::PreferenceLoadFailed, Language::English) => "Failed to load theme settings.",
            (Self::PreferenceSaveFailed, Language::Polish) => {
                "Nie udało się zapisać preferencji motywu."
            }
            (Self::PreferenceSaveFailed, Language::English) => {
                "Failed to save the theme preference."
            }
        }
    }
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Sends notices through the desktop notification daemon.
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    language: Language,
    enabled: bool,
}

impl DesktopNotifier {
    pub const fn new(language: Language, enabled: bool) -> Self {
        Self { language, enabled }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: Notice) {
        let body = notice.body(self.language);
        if !self.enabled {
            tracing::warn!(?notice, "{body}");
            return;
        }
        if let Err(err) = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(notice.title(self.language))
            .body(body)
            .show()
        {
            tracing::warn!(?notice, "system notification failed: {err}");
        }
    }
}
