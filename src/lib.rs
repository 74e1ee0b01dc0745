pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod locale;
pub mod logging;
pub mod notification;
pub mod source;
pub mod state;
pub mod storage;
pub mod theme;
pub use cli::CliOptions;
pub use error::{AppError, AppResult};

use std::sync::Arc;
use std::time::Duration;

use crate::engine::{ThemeEngine, ThemeSnapshot};
use crate::locale::Language;
use crate::notification::DesktopNotifier;
use crate::source::{Identity, SharedAppearance, SharedIdentity};
use crate::storage::{FileCache, FileDocumentStore};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// State reported once a run has settled.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: ThemeSnapshot,
    pub language: Language,
    pub identity: Option<Identity>,
    /// False when storage did not answer before the timeout.
    pub settled: bool,
}

/// Entrypoint used by the CLI binding.
pub fn run(options: CliOptions) -> AppResult<RunReport> {
    logging::init();
    tracing::info!("starting campus-companion");

    let config = config::load_app_config();
    let cache = Arc::new(FileCache::new(config.cache_path()?));
    let remote = Arc::new(FileDocumentStore::new(config.remote_root_path()?));

    let language = match options.language {
        Some(language) => {
            locale::cache_language(cache.as_ref(), &config.language_key, language);
            language
        }
        None => locale::detect_language(cache.as_ref(), &config.language_key),
    };

    let identity = SharedIdentity::new(options.user.as_deref().map(Identity::new));
    let appearance = match options.device {
        Some(mode) => SharedAppearance::new(mode),
        None => SharedAppearance::detect(),
    };

    let notifier = DesktopNotifier::new(language, config.desktop_notifications);
    let mut engine = ThemeEngine::new(remote, cache, Box::new(notifier))
        .with_settings(config.engine_settings());
    engine.initialize(&identity, &appearance)?;
    let mut settled = engine.wait_idle(SETTLE_TIMEOUT);

    if let Some(preference) = options.theme {
        engine.set_preference(preference)?;
        settled = engine.wait_idle(SETTLE_TIMEOUT);
    }

    let report = RunReport {
        snapshot: engine.snapshot(),
        language,
        identity: engine.identity().cloned(),
        settled,
    };
    engine.shutdown();

    tracing::info!(
        preference = %report.snapshot.preference,
        active = %report.snapshot.active_mode,
        settled = report.settled,
        "run complete"
    );
    Ok(report)
}
