use std::sync::atomic::{AtomicU64, Ordering};

use crate::source::Identity;
use crate::storage::{
    LocalPreferenceCache, PreferenceRecord, RemotePreferenceStore, StorageError,
};
use crate::theme::ThemePreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSource {
    Remote,
    Local,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub preference: ThemePreference,
    pub source: PreferenceSource,
    /// Every store that was consulted returned an error.
    pub all_sources_failed: bool,
}

impl Resolution {
    const fn found(preference: ThemePreference, source: PreferenceSource) -> Self {
        Self {
            preference,
            source,
            all_sources_failed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolveRequest {
    pub(crate) identity: Option<Identity>,
    pub(crate) preference_key: String,
    pub(crate) collection: String,
}

/// Remote record for the identity, then the local cache, then `system`.
/// A failed read counts as "not found" for that step.
pub(crate) fn resolve_preference(
    remote: &dyn RemotePreferenceStore,
    local: &dyn LocalPreferenceCache,
    request: &ResolveRequest,
) -> Resolution {
    let mut attempted = 0_u32;
    let mut failed = 0_u32;

    if let Some(identity) = &request.identity {
        attempted += 1;
        match remote.get(&request.collection, identity) {
            Ok(Some(document)) => match PreferenceRecord::from_document(&document) {
                Some(record) => {
                    return Resolution::found(record.theme_preference, PreferenceSource::Remote)
                }
                None => tracing::debug!(identity = %identity, "remote document has no preference"),
            },
            Ok(None) => tracing::debug!(identity = %identity, "no remote preference document"),
            Err(err) => {
                failed += 1;
                tracing::warn!(identity = %identity, ?err, "remote preference read failed");
            }
        }
    }

    attempted += 1;
    match local.get(&request.preference_key) {
        Ok(Some(value)) => match PreferenceRecord::from_cached(&value) {
            Some(record) => {
                return Resolution::found(record.theme_preference, PreferenceSource::Local)
            }
            None => tracing::warn!(value = %value, "ignoring unknown cached preference"),
        },
        Ok(None) => tracing::debug!("no cached preference"),
        Err(err) => {
            failed += 1;
            tracing::warn!(?err, "cached preference read failed");
        }
    }

    Resolution {
        preference: ThemePreference::System,
        source: PreferenceSource::Default,
        all_sources_failed: failed == attempted,
    }
}

#[derive(Debug)]
pub enum WriteOutcome {
    Written,
    /// A newer write was dispatched before this one started.
    Superseded,
    NotSignedIn,
    Failed(StorageError),
}

impl WriteOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug)]
pub struct PersistReport {
    pub preference: ThemePreference,
    pub local: WriteOutcome,
    pub remote: WriteOutcome,
}

impl PersistReport {
    pub fn has_failures(&self) -> bool {
        self.local.is_failure() || self.remote.is_failure()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PersistRequest {
    pub(crate) preference: ThemePreference,
    pub(crate) identity: Option<Identity>,
    pub(crate) preference_key: String,
    pub(crate) collection: String,
    pub(crate) sequence: u64,
}

/// Local cache first, then a merge into the remote document. The two
/// writes are attempted independently.
pub(crate) fn persist_preference(
    remote: &dyn RemotePreferenceStore,
    local: &dyn LocalPreferenceCache,
    request: &PersistRequest,
    latest_sequence: &AtomicU64,
) -> PersistReport {
    let superseded = || latest_sequence.load(Ordering::SeqCst) != request.sequence;
    let value = request.preference.as_str();

    let local_outcome = if superseded() {
        WriteOutcome::Superseded
    } else {
        match local.set(&request.preference_key, value) {
            Ok(()) => WriteOutcome::Written,
            Err(err) => {
                tracing::warn!(?err, preference = %value, "failed to cache preference");
                WriteOutcome::Failed(err)
            }
        }
    };

    let remote_outcome = match &request.identity {
        None => WriteOutcome::NotSignedIn,
        Some(_) if superseded() => WriteOutcome::Superseded,
        Some(identity) => {
            let fields = PreferenceRecord::new(request.preference).to_document();
            match remote.set_merge(&request.collection, identity, fields) {
                Ok(()) => WriteOutcome::Written,
                Err(err) => {
                    tracing::warn!(identity = %identity, ?err, "failed to store remote preference");
                    WriteOutcome::Failed(err)
                }
            }
        }
    };

    PersistReport {
        preference: request.preference,
        local: local_outcome,
        remote: remote_outcome,
    }
}
