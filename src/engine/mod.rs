//! Process-wide theme state.
//!
//! [`ThemeEngine`] reconciles the device appearance, the signed-in user's
//! remote preference and the device-local cached preference into one
//! published [`ThemeSnapshot`]. It lives on a single owner thread: storage
//! work runs in issue order on a [`TaskRunner`] and reports back through a
//! channel that the owner drains with [`ThemeEngine::pump`]. Because reads
//! queue behind earlier writes, a resolution never sees a cache older than
//! the last explicit choice.
//!
//! Every resolution carries an epoch. Only the completion whose epoch is
//! the latest dispatched is applied; older completions are dropped, so
//! overlapping sign-in/sign-out resolutions settle on the last trigger no
//! matter which read returns first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::notification::{Notice, Notifier};
use crate::source::{AppearanceSource, Identity, IdentityProvider, Subscription};
use crate::state::{EnginePhase, LifecycleEvent, StateMachine, StateResult};
use crate::storage::{
    LocalPreferenceCache, RemotePreferenceStore, PREFERENCE_COLLECTION, THEME_PREFERENCE_KEY,
};
use crate::theme::{ActiveMode, AppTheme, ThemePreference};

mod resolve;
mod runner;

use self::resolve::{persist_preference, resolve_preference, PersistRequest, ResolveRequest};
pub use self::resolve::{PersistReport, PreferenceSource, Resolution, WriteOutcome};
pub use self::runner::{StorageWorker, Task, TaskRunner};

/// What every consumer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub theme: &'static AppTheme,
    pub preference: ThemePreference,
    pub active_mode: ActiveMode,
    pub is_resolving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub preference_key: String,
    pub remote_collection: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            preference_key: THEME_PREFERENCE_KEY.to_string(),
            remote_collection: PREFERENCE_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&ThemeSnapshot)>;

enum EngineEvent {
    IdentityChanged(Option<Identity>),
    AppearanceChanged(ActiveMode),
    Resolved { epoch: u64, resolution: Resolution },
    Persisted(PersistReport),
}

pub struct ThemeEngine {
    remote: Arc<dyn RemotePreferenceStore>,
    local: Arc<dyn LocalPreferenceCache>,
    notifier: Box<dyn Notifier>,
    runner: Box<dyn TaskRunner>,
    settings: EngineSettings,
    lifecycle: StateMachine,
    preference: ThemePreference,
    device_mode: ActiveMode,
    identity: Option<Identity>,
    resolution_epoch: u64,
    resolution_pending: bool,
    pending_writes: usize,
    write_sequence: Arc<AtomicU64>,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
    subscriptions: Vec<Subscription>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    last_published: Option<ThemeSnapshot>,
}

impl ThemeEngine {
    pub fn new(
        remote: Arc<dyn RemotePreferenceStore>,
        local: Arc<dyn LocalPreferenceCache>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            remote,
            local,
            notifier,
            runner: Box::new(StorageWorker::new()),
            settings: EngineSettings::default(),
            lifecycle: StateMachine::new(),
            preference: ThemePreference::System,
            device_mode: ActiveMode::Light,
            identity: None,
            resolution_epoch: 0,
            resolution_pending: false,
            pending_writes: 0,
            write_sequence: Arc::new(AtomicU64::new(0)),
            events_tx,
            events_rx,
            subscriptions: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
            last_published: None,
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_runner(mut self, runner: Box<dyn TaskRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn phase(&self) -> EnginePhase {
        self.lifecycle.phase()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_resolving(&self) -> bool {
        self.resolution_pending || self.pending_writes > 0
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        let active_mode = self.preference.active_mode(self.device_mode);
        ThemeSnapshot {
            theme: active_mode.theme(),
            preference: self.preference,
            active_mode,
            is_resolving: self.is_resolving(),
        }
    }

    /// Publish a device-derived theme right away, hook up both feeds and
    /// start resolving the persisted preference.
    pub fn initialize(
        &mut self,
        identity: &dyn IdentityProvider,
        appearance: &dyn AppearanceSource,
    ) -> StateResult<()> {
        self.lifecycle.transition(LifecycleEvent::Initialize)?;
        self.device_mode = appearance.current();
        self.preference = ThemePreference::System;
        self.resolution_pending = true;
        tracing::info!(device = %self.device_mode, "publishing provisional theme");
        self.publish();

        let tx = self.events_tx.clone();
        self.subscriptions
            .push(appearance.subscribe(Box::new(move |mode| {
                let _ = tx.send(EngineEvent::AppearanceChanged(mode));
            })));
        let tx = self.events_tx.clone();
        self.subscriptions
            .push(identity.subscribe(Box::new(move |identity| {
                let _ = tx.send(EngineEvent::IdentityChanged(identity));
            })));

        // Providers usually report the current identity on subscribe, which
        // has already queued a resolution.
        self.pump();
        if self.resolution_epoch == 0 {
            self.dispatch_resolution();
        }
        Ok(())
    }

    /// Apply every event that has arrived so far. Never blocks.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Block until no resolution or write is outstanding, or `timeout` passes.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.is_resolving() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(event) => self.handle(event),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    /// Optimistically switch to `preference`, then persist it in the
    /// background. Persistence failures never roll the choice back.
    pub fn set_preference(&mut self, preference: ThemePreference) -> StateResult<()> {
        self.lifecycle.transition(LifecycleEvent::PreferenceChosen)?;

        // An explicit choice outranks anything still being read.
        self.resolution_epoch += 1;
        self.resolution_pending = false;
        self.preference = preference;
        self.pending_writes += 1;
        tracing::info!(preference = %preference, "theme preference chosen");
        self.publish();

        let sequence = self.write_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let request = PersistRequest {
            preference,
            identity: self.identity.clone(),
            preference_key: self.settings.preference_key.clone(),
            collection: self.settings.remote_collection.clone(),
            sequence,
        };
        let remote = Arc::clone(&self.remote);
        let local = Arc::clone(&self.local);
        let latest = Arc::clone(&self.write_sequence);
        let tx = self.events_tx.clone();
        self.runner.spawn(Box::new(move || {
            let report = persist_preference(remote.as_ref(), local.as_ref(), &request, &latest);
            let _ = tx.send(EngineEvent::Persisted(report));
        }));
        Ok(())
    }

    /// Follow the device only while the preference is `system`. No I/O.
    pub fn on_device_appearance_changed(&mut self, mode: ActiveMode) {
        self.device_mode = mode;
        if self.preference.follows_device() {
            self.publish();
        } else {
            tracing::debug!(
                device = %mode,
                preference = %self.preference,
                "explicit preference; ignoring device appearance"
            );
        }
    }

    pub fn on_identity_changed(&mut self, identity: Option<Identity>) {
        tracing::debug!(identity = ?identity, "identity changed");
        self.identity = identity;
        if self.lifecycle.phase() == EnginePhase::Uninitialized {
            return;
        }
        self.dispatch_resolution();
    }

    /// Register a consumer. It is called at once with the current snapshot
    /// (when one has been published) and then on every change.
    pub fn observe(&mut self, mut observer: impl FnMut(&ThemeSnapshot) + 'static) -> ObserverId {
        if let Some(snapshot) = &self.last_published {
            observer(snapshot);
        }
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Drop the identity and appearance subscriptions.
    pub fn shutdown(&mut self) {
        tracing::debug!(count = self.subscriptions.len(), "releasing engine subscriptions");
        self.subscriptions.clear();
    }

    fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::IdentityChanged(identity) => self.on_identity_changed(identity),
            EngineEvent::AppearanceChanged(mode) => self.on_device_appearance_changed(mode),
            EngineEvent::Resolved { epoch, resolution } => {
                self.apply_resolution(epoch, resolution)
            }
            EngineEvent::Persisted(report) => self.finish_persist(report),
        }
    }

    fn dispatch_resolution(&mut self) {
        self.resolution_epoch += 1;
        let epoch = self.resolution_epoch;
        self.resolution_pending = true;
        tracing::debug!(epoch, identity = ?self.identity, "dispatching preference resolution");

        let request = ResolveRequest {
            identity: self.identity.clone(),
            preference_key: self.settings.preference_key.clone(),
            collection: self.settings.remote_collection.clone(),
        };
        let remote = Arc::clone(&self.remote);
        let local = Arc::clone(&self.local);
        let tx = self.events_tx.clone();
        self.runner.spawn(Box::new(move || {
            let resolution = resolve_preference(remote.as_ref(), local.as_ref(), &request);
            let _ = tx.send(EngineEvent::Resolved { epoch, resolution });
        }));
        self.publish();
    }

    fn apply_resolution(&mut self, epoch: u64, resolution: Resolution) {
        if epoch != self.resolution_epoch {
            tracing::debug!(
                epoch,
                latest = self.resolution_epoch,
                "discarding stale preference resolution"
            );
            return;
        }
        if let Err(err) = self.lifecycle.transition(LifecycleEvent::ResolutionApplied) {
            tracing::warn!(?err, "dropping resolution outside engine lifecycle");
            return;
        }

        self.resolution_pending = false;
        self.preference = resolution.preference;
        tracing::info!(
            epoch,
            preference = %resolution.preference,
            source = ?resolution.source,
            "theme preference resolved"
        );
        if resolution.all_sources_failed {
            self.notifier.notify(Notice::PreferenceLoadFailed);
        }
        self.publish();
    }

    fn finish_persist(&mut self, report: PersistReport) {
        self.pending_writes = self.pending_writes.saturating_sub(1);
        if report.has_failures() {
            tracing::warn!(
                preference = %report.preference,
                local = ?report.local,
                remote = ?report.remote,
                "theme preference not fully persisted"
            );
            self.notifier.notify(Notice::PreferenceSaveFailed);
        }
        self.publish();
    }

    fn publish(&mut self) {
        if self.lifecycle.phase() == EnginePhase::Uninitialized {
            return;
        }
        let snapshot = self.snapshot();
        if self.last_published == Some(snapshot) {
            return;
        }
        self.last_published = Some(snapshot);
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
    }
}

impl Drop for ThemeEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
