//! Collaborators that push changes into the engine: who is signed in and
//! what the device appearance is.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::theme::ActiveMode;

mod device;
mod identity;

pub use device::detect_device_mode;
pub use identity::Identity;

pub type IdentityListener = Box<dyn Fn(Option<Identity>) + Send>;
pub type AppearanceListener = Box<dyn Fn(ActiveMode) + Send>;

/// Releases a listener registration once, on `unsubscribe()` or drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Emits the signed-in identity. Listeners fire at least once on subscribe
/// and again on every sign-in or sign-out.
pub trait IdentityProvider {
    fn subscribe(&self, on_change: IdentityListener) -> Subscription;
}

/// Emits the OS light/dark setting.
pub trait AppearanceSource {
    fn current(&self) -> ActiveMode;
    fn subscribe(&self, on_change: AppearanceListener) -> Subscription;
}

struct Registry<T> {
    value: T,
    next_id: u64,
    listeners: Vec<(u64, Box<dyn Fn(T) + Send>)>,
}

impl<T: Clone + PartialEq> Registry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    fn add(&mut self, listener: Box<dyn Fn(T) + Send>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn update(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for (_, listener) in &self.listeners {
            listener(self.value.clone());
        }
        true
    }
}

type SharedRegistry<T> = Arc<Mutex<Registry<T>>>;

fn release_listener<T: Send + 'static>(registry: Weak<Mutex<Registry<T>>>, id: u64) -> Subscription {
    Subscription::new(move || {
        if let Some(registry) = registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    })
}

/// In-process identity feed. The auth layer calls `sign_in` / `sign_out`.
///
/// Listeners run with the feed locked, so they must not call back into it.
#[derive(Clone)]
pub struct SharedIdentity {
    inner: SharedRegistry<Option<Identity>>,
}

impl SharedIdentity {
    pub fn new(current: Option<Identity>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::new(current))),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::debug!(identity = %identity, "identity signed in");
        self.lock().update(Some(identity));
    }

    pub fn sign_out(&self) {
        if self.lock().update(None) {
            tracing::debug!("identity signed out");
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<Option<Identity>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for SharedIdentity {
    fn subscribe(&self, on_change: IdentityListener) -> Subscription {
        let id = {
            let mut registry = self.lock();
            on_change(registry.value.clone());
            registry.add(on_change)
        };
        release_listener(Arc::downgrade(&self.inner), id)
    }
}

/// In-process appearance feed. The platform layer calls `set`.
#[derive(Clone)]
pub struct SharedAppearance {
    inner: SharedRegistry<ActiveMode>,
}

impl SharedAppearance {
    pub fn new(current: ActiveMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::new(current))),
        }
    }

    pub fn detect() -> Self {
        Self::new(detect_device_mode())
    }

    pub fn set(&self, mode: ActiveMode) {
        if self.lock().update(mode) {
            tracing::debug!(mode = %mode, "device appearance changed");
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<ActiveMode>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AppearanceSource for SharedAppearance {
    fn current(&self) -> ActiveMode {
        self.lock().value
    }

    fn subscribe(&self, on_change: AppearanceListener) -> Subscription {
        let id = self.lock().add(on_change);
        release_listener(Arc::downgrade(&self.inner), id)
    }
}
