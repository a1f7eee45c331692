//! Auth-state change notifications.
//!
//! The auth middleware publishes an [`AuthEvent`] for every verification
//! attempt; interested parties register a callback with
//! [`AuthEvents::subscribe`] and stop listening by dropping (or calling
//! [`Subscription::unsubscribe`] on) the returned handle.
//!
//! ```ignore
//! let events = AuthEvents::new();
//! let _audit = events.subscribe(|event| AuditEvent::from(event).log());
//! ```

use super::verifier::AuthUser;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A change in the caller's authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A token was verified for `user`
    SignedIn {
        user: AuthUser,
        ip: Option<String>,
    },
    /// A token was presented but rejected
    Rejected {
        reason: String,
        ip: Option<String>,
    },
}

type Callback = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    callbacks: Mutex<BTreeMap<u64, Callback>>,
}

impl Listeners {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, Callback>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of auth-change callbacks. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct AuthEvents {
    inner: Arc<Listeners>,
}

impl AuthEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every subsequent event.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().insert(id, Arc::new(callback));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every current subscriber in registration order.
    pub fn publish(&self, event: &AuthEvent) {
        // Snapshot first so callbacks may subscribe or unsubscribe re-entrantly
        let callbacks: Vec<Callback> = self.inner.lock().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().len()
    }
}

impl std::fmt::Debug for AuthEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`AuthEvents::subscribe`]; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the callback registered for the lifetime of the registry.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().remove(&self.id);
        }
    }
}
