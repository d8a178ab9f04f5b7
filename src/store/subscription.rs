use std::fmt;
use std::rc::Weak;

/// Identifier of one subscription on one store.
///
/// Allocated from a per-store counter, so an id is never handed out twice
/// by the same store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Type-erased view of a store's listener table, so cancellation handles
/// do not need to carry the value type.
pub(crate) trait Registry {
    /// Remove the listener. Returns `false` if it was already gone.
    fn unregister(&self, id: SubscriptionId) -> bool;

    fn is_registered(&self, id: SubscriptionId) -> bool;
}

/// Cancellation handle returned by [`Store::subscribe`](super::Store::subscribe).
///
/// Calling [`unsubscribe`](Self::unsubscribe) removes the listener; calling
/// it again does nothing. Dropping the handle does **not** cancel the
/// subscription, use [`guard`](Self::guard) for that.
///
/// The handle only holds a weak reference to the store, so it never keeps
/// the store alive.
#[derive(Clone)]
pub struct Unsubscribe {
    id: SubscriptionId,
    registry: Weak<dyn Registry>,
}

impl Unsubscribe {
    pub(crate) fn new(id: SubscriptionId, registry: Weak<dyn Registry>) -> Self {
        Self { id, registry }
    }

    /// Id of the subscription this handle cancels.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Cancel the subscription.
    ///
    /// Returns `true` only for the call that actually removed the listener.
    /// Safe to call from inside a notification, including the listener's
    /// own; a pass that already snapshotted the listener still delivers to
    /// it once.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.unregister(self.id))
    }

    /// Whether the listener is still registered with a live store.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.is_registered(self.id))
    }

    /// Turn the handle into an RAII guard that cancels on drop.
    pub fn guard(self) -> Subscription {
        Subscription {
            handle: self,
            armed: true,
        }
    }

    /// Turn the handle into a plain zero-argument closure.
    pub fn into_fn(self) -> impl Fn() {
        move || {
            self.unsubscribe();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// RAII guard for a subscription.
///
/// Dropping the guard cancels the subscription.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    handle: Unsubscribe,
    armed: bool,
}

impl Subscription {
    /// Id of the guarded subscription.
    pub fn id(&self) -> SubscriptionId {
        self.handle.id
    }

    /// Whether the guarded listener is still registered.
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Release the guard without cancelling, handing back the plain handle.
    pub fn forget(mut self) -> Unsubscribe {
        self.armed = false;
        self.handle.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.armed {
            self.handle.unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.handle.id)
            .finish_non_exhaustive()
    }
}
