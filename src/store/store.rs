use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use super::options::{Reentrancy, StoreOptions};
use super::subscription::{Registry, Subscription, SubscriptionId, Unsubscribe};
use crate::runtime::{self, Dispatch, Listener};

struct StoreInner<T> {
    value: T,
    version: u64,
    next_id: u64,
    /// Active listeners; ids grow monotonically, so key order is
    /// registration order.
    listeners: BTreeMap<SubscriptionId, Listener<T>>,
    dispatch: Dispatch<T>,
    options: StoreOptions,
}

impl<T> StoreInner<T> {
    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn label(&self) -> &'static str {
        self.options.label()
    }

    fn snapshot(&self) -> Vec<(SubscriptionId, Listener<T>)> {
        self.listeners
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect()
    }
}

impl<T> Registry for RefCell<StoreInner<T>> {
    fn unregister(&self, id: SubscriptionId) -> bool {
        // Bind the removed listener so it is dropped after the borrow ends;
        // its captures may touch this store again.
        let (removed, store) = {
            let mut inner = self.borrow_mut();
            (inner.listeners.remove(&id), inner.label())
        };
        if removed.is_some() {
            tracing::trace!(store, subscription = %id, "unsubscribed");
        }
        removed.is_some()
    }

    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.borrow().listeners.contains_key(&id)
    }
}

/// An observable single-value store.
///
/// Every listener registered with [`subscribe`](Self::subscribe) is called
/// once with the current value right away, then again on every
/// [`set`](Self::set), in registration order, on the calling thread.
/// There is no equality check: setting an unchanged value still notifies.
///
/// Cloning a `Store` creates a new handle to the **same** state. The store is
/// single-threaded (`!Send`, `!Sync`); share it across threads only behind
/// your own synchronization, by moving the value rather than the store.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use watchbox::Store;
///
/// let store = Store::new(0);
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let unsubscribe = store.subscribe({
///     let seen = Rc::clone(&seen);
///     move |value: &i32| seen.borrow_mut().push(*value)
/// });
///
/// store.set(5);
/// store.update(|n| n + 1);
/// unsubscribe.unsubscribe();
/// store.set(100);
///
/// assert_eq!(*seen.borrow(), vec![0, 5, 6]);
/// ```
pub struct Store<T> {
    inner: Rc<RefCell<StoreInner<T>>>,
}

impl<T: Clone + 'static> Store<T> {
    /// Create a new store with the given initial value.
    pub fn new(initial: T) -> Self {
        Self::with_options(initial, StoreOptions::default())
    }

    /// Create a new store with explicit [`StoreOptions`].
    pub fn with_options(initial: T, options: StoreOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                value: initial,
                version: 0,
                next_id: 0,
                listeners: BTreeMap::new(),
                dispatch: Dispatch::new(),
                options,
            })),
        }
    }

    /// Register a listener.
    ///
    /// The listener is called with the current value before this method
    /// returns, and then on every subsequent `set` until the returned handle
    /// is used to cancel it.
    ///
    /// # Panics
    ///
    /// With [`PanicPolicy::Propagate`](super::PanicPolicy::Propagate), a panic
    /// in the initial call unwinds out of `subscribe`. The listener remains
    /// registered in that case.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T) + 'static,
    {
        let listener: Listener<T> = Rc::new(listener);
        let (id, current, options) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.allocate_id();
            inner.listeners.insert(id, Rc::clone(&listener));
            (id, inner.value.clone(), inner.options)
        };
        let store = options.label();
        tracing::trace!(store, subscription = %id, "subscribed");

        let registry: Weak<dyn Registry> = Rc::downgrade(&self.inner) as Weak<dyn Registry>;
        let handle = Unsubscribe::new(id, registry);
        runtime::invoke(id, listener.as_ref(), &current, options.panics, store);
        handle
    }

    /// Like [`subscribe`](Self::subscribe), but the subscription is cancelled
    /// when the returned guard is dropped.
    pub fn subscribe_guarded<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        self.subscribe(listener).guard()
    }

    /// Replace the value and notify every active listener.
    ///
    /// Listeners receive the new value as their argument; the store itself
    /// only holds the new value once the pass has finished, so
    /// [`get`](Self::get) from inside a listener still returns the previous
    /// one.
    ///
    /// A `set` issued from inside a listener is scheduled according to
    /// [`StoreOptions::reentrancy`].
    pub fn set(&self, value: T) {
        let (value, reentrancy) = {
            let mut inner = self.inner.borrow_mut();
            let reentrancy = inner.options.reentrancy;
            if reentrancy == Reentrancy::Queued && inner.dispatch.is_dispatching() {
                inner.dispatch.enqueue(value);
                tracing::debug!(
                    store = inner.label(),
                    pending = inner.dispatch.pending_len(),
                    "set during notification pass queued"
                );
                return;
            }
            (value, reentrancy)
        };

        self.run_pass(value);

        if reentrancy == Reentrancy::Queued {
            while let Some(next) = self.next_queued() {
                self.run_pass(next);
            }
        }
    }

    /// Replace the value with `transform(current)`.
    ///
    /// Equivalent to `self.set(transform(&self.get()))`. A panic inside
    /// `transform` propagates and leaves the store untouched.
    pub fn update<F>(&self, transform: F)
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.get();
        self.set(transform(&current));
    }

    /// Mutate a copy of the current value in place, then `set` it.
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the value by reference without cloning.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls a mutating method on the same store.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let inner = self.inner.borrow();
        f(&inner.value)
    }

    /// Number of committed `set` operations.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// The options this store was created with.
    pub fn options(&self) -> StoreOptions {
        self.inner.borrow().options
    }

    /// Deliver `value` to a snapshot of the listeners, then commit it.
    fn run_pass(&self, value: T) {
        let (listeners, ticket, options, depth) = {
            let mut inner = self.inner.borrow_mut();
            let ticket = inner.dispatch.begin();
            (
                inner.snapshot(),
                ticket,
                inner.options,
                inner.dispatch.depth(),
            )
        };
        let store = options.label();
        tracing::trace!(
            store,
            listeners = listeners.len(),
            depth,
            generation = ticket.generation(),
            "notification pass"
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            runtime::deliver(&listeners, &value, options.panics, store);
        }));
        drop(listeners);

        if let Err(payload) = result {
            let discarded = self.inner.borrow_mut().dispatch.abort(ticket);
            if !discarded.is_empty() {
                tracing::debug!(
                    store,
                    discarded = discarded.len(),
                    "dropping queued values after listener panic"
                );
            }
            drop(discarded);
            panic::resume_unwind(payload);
        }

        let replaced = {
            let mut inner = self.inner.borrow_mut();
            if inner.dispatch.finish(ticket) {
                inner.version += 1;
                Some(std::mem::replace(&mut inner.value, value))
            } else {
                None
            }
        };
        drop(replaced);
    }

    fn next_queued(&self) -> Option<T> {
        self.inner.borrow_mut().dispatch.dequeue()
    }
}

impl<T: Clone + Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.listeners.len())
            .field("options", &inner.options)
            .finish()
    }
}

/// Create a new store holding `initial`.
///
/// # Example
///
/// ```
/// use watchbox::create_store;
///
/// let store = create_store("draft".to_string());
/// store.set("published".to_string());
/// assert_eq!(store.get(), "published");
/// ```
pub fn create_store<T: Clone + 'static>(initial: T) -> Store<T> {
    Store::new(initial)
}
