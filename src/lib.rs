//! # Watchbox
//!
//! A minimal observable value container for sharing state between UI
//! components.
//!
//! A [`Store<T>`] holds a single value and notifies its listeners whenever
//! the value is set:
//! - `subscribe` registers a listener and calls it right away with the
//!   current value
//! - `set` calls every active listener with the new value, in registration
//!   order, before returning
//! - `update` derives the new value from the current one
//!
//! Everything happens synchronously on the caller's thread. There is no
//! deduplication: setting an unchanged value notifies again.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use watchbox::create_store;
//!
//! let count = create_store(10);
//! let last = Rc::new(Cell::new(0));
//!
//! let _unsubscribe = count.subscribe({
//!     let last = Rc::clone(&last);
//!     move |value: &i32| last.set(*value)
//! });
//! assert_eq!(last.get(), 10);
//!
//! count.update(|n| n + 1);
//! assert_eq!(last.get(), 11);
//! ```

mod runtime;
pub mod store;

// Re-export main types for convenience
pub use store::{
    create_store, PanicPolicy, Reentrancy, Store, StoreOptions, Subscription, SubscriptionId,
    Unsubscribe,
};
