//! The observable value store.
//!
//! A [`Store`] holds one value and calls its listeners synchronously every
//! time the value is set. Subscribing hands back an [`Unsubscribe`] handle;
//! [`StoreOptions`] selects how reentrant writes and listener panics are
//! handled.

mod options;
mod store;
mod subscription;

pub use options::{PanicPolicy, Reentrancy, StoreOptions};
pub use store::{create_store, Store};
pub use subscription::{Subscription, SubscriptionId, Unsubscribe};
