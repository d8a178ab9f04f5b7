//! Runtime support for stores.
//!
//! This module holds the notification-pass machinery shared by every
//! [`Store`](crate::Store): listener snapshots, panic handling, and the
//! bookkeeping that decides how reentrant `set` calls are scheduled.

mod dispatch;

pub(crate) use dispatch::{deliver, invoke, Dispatch, Listener};
