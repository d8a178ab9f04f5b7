use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::store::{PanicPolicy, SubscriptionId};

/// A registered listener. Shared so a pass can hold its own snapshot.
pub(crate) type Listener<T> = Rc<dyn Fn(&T)>;

/// Handed out when a pass starts; returned when it finishes or unwinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PassTicket {
    generation: u64,
    /// Latest live generation before this pass began.
    previous: u64,
}

impl PassTicket {
    pub(crate) fn generation(self) -> u64 {
        self.generation
    }
}

/// Notification-pass bookkeeping for a single store.
pub(crate) struct Dispatch<T> {
    /// Number of passes currently on the stack.
    depth: usize,
    /// Bumped at the start of every pass; never reused.
    started: u64,
    /// Generation of the most recently started pass that has not unwound.
    latest: u64,
    /// Values waiting for the running pass to finish (queued reentrancy only).
    pending: VecDeque<T>,
}

impl<T> Dispatch<T> {
    pub(crate) fn new() -> Self {
        Self {
            depth: 0,
            started: 0,
            latest: 0,
            pending: VecDeque::new(),
        }
    }

    pub(crate) fn is_dispatching(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a pass.
    pub(crate) fn begin(&mut self) -> PassTicket {
        self.depth += 1;
        self.started += 1;
        let ticket = PassTicket {
            generation: self.started,
            previous: self.latest,
        };
        self.latest = ticket.generation;
        ticket
    }

    /// Leave a pass normally. Returns whether the pass may commit its value,
    /// i.e. no other surviving pass started after it.
    pub(crate) fn finish(&mut self, ticket: PassTicket) -> bool {
        self.depth -= 1;
        ticket.generation == self.latest
    }

    /// Leave a pass that is unwinding. An unwound pass never commits, so its
    /// claim on being the latest pass is handed back to whatever preceded it.
    /// Once the outermost pass is gone the queued values are returned so the
    /// caller can drop them outside any borrow.
    pub(crate) fn abort(&mut self, ticket: PassTicket) -> VecDeque<T> {
        self.depth -= 1;
        if self.latest == ticket.generation {
            self.latest = ticket.previous;
        }
        if self.depth == 0 {
            std::mem::take(&mut self.pending)
        } else {
            VecDeque::new()
        }
    }

    pub(crate) fn enqueue(&mut self, value: T) {
        self.pending.push_back(value);
    }

    pub(crate) fn dequeue(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Call every listener of a snapshot, in order, with `value`.
pub(crate) fn deliver<T>(
    listeners: &[(SubscriptionId, Listener<T>)],
    value: &T,
    panics: PanicPolicy,
    store: &'static str,
) {
    for (id, listener) in listeners {
        invoke(*id, listener.as_ref(), value, panics, store);
    }
}

/// Call one listener, applying the store's panic policy.
pub(crate) fn invoke<T>(
    id: SubscriptionId,
    listener: &dyn Fn(&T),
    value: &T,
    panics: PanicPolicy,
    store: &'static str,
) {
    match panics {
        PanicPolicy::Propagate => listener(value),
        PanicPolicy::Isolate => {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(value))) {
                tracing::error!(
                    store,
                    subscription = %id,
                    panic = panic_message(payload.as_ref()),
                    "listener panicked; continuing notification pass"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
