/// How a `set` issued from inside a notification pass is scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reentrancy {
    /// Run a full nested pass immediately, before the outer pass resumes.
    #[default]
    Nested,
    /// Queue the value and deliver it after the outer pass has committed.
    Queued,
}

/// What happens when a listener panics during delivery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanicPolicy {
    /// Unwind out of the triggering call. Later listeners in the pass are
    /// skipped and the value is not committed.
    #[default]
    Propagate,
    /// Catch the panic, log it, and keep notifying the remaining listeners.
    Isolate,
}

/// Behavior knobs for a [`Store`](super::Store).
///
/// The defaults reproduce the plain synchronous contract: nested reentrant
/// passes and panics that propagate to the caller.
///
/// # Examples
///
/// ```
/// use watchbox::{PanicPolicy, Reentrancy, Store, StoreOptions};
///
/// let options = StoreOptions::default()
///     .with_name("settings")
///     .with_reentrancy(Reentrancy::Queued)
///     .with_panic_policy(PanicPolicy::Isolate);
///
/// let store = Store::with_options(0u8, options);
/// assert_eq!(store.options().reentrancy, Reentrancy::Queued);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Scheduling of `set` calls made while a pass is running.
    pub reentrancy: Reentrancy,
    /// Listener panic handling.
    pub panics: PanicPolicy,
    /// Label attached to tracing events emitted by the store.
    pub name: Option<&'static str>,
}

impl StoreOptions {
    /// Set how `set` calls made during a pass are scheduled.
    #[must_use]
    pub fn with_reentrancy(mut self, reentrancy: Reentrancy) -> Self {
        self.reentrancy = reentrancy;
        self
    }

    /// Set how listener panics are handled.
    #[must_use]
    pub fn with_panic_policy(mut self, panics: PanicPolicy) -> Self {
        self.panics = panics;
        self
    }

    /// Label the store in tracing events.
    #[must_use]
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Name used in tracing events.
    pub(crate) fn label(&self) -> &'static str {
        self.name.unwrap_or("anonymous")
    }
}
