//! Cancellation handle for running shortcuts.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// A cloneable cancellation signal, optionally bounded by a deadline.
///
/// Clones share one token. Contexts derived with [`Context::with_timeout`]
/// follow their parent but cancelling them leaves the parent running.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is only cancelled by an explicit [`Context::cancel`].
    pub fn background() -> Self {
        Self::default()
    }

    /// A child context that also expires after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            token: self.token.child_token(),
            deadline: Some(self.deadline.map_or(deadline, |own| own.min(deadline))),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
