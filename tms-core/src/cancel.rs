//! Cooperative cancellation for CPU-bound planning work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Raised when a deadline passes or a [`CancelToken`] fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Shared flag that a caller flips to abort planning.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Caller-supplied deadline and/or cancellation token.
///
/// The default value never cancels.
///
/// # Examples
///
/// ```
/// use tms_core::{CancelToken, Cancellation};
///
/// let token = CancelToken::new();
/// let cancellation = Cancellation::default().with_token(token.clone());
/// assert!(cancellation.check().is_ok());
/// token.cancel();
/// assert!(cancellation.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Cancel once `timeout` has elapsed from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self::default().with_deadline(Instant::now() + timeout)
    }

    /// Attach an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Return [`Cancelled`] if the token fired or the deadline passed.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when work should stop.
    pub fn check(&self) -> Result<(), Cancelled> {
        let token_fired = self.token.as_ref().is_some_and(CancelToken::is_cancelled);
        let expired = self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        if token_fired || expired {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_never_cancels() {
        assert!(Cancellation::default().check().is_ok());
    }

    #[rstest]
    fn elapsed_deadline_cancels() {
        let cancellation = Cancellation::default().with_deadline(Instant::now());
        assert_eq!(cancellation.check(), Err(Cancelled));
    }

    #[rstest]
    fn token_clones_share_state() {
        let token = CancelToken::new();
        let cancellation = Cancellation::default().with_token(token.clone());
        token.cancel();
        assert_eq!(cancellation.check(), Err(Cancelled));
    }
}
