use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{FloorpathError, Result};

/// Cooperative cancellation flag shared between the caller and a search.
///
/// Clones share the same flag. Searches poll it between rooms, transit
/// pairs, clusters and search iterations, and unwind with
/// [`FloorpathError::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every search holding a clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(FloorpathError::Cancelled)` if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`FloorpathError::Cancelled`] once the token is cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(FloorpathError::Cancelled)
        } else {
            Ok(())
        }
    }
}
