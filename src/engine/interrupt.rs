//! Cancellation and deadline hook for long searches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::error::{GameError, Result};

/// Stops a search early, either on request or after a deadline.
///
/// Clones share the same cancel flag, so a handle kept by another thread
/// can stop a search in progress.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancelled: Arc<AtomicBool>,
    started: Option<Instant>,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// An interrupt that only fires when cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// An interrupt that also fires `budget` from now.
    ///
    /// A budget too large to represent as an instant means no deadline.
    pub fn with_deadline(budget: Duration) -> Self {
        let now = Instant::now();
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            started: Some(now),
            deadline: now.checked_add(budget),
        }
    }

    /// Same cancel flag, with a deadline `budget` from now (or none).
    pub fn rearm(&self, budget: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            cancelled: Arc::clone(&self.cancelled),
            started: Some(now),
            deadline: budget.and_then(|b| now.checked_add(b)),
        }
    }

    /// Request cancellation of every search sharing this flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Clear a previous cancellation.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// `Err` if the search should stop now.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            let now = Instant::now();
            if now >= deadline {
                let elapsed_secs = self
                    .started
                    .map(|s| now.duration_since(s).as_secs_f64())
                    .unwrap_or_default();
                return Err(GameError::DeadlineExceeded { elapsed_secs });
            }
        }
        Ok(())
    }
}
