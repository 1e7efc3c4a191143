//! Per-call operation context.
//!
//! # Responsibility
//! - Carry cooperative cancellation and an optional deadline through managers.
//!
//! # Invariants
//! - Managers never inspect the context; they forward it to hooks and
//!   repositories, which decide when to call [`OpContext::check`].
//! - Cancellation is shared by every clone of a context.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a context stopped permitting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// [`CancelHandle::cancel`] was called.
    Cancelled,
    /// An absolute deadline set with [`OpContext::with_deadline`] passed.
    DeadlineExceeded,
    /// A relative timeout set with [`OpContext::with_timeout`] elapsed.
    TimedOut,
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::DeadlineExceeded => write!(f, "operation deadline exceeded"),
            Self::TimedOut => write!(f, "operation timed out"),
        }
    }
}

impl Error for ContextError {}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    from_timeout: bool,
}

/// Context value threaded through every manager, hook and repository call.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Deadline>,
}

/// Handle that cancels every clone of the context it was taken from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl OpContext {
    /// Creates a context without deadline that is never cancelled on its own.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a copy that fails with [`ContextError::DeadlineExceeded`] after `at`.
    pub fn with_deadline(&self, at: Instant) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(Deadline {
                at,
                from_timeout: false,
            }),
        }
    }

    /// Returns a copy that fails with [`ContextError::TimedOut`] once `timeout` elapses.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(Deadline {
                at: Instant::now() + timeout,
                from_timeout: true,
            }),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.map(|deadline| deadline.at)
    }

    /// Returns `Err` once the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline.at => Err(if deadline.from_timeout {
                ContextError::TimedOut
            } else {
                ContextError::DeadlineExceeded
            }),
            _ => Ok(()),
        }
    }
}
