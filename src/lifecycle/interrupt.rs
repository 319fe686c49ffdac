//! Cooperative interruption.
//!
//! Every thread owns an [`InterruptFlag`]. Another thread holding a clone of
//! the handle may set it; long-running work polls it with
//! [`check_interrupted`] and bails out.
//!
//! Checking never clears the flag. Use [`InterruptFlag::clear`] or
//! [`InterruptFlag::take`] to reset it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

thread_local! {
    static CURRENT: InterruptFlag = InterruptFlag::new();
}

/// Raised when the current thread has been asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unexpected interrupt")]
pub struct Interrupted;

/// Shared handle to a thread's interruption flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// A fresh, unset flag not tied to any thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// The calling thread's flag.
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    /// Request interruption.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// Fail with [`Interrupted`] if the flag is set. Leaves the flag as is.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_interrupted() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Fail with [`Interrupted`] if the calling thread's flag is set.
pub fn check_interrupted() -> Result<(), Interrupted> {
    CURRENT.with(InterruptFlag::check)
}
