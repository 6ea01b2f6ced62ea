//! Process-wide writer lock.
//!
//! Every service that reads a student, changes it and writes it back holds
//! this lock for the whole cycle. Services built by `initialize_backend`
//! share one instance, so a checkout can never interleave with a weekly
//! reset or a card being blocked.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct WriteLock {
    inner: Arc<Mutex<()>>,
}

impl WriteLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until this caller is the only writer.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        // The mutex guards no data and storage commits are single writes,
        // so a holder that panicked left nothing half-applied.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
