// src/mirror/limiter.rs
// =============================================================================
// Bounds how many network fetches are in flight at once.
//
// A slot is held only for the duration of the fetch itself. Parsing,
// rewriting, writing and waiting on child tasks all happen after the slot is
// dropped; otherwise N parents waiting on their own children could hold every
// slot and the run would never finish.
// =============================================================================

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::PageError;

#[derive(Debug)]
pub struct Limiter {
    slots: Semaphore,
    capacity: usize,
}

/// An acquired slot. Dropping it frees the slot.
pub type Slot<'a> = SemaphorePermit<'a>;

impl Limiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Semaphore::new(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits for a free slot.
    pub async fn acquire(&self) -> Result<Slot<'_>, PageError> {
        self.slots
            .acquire()
            .await
            .map_err(|_| PageError::Internal("concurrency limiter closed".to_string()))
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}
