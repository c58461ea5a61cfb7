//! CompletionCell: single-fill synchronization slot bridging async completion
//! to a blocking read.
//!
//! A cell is created per request, written exactly once by the dispatcher's
//! completion handler, and read by one or more waiters. Filling after every
//! waiter has given up is harmless; the value is simply dropped with the cell.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// A write-once, many-reader slot with blocking observation.
///
/// Cheaply cloneable; all clones observe the same slot. `fill()` and `wait()`
/// may race from different threads in either order without losing the value.
///
/// # Example
///
/// ```rust
/// use nebula_connect::CompletionCell;
///
/// let cell = CompletionCell::new();
/// let writer = cell.clone();
///
/// let handle = std::thread::spawn(move || writer.fill(42).unwrap());
/// assert_eq!(cell.wait(), 42);
/// handle.join().unwrap();
/// ```
pub struct CompletionCell<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    slot: Mutex<Option<T>>,
    filled: Condvar,
}

impl<T> Clone for CompletionCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for CompletionCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CompletionCell<T> {
    /// Create a new, empty cell.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(None),
                filled: Condvar::new(),
            }),
        }
    }

    // A waiter that panicked while holding the lock must not wedge the writer,
    // so poisoning is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Store the value and wake every current waiter.
    ///
    /// Returns `ApiError::DoubleCompletion` if the cell is already filled; the
    /// first value is left intact. A second fill indicates a dispatcher bug and
    /// should be logged loudly by the caller, never treated as normal.
    pub fn fill(&self, value: T) -> Result<(), ApiError> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(ApiError::DoubleCompletion);
        }
        *slot = Some(value);
        // Waiters re-check the slot under the same lock, so the store and the
        // wakeup are atomic from their point of view.
        self.inner.filled.notify_all();
        Ok(())
    }

    /// Whether the cell has been filled.
    pub fn is_filled(&self) -> bool {
        self.lock().is_some()
    }
}

impl<T: Clone> CompletionCell<T> {
    /// Block the calling thread until the cell is filled, then return the value.
    ///
    /// Returns immediately if the cell was filled before this call. Multiple
    /// threads may wait concurrently; all observe the same value.
    pub fn wait(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.as_ref() {
                return value.clone();
            }
            slot = self
                .inner
                .filled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Bounded variant of [`wait`](Self::wait).
    ///
    /// Returns `ApiError::WaitTimeout` if the cell is still empty when the
    /// timeout elapses. This does not cancel the in-flight request: a later
    /// fill succeeds and its value is discarded with the cell.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, ApiError> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.as_ref() {
                return Ok(value.clone());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ApiError::WaitTimeout { waited: timeout });
            }
            let (guard, _) = self
                .inner
                .filled
                .wait_timeout(slot, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            slot = guard;
        }
    }

    /// Non-blocking read of the value, if filled.
    pub fn try_get(&self) -> Option<T> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fill_before_wait_returns_immediately() {
        let cell = CompletionCell::new();
        cell.fill("hello".to_string()).unwrap();
        assert!(cell.is_filled());
        assert_eq!(cell.wait(), "hello");
    }

    #[test]
    fn test_wait_before_fill_blocks_until_filled() {
        let cell = CompletionCell::new();
        let writer = cell.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            writer.fill(7u32).unwrap();
        });

        let start = Instant::now();
        assert_eq!(cell.wait(), 7);
        assert!(start.elapsed() >= Duration::from_millis(40));
        handle.join().unwrap();
    }

    #[test]
    fn test_double_fill_rejected_first_value_kept() {
        let cell = CompletionCell::new();
        cell.fill(1).unwrap();
        assert!(matches!(cell.fill(2), Err(ApiError::DoubleCompletion)));
        assert_eq!(cell.wait(), 1);
    }

    #[test]
    fn test_concurrent_waiters_observe_same_value() {
        let cell = CompletionCell::new();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let observer = cell.clone();
                thread::spawn(move || observer.wait())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        cell.fill(99).unwrap();

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), 99);
        }
    }

    #[test]
    fn test_wait_timeout_expires_empty() {
        let cell: CompletionCell<u32> = CompletionCell::new();
        let result = cell.wait_timeout(Duration::from_millis(30));
        assert!(matches!(result, Err(ApiError::WaitTimeout { .. })));
    }

    #[test]
    fn test_late_fill_after_abandoned_wait_is_harmless() {
        let cell = CompletionCell::new();
        assert!(cell.wait_timeout(Duration::from_millis(10)).is_err());

        // The request "completes" after the waiter gave up.
        cell.fill(5).unwrap();
        assert_eq!(cell.try_get(), Some(5));
    }

    #[test]
    fn test_wait_timeout_returns_value_when_filled_in_time() {
        let cell = CompletionCell::new();
        let writer = cell.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.fill("fast enough".to_string()).unwrap();
        });

        let value = cell.wait_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(value, "fast enough");
        handle.join().unwrap();
    }

    #[test]
    fn test_try_get_on_empty_cell() {
        let cell: CompletionCell<u32> = CompletionCell::new();
        assert_eq!(cell.try_get(), None);
        assert!(!cell.is_filled());
    }
}
