//! One-shot debounced batching
//!
//! A [`DebouncedBatcher`] collects entries and fires its callback exactly once,
//! one window after the first entry arrived, with everything accumulated up to
//! that deadline. A single timer task is armed on the first `add`; the fired
//! latch is structural (the state machine moves to `Fired` and stays there),
//! so there is no race between per-entry timers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{LintError, Result};

/// Callback receiving the accumulated entries when the window closes.
pub type FireCallback<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

enum BatchState<T> {
    Idle,
    Accumulating(Vec<T>),
    Fired,
}

/// Time-windowed one-shot aggregator.
///
/// Must be used within a tokio runtime context; the window timer is a spawned
/// task. There is no cancellation: once armed, the timer runs to its deadline
/// and fires with whatever accumulated.
pub struct DebouncedBatcher<T> {
    window: Duration,
    on_fire: FireCallback<T>,
    state: Arc<Mutex<BatchState<T>>>,
}

impl<T: Send + 'static> DebouncedBatcher<T> {
    /// Create an idle batcher that will invoke `on_fire` one `window` after
    /// its first entry.
    #[must_use]
    pub fn new(window: Duration, on_fire: FireCallback<T>) -> Self {
        Self {
            window,
            on_fire,
            state: Arc::new(Mutex::new(BatchState::Idle)),
        }
    }

    /// Append an entry; the first entry arms the window timer.
    ///
    /// # Errors
    ///
    /// [`LintError::BatchClosed`] once the batch has fired. Fired batches do
    /// not reopen; route later entries to a fresh batcher.
    pub fn add(&self, entry: T) -> Result<()> {
        let mut state = lock_state(&self.state);
        match &mut *state {
            BatchState::Idle => {
                *state = BatchState::Accumulating(vec![entry]);
                drop(state);
                self.arm();
                Ok(())
            }
            BatchState::Accumulating(entries) => {
                entries.push(entry);
                Ok(())
            }
            BatchState::Fired => Err(LintError::BatchClosed),
        }
    }

    /// Whether the batch has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        matches!(&*lock_state(&self.state), BatchState::Fired)
    }

    /// Entries pending right now; empty once fired.
    #[must_use]
    pub fn pending(&self) -> usize {
        match &*lock_state(&self.state) {
            BatchState::Accumulating(entries) => entries.len(),
            _ => 0,
        }
    }

    fn arm(&self) {
        let window = self.window;
        let state = Arc::clone(&self.state);
        let on_fire = Arc::clone(&self.on_fire);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let entries = {
                let mut state = lock_state(&state);
                match std::mem::replace(&mut *state, BatchState::Fired) {
                    BatchState::Accumulating(entries) => entries,
                    // Single timer per batch, so the latch can only have been
                    // flipped by this task; firing on nothing is a no-op.
                    BatchState::Idle | BatchState::Fired => return,
                }
            };
            on_fire(entries);
        });
    }
}

fn lock_state<T>(state: &Mutex<BatchState<T>>) -> MutexGuard<'_, BatchState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
