//! Generic debounce with configurable leading-edge behavior.
//!
//! A [`DeferredExecutor`] coalesces rapid trigger calls into at most one
//! immediate (leading) invocation plus one trailing invocation carrying the
//! last call's arguments. It is an explicit Idle/Pending state machine with a
//! single replaceable timer slot: a new trigger always supersedes the pending
//! one, and supersession is generation-checked rather than relying on
//! cancellation timing.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Shared debounce state. Cloning is cheap and clones share one timer slot,
/// so a handle can be passed around freely without changing semantics.
pub struct DeferredExecutor<T: Send + 'static> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    callback: Box<dyn Fn(T) + Send + Sync>,
    delay: Duration,
    call_on_first: bool,
    state: Mutex<ExecState>,
}

/// Idle when `pending` is `None`; Pending while a timer is armed.
#[derive(Default)]
struct ExecState {
    /// Bumped on every trigger and cancel; a scheduled task only acts if the
    /// generation it was armed with is still current.
    generation: u64,
    pending: Option<CancellationToken>,
}

impl<T: Send + 'static> DeferredExecutor<T> {
    /// Debounce with the leading edge enabled: the first trigger while idle
    /// fires immediately, a burst then adds one trailing call.
    pub fn new(delay: Duration, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::build(delay, true, callback)
    }

    /// Debounce with the leading edge disabled: every burst produces exactly
    /// one call, `delay` after the last trigger.
    pub fn trailing_only(delay: Duration, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::build(delay, false, callback)
    }

    fn build(
        delay: Duration,
        call_on_first: bool,
        callback: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                callback: Box::new(callback),
                delay,
                call_on_first,
                state: Mutex::new(ExecState::default()),
            }),
        }
    }

    /// Request an invocation with `args`.
    ///
    /// Cancels any pending scheduled call, fires the callback synchronously
    /// when this is a first invocation since idle (and the leading edge is
    /// enabled), and re-arms the timer for the trailing call. Must be called
    /// from within a tokio runtime.
    pub fn trigger(&self, args: T) {
        let leading_args = {
            let mut state = self.lock_state();
            state.generation = state.generation.wrapping_add(1);
            let generation = state.generation;

            let first = state.pending.is_none() && self.inner.call_on_first;
            if let Some(previous) = state.pending.take() {
                previous.cancel();
            }

            let token = CancellationToken::new();
            state.pending = Some(token.clone());

            let (leading_args, trailing_args) = if first {
                (Some(args), None)
            } else {
                (None, Some(args))
            };

            // The task holds only a weak reference: once every handle is
            // dropped the callback can no longer fire.
            let weak = Arc::downgrade(&self.inner);
            let delay = self.inner.delay;
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                Self::fire_trailing(weak, generation, trailing_args);
            });

            leading_args
        };

        if let Some(args) = leading_args {
            (self.inner.callback)(args);
        }
    }

    /// Cancel any pending scheduled call; it will never fire.
    pub fn cancel(&self) {
        let mut state = self.lock_state();
        state.generation = state.generation.wrapping_add(1);
        if let Some(previous) = state.pending.take() {
            previous.cancel();
        }
    }

    /// `true` while a timer is armed.
    pub fn is_pending(&self) -> bool {
        self.lock_state().pending.is_some()
    }

    fn lock_state(&self) -> MutexGuard<'_, ExecState> {
        self.inner
            .state
            .lock()
            .expect("deferred executor state lock poisoned")
    }

    /// Timer expiry path: clear the pending marker and fire the trailing
    /// call unless this arm was superseded in the meantime.
    fn fire_trailing(weak: Weak<Inner<T>>, generation: u64, trailing_args: Option<T>) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        {
            let mut state = inner
                .state
                .lock()
                .expect("deferred executor state lock poisoned");
            if state.generation != generation {
                return;
            }
            state.pending = None;
        }
        // None here means the leading call already carried these arguments.
        if let Some(args) = trailing_args {
            (inner.callback)(args);
        }
    }
}

impl<T: Send + 'static> Clone for DeferredExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        // Wake any armed timer task so it can observe the teardown.
        if let Ok(state) = self.state.get_mut() {
            if let Some(pending) = state.pending.take() {
                pending.cancel();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
