//! Progress reporting and cooperative cancellation.
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Receives progress updates from a running export and tells it when to stop.
///
/// Exporters poll [`ProgressHandle::is_cancelled`] between items. A cancelled
/// export leaves its output truncated.
pub trait ProgressHandle {
    /// Announce the number of steps the next phase will take
    fn set_maximum(&self, _maximum: usize) {}

    fn increment(&self);

    fn is_cancelled(&self) -> bool;
}

/// A handle that ignores progress and never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressHandle for NoProgress {
    fn increment(&self) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    count: AtomicUsize,
    maximum: AtomicUsize,
    cancel_after: Option<usize>,
}

/// A progress counter with a cancellation flag, shareable across threads.
///
/// Clones share the same state, so one clone may be handed to an export while
/// another cancels it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that cancels itself once `steps` increments have been counted
    pub fn cancel_after(steps: usize) -> Self {
        Self {
            state: Arc::new(TokenState {
                cancel_after: Some(steps),
                ..Default::default()
            }),
        }
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    /// The number of steps counted so far
    pub fn count(&self) -> usize {
        self.state.count.load(Ordering::SeqCst)
    }

    /// The most recently announced phase size
    pub fn maximum(&self) -> usize {
        self.state.maximum.load(Ordering::SeqCst)
    }
}

impl ProgressHandle for CancellationToken {
    fn set_maximum(&self, maximum: usize) {
        self.state.maximum.store(maximum, Ordering::SeqCst);
    }

    fn increment(&self) {
        let count = self.state.count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(limit) = self.state.cancel_after {
            if count >= limit {
                self.cancel();
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}
