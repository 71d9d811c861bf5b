use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Hands out job tokens `0..total`, each to exactly one caller.
///
/// Shared by all workers behind an `Arc`. Once the cancellation token fires no
/// further tokens are issued; tokens already claimed are unaffected.
pub struct JobSource {
    total: u64,
    next: AtomicU64,
    cancel: CancellationToken,
}

impl JobSource {
    pub fn new(total: u64, cancel: CancellationToken) -> Self {
        Self {
            total,
            next: AtomicU64::new(0),
            cancel,
        }
    }

    /// Claim the next job token, or `None` when the source is exhausted or
    /// cancelled.
    pub fn claim(&self) -> Option<u64> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.total).then_some(n + 1)
            })
            .ok()
    }

    /// Number of tokens handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Acquire)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
