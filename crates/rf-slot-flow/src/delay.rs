//! Skippable delays
//!
//! Every timed wait in the win presentation goes through [`skippable_delay`],
//! which resolves as soon as a skip is requested instead of at the next
//! natural boundary.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// How a delay ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayOutcome {
    /// Full duration elapsed
    Elapsed,
    /// Skip was requested before the duration elapsed
    Skipped,
}

impl DelayOutcome {
    pub fn is_skipped(self) -> bool {
        self == Self::Skipped
    }
}

/// Latched skip flag shared between the animating task and its controllers
///
/// Once requested, the flag stays set until [`reset`](Self::reset), so a
/// skip arriving between two delays still cuts the next one short.
#[derive(Debug, Clone)]
pub struct SkipSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl SkipSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Latch the flag and wake every pending delay
    pub fn request(&self) {
        self.tx.send_replace(true);
    }

    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for SkipSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep for `duration` unless `skip` is (or becomes) requested first
pub async fn skippable_delay(duration: Duration, skip: &SkipSignal) -> DelayOutcome {
    if skip.is_requested() {
        return DelayOutcome::Skipped;
    }
    if duration.is_zero() {
        return DelayOutcome::Elapsed;
    }

    let mut rx = skip.subscribe();
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    let skipped = tokio::select! {
        _ = &mut sleep => return DelayOutcome::Elapsed,
        requested = rx.wait_for(|requested| *requested) => requested.is_ok(),
    };

    if skipped {
        DelayOutcome::Skipped
    } else {
        // Sender gone, nothing can skip any more
        sleep.await;
        DelayOutcome::Elapsed
    }
}
