//! Time source for pauses and condition polling.
//!
//! Production code sleeps on the tokio timer; tests swap in
//! [`VirtualClock`], which only advances a counter.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock pauses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that returns immediately and accumulates the time it was asked to wait.
#[derive(Debug, Default)]
pub struct VirtualClock {
    elapsed_ms: AtomicU64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time slept so far.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Clock for VirtualClock {
    async fn sleep(&self, duration: Duration) {
        self.elapsed_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}

/// Polling schedule: check every `interval`, give up after `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct PollSpec {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Evaluate `predicate` until it holds or the timeout is spent.
///
/// The predicate is always evaluated at least once, and once more after
/// the final pause. Returns whether it held.
pub async fn poll_until<F, Fut>(clock: &dyn Clock, poll: PollSpec, mut predicate: F) -> bool
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = bool> + Send,
{
    let interval = poll.interval.max(Duration::from_millis(1));
    let mut waited = Duration::ZERO;

    loop {
        if predicate().await {
            return true;
        }
        if waited >= poll.timeout {
            return false;
        }
        let step = interval.min(poll.timeout - waited);
        clock.sleep(step).await;
        waited += step;
    }
}
