//! Input debouncing.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Coalesces bursts of calls: only the last call within the window runs.
///
/// Each call takes a ticket, waits out the delay, and runs only if no newer
/// call took a ticket in the meantime.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    ticket: Arc<AtomicU64>,
}

impl Debouncer {
    /// Debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `f` after the quiet period unless superseded. Returns `None` when
    /// a newer call took over.
    pub async fn run<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.ticket.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(f().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));

        let first = debouncer.run(|| async { "first" });
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debouncer.run(|| async { "second" }).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, None);
        assert_eq!(second, Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_both_run() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        assert_eq!(debouncer.run(|| async { 1 }).await, Some(1));
        assert_eq!(debouncer.run(|| async { 2 }).await, Some(2));
    }
}
