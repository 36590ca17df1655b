//! Latest-wins debouncing for search input

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Identifies one keystroke's worth of search input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Collapses bursts of queries so only the last one reaches the network.
///
/// Every call to [`SearchDebouncer::debounce`] supersedes the ones before it.
/// A superseded call resolves to `None` once its delay has elapsed.
#[derive(Debug)]
pub struct SearchDebouncer {
    generation: AtomicU64,
    delay: Duration,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register new input and return its ticket.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    /// Wait out the delay; yields the trimmed query only if nothing newer arrived.
    pub async fn debounce(&self, query: &str) -> Option<String> {
        let ticket = self.ticket();
        tokio::time::sleep(self.delay).await;
        if !self.is_latest(ticket) {
            log::trace!("search '{}' superseded", query);
            return None;
        }
        Some(query.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes() {
        let d = SearchDebouncer::default();
        let a = d.ticket();
        assert!(d.is_latest(a));
        let b = d.ticket();
        assert!(!d.is_latest(a));
        assert!(d.is_latest(b));
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_of_a_burst_fires() {
        let d = SearchDebouncer::default();
        let (a, b, c) = tokio::join!(d.debounce("c"), d.debounce("ca"), d.debounce(" cat "));
        assert_eq!(a, None);
        assert_eq!(b, None);
        assert_eq!(c.as_deref(), Some("cat"));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_queries_both_fire() {
        let d = SearchDebouncer::new(Duration::from_millis(100));
        assert_eq!(d.debounce("dog").await.as_deref(), Some("dog"));
        assert_eq!(d.debounce("cat").await.as_deref(), Some("cat"));
    }
}
