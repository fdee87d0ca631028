use std::time::{Duration, Instant};

/// A cached value and when it was fetched
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, fetched_at: Instant) -> Self {
        Self { value, fetched_at }
    }

    /// Fresh while `now` is strictly inside `[fetched_at, fetched_at + window)`
    pub fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        match now.checked_duration_since(self.fetched_at) {
            Some(age) => age < window,
            // `now` earlier than the fetch: treat as just fetched
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_window() {
        let t0 = Instant::now();
        let window = Duration::from_secs(60);
        let entry = CacheEntry::new("v", t0);

        assert!(entry.is_fresh(t0, window));
        assert!(entry.is_fresh(t0 + Duration::from_secs(59), window));
        assert!(!entry.is_fresh(t0 + window, window));
        assert!(!entry.is_fresh(t0 + Duration::from_secs(3600), window));
    }
}
