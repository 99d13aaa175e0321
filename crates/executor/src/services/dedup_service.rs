use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Remembers caller-supplied idempotency keys for a fixed window so a retried
/// webhook does not submit a second order. Keys expire lazily on each call.
///
/// The map lock is never held across an await, so a plain mutex is enough and
/// a claim can be given back from `Drop`.
pub struct DedupWindow {
    window: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

/// A claimed key. Dropping it gives the key back unless [`Claim::commit`] was
/// called, so a request that is cancelled or fails before anything reached the
/// exchange can be retried with the same key.
#[must_use = "dropping a claim releases the key"]
pub struct Claim<'a> {
    window: &'a DedupWindow,
    key: Option<String>,
}

impl Claim<'_> {
    /// Keeps the key for the rest of the window. Called right before the
    /// order is sent.
    pub fn commit(mut self) {
        self.key = None;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.window.release(&key);
        }
    }
}

impl DedupWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `key` and returns a claim on it, or `None` if it was already
    /// seen within the window. Check and insert happen under one lock.
    pub fn try_claim(&self, key: &str) -> Option<Claim<'_>> {
        if !self.is_enabled() {
            return Some(Claim {
                window: self,
                key: None,
            });
        }
        let now = Instant::now();
        let mut seen = self.entries();
        seen.retain(|_, at| now.duration_since(*at) < self.window);

        if seen.contains_key(key) {
            return None;
        }
        seen.insert(key.to_string(), now);
        Some(Claim {
            window: self,
            key: Some(key.to_string()),
        })
    }

    fn release(&self, key: &str) {
        self.entries().remove(key);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_within_window_is_rejected() {
        let window = DedupWindow::new(Duration::from_secs(60));
        window.try_claim("sig-1").unwrap().commit();
        assert!(window.try_claim("sig-1").is_none());
        assert!(window.try_claim("sig-2").is_some());
    }

    #[test]
    fn dropped_claim_can_be_claimed_again() {
        let window = DedupWindow::new(Duration::from_secs(60));
        let claim = window.try_claim("sig-1").unwrap();
        assert!(window.try_claim("sig-1").is_none());
        drop(claim);
        assert_eq!(window.len(), 0);
        assert!(window.try_claim("sig-1").is_some());
    }

    #[tokio::test]
    async fn expired_keys_are_pruned() {
        let window = DedupWindow::new(Duration::from_millis(20));
        window.try_claim("sig-1").unwrap().commit();
        tokio::time::sleep(Duration::from_millis(40)).await;
        window.try_claim("sig-1").unwrap().commit();
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn zero_window_disables_dedup() {
        let window = DedupWindow::new(Duration::ZERO);
        window.try_claim("sig-1").unwrap().commit();
        window.try_claim("sig-1").unwrap().commit();
        assert_eq!(window.len(), 0);
    }
}
