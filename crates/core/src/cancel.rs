use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag between the UI thread and the active worker.
///
/// Created once at startup, cleared at the start of each job, set on a
/// user stop request, and read at every checkpoint capable of stopping.
/// All operations are idempotent and non-blocking.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_starts_unset() {
        assert!(!CancelToken::new().is_set());
    }

    #[test]
    fn test_set_and_clear_are_idempotent() {
        let token = CancelToken::new();
        token.set();
        token.set();
        assert!(token.is_set());
        token.clear();
        token.clear();
        assert!(!token.is_set());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        token.set();
        assert!(other.is_set());
    }

    #[test]
    fn test_visible_across_threads() {
        let token = CancelToken::new();
        let worker_token = token.clone();
        let handle = thread::spawn(move || {
            while !worker_token.is_set() {
                thread::yield_now();
            }
            true
        });
        token.set();
        assert!(handle.join().unwrap());
    }
}
