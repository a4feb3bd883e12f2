//! Identity module
//!
//! Monotonic id generation for sessions and game objects. One generator
//! is instantiated per entity kind and injected wherever ids are minted;
//! there is no process-wide singleton.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique session identifier
pub type SessionId = u64;

/// Unique game object identifier
pub type ObjectId = u64;

/// Monotonically increasing id source.
///
/// Safe to share across threads: a single atomic fetch-add guarantees
/// that concurrently minted ids are pairwise distinct and that no id is
/// ever skipped and reused.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator starting at 0
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Take the next id
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }

    #[test]
    fn test_generators_are_independent() {
        let sessions = IdGenerator::new();
        let objects = IdGenerator::new();
        assert_eq!(sessions.next_id(), 0);
        assert_eq!(objects.next_id(), 0);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(IdGenerator::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..1000).map(|_| ids.next_id()).collect::<Vec<_>>()
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
    }
}
