//! Time-boxed cache for slowly changing reference lists.

use std::sync::RwLock;
use std::time::{Duration, Instant};

/// A single value that expires after `ttl`. Concurrent refreshes are not coordinated;
/// the last writer wins.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    slot: RwLock<Option<(Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<V> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    pub fn insert(&self, value: V) {
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some((Instant::now(), value));
    }

    pub fn clear(&self) {
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}
