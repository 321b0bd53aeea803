use crate::PreviewResult;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_MAX_CACHE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    #[default]
    UseCache,
    NoCache,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: PreviewResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    // Insertion order, oldest first. Eviction order, not access order.
    order: VecDeque<String>,
}

impl CacheState {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }
}

/// Bounded preview cache: FIFO eviction on insert, lazy expiry on lookup.
///
/// Cloning shares the underlying storage.
#[derive(Clone)]
pub struct PreviewCache {
    state: Arc<Mutex<CacheState>>,
    max_size: usize,
    max_age: Duration,
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl PreviewCache {
    pub fn new(max_size: usize) -> Self {
        Self::with_max_age(max_size, DEFAULT_MAX_CACHE_AGE)
    }

    pub fn with_max_age(max_size: usize, max_age: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            max_size,
            max_age,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        // A timestamp in the future yields a negative age and counts as live.
        match now.signed_duration_since(entry.timestamp).to_std() {
            Ok(age) => age >= self.max_age,
            Err(_) => false,
        }
    }

    /// Returns a copy of the live entry for `key`; an expired entry is dropped and reported absent.
    pub async fn get(&self, key: &str) -> Option<PreviewResult> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let expired = match state.entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => return Some(entry.data.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!(key = %key, "Cache entry expired");
            state.remove(key);
        }
        None
    }

    pub async fn set(&self, key: String, value: PreviewResult) {
        self.set_at(key, value, Utc::now()).await;
    }

    /// Inserts with an explicit timestamp. Overwriting a key keeps its place in the eviction order.
    pub async fn set_at(&self, key: String, value: PreviewResult, timestamp: DateTime<Utc>) {
        if self.max_size == 0 {
            return;
        }
        let mut state = self.state.lock().await;
        let entry = CacheEntry {
            data: value,
            timestamp,
        };

        if let Some(existing) = state.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        while state.entries.len() >= self.max_size {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            debug!(key = %oldest, "Evicting oldest cache entry");
            state.entries.remove(&oldest);
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, entry);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.state.lock().await.entries.contains_key(key)
    }

    /// Number of stored entries, expired ones included until they are looked up or purged.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.order.clear();
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }
}
