//! In-process key/value cache
//!
//! String keys and values with optional per-key expiry, shared behind an
//! `Arc` by rate limiting and feature switches. Expired entries are dropped
//! lazily on access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Cheap to clone; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }
        None
    }

    pub fn set(&self, key: &str, value: impl Into<String>, ttl: Option<Duration>) {
        self.entries
            .insert(key.to_string(), Entry::new(value.into(), ttl));
    }

    /// Increment a counter and return the new value.
    ///
    /// A missing, expired or non-numeric key starts at 1 with `ttl`; an
    /// existing counter keeps its original expiry.
    pub fn incr(&self, key: &str, ttl: Option<Duration>) -> u64 {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let current = if entry.is_expired(now) {
                    None
                } else {
                    entry.value.parse::<u64>().ok()
                };
                match current {
                    Some(n) => {
                        let next = n.saturating_add(1);
                        entry.value = next.to_string();
                        next
                    }
                    None => {
                        *entry = Entry::new("1".to_string(), ttl);
                        1
                    }
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new("1".to_string(), ttl));
                1
            }
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.retain(|_, e| !e.is_expired(now));
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache.set("greeting", "hello", None);
        assert_eq!(cache.get("greeting").as_deref(), Some("hello"));

        assert!(cache.delete("greeting"));
        assert!(!cache.delete("greeting"));
        assert_eq!(cache.get("greeting"), None);
    }

    #[test]
    fn test_expired_entries_vanish() {
        let cache = MemoryCache::new();
        cache.set("short", "lived", Some(Duration::ZERO));
        cache.set("long", "lived", Some(Duration::from_secs(60)));

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long").as_deref(), Some("lived"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_incr() {
        let cache = MemoryCache::new();
        assert_eq!(cache.incr("hits", Some(Duration::from_secs(60))), 1);
        assert_eq!(cache.incr("hits", None), 2);
        assert_eq!(cache.incr("hits", None), 3);
        assert_eq!(cache.get("hits").as_deref(), Some("3"));

        cache.set("word", "abc", None);
        assert_eq!(cache.incr("word", None), 1);
    }

    #[test]
    fn test_incr_restarts_after_expiry() {
        let cache = MemoryCache::new();
        assert_eq!(cache.incr("window", Some(Duration::ZERO)), 1);
        assert_eq!(cache.incr("window", Some(Duration::ZERO)), 1);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        other.set("k", "v", None);
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        cache.clear();
        assert!(other.is_empty());
    }
}
