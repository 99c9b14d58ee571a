//! Feature switches
//!
//! A switch is a percentage stored in the cache under `gatekeeper:{name}`.
//! 100 means fully on, 0 (or a missing key) means off, anything between rolls
//! the feature out to a stable subset of users.

use crate::cache::MemoryCache;
use crate::crypto::sha256;

const KEY_PREFIX: &str = "gatekeeper";

#[derive(Debug, Clone)]
pub struct GateKeeper {
    cache: MemoryCache,
}

impl GateKeeper {
    pub fn new(cache: MemoryCache) -> Self {
        Self { cache }
    }

    fn key(name: &str) -> String {
        format!("{}:{}", KEY_PREFIX, name)
    }

    /// Rollout percentage, 0 for unknown switches.
    pub fn percent(&self, name: &str) -> u8 {
        self.cache
            .get(&Self::key(name))
            .and_then(|v| v.parse::<u8>().ok())
            .map(|p| p.min(100))
            .unwrap_or(0)
    }

    pub fn set_percent(&self, name: &str, percent: u8) {
        let percent = percent.min(100);
        tracing::info!(switch = %name, percent, "Feature switch updated");
        self.cache.set(&Self::key(name), percent.to_string(), None);
    }

    pub fn turn_on(&self, name: &str) {
        self.set_percent(name, 100);
    }

    pub fn turn_off(&self, name: &str) {
        self.set_percent(name, 0);
    }

    pub fn is_switch_on(&self, name: &str) -> bool {
        self.percent(name) == 100
    }

    /// Whether `user_key` falls inside the rollout of `name`.
    ///
    /// The bucket is derived from a hash of switch name and user key, so a
    /// user stays in (or out of) a rollout as long as the percentage does not
    /// shrink below their bucket.
    pub fn in_gk(&self, user_key: &str, name: &str) -> bool {
        let percent = self.percent(name);
        if percent == 0 {
            return false;
        }
        if percent >= 100 {
            return true;
        }
        bucket(user_key, name) < percent
    }
}

fn bucket(user_key: &str, name: &str) -> u8 {
    let digest = sha256(format!("{}:{}", name, user_key).as_bytes());
    let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (head % 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWITCH: &str = "switch_newsfeed_to_column_store";

    #[test]
    fn test_unknown_switch_is_off() {
        let gk = GateKeeper::new(MemoryCache::new());
        assert!(!gk.is_switch_on("never_configured"));
        assert!(!gk.in_gk("user-1", "never_configured"));
    }

    #[test]
    fn test_turn_on_and_off() {
        let gk = GateKeeper::new(MemoryCache::new());
        gk.turn_on(SWITCH);
        assert!(gk.is_switch_on(SWITCH));
        assert!(gk.in_gk("anyone", SWITCH));

        gk.turn_off(SWITCH);
        assert!(!gk.is_switch_on(SWITCH));
        assert!(!gk.in_gk("anyone", SWITCH));
    }

    #[test]
    fn test_partial_rollout_is_stable() {
        let gk = GateKeeper::new(MemoryCache::new());
        gk.set_percent(SWITCH, 50);
        assert!(!gk.is_switch_on(SWITCH));

        let inside: Vec<bool> = (0..200).map(|i| gk.in_gk(&i.to_string(), SWITCH)).collect();
        let again: Vec<bool> = (0..200).map(|i| gk.in_gk(&i.to_string(), SWITCH)).collect();
        assert_eq!(inside, again);

        let count = inside.iter().filter(|&&b| b).count();
        assert!(count > 0 && count < 200);
    }

    #[test]
    fn test_percent_is_clamped() {
        let cache = MemoryCache::new();
        let gk = GateKeeper::new(cache.clone());
        gk.set_percent(SWITCH, 250);
        assert_eq!(gk.percent(SWITCH), 100);

        cache.set("gatekeeper:garbled", "lots", None);
        assert_eq!(gk.percent("garbled"), 0);
    }

    #[test]
    fn test_clearing_cache_resets_switches() {
        let cache = MemoryCache::new();
        let gk = GateKeeper::new(cache.clone());
        gk.turn_on(SWITCH);
        cache.clear();
        assert!(!gk.is_switch_on(SWITCH));
    }
}
