//! Bounded response cache
//!
//! Entries are kept under a normalized key and evicted least-recently-used
//! first once the capacity is reached. Extra keys can be registered as aliases
//! of an existing entry, which is how a pokemon fetched by name and by id ends
//! up sharing a single entry.

use std::collections::HashMap;

pub const DEFAULT_CAPACITY: usize = 512;

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    last_used: u64,
}

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub aliases: usize,
}

#[derive(Debug)]
pub struct ResponseCache<V> {
    capacity: usize,
    entries: HashMap<String, CacheEntry<V>>,
    aliases: HashMap<String, String>,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Normalize a request URL into a cache key.
///
/// The base URL and surrounding slashes are stripped and the path is
/// lowercased; a query string is kept verbatim.
pub fn normalize_key(base_url: &str, url: &str) -> String {
    let rest = url.strip_prefix(base_url.trim_end_matches('/')).unwrap_or(url);
    match rest.split_once('?') {
        Some((path, query)) => format!("{}?{}", path.trim_matches('/').to_lowercase(), query),
        None => rest.trim_matches('/').to_lowercase(),
    }
}

impl<V> ResponseCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            aliases: HashMap::new(),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.get(key).map(String::as_str).unwrap_or(key)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(self.resolve(key))
    }

    /// Store `value` under `key`, evicting the least recently used entry if full
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        self.aliases.remove(&key);
        let last_used = self.tick();
        self.entries.insert(key, CacheEntry { value, last_used });

        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    /// Make `alias` resolve to the entry stored under `canonical`.
    ///
    /// Returns false (and registers nothing) when `canonical` is not cached.
    pub fn alias(&mut self, alias: impl Into<String>, canonical: &str) -> bool {
        let alias = alias.into();
        let canonical = self.resolve(canonical).to_string();
        if !self.entries.contains_key(&canonical) {
            return false;
        }
        if alias == canonical {
            return true;
        }
        // An alias shadows any standalone entry with the same key
        self.entries.remove(&alias);
        self.aliases.insert(alias, canonical);
        true
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.aliases.retain(|_, target| *target != key);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            aliases: self.aliases.len(),
        }
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Look up `key` (or the entry it aliases), marking it as recently used
    pub fn get(&mut self, key: &str) -> Option<V> {
        let canonical = self.resolve(key).to_string();
        let now = self.tick();

        match self.entries.get_mut(&canonical) {
            Some(entry) => {
                entry.last_used = now;
                self.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }
}
