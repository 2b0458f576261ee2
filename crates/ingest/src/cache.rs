//! Bounded LRU cache of dispatcher results.

use std::num::NonZeroUsize;

use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::chunker::{ChunkOutcome, DocType};

type CacheKey = [u8; 32];

/// LRU cache mapping `(doc_type, text)` digests to chunking outcomes.
///
/// Owned by the caller; share it behind a `tokio::sync::Mutex` when several
/// tasks chunk concurrently.
pub struct ChunkCache {
    cache: LruCache<CacheKey, ChunkOutcome>,
    hits: u64,
    misses: u64,
}

impl ChunkCache {
    /// A zero `capacity` is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_config(config: &chunkwise_core::config::CacheConfig) -> Self {
        Self::new(config.capacity)
    }

    fn key(text: &str, doc_type: DocType) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(doc_type.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&hasher.finalize());
        key
    }

    /// Look up the outcome cached for `text` chunked as `doc_type`.
    pub fn get(&mut self, text: &str, doc_type: DocType) -> Option<ChunkOutcome> {
        let key = Self::key(text, doc_type);
        if let Some(outcome) = self.cache.get(&key) {
            self.hits += 1;
            Some(outcome.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    pub fn put(&mut self, text: &str, doc_type: DocType, outcome: ChunkOutcome) {
        let key = Self::key(text, doc_type);
        self.cache.put(key, outcome);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Strategy;

    fn outcome(chunk: &str) -> ChunkOutcome {
        ChunkOutcome::new(vec![chunk.to_string()], DocType::Mixed, Strategy::Recursive)
    }

    #[test]
    fn cache_hit_and_miss() {
        let mut cache = ChunkCache::new(100);

        assert!(cache.get("hello", DocType::Auto).is_none());
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);

        cache.put("hello", DocType::Auto, outcome("hello"));
        let cached = cache.get("hello", DocType::Auto).unwrap();
        assert_eq!(cached.chunks, vec!["hello"]);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn doc_type_is_part_of_the_key() {
        let mut cache = ChunkCache::new(10);
        cache.put("same text", DocType::Structured, outcome("a"));
        assert!(cache.get("same text", DocType::Mixed).is_none());
        assert!(cache.get("same text", DocType::Structured).is_some());
    }

    #[test]
    fn cache_eviction() {
        let mut cache = ChunkCache::new(2);

        cache.put("a", DocType::Auto, outcome("a"));
        cache.put("b", DocType::Auto, outcome("b"));
        cache.put("c", DocType::Auto, outcome("c")); // evicts "a"

        assert!(cache.get("a", DocType::Auto).is_none());
        assert!(cache.get("b", DocType::Auto).is_some());
        assert!(cache.get("c", DocType::Auto).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_holds_one_entry() {
        let mut cache = ChunkCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put("x", DocType::Auto, outcome("x"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn hit_rate_calculation() {
        let mut cache = ChunkCache::new(100);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.put("x", DocType::Auto, outcome("x"));
        cache.get("x", DocType::Auto); // hit
        cache.get("y", DocType::Auto); // miss
        assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
