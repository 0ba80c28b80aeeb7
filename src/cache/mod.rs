//! Per-subproblem kernel-value cache
//!
//! LRU cache over symmetric kernel entries, keyed by normalized (i, j) with
//! i <= j. Each solver invocation owns its cache exclusively; caches are
//! never shared across subproblems, so no synchronization is needed.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key for kernel values, normalized so that i <= j
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    i: usize,
    j: usize,
}

impl CacheKey {
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }
}

/// LRU cache for kernel matrix values
pub struct KernelCache {
    cache: LruCache<CacheKey, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a new kernel cache with capacity in number of entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a kernel cache sized from a memory budget in bytes.
    /// Assumes 16 bytes per entry (key + value + overhead).
    pub fn with_memory_limit(memory_bytes: usize) -> Self {
        Self::new((memory_bytes / 16).max(1))
    }

    /// Get a kernel value from cache
    pub fn get(&mut self, i: usize, j: usize) -> Option<f64> {
        let key = CacheKey::new(i, j);
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Put a kernel value into cache
    pub fn put(&mut self, i: usize, j: usize, value: f64) {
        self.cache.put(CacheKey::new(i, j), value);
    }

    /// Fetch a kernel value, computing and caching it on a miss
    pub fn get_or_compute<F: FnOnce() -> f64>(&mut self, i: usize, j: usize, compute: F) -> f64 {
        if let Some(value) = self.get(i, j) {
            value
        } else {
            let value = compute();
            self.put(i, j, value);
            value
        }
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalization() {
        let mut cache = KernelCache::new(4);
        cache.put(5, 1, 2.5);

        // Symmetric access hits the same entry
        assert_eq!(cache.get(1, 5), Some(2.5));
        assert_eq!(cache.get(5, 1), Some(2.5));
    }

    #[test]
    fn test_kernel_cache_basic() {
        let mut cache = KernelCache::new(3);

        assert_eq!(cache.get(0, 1), None);
        assert_eq!(cache.stats().misses, 1);

        cache.put(0, 1, 5.0);
        assert_eq!(cache.get(0, 1), Some(5.0));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_kernel_cache_lru_eviction() {
        let mut cache = KernelCache::new(2);

        cache.put(0, 1, 1.0);
        cache.put(1, 2, 2.0);
        cache.put(2, 3, 3.0); // Evicts (0,1)

        assert_eq!(cache.get(0, 1), None);
        assert_eq!(cache.get(1, 2), Some(2.0));
        assert_eq!(cache.get(2, 3), Some(3.0));
    }

    #[test]
    fn test_get_or_compute() {
        let mut cache = KernelCache::new(10);
        let mut calls = 0;

        let v1 = cache.get_or_compute(0, 1, || {
            calls += 1;
            7.0
        });
        let v2 = cache.get_or_compute(1, 0, || {
            calls += 1;
            0.0
        });

        assert_eq!(v1, 7.0);
        assert_eq!(v2, 7.0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = KernelCache::new(10);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.get(0, 1);
        cache.put(0, 1, 1.0);
        cache.get(0, 1);

        assert_eq!(cache.hit_rate(), 0.5);
    }
}
