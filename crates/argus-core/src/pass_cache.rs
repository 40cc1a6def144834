// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Content-addressed cache of expensive render-pass begin records.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// Maps an attachment configuration to a previously built begin-info
/// record, so repeated configurations skip the expensive native
/// render-pass creation.
///
/// The map is keyed by the full configuration value, not a pre-computed
/// digest: two configurations only share an entry when they compare
/// equal, so a hash collision between non-identical configurations can
/// never alias incompatible native objects. Entries are never evicted:
/// the distinct attachment configurations an application uses is small
/// and recreation costs far more than retention.
///
/// Lookups take the read lock and may run concurrently. A miss upgrades
/// to the write lock, re-checks, and only then runs the creation
/// closure, so two racing misses for one key produce exactly one entry.
/// Values are returned as `Arc` clones; the cached record itself is
/// shared, not copied.
pub struct RenderPassCache<K, V> {
    entries: RwLock<FxHashMap<K, Arc<V>>>,
}

impl<K, V> std::fmt::Debug for RenderPassCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPassCache")
            .field("len", &self.entries.read().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Clone, V> RenderPassCache<K, V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Returns the cached record for `key`, if present.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Returns the cached record for `key`, building and inserting it
    /// with `create` on a miss.
    ///
    /// The write lock is held across the re-check and the creation call,
    /// so `create` runs at most once per key even under concurrent
    /// misses. A failing `create` inserts nothing.
    pub fn get_or_create<E>(
        &self,
        key: &K,
        create: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(found) = self.get(key) {
            return Ok(found);
        }

        let mut entries = self.entries.write().unwrap();
        if let Some(found) = entries.get(key) {
            return Ok(found.clone());
        }

        let built = Arc::new(create()?);
        entries.insert(key.clone(), built.clone());
        Ok(built)
    }

    /// Returns the number of cached configurations.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Removes and returns every cached record, for device teardown.
    pub fn drain(&self) -> Vec<Arc<V>> {
        self.entries
            .write()
            .unwrap()
            .drain()
            .map(|(_, value)| value)
            .collect()
    }
}

impl<K: Hash + Eq + Clone, V> Default for RenderPassCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct TestKey {
        formats: Vec<u32>,
        samples: u32,
    }

    fn test_key(samples: u32) -> TestKey {
        TestKey {
            formats: vec![1, 2],
            samples,
        }
    }

    #[test]
    fn identical_configs_share_one_record() {
        let cache: RenderPassCache<TestKey, String> = RenderPassCache::new();
        let first = cache
            .get_or_create(&test_key(1), || Ok::<_, ()>("pass".to_string()))
            .unwrap();
        let second = cache
            .get_or_create(&test_key(1), || Ok::<_, ()>("other".to_string()))
            .unwrap();
        // Identity, not just equal value.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn differing_configs_never_share_a_record() {
        let cache: RenderPassCache<TestKey, u32> = RenderPassCache::new();
        let one_sample = cache.get_or_create(&test_key(1), || Ok::<_, ()>(1)).unwrap();
        let four_samples = cache.get_or_create(&test_key(4), || Ok::<_, ()>(4)).unwrap();
        assert!(!Arc::ptr_eq(&one_sample, &four_samples));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_creation_inserts_nothing() {
        let cache: RenderPassCache<TestKey, u32> = RenderPassCache::new();
        let result = cache.get_or_create(&test_key(1), || Err("driver refused"));
        assert_eq!(result.unwrap_err(), "driver refused");
        assert!(cache.is_empty());

        // The key stays creatable afterwards.
        assert!(cache.get_or_create(&test_key(1), || Ok::<_, ()>(7)).is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_misses_create_exactly_one_entry() {
        let cache: Arc<RenderPassCache<TestKey, u32>> = Arc::new(RenderPassCache::new());
        let creations = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let creations = creations.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_create(&test_key(2), || {
                            creations.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(2)
                        })
                        .unwrap()
                })
            })
            .collect();

        let records: Vec<Arc<u32>> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        assert_eq!(creations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        for record in &records[1..] {
            assert!(Arc::ptr_eq(&records[0], record));
        }
    }
}
