//! Persistent hash map whose values are lattice elements.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};

/// A lattice element with a least-upper-bound operation.
pub trait Join {
    /// The least upper bound of `self` and `other`.
    fn join(&self, other: &Self) -> Self;
}

/// An immutable map whose values can be joined. Operations that would
/// mutate return a new map instead; unchanged maps share their storage.
pub struct PersistentMap<K, V> {
    inner: Arc<FxHashMap<K, V>>,
}

impl<K, V> PersistentMap<K, V> {
    /// The empty map.
    pub fn empty() -> Self {
        PersistentMap {
            inner: Arc::new(FxHashMap::default()),
        }
    }

    pub fn size(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> PersistentMap<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns a map with the given binding added or replaced.
    pub fn put(&self, key: K, value: V) -> Self {
        let mut map = (*self.inner).clone();
        map.insert(key, value);
        PersistentMap {
            inner: Arc::new(map),
        }
    }

    /// Returns a map without the given key.
    pub fn remove(&self, key: &K) -> Self {
        if !self.inner.contains_key(key) {
            return self.clone();
        }
        let mut map = (*self.inner).clone();
        map.remove(key);
        PersistentMap {
            inner: Arc::new(map),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone + Join> PersistentMap<K, V> {
    /// Inserts if absent, otherwise replaces the existing value with the
    /// join of the existing value and the given one.
    pub fn weak_update(&self, key: K, value: V) -> Self {
        let mut map = (*self.inner).clone();
        match map.get(&key) {
            Some(existing) => {
                let joined = existing.join(&value);
                map.insert(key, joined);
            }
            None => {
                map.insert(key, value);
            }
        }
        PersistentMap {
            inner: Arc::new(map),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone + Join> Join for PersistentMap<K, V> {
    /// Per-key join over the union of the key sets.
    fn join(&self, other: &Self) -> Self {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return self.clone();
        }
        let mut map = (*self.inner).clone();
        for (key, value) in other.inner.iter() {
            match map.get(key) {
                Some(existing) => {
                    let joined = existing.join(value);
                    map.insert(key.clone(), joined);
                }
                None => {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
        PersistentMap {
            inner: Arc::new(map),
        }
    }
}

impl<K, V> Clone for PersistentMap<K, V> {
    fn clone(&self) -> Self {
        PersistentMap {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for PersistentMap<K, V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for PersistentMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl<K: Eq + Hash, V: Eq> Eq for PersistentMap<K, V> {}

impl<K: Hash, V: Hash> Hash for PersistentMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: the sum of the entry hashes.
        let mut sum: u64 = 0;
        for (k, v) in self.inner.iter() {
            let mut h = FxHasher::default();
            k.hash(&mut h);
            v.hash(&mut h);
            sum = sum.wrapping_add(h.finish());
        }
        state.write_u64(sum);
        state.write_usize(self.inner.len());
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> FromIterator<(K, V)> for PersistentMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PersistentMap {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}
