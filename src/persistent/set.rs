//! Persistent hash set.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashSet, FxHasher};

/// An immutable set. Operations that would mutate return a new set instead;
/// unchanged sets share their storage.
pub struct PersistentSet<T> {
    inner: Arc<FxHashSet<T>>,
}

impl<T> PersistentSet<T> {
    /// The empty set.
    pub fn empty() -> Self {
        PersistentSet {
            inner: Arc::new(FxHashSet::default()),
        }
    }

    pub fn size(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter()
    }
}

impl<T: Eq + Hash + Clone> PersistentSet<T> {
    /// The set containing exactly the given element.
    pub fn singleton(value: T) -> Self {
        let mut set = FxHashSet::default();
        set.insert(value);
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.inner.contains(value)
    }

    /// Returns a set with the given element added.
    pub fn add(&self, value: T) -> Self {
        if self.inner.contains(&value) {
            return self.clone();
        }
        let mut set = (*self.inner).clone();
        set.insert(value);
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    /// Returns a set with the given element removed.
    pub fn remove(&self, value: &T) -> Self {
        if !self.inner.contains(value) {
            return self.clone();
        }
        let mut set = (*self.inner).clone();
        set.remove(value);
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    /// Returns the union of the two sets.
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() || Arc::ptr_eq(&self.inner, &other.inner) {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut set = (*self.inner).clone();
        set.extend(other.inner.iter().cloned());
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    /// Returns this set minus the elements of the other set.
    pub fn subtract(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        let set: FxHashSet<T> = self
            .inner
            .iter()
            .filter(|v| !other.contains(v))
            .cloned()
            .collect();
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    /// Returns the intersection of the two sets.
    pub fn intersect(&self, other: &Self) -> Self {
        let set: FxHashSet<T> = self
            .inner
            .iter()
            .filter(|v| other.contains(v))
            .cloned()
            .collect();
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    /// Returns a set without the elements matching the predicate.
    pub fn remove_if(&self, mut filter: impl FnMut(&T) -> bool) -> Self {
        let set: FxHashSet<T> = self
            .inner
            .iter()
            .filter(|v| !filter(v))
            .cloned()
            .collect();
        if set.len() == self.inner.len() {
            return self.clone();
        }
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    /// Returns a set with all given elements added.
    pub fn add_all(&self, values: impl IntoIterator<Item = T>) -> Self {
        let mut set = (*self.inner).clone();
        set.extend(values);
        PersistentSet {
            inner: Arc::new(set),
        }
    }

    pub fn contains_all(&self, other: &Self) -> bool {
        other.inner.iter().all(|v| self.inner.contains(v))
    }

    /// Snapshot as a mutable set.
    pub fn to_mutable(&self) -> FxHashSet<T> {
        (*self.inner).clone()
    }
}

impl<T> Clone for PersistentSet<T> {
    fn clone(&self) -> Self {
        PersistentSet {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for PersistentSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Eq + Hash> PartialEq for PersistentSet<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl<T: Eq + Hash> Eq for PersistentSet<T> {}

impl<T: Hash> Hash for PersistentSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: the sum of the element hashes.
        let mut sum: u64 = 0;
        for v in self.inner.iter() {
            let mut h = FxHasher::default();
            v.hash(&mut h);
            sum = sum.wrapping_add(h.finish());
        }
        state.write_u64(sum);
        state.write_usize(self.inner.len());
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.iter()).finish()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for PersistentSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PersistentSet {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<T: Eq + Hash + Clone> From<FxHashSet<T>> for PersistentSet<T> {
    fn from(set: FxHashSet<T>) -> Self {
        PersistentSet {
            inner: Arc::new(set),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentSet<T> {
    type Item = &'a T;
    type IntoIter = std::collections::hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let s = PersistentSet::empty().add(1).add(2);
        assert_eq!(s.size(), 2);
        assert!(s.contains(&1));

        let t = s.remove(&1);
        assert!(!t.contains(&1));
        assert!(s.contains(&1), "original unchanged");
    }

    #[test]
    fn test_union_subtract_intersect() {
        let a: PersistentSet<i32> = [1, 2, 3].into_iter().collect();
        let b: PersistentSet<i32> = [3, 4].into_iter().collect();

        let u = a.union(&b);
        assert_eq!(u.size(), 4);

        let d = a.subtract(&b);
        assert_eq!(d, [1, 2].into_iter().collect());

        let i = a.intersect(&b);
        assert_eq!(i, PersistentSet::singleton(3));
    }

    #[test]
    fn test_remove_if() {
        let a: PersistentSet<i32> = [1, 2, 3, 4].into_iter().collect();
        let even = a.remove_if(|v| v % 2 == 1);
        assert_eq!(even, [2, 4].into_iter().collect());
    }

    #[test]
    fn test_equality_and_hash_order_independent() {
        use std::collections::hash_map::DefaultHasher;

        let a: PersistentSet<i32> = [1, 2, 3].into_iter().collect();
        let b: PersistentSet<i32> = [3, 2, 1].into_iter().collect();
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_contains_all() {
        let a: PersistentSet<i32> = [1, 2, 3].into_iter().collect();
        let b: PersistentSet<i32> = [1, 3].into_iter().collect();
        assert!(a.contains_all(&b));
        assert!(!b.contains_all(&a));
    }
}
