//! An ordered key -> value mapping, built as a single two-level list of
//! `(K, V)` pairs ordered by key.
//!
//! The source design models this as a key list with a parallel value list
//! kept in lockstep; that invites desync bugs the moment split/merge touches
//! one structure without the other. Storing entries as pairs in one list,
//! ordered through [`ByKey`], gets the same semantics with no synchronization
//! to get wrong -- see DESIGN.md.

use crate::comparator::{ByKey, Comparator, NaturalOrder};
use crate::two_level_list::{Islice, Iter, TwoLevelList};
use std::cmp::Ordering;

/// An ordered mapping from `K` to `V`. Two keys are the same key whenever
/// the comparator reports them equal; `set` on an existing key overwrites
/// only the value, never the stored key.
#[derive(Debug)]
pub struct SortedMap<K, V, C = NaturalOrder> {
    inner: TwoLevelList<(K, V), ByKey<C>>,
}

impl<K: Clone, V: Clone, C: Comparator<K> + Clone> Clone for SortedMap<K, V, C> {
    fn clone(&self) -> Self {
        SortedMap {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Clone, V: Clone> SortedMap<K, V, NaturalOrder>
where
    NaturalOrder: Comparator<K>,
{
    pub fn new() -> Self {
        SortedMap {
            inner: TwoLevelList::with_comparator(ByKey(NaturalOrder)),
        }
    }
}

impl<K: Clone, V: Clone, C: Comparator<K> + Default> Default for SortedMap<K, V, C> {
    fn default() -> Self {
        SortedMap {
            inner: TwoLevelList::with_comparator(ByKey(C::default())),
        }
    }
}

impl<K: Clone, V: Clone, C: Comparator<K>> SortedMap<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        SortedMap {
            inner: TwoLevelList::with_comparator(ByKey(comparator)),
        }
    }

    pub fn with_comparator_and_load_factor(comparator: C, load_factor: usize) -> Self {
        SortedMap {
            inner: TwoLevelList::new(ByKey(comparator), load_factor),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn size(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    fn key_probe(&self, key: &K) -> Option<(usize, usize)> {
        let comparator = &self.inner.comparator().0;
        self.inner
            .probe_by(key, |pair, k| comparator.compare(&pair.0, k))
    }

    /// Overwrites the value if `key` is already present (the stored key
    /// object is not replaced); otherwise inserts a new entry.
    pub fn set(&mut self, key: K, value: V) {
        match self.key_probe(&key) {
            Some((p, idx)) => self.inner.element_mut(p, idx).1 = value,
            None => self.inner.add((key, value)),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.key_probe(key).map(|(p, idx)| &self.inner.element(p, idx).1)
    }

    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &K) -> bool {
        self.key_probe(key).is_some()
    }

    /// Gets the value for `key`, inserting `default` first if absent.
    pub fn upsert(&mut self, key: K, default: V) -> &mut V {
        let existing = self.key_probe(&key);
        let (p, idx) = match existing {
            Some(pos) => pos,
            None => {
                self.inner.add((key.clone(), default));
                self.key_probe(&key).expect("key was just inserted")
            }
        };
        &mut self.inner.element_mut(p, idx).1
    }

    /// Removes `key` and its value, returning the value if it was present.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let (p, idx) = self.key_probe(key)?;
        let rank = self.inner.rank_from_pos(p, idx);
        self.inner.pop(rank as isize).map(|(_, v)| v)
    }

    pub fn pop_key(&mut self, key: &K) -> Option<V> {
        self.delete(key)
    }

    pub fn pop_key_or(&mut self, key: &K, default: V) -> V {
        self.delete(key).unwrap_or(default)
    }

    pub fn pop_entry(&mut self, rank: isize) -> Option<(K, V)> {
        self.inner.pop(rank)
    }

    /// The value at `rank` (rank order, not a key lookup).
    pub fn at(&self, rank: isize) -> Option<&V> {
        self.inner.at(rank).map(|pair| &pair.1)
    }

    pub fn entry_at(&self, rank: isize) -> Option<&(K, V)> {
        self.inner.at(rank)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.iter().map(|pair| &pair.0)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.iter().map(|pair| &pair.1)
    }

    pub fn entries(&self) -> Iter<'_, (K, V)> {
        self.inner.iter()
    }

    pub fn for_each<F: FnMut(&K, &V, usize)>(&self, mut f: F) {
        for (index, (k, v)) in self.inner.iter().enumerate() {
            f(k, v, index);
        }
    }

    pub fn bisect_left(&self, key: &K) -> usize {
        let comparator = &self.inner.comparator().0;
        self.inner
            .bisect_left_by_key(key, |pair, k| comparator.compare(&pair.0, k))
    }

    pub fn bisect_right(&self, key: &K) -> usize {
        let comparator = &self.inner.comparator().0;
        self.inner
            .bisect_right_by_key(key, |pair, k| comparator.compare(&pair.0, k))
    }

    pub fn index_of(&self, key: &K, start: isize, end: isize) -> Option<usize> {
        let (start, end) = self.inner.normalize_range(start, end);
        if start >= end {
            return None;
        }
        let lo = self.bisect_left(key);
        let hi = self.bisect_right(key);
        if lo >= hi {
            return None;
        }
        let rank = lo.max(start);
        if rank < hi && rank < end {
            Some(rank)
        } else {
            None
        }
    }

    pub fn islice(&self, start: isize, end: isize, reverse: bool) -> Islice<'_, (K, V)> {
        self.inner.islice(start, end, reverse)
    }

    /// Entries whose keys fall in the comparator range `(min, max)`. `None`
    /// on a bound means unbounded on that side.
    pub fn irange(
        &self,
        min: Option<&K>,
        max: Option<&K>,
        incl_min: bool,
        incl_max: bool,
        reverse: bool,
    ) -> Islice<'_, (K, V)> {
        let comparator = &self.inner.comparator().0;
        let start = match min {
            None => 0,
            Some(k) if incl_min => self.inner.bisect_left_by_key(k, |pair, k| comparator.compare(&pair.0, k)),
            Some(k) => self.inner.bisect_right_by_key(k, |pair, k| comparator.compare(&pair.0, k)),
        };
        let end = match max {
            None => self.inner.len(),
            Some(k) if incl_max => self.inner.bisect_right_by_key(k, |pair, k| comparator.compare(&pair.0, k)),
            Some(k) => self.inner.bisect_left_by_key(k, |pair, k| comparator.compare(&pair.0, k)),
        };
        self.inner.islice_ranks(start, end, reverse)
    }

    pub fn check_invariants(&self) {
        self.inner.check_invariants();
    }
}

impl<K, V, C> IntoIterator for SortedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = crate::two_level_list::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a SortedMap<K, V, C> {
    type Item = &'a (K, V);
    type IntoIter = Iter<'a, (K, V)>;

    fn into_iter(self) -> Iter<'a, (K, V)> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrips() {
        let mut m: SortedMap<i32, &str> = SortedMap::new();
        m.set(1, "one");
        m.set(2, "two");
        assert_eq!(m.get(&1), Some(&"one"));
        assert_eq!(m.get(&3), None);
    }

    #[test]
    fn overwrite_preserves_key_identity_under_degenerate_comparator() {
        #[derive(Clone)]
        struct AllEqual;
        impl Comparator<&'static str> for AllEqual {
            fn compare(&self, _a: &&'static str, _b: &&'static str) -> Ordering {
                Ordering::Equal
            }
        }
        let mut m: SortedMap<&'static str, i32, AllEqual> = SortedMap::with_comparator(AllEqual);
        m.set("a", 1);
        m.set("b", 2);
        assert_eq!(m.len(), 1);
        assert_eq!(m.entry_at(0), Some(&("a", 2)));
        m.set("c", 3);
        assert_eq!(m.entry_at(0), Some(&("a", 3)));
        assert!(!m.has(&"x"));
        assert_eq!(m.delete(&"x"), None);
    }

    #[test]
    fn upsert_inserts_default_once() {
        let mut m: SortedMap<i32, Vec<i32>> = SortedMap::new();
        m.upsert(1, Vec::new()).push(10);
        m.upsert(1, Vec::new()).push(20);
        assert_eq!(m.get(&1), Some(&vec![10, 20]));
    }

    #[test]
    fn delete_removes_entry() {
        let mut m: SortedMap<i32, i32> = SortedMap::new();
        m.set(1, 100);
        m.set(2, 200);
        assert_eq!(m.delete(&1), Some(100));
        assert_eq!(m.get(&1), None);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn irange_filters_by_key() {
        let mut m: SortedMap<i32, i32> = SortedMap::new();
        for k in 0..20 {
            m.set(k, k * 10);
        }
        let in_range: Vec<(i32, i32)> = m
            .irange(Some(&5), Some(&10), true, false, false)
            .cloned()
            .collect();
        assert_eq!(
            in_range,
            vec![(5, 50), (6, 60), (7, 70), (8, 80), (9, 90)]
        );
    }
}
