//! An ordered set view over [`TwoLevelList`], deduplicating on insert.

use crate::comparator::{Comparator, NaturalOrder};
use crate::two_level_list::{Islice, Iter, TwoLevelList};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// An ordered set of unique-under-`C` values of `T`.
#[derive(Debug)]
pub struct SortedSet<T, C = NaturalOrder> {
    inner: TwoLevelList<T, C>,
}

impl<T: Clone, C: Comparator<T> + Clone> Clone for SortedSet<T, C> {
    fn clone(&self) -> Self {
        SortedSet {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> SortedSet<T, NaturalOrder>
where
    NaturalOrder: Comparator<T>,
{
    pub fn new() -> Self {
        SortedSet {
            inner: TwoLevelList::with_comparator(NaturalOrder),
        }
    }
}

impl<T: Clone, C: Comparator<T> + Default> Default for SortedSet<T, C> {
    fn default() -> Self {
        SortedSet {
            inner: TwoLevelList::default(),
        }
    }
}

impl<T: Clone, C: Comparator<T>> SortedSet<T, C> {
    pub fn with_comparator(comparator: C) -> Self {
        SortedSet {
            inner: TwoLevelList::with_comparator(comparator),
        }
    }

    pub fn with_comparator_and_load_factor(comparator: C, load_factor: usize) -> Self {
        SortedSet {
            inner: TwoLevelList::new(comparator, load_factor),
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

    /// Inserts `value` only if no element currently compares equal.
    pub fn add(&mut self, value: T) {
        if self.inner.probe(&value).is_none() {
            self.inner.add(value);
        }
    }

    /// Deduplicates the incoming values first, then inserts whatever isn't
    /// already present.
    pub fn update<I: IntoIterator<Item = T>>(&mut self, iter: I)
    where
        C: Clone,
    {
        let mut incoming: Vec<T> = iter.into_iter().collect();
        incoming.sort_by(|a, b| self.inner.comparator().compare(a, b));
        incoming.dedup_by(|a, b| self.inner.comparator().compare(a, b) == std::cmp::Ordering::Equal);
        let fresh: Vec<T> = incoming
            .into_iter()
            .filter(|v| self.inner.probe(v).is_none())
            .collect();
        self.inner.update(fresh);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn delete(&mut self, value: &T) -> bool {
        self.inner.delete(value)
    }

    pub fn delete_at(&mut self, rank: isize) -> bool {
        self.inner.delete_at(rank)
    }

    pub fn pop(&mut self, rank: isize) -> Option<T> {
        self.inner.pop(rank)
    }

    pub fn at(&self, rank: isize) -> Option<&T> {
        self.inner.at(rank)
    }

    pub fn slice(&self, start: isize, end: isize) -> Vec<T> {
        self.inner.slice(start, end)
    }

    /// Calls `f(value, index)` for every element in order.
    pub fn for_each<F: FnMut(&T, usize)>(&self, mut f: F) {
        for (index, value) in self.inner.iter().enumerate() {
            f(value, index);
        }
    }

    pub fn has(&self, value: &T) -> bool {
        self.inner.has(value)
    }

    /// 0 or 1: whether `value` is present.
    pub fn count(&self, value: &T) -> usize {
        self.inner.has(value) as usize
    }

    pub fn index_of(&self, value: &T, start: isize, end: isize) -> Option<usize> {
        self.inner.index_of(value, start, end)
    }

    pub fn bisect_left(&self, value: &T) -> usize {
        self.inner.bisect_left(value)
    }

    pub fn bisect_right(&self, value: &T) -> usize {
        self.inner.bisect_right(value)
    }

    pub fn irange(
        &self,
        min: Option<&T>,
        max: Option<&T>,
        incl_min: bool,
        incl_max: bool,
        reverse: bool,
    ) -> Islice<'_, T> {
        self.inner.irange(min, max, incl_min, incl_max, reverse)
    }

    pub fn islice(&self, start: isize, end: isize, reverse: bool) -> Islice<'_, T> {
        self.inner.islice(start, end, reverse)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.inner.iter()
    }

    pub fn keys(&self) -> Iter<'_, T> {
        self.inner.iter()
    }

    pub fn values(&self) -> Iter<'_, T> {
        self.inner.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&T, &T)> {
        self.inner.iter().map(|v| (v, v))
    }

    /// Checks the shared structural invariants plus the set-specific one:
    /// strict inequality between every pair of adjacent elements (no
    /// duplicates anywhere, not just within a sublist).
    pub fn check_invariants(&self) {
        self.inner.check_invariants();
        let mut prev: Option<&T> = None;
        for v in self.inner.iter() {
            if let Some(p) = prev {
                assert_eq!(
                    self.inner.comparator().compare(p, v),
                    std::cmp::Ordering::Less,
                    "adjacent set elements are not strictly increasing"
                );
            }
            prev = Some(v);
        }
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.inner.iter().all(|v| other.inner.has(v))
    }

    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.inner.iter().all(|v| self.inner.has(v))
    }

    pub fn is_disjoint_from(&self, other: &Self) -> bool {
        !other.inner.iter().any(|v| self.inner.has(v))
    }
}

impl<T: Clone, C: Comparator<T> + Clone> SortedSet<T, C> {
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.union_update(other);
        result
    }

    pub fn union_update(&mut self, other: &Self) {
        for v in other.inner.iter() {
            self.add(v.clone());
        }
    }

    /// Iterates the smaller side, probing the larger.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = SortedSet::with_comparator_and_load_factor(
            self.inner.comparator().clone(),
            self.inner.load_factor(),
        );
        let (small, large): (&Self, &Self) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        for v in small.inner.iter() {
            if large.inner.has(v) {
                result.add(v.clone());
            }
        }
        result
    }

    pub fn intersection_update(&mut self, other: &Self) {
        let keep: Vec<T> = self
            .inner
            .iter()
            .filter(|v| other.inner.has(v))
            .cloned()
            .collect();
        self.inner.clear();
        self.inner.update(keep);
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.difference_update(other);
        result
    }

    /// Deletes probes one at a time when `other` is small relative to
    /// `self` (< len/4); otherwise rebuilds by scanning and keeping values
    /// absent from `other`.
    pub fn difference_update(&mut self, other: &Self) {
        if other.len() * 4 < self.len() {
            for v in other.inner.iter() {
                self.inner.delete(v);
            }
        } else {
            let keep: Vec<T> = self
                .inner
                .iter()
                .filter(|v| !other.inner.has(v))
                .cloned()
                .collect();
            self.inner.clear();
            self.inner.update(keep);
        }
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.symmetric_difference_update(other);
        result
    }

    pub fn symmetric_difference_update(&mut self, other: &Self) {
        let mut to_remove = Vec::new();
        let mut to_add = Vec::new();
        for v in other.inner.iter() {
            if self.inner.has(v) {
                to_remove.push(v.clone());
            } else {
                to_add.push(v.clone());
            }
        }
        for v in &to_remove {
            self.inner.delete(v);
        }
        for v in to_add {
            self.add(v);
        }
    }
}

/// Renders as a bracketed, comma-separated list in iteration order, e.g.
/// `[1, 2, 3]` -- the `toString` analogue from spec.md §6, inherited by
/// `SortedSet` along with the rest of `SortedArray`'s read surface.
impl<T: fmt::Display, C> fmt::Display for SortedSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// Serializes as a plain JSON array of the elements in iteration order.
impl<T: Serialize, C> Serialize for SortedSet<T, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.inner.len()))?;
        for value in self.inner.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<T: Serialize, C> SortedSet<T, C> {
    /// The `toJSON` analogue from spec.md §6.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for SortedSet<T, C>
where
    C: Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = SortedSet::default();
        set.update(iter);
        set
    }
}

impl<T, C> IntoIterator for SortedSet<T, C> {
    type Item = T;
    type IntoIter = crate::two_level_list::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a SortedSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[i32]) -> SortedSet<i32> {
        let mut s: SortedSet<i32> = SortedSet::new();
        s.update(values.iter().copied());
        s
    }

    #[test]
    fn add_deduplicates() {
        let mut s: SortedSet<i32> = SortedSet::new();
        s.add(1);
        s.add(1);
        s.add(2);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn symmetric_difference_scenario() {
        let a = set(&(0..75).collect::<Vec<_>>());
        let b = set(&(25..100).collect::<Vec<_>>());
        let sym = a.symmetric_difference(&b);
        let expected: Vec<i32> = (0..25).chain(75..100).collect();
        assert_eq!(sym.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn union_then_difference_equals_original_difference() {
        let a = set(&[1, 2, 3, 4, 5]);
        let b = set(&[3, 4, 5, 6, 7]);
        let union = a.union(&b);
        let lhs = union.difference(&b);
        let rhs = a.difference(&b);
        assert_eq!(
            lhs.iter().copied().collect::<Vec<_>>(),
            rhs.iter().copied().collect::<Vec<_>>()
        );
    }

    #[test]
    fn subset_superset_disjoint() {
        let a = set(&[1, 2, 3]);
        let b = set(&[1, 2, 3, 4, 5]);
        let c = set(&[10, 11]);
        assert!(a.is_subset_of(&b));
        assert!(b.is_superset_of(&a));
        assert!(a.is_disjoint_from(&c));
        assert!(!a.is_disjoint_from(&b));
    }

    #[test]
    fn intersection_of_disjoint_sets_is_empty() {
        let a = set(&[1, 2, 3]);
        let b = set(&[4, 5, 6]);
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn slice_and_for_each_mirror_sorted_array() {
        let s = set(&[3, 1, 2]);
        assert_eq!(s.slice(0, s.len() as isize), vec![1, 2, 3]);
        let mut seen = Vec::new();
        s.for_each(|v, i| seen.push((i, *v)));
        assert_eq!(seen, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn to_string_and_to_json_render_as_array() {
        let s = set(&[3, 1, 2]);
        assert_eq!(s.to_string(), "[1, 2, 3]");
        assert_eq!(s.to_json().unwrap(), "[1,2,3]");
    }
}
