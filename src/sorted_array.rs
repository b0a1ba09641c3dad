//! An ordered multiset view over [`TwoLevelList`].
//!
//! Pass-through container: every operation reduces directly to a call into
//! the core, plus a handful of conveniences (`concat`, `for_each`) that
//! don't belong on the core because they're specific to presenting a flat
//! sequence.

use crate::comparator::{Comparator, NaturalOrder};
use crate::two_level_list::{Islice, Iter, TwoLevelList};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// An ordered multiset of `T`, allowing duplicates, ordered by `C`.
#[derive(Debug)]
pub struct SortedArray<T, C = NaturalOrder> {
    inner: TwoLevelList<T, C>,
}

impl<T: Clone, C: Comparator<T> + Clone> Clone for SortedArray<T, C> {
    fn clone(&self) -> Self {
        SortedArray {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone, C: Comparator<T> + Default> Default for SortedArray<T, C> {
    fn default() -> Self {
        SortedArray {
            inner: TwoLevelList::default(),
        }
    }
}

impl<T: Clone> SortedArray<T, NaturalOrder>
where
    NaturalOrder: Comparator<T>,
{
    pub fn new() -> Self {
        SortedArray {
            inner: TwoLevelList::with_comparator(NaturalOrder),
        }
    }
}

impl<T: Clone, C: Comparator<T>> SortedArray<T, C> {
    pub fn with_comparator(comparator: C) -> Self {
        SortedArray {
            inner: TwoLevelList::with_comparator(comparator),
        }
    }

    pub fn with_comparator_and_load_factor(comparator: C, load_factor: usize) -> Self {
        SortedArray {
            inner: TwoLevelList::new(comparator, load_factor),
        }
    }

    pub fn load_factor(&self) -> usize {
        self.inner.load_factor()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn add(&mut self, value: T) {
        self.inner.add(value);
    }

    pub fn update<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.inner.update(iter);
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

    pub fn delete_slice(&mut self, start: isize, end: isize) -> usize {
        self.inner.delete_slice(start, end)
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

    pub fn index_of(&self, value: &T, start: isize, end: isize) -> Option<usize> {
        self.inner.index_of(value, start, end)
    }

    /// Alias for [`Self::has`], matching the read-only surface shared with
    /// `SortedSet`.
    pub fn includes(&self, value: &T) -> bool {
        self.inner.has(value)
    }

    pub fn has(&self, value: &T) -> bool {
        self.inner.has(value)
    }

    pub fn bisect_left(&self, value: &T) -> usize {
        self.inner.bisect_left(value)
    }

    pub fn bisect_right(&self, value: &T) -> usize {
        self.inner.bisect_right(value)
    }

    pub fn count(&self, value: &T) -> usize {
        self.inner.count(value)
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

    /// Calls `f(value, index)` for every element in order.
    pub fn for_each<F: FnMut(&T, usize)>(&self, mut f: F) {
        for (index, value) in self.inner.iter().enumerate() {
            f(value, index);
        }
    }

    pub fn check_invariants(&self) {
        self.inner.check_invariants();
    }
}

impl<T: Clone, C: Comparator<T> + Clone> SortedArray<T, C> {
    /// Builds a new container from this one's contents followed by `other`'s,
    /// under the same comparator.
    pub fn concat(&self, other: &[T]) -> Self {
        let mut merged = TwoLevelList::new(self.inner.comparator().clone(), self.inner.load_factor());
        merged.update(self.inner.iter().cloned());
        merged.update(other.iter().cloned());
        SortedArray { inner: merged }
    }
}

/// Renders as a bracketed, comma-separated list in iteration order, e.g.
/// `[1, 2, 3]` -- the `toString` analogue from spec.md §6.
impl<T: fmt::Display, C> fmt::Display for SortedArray<T, C> {
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
impl<T: Serialize, C> Serialize for SortedArray<T, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.inner.len()))?;
        for value in self.inner.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<T: Serialize, C> SortedArray<T, C> {
    /// The `toJSON` analogue from spec.md §6: a JSON array of the elements
    /// in iteration order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for SortedArray<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        SortedArray {
            inner: TwoLevelList::from_iter(iter),
        }
    }
}

impl<T, C> IntoIterator for SortedArray<T, C> {
    type Item = T;
    type IntoIter = crate::two_level_list::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a SortedArray<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_duplicates_in_order() {
        let mut a: SortedArray<i32> = SortedArray::new();
        a.update(vec![3, 1, 2, 1, 3]);
        assert_eq!(a.slice(0, a.len() as isize), vec![1, 1, 2, 3, 3]);
        assert_eq!(a.count(&1), 2);
    }

    #[test]
    fn concat_merges_under_shared_comparator() {
        let mut a: SortedArray<i32> = SortedArray::new();
        a.update(vec![1, 3, 5]);
        let merged = a.concat(&[0, 2, 4]);
        assert_eq!(merged.slice(0, merged.len() as isize), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn for_each_visits_in_order_with_indices() {
        let mut a: SortedArray<i32> = SortedArray::new();
        a.update(vec![5, 1, 3]);
        let mut seen = Vec::new();
        a.for_each(|v, i| seen.push((i, *v)));
        assert_eq!(seen, vec![(0, 1), (1, 3), (2, 5)]);
    }

    #[test]
    fn delete_at_and_pop_respect_rank_semantics() {
        let mut a: SortedArray<i32> = SortedArray::new();
        a.update(vec![10, 20, 30]);
        assert_eq!(a.pop(-1), Some(30));
        assert!(a.delete_at(0));
        assert_eq!(a.slice(0, a.len() as isize), vec![20]);
    }

    #[test]
    fn to_string_renders_bracketed_list() {
        let mut a: SortedArray<i32> = SortedArray::new();
        a.update(vec![3, 1, 2]);
        assert_eq!(a.to_string(), "[1, 2, 3]");
        assert_eq!(SortedArray::<i32>::new().to_string(), "[]");
    }

    #[test]
    fn to_json_renders_json_array() {
        let mut a: SortedArray<i32> = SortedArray::new();
        a.update(vec![3, 1, 2]);
        assert_eq!(a.to_json().unwrap(), "[1,2,3]");
    }
}
