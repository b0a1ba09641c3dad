//! The core ordered multiset: a list of bounded, sorted sublists with a
//! lazily built positional index for rank queries.
//!
//! `SortedArray`, `SortedSet` and `SortedMap` are all thin views over this
//! structure (see their respective modules); this is where the sublist
//! splitting/merging and the rank <-> (sublist, offset) conversion live.

mod iter;

pub use iter::{IntoIter, Islice, Iter};

use crate::bisect::{bisect_left, bisect_left_by, bisect_right, bisect_right_by, insort};
use crate::comparator::Comparator;
use crate::positional_index::PositionalIndex;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;

/// Default load factor, matching the sorted-containers lineage this crate
/// descends from.
pub const DEFAULT_LOAD_FACTOR: usize = 1000;

/// An ordered multiset of `T`, stored as a sequence of bounded sublists.
///
/// Comparisons go exclusively through `C: Comparator<T>`; two elements `a`
/// and `b` are considered equivalent whenever `cmp.compare(a, b) ==
/// Ordering::Equal`, independent of any `PartialEq` impl `T` may have.
pub struct TwoLevelList<T, C> {
    lists: Vec<Vec<T>>,
    maxes: Vec<T>,
    len: usize,
    index: RefCell<PositionalIndex>,
    load_factor: usize,
    comparator: C,
}

impl<T: Clone, C: Comparator<T>> TwoLevelList<T, C> {
    /// Builds an empty container with the given comparator and load factor.
    ///
    /// # Panics
    /// Panics if `load_factor < 4` (per the structural invariant `L >= 4`).
    pub fn new(comparator: C, load_factor: usize) -> Self {
        assert!(load_factor >= 4, "load factor must be at least 4");
        TwoLevelList {
            lists: Vec::new(),
            maxes: Vec::new(),
            len: 0,
            index: RefCell::new(PositionalIndex::default()),
            load_factor,
            comparator,
        }
    }

    /// Builds an empty container with the default load factor.
    pub fn with_comparator(comparator: C) -> Self {
        Self::new(comparator, DEFAULT_LOAD_FACTOR)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn load_factor(&self) -> usize {
        self.load_factor
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Inserts `value`, preserving sorted order. Expected O(L + log(n/L)).
    pub fn add(&mut self, value: T) {
        if self.lists.is_empty() {
            self.maxes.push(value.clone());
            self.lists.push(vec![value]);
            self.len = 1;
            self.index.borrow_mut().invalidate();
            return;
        }
        let p = bisect_right(&self.maxes, &value, &self.comparator);
        if p == self.maxes.len() {
            let last = self.lists.len() - 1;
            self.maxes[last] = value.clone();
            self.lists[last].push(value);
            self.len += 1;
            self.expand(last);
        } else {
            insort(&mut self.lists[p], value, &self.comparator);
            self.maxes[p] = self.lists[p].last().unwrap().clone();
            self.len += 1;
            self.expand(p);
        }
    }

    fn expand(&mut self, p: usize) {
        debug_assert!(!self.lists.is_empty());
        if self.lists[p].len() > 2 * self.load_factor {
            let tail = self.lists[p].split_off(self.load_factor);
            self.maxes[p] = self.lists[p].last().unwrap().clone();
            let tail_max = tail.last().unwrap().clone();
            self.lists.insert(p + 1, tail);
            self.maxes.insert(p + 1, tail_max);
            self.index.borrow_mut().invalidate();
        } else {
            let mut index = self.index.borrow_mut();
            if index.is_built() {
                index.increment(p);
            }
        }
    }

    /// Bulk insert. Rebuilds the whole layout from scratch if the incoming
    /// batch dwarfs the current contents; otherwise inserts one at a time.
    pub fn update<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut incoming: Vec<T> = iter.into_iter().collect();
        if incoming.is_empty() {
            return;
        }
        incoming.sort_by(|a, b| self.comparator.compare(a, b));
        if self.lists.is_empty() {
            self.bulk_load(incoming);
        } else if incoming.len() * 4 >= self.len {
            let mut flat: Vec<T> = self.lists.drain(..).flatten().collect();
            flat.extend(incoming);
            flat.sort_by(|a, b| self.comparator.compare(a, b));
            self.maxes.clear();
            self.len = 0;
            self.bulk_load(flat);
        } else {
            for value in incoming {
                self.add(value);
            }
        }
    }

    fn bulk_load(&mut self, sorted: Vec<T>) {
        self.len = sorted.len();
        self.lists = sorted
            .chunks(self.load_factor)
            .map(|chunk| chunk.to_vec())
            .collect();
        self.maxes = self
            .lists
            .iter()
            .map(|chunk| chunk.last().unwrap().clone())
            .collect();
        self.index.borrow_mut().invalidate();
    }

    /// Membership test: is some element equivalent to `value` present?
    pub fn has(&self, value: &T) -> bool {
        self.probe(value).is_some()
    }

    pub(crate) fn probe(&self, value: &T) -> Option<(usize, usize)> {
        if self.maxes.is_empty() {
            return None;
        }
        let p = bisect_left(&self.maxes, value, &self.comparator);
        if p == self.maxes.len() {
            return None;
        }
        let idx = bisect_left(&self.lists[p], value, &self.comparator);
        if idx < self.lists[p].len()
            && self.comparator.compare(&self.lists[p][idx], value) == Ordering::Equal
        {
            Some((p, idx))
        } else {
            None
        }
    }

    /// Like [`probe`], but the probe is a heterogeneous key compared via
    /// `key_cmp`, never requiring construction of a full `T`. Backs
    /// `SortedMap`'s key-only lookups.
    pub(crate) fn probe_by<K>(
        &self,
        key: &K,
        mut key_cmp: impl FnMut(&T, &K) -> Ordering,
    ) -> Option<(usize, usize)> {
        if self.maxes.is_empty() {
            return None;
        }
        let p = bisect_left_by(&self.maxes, key, &mut key_cmp);
        if p == self.maxes.len() {
            return None;
        }
        let idx = bisect_left_by(&self.lists[p], key, &mut key_cmp);
        if idx < self.lists[p].len() && key_cmp(&self.lists[p][idx], key) == Ordering::Equal {
            Some((p, idx))
        } else {
            None
        }
    }

    /// Heterogeneous-key form of [`Self::bisect_left`]. Backs `SortedMap`,
    /// which has no spare `V` to build a probe element with.
    pub(crate) fn bisect_left_by_key<K>(
        &self,
        key: &K,
        mut key_cmp: impl FnMut(&T, &K) -> Ordering,
    ) -> usize {
        if self.maxes.is_empty() {
            return 0;
        }
        let p = bisect_left_by(&self.maxes, key, &mut key_cmp);
        if p == self.maxes.len() {
            return self.len;
        }
        let idx = bisect_left_by(&self.lists[p], key, &mut key_cmp);
        self.rank_from_pos(p, idx)
    }

    /// Heterogeneous-key form of [`Self::bisect_right`].
    pub(crate) fn bisect_right_by_key<K>(
        &self,
        key: &K,
        mut key_cmp: impl FnMut(&T, &K) -> Ordering,
    ) -> usize {
        if self.maxes.is_empty() {
            return 0;
        }
        let p = bisect_right_by(&self.maxes, key, &mut key_cmp);
        if p == self.maxes.len() {
            return self.len;
        }
        let idx = bisect_right_by(&self.lists[p], key, &mut key_cmp);
        self.rank_from_pos(p, idx)
    }

    pub(crate) fn element(&self, p: usize, idx: usize) -> &T {
        &self.lists[p][idx]
    }

    pub(crate) fn element_mut(&mut self, p: usize, idx: usize) -> &mut T {
        &mut self.lists[p][idx]
    }

    /// Removes one occurrence equivalent to `value`, if present. Returns
    /// whether anything was removed.
    pub fn delete(&mut self, value: &T) -> bool {
        match self.probe(value) {
            Some((p, idx)) => {
                self.delete_internal(p, idx);
                true
            }
            None => false,
        }
    }

    fn delete_internal(&mut self, p: usize, idx: usize) -> T {
        let removed = self.lists[p].remove(idx);
        self.len -= 1;
        let remaining = self.lists[p].len();
        if remaining > self.load_factor / 2 {
            if let Some(last) = self.lists[p].last() {
                self.maxes[p] = last.clone();
            }
            let mut index = self.index.borrow_mut();
            if index.is_built() {
                index.decrement(p);
            }
        } else if self.lists.len() > 1 {
            debug_assert!(self.lists.len() > 1);
            let (keep, drop_idx) = if p == 0 { (0, 1) } else { (p - 1, p) };
            let dropped = self.lists.remove(drop_idx);
            self.maxes.remove(drop_idx);
            self.lists[keep].extend(dropped);
            self.maxes[keep] = self.lists[keep].last().unwrap().clone();
            self.index.borrow_mut().invalidate();
            self.expand(keep);
        } else if remaining > 0 {
            self.maxes[p] = self.lists[p].last().unwrap().clone();
        } else {
            self.lists.remove(p);
            self.maxes.remove(p);
            self.index.borrow_mut().invalidate();
        }
        removed
    }

    fn normalize_rank(&self, rank: isize) -> Option<usize> {
        let len = self.len as isize;
        let r = if rank < 0 { rank + len } else { rank };
        if r < 0 || r >= len {
            None
        } else {
            Some(r as usize)
        }
    }

    pub(crate) fn normalize_range(&self, start: isize, end: isize) -> (usize, usize) {
        let len = self.len as isize;
        let clamp = |v: isize| (if v < 0 { v + len } else { v }).clamp(0, len);
        let start = clamp(start);
        let end = clamp(end);
        (start as usize, end as usize)
    }

    fn ensure_index_built(&self) {
        let mut index = self.index.borrow_mut();
        if !index.is_built() {
            let lengths: Vec<usize> = self.lists.iter().map(Vec::len).collect();
            *index = PositionalIndex::build(&lengths);
        }
    }

    fn pos_from_rank(&self, rank: usize) -> (usize, usize) {
        if self.lists.len() == 1 {
            return (0, rank);
        }
        let first_len = self.lists[0].len();
        if rank < first_len {
            return (0, rank);
        }
        let last = self.lists.len() - 1;
        let last_len = self.lists[last].len();
        if rank >= self.len - last_len {
            return (last, rank - (self.len - last_len));
        }
        self.ensure_index_built();
        self.index.borrow().pos_from_rank(rank)
    }

    pub(crate) fn rank_from_pos(&self, p: usize, idx: usize) -> usize {
        if p == 0 {
            return idx;
        }
        self.ensure_index_built();
        self.index.borrow().rank_from_pos(p, idx)
    }

    /// Looks up the element at `rank` (Python-style negative indexing).
    pub fn at(&self, rank: isize) -> Option<&T> {
        let rank = self.normalize_rank(rank)?;
        let (p, idx) = self.pos_from_rank(rank);
        Some(&self.lists[p][idx])
    }

    /// Removes and returns the element at `rank`. Out-of-range is `None`.
    pub fn pop(&mut self, rank: isize) -> Option<T> {
        let rank = self.normalize_rank(rank)?;
        let (p, idx) = self.pos_from_rank(rank);
        Some(self.delete_internal(p, idx))
    }

    /// Removes the element at `rank`. Returns whether anything was removed.
    pub fn delete_at(&mut self, rank: isize) -> bool {
        match self.normalize_rank(rank) {
            Some(rank) => {
                let (p, idx) = self.pos_from_rank(rank);
                self.delete_internal(p, idx);
                true
            }
            None => false,
        }
    }

    /// Removes elements in `[start, end)`. Returns the number removed.
    pub fn delete_slice(&mut self, start: isize, end: isize) -> usize {
        let (start, end) = self.normalize_range(start, end);
        if start >= end {
            return 0;
        }
        let removed = end - start;
        if start == 0 && end == self.len {
            self.clear();
            return removed;
        }
        if self.len <= 8 * removed {
            let mut survivors = Vec::with_capacity(self.len - removed);
            survivors.extend(self.slice(0, start as isize));
            survivors.extend(self.slice(end as isize, self.len as isize));
            self.clear();
            self.update(survivors);
        } else {
            for rank in (start..end).rev() {
                let (p, idx) = self.pos_from_rank(rank);
                self.delete_internal(p, idx);
            }
        }
        removed
    }

    /// Returns a flat copy of the elements in `[start, end)`.
    pub fn slice(&self, start: isize, end: isize) -> Vec<T> {
        let (start, end) = self.normalize_range(start, end);
        if start >= end {
            return Vec::new();
        }
        if start == 0 && end == self.len {
            return self.lists.iter().flatten().cloned().collect();
        }
        let mut result = Vec::with_capacity(end - start);
        let (mut p, mut idx) = self.pos_from_rank(start);
        let mut remaining = end - start;
        while remaining > 0 {
            let list = &self.lists[p];
            let take = (list.len() - idx).min(remaining);
            result.extend(list[idx..idx + take].iter().cloned());
            remaining -= take;
            p += 1;
            idx = 0;
        }
        result
    }

    /// Minimal rank at which `value` could be inserted while keeping sort
    /// order, biased left of any equivalent run.
    pub fn bisect_left(&self, value: &T) -> usize {
        if self.maxes.is_empty() {
            return 0;
        }
        let p = bisect_left(&self.maxes, value, &self.comparator);
        if p == self.maxes.len() {
            return self.len;
        }
        let idx = bisect_left(&self.lists[p], value, &self.comparator);
        self.rank_from_pos(p, idx)
    }

    /// As [`Self::bisect_left`], biased right of any equivalent run.
    pub fn bisect_right(&self, value: &T) -> usize {
        if self.maxes.is_empty() {
            return 0;
        }
        let p = bisect_right(&self.maxes, value, &self.comparator);
        if p == self.maxes.len() {
            return self.len;
        }
        let idx = bisect_right(&self.lists[p], value, &self.comparator);
        self.rank_from_pos(p, idx)
    }

    /// First rank `>= start` within `[start, end)` at which `value` occurs.
    pub fn index_of(&self, value: &T, start: isize, end: isize) -> Option<usize> {
        let (start, end) = self.normalize_range(start, end);
        if start >= end {
            return None;
        }
        let lo = self.bisect_left(value);
        let hi = self.bisect_right(value);
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

    /// Number of elements equivalent to `value`.
    pub fn count(&self, value: &T) -> usize {
        self.bisect_right(value) - self.bisect_left(value)
    }

    pub fn clear(&mut self) {
        self.lists.clear();
        self.maxes.clear();
        self.len = 0;
        self.index.borrow_mut().invalidate();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.lists)
    }

    /// Lazy iterator over `[start, end)`, optionally reversed.
    pub fn islice(&self, start: isize, end: isize, reverse: bool) -> Islice<'_, T> {
        let (start, end) = self.normalize_range(start, end);
        self.islice_ranks(start, end, reverse)
    }

    /// Lazy iterator over the comparator range `(min, max)`, with inclusivity
    /// flags per bound. `None` on either bound means unbounded on that side.
    pub fn irange(
        &self,
        min: Option<&T>,
        max: Option<&T>,
        incl_min: bool,
        incl_max: bool,
        reverse: bool,
    ) -> Islice<'_, T> {
        let start = match min {
            None => 0,
            Some(v) if incl_min => self.bisect_left(v),
            Some(v) => self.bisect_right(v),
        };
        let end = match max {
            None => self.len,
            Some(v) if incl_max => self.bisect_right(v),
            Some(v) => self.bisect_left(v),
        };
        self.islice_ranks(start, end, reverse)
    }

    pub(crate) fn islice_ranks(&self, start: usize, end: usize, reverse: bool) -> Islice<'_, T> {
        if start >= end {
            return Islice::empty();
        }
        let front = self.pos_from_rank(start);
        let back = if end == self.len {
            (self.lists.len(), 0)
        } else {
            self.pos_from_rank(end)
        };
        let iter = Iter::with_bounds(&self.lists, front, back);
        if reverse {
            Islice::rev(iter)
        } else {
            Islice::fwd(iter)
        }
    }

    /// Checks every structural invariant; panics on violation. Intended for
    /// tests and debug builds, not as part of the normal control flow.
    pub fn check_invariants(&self) {
        assert!(self.load_factor >= 4, "load factor must be at least 4");
        assert_eq!(self.maxes.len(), self.lists.len(), "maxes/lists length mismatch");
        let total: usize = self.lists.iter().map(Vec::len).sum();
        assert_eq!(self.len, total, "len does not match sum of sublist lengths");

        let last_pos = self.lists.len().saturating_sub(1);
        for (i, list) in self.lists.iter().enumerate() {
            assert!(!list.is_empty(), "sublist {i} is empty");
            for w in list.windows(2) {
                assert_ne!(
                    self.comparator.compare(&w[0], &w[1]),
                    Ordering::Greater,
                    "sublist {i} is not sorted"
                );
            }
            assert_eq!(
                self.comparator.compare(list.last().unwrap(), &self.maxes[i]),
                Ordering::Equal,
                "maxes[{i}] does not match last element"
            );
            if i < last_pos {
                assert!(list.len() <= 2 * self.load_factor, "sublist {i} exceeds 2L");
                assert!(list.len() >= self.load_factor / 2, "sublist {i} underflows L/2");
                let next_first = &self.lists[i + 1][0];
                assert_ne!(
                    self.comparator.compare(list.last().unwrap(), next_first),
                    Ordering::Greater,
                    "sublists {i} and {} are out of order",
                    i + 1
                );
            } else {
                assert!(list.len() <= 2 * self.load_factor, "terminal sublist exceeds 2L");
            }
        }

        let lengths: Vec<usize> = self.lists.iter().map(Vec::len).collect();
        self.index.borrow().check_invariants(&lengths);
    }
}

impl<T: Clone, C: Comparator<T> + Default> Default for TwoLevelList<T, C> {
    fn default() -> Self {
        Self::new(C::default(), DEFAULT_LOAD_FACTOR)
    }
}

impl<T: Clone, C: Comparator<T> + Clone> Clone for TwoLevelList<T, C> {
    fn clone(&self) -> Self {
        TwoLevelList {
            lists: self.lists.clone(),
            maxes: self.maxes.clone(),
            len: self.len,
            index: RefCell::new(self.index.borrow().clone()),
            load_factor: self.load_factor,
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for TwoLevelList<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lists.iter().flatten()).finish()
    }
}

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for TwoLevelList<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new(C::default(), DEFAULT_LOAD_FACTOR);
        list.update(iter);
        list
    }
}

impl<T, C> IntoIterator for TwoLevelList<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self.lists)
    }
}

impl<'a, T, C> IntoIterator for &'a TwoLevelList<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
