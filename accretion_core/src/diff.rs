// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered-sequence differencing.
//!
//! [`SequenceDiffer`] computes a run-length-encoded edit script
//! ([`ActionSequence`]) that turns an original sequence of ids into a new
//! one. It is tuned for draw orders, where most entries survive a
//! regeneration unchanged:
//!
//! - A single forward scan over the new sequence matches ids against a map of
//!   original positions. Matches must be strictly increasing in original
//!   position to count as unchanged; anything else is re-inserted.
//! - Original positions never matched form the removal set.
//! - The matched runs and the removal set are merged into one coalesced
//!   script.
//!
//! Duplicate ids on either side are treated as corrupt input. The differ
//! then returns a blanket "remove everything, add everything" script, which
//! is always correct, and reports [`DiffOutcome::Fallback`].
//!
//! Scripts are applied in two passes: every removal first, then every
//! insertion. [`ActionSequence::removals`] and
//! [`ActionSequence::insertions`] yield offsets in the coordinates of the
//! buffer as it is during each pass, so a consumer can patch a buffer in
//! place and report each edit as it goes.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::id::MetafileId;

/// Kind of a run in an edit script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Entries kept as they are.
    NoChange,
    /// Entries inserted from the new sequence.
    Add,
    /// Entries dropped from the original sequence.
    Remove,
}

/// One run of an edit script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiffAction {
    /// What happens to the entries of this run.
    pub kind: ActionKind,
    /// Number of entries in the run. Never zero.
    pub count: usize,
}

impl DiffAction {
    /// Creates a run.
    #[inline]
    #[must_use]
    pub const fn new(kind: ActionKind, count: usize) -> Self {
        Self { kind, count }
    }
}

/// A coalesced edit script.
///
/// Adjacent runs of the same kind are merged on [`push`](Self::push) and
/// zero-length runs are dropped, so two scripts describing the same edit
/// compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionSequence {
    actions: Vec<DiffAction>,
}

impl ActionSequence {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a run, merging it into the last run if the kinds match.
    pub fn push(&mut self, kind: ActionKind, count: usize) {
        if count == 0 {
            return;
        }
        match self.actions.last_mut() {
            Some(last) if last.kind == kind => last.count += count,
            _ => self.actions.push(DiffAction::new(kind, count)),
        }
    }

    /// Removes every run.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// The runs, front to back.
    #[must_use]
    pub fn as_slice(&self) -> &[DiffAction] {
        &self.actions
    }

    /// Number of runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the script has no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns `true` if applying the script leaves the buffer untouched.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.actions.iter().all(|a| a.kind == ActionKind::NoChange)
    }

    /// Total number of removed entries.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.count_of(ActionKind::Remove)
    }

    /// Total number of inserted entries.
    #[must_use]
    pub fn added_count(&self) -> usize {
        self.count_of(ActionKind::Add)
    }

    /// Yields `(at, count)` for every removal, in order.
    ///
    /// `at` is relative to the start of the original range, after all
    /// earlier removals have been applied.
    pub fn removals(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut cursor = 0;
        self.actions.iter().filter_map(move |a| match a.kind {
            ActionKind::NoChange => {
                cursor += a.count;
                None
            }
            ActionKind::Remove => Some((cursor, a.count)),
            ActionKind::Add => None,
        })
    }

    /// Yields `(at, src, count)` for every insertion, in order.
    ///
    /// `at` is relative to the start of the range after the removal pass and
    /// all earlier insertions; `src` indexes the new sequence.
    pub fn insertions(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let mut cursor = 0;
        let mut src = 0;
        self.actions.iter().filter_map(move |a| match a.kind {
            ActionKind::NoChange => {
                cursor += a.count;
                src += a.count;
                None
            }
            ActionKind::Add => {
                let item = (cursor, src, a.count);
                cursor += a.count;
                src += a.count;
                Some(item)
            }
            ActionKind::Remove => None,
        })
    }

    /// Applies the script to `old`, taking inserted entries from `new`.
    ///
    /// # Panics
    ///
    /// Panics if the script was not computed for these two sequences.
    #[must_use]
    pub fn apply<T: Clone>(&self, old: &[T], new: &[T]) -> Vec<T> {
        let mut buf = old.to_vec();
        for (at, count) in self.removals() {
            buf.drain(at..at + count);
        }
        for (at, src, count) in self.insertions() {
            buf.splice(at..at, new[src..src + count].iter().cloned());
        }
        buf
    }

    fn count_of(&self, kind: ActionKind) -> usize {
        self.actions
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.count)
            .sum()
    }
}

/// How the last comparison was resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DiffOutcome {
    /// Both sequences are equal; the script is a single `NoChange` run (or
    /// empty when both sides are empty).
    #[default]
    Identical,
    /// The script describes a real edit.
    Edited,
    /// Duplicate ids were found; the script replaces everything.
    Fallback,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    pos: usize,
    touched: bool,
    seen: bool,
}

/// Map-based differ for ordered id sequences.
///
/// Long-lived: the original sequence, its position map, and all scratch
/// buffers are reused across comparisons. The map is rebuilt lazily, only
/// when [`compare`](Self::compare) needs it after
/// [`set_original`](Self::set_original).
///
/// # Example
///
/// ```
/// use accretion_core::diff::{ActionKind, DiffAction, SequenceDiffer};
///
/// let mut differ = SequenceDiffer::new();
/// let script = differ.diff(&[1_u64, 2, 3, 4], &[1, 3, 4]);
/// assert_eq!(
///     script.as_slice(),
///     &[
///         DiffAction::new(ActionKind::NoChange, 1),
///         DiffAction::new(ActionKind::Remove, 1),
///         DiffAction::new(ActionKind::NoChange, 2),
///     ]
/// );
/// ```
#[derive(Debug)]
pub struct SequenceDiffer<T = MetafileId> {
    original: Vec<T>,
    map: BTreeMap<T, Slot>,
    map_stale: bool,
    unique: bool,
    runs: ActionSequence,
    removed: Vec<usize>,
    actions: ActionSequence,
    outcome: DiffOutcome,
}

impl<T: Ord + Copy> Default for SequenceDiffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Copy> SequenceDiffer<T> {
    /// Creates a differ with an empty original.
    #[must_use]
    pub fn new() -> Self {
        Self {
            original: Vec::new(),
            map: BTreeMap::new(),
            map_stale: false,
            unique: true,
            runs: ActionSequence::new(),
            removed: Vec::new(),
            actions: ActionSequence::new(),
            outcome: DiffOutcome::Identical,
        }
    }

    /// Replaces the original sequence.
    pub fn set_original(&mut self, original: &[T]) {
        self.original.clear();
        self.original.extend_from_slice(original);
        self.map_stale = true;
    }

    /// The current original sequence.
    #[must_use]
    pub fn original(&self) -> &[T] {
        &self.original
    }

    /// How the last comparison was resolved.
    #[must_use]
    pub fn outcome(&self) -> DiffOutcome {
        self.outcome
    }

    /// The script produced by the last comparison.
    #[must_use]
    pub fn actions(&self) -> &ActionSequence {
        &self.actions
    }

    /// Sets the original and compares `new` against it.
    pub fn diff(&mut self, original: &[T], new: &[T]) -> &ActionSequence {
        self.set_original(original);
        self.compare(new)
    }

    /// Computes the script turning the original into `new`.
    pub fn compare(&mut self, new: &[T]) -> &ActionSequence {
        self.actions.clear();
        let old_len = self.original.len();

        if old_len == 0 || new.is_empty() {
            self.actions.push(ActionKind::Add, new.len());
            self.actions.push(ActionKind::Remove, old_len);
            self.outcome = if self.actions.is_empty() {
                DiffOutcome::Identical
            } else {
                DiffOutcome::Edited
            };
            return &self.actions;
        }

        self.rebuild_map();
        if !self.unique || !self.scan(new) {
            return self.fallback(new.len());
        }

        self.removed.clear();
        self.removed.extend(
            self.map
                .values()
                .filter(|slot| !slot.touched)
                .map(|slot| slot.pos),
        );
        self.removed.sort_unstable();

        if self.removed.is_empty()
            && matches!(self.runs.as_slice(), [run] if run.kind == ActionKind::NoChange)
        {
            self.actions.push(ActionKind::NoChange, old_len);
            self.outcome = DiffOutcome::Identical;
            return &self.actions;
        }

        self.merge();
        self.outcome = DiffOutcome::Edited;
        &self.actions
    }

    fn rebuild_map(&mut self) {
        if !self.map_stale {
            for slot in self.map.values_mut() {
                slot.touched = false;
                slot.seen = false;
            }
            return;
        }
        self.map.clear();
        self.unique = true;
        for (pos, &id) in self.original.iter().enumerate() {
            let slot = Slot {
                pos,
                touched: false,
                seen: false,
            };
            if self.map.insert(id, slot).is_some() {
                self.unique = false;
            }
        }
        self.map_stale = false;
    }

    /// Forward scan over `new`, building the per-entry run list.
    ///
    /// Returns `false` if an id occurs twice in `new`.
    fn scan(&mut self, new: &[T]) -> bool {
        self.runs.clear();
        let mut cursor: Option<usize> = None;
        for id in new {
            let Some(slot) = self.map.get_mut(id) else {
                self.runs.push(ActionKind::Add, 1);
                continue;
            };
            if slot.seen {
                return false;
            }
            slot.seen = true;
            if cursor.is_none_or(|c| slot.pos > c) {
                slot.touched = true;
                cursor = Some(slot.pos);
                self.runs.push(ActionKind::NoChange, 1);
            } else {
                self.runs.push(ActionKind::Add, 1);
            }
        }
        true
    }

    /// Interleaves the removal set (original coordinates) with the runs.
    fn merge(&mut self) {
        let mut old_pos = 0;
        let mut next = 0;
        for run in self.runs.as_slice() {
            if run.kind == ActionKind::Add {
                self.actions.push(ActionKind::Add, run.count);
                continue;
            }
            let mut left = run.count;
            while left > 0 {
                while self.removed.get(next) == Some(&old_pos) {
                    self.actions.push(ActionKind::Remove, 1);
                    old_pos += 1;
                    next += 1;
                }
                let until = self.removed.get(next).map_or(usize::MAX, |&r| r - old_pos);
                let take = left.min(until);
                self.actions.push(ActionKind::NoChange, take);
                old_pos += take;
                left -= take;
            }
        }
        self.actions.push(ActionKind::Remove, self.removed.len() - next);
    }

    fn fallback(&mut self, new_len: usize) -> &ActionSequence {
        self.actions.clear();
        self.actions.push(ActionKind::Remove, self.original.len());
        self.actions.push(ActionKind::Add, new_len);
        self.outcome = DiffOutcome::Fallback;
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn runs(script: &ActionSequence) -> Vec<(ActionKind, usize)> {
        script.as_slice().iter().map(|a| (a.kind, a.count)).collect()
    }

    use ActionKind::{Add, NoChange, Remove};

    #[test]
    fn push_coalesces_and_drops_empty_runs() {
        let mut seq = ActionSequence::new();
        seq.push(NoChange, 2);
        seq.push(NoChange, 1);
        seq.push(Add, 0);
        seq.push(Remove, 4);
        assert_eq!(runs(&seq), vec![(NoChange, 3), (Remove, 4)]);
        assert_eq!(seq.removed_count(), 4);
        assert_eq!(seq.added_count(), 0);
        assert!(!seq.is_unchanged());
    }

    #[test]
    fn removal_inside_sequence() {
        let mut differ = SequenceDiffer::new();
        let script = differ.diff(&[1_u64, 2, 3, 4], &[1, 3, 4]).clone();
        assert_eq!(runs(&script), vec![(NoChange, 1), (Remove, 1), (NoChange, 2)]);
        assert_eq!(script.apply(&[1, 2, 3, 4], &[1, 3, 4]), vec![1, 3, 4]);
        assert_eq!(differ.outcome(), DiffOutcome::Edited);
    }

    #[test]
    fn empty_original_is_one_add_run() {
        let mut differ = SequenceDiffer::new();
        let script = differ.diff(&[], &[7_u64, 8]).clone();
        assert_eq!(runs(&script), vec![(Add, 2)]);
        assert_eq!(script.apply(&[], &[7, 8]), vec![7, 8]);
    }

    #[test]
    fn empty_new_is_one_remove_run() {
        let mut differ = SequenceDiffer::new();
        let script = differ.diff(&[5_u64, 6], &[]).clone();
        assert_eq!(runs(&script), vec![(Remove, 2)]);
        assert!(script.apply(&[5, 6], &[]).is_empty());
    }

    #[test]
    fn identical_sequences_are_one_no_change_run() {
        let mut differ = SequenceDiffer::new();
        let script = differ.diff(&[1_u64, 2, 3], &[1, 2, 3]);
        assert_eq!(runs(script), vec![(NoChange, 3)]);
        assert!(script.is_unchanged());
        assert_eq!(script.removals().count() + script.insertions().count(), 0);
        assert_eq!(differ.outcome(), DiffOutcome::Identical);
    }

    #[test]
    fn both_empty_is_unchanged() {
        let mut differ = SequenceDiffer::<u64>::new();
        assert!(differ.diff(&[], &[]).is_unchanged());
        assert_eq!(differ.outcome(), DiffOutcome::Identical);
    }

    #[test]
    fn duplicate_in_original_falls_back() {
        let mut differ = SequenceDiffer::new();
        let script = differ.diff(&[1_u64, 2, 1, 3], &[2, 1]).clone();
        assert_eq!(runs(&script), vec![(Remove, 4), (Add, 2)]);
        assert_eq!(differ.outcome(), DiffOutcome::Fallback);
        assert_eq!(script.apply(&[1, 2, 1, 3], &[2, 1]), vec![2, 1]);
    }

    #[test]
    fn duplicate_in_new_falls_back() {
        let mut differ = SequenceDiffer::new();
        let script = differ.diff(&[1_u64, 2, 3], &[1, 4, 1]).clone();
        assert_eq!(runs(&script), vec![(Remove, 3), (Add, 3)]);
        assert_eq!(differ.outcome(), DiffOutcome::Fallback);
    }

    #[test]
    fn out_of_order_match_is_reinserted() {
        let mut differ = SequenceDiffer::new();
        let old = [1_u64, 2, 3];
        let new = [3, 1, 2];
        let script = differ.diff(&old, &new).clone();
        // 3 seeds the cursor at the end; 1 and 2 come back as inserts.
        assert_eq!(
            runs(&script),
            vec![(Remove, 2), (NoChange, 1), (Add, 2)],
            "got {script:?}"
        );
        assert_eq!(script.apply(&old, &new), new.to_vec());
    }

    #[test]
    fn insertions_and_removals_interleave() {
        let mut differ = SequenceDiffer::new();
        let old = [10_u64, 11, 12, 13, 14];
        let new = [10, 20, 12, 21, 22, 14, 23];
        let script = differ.diff(&old, &new).clone();
        assert_eq!(
            runs(&script),
            vec![
                (NoChange, 1),
                (Add, 1),
                (Remove, 1),
                (NoChange, 1),
                (Add, 2),
                (Remove, 1),
                (NoChange, 1),
                (Add, 1),
            ]
        );
        assert_eq!(script.removals().collect::<Vec<_>>(), vec![(1, 1), (2, 1)]);
        assert_eq!(
            script.insertions().collect::<Vec<_>>(),
            vec![(1, 1, 1), (3, 3, 2), (6, 6, 1)]
        );
        assert_eq!(script.apply(&old, &new), new.to_vec());
    }

    #[test]
    fn original_is_reused_across_comparisons() {
        let mut differ = SequenceDiffer::new();
        differ.set_original(&[1_u64, 2, 3]);
        assert_eq!(runs(differ.compare(&[1, 3])), vec![(NoChange, 1), (Remove, 1), (NoChange, 1)]);
        assert_eq!(runs(differ.compare(&[1, 2, 3])), vec![(NoChange, 3)]);
        assert_eq!(runs(differ.compare(&[2, 3, 4])), vec![(Remove, 1), (NoChange, 2), (Add, 1)]);
        assert_eq!(differ.original(), &[1, 2, 3]);
    }

    #[test]
    fn stale_map_is_rebuilt_after_set_original() {
        let mut differ = SequenceDiffer::new();
        let _ = differ.diff(&[1_u64, 1], &[1]);
        assert_eq!(differ.outcome(), DiffOutcome::Fallback);
        let script = differ.diff(&[1, 2], &[2]);
        assert_eq!(runs(script), vec![(Remove, 1), (NoChange, 1)]);
    }

    /// Xorshift64 generator; deterministic across platforms.
    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }
    }

    /// A random subsequence of `old` with fresh ids and a few swaps mixed in.
    fn mutate(rng: &mut XorShift, old: &[u64], fresh: &mut u64) -> Vec<u64> {
        let mut new = Vec::new();
        for &id in old {
            match rng.below(8) {
                0 => {}
                1 => {
                    *fresh += 1;
                    new.push(*fresh);
                    new.push(id);
                }
                _ => new.push(id),
            }
        }
        if new.len() > 2 && rng.below(3) == 0 {
            let a = rng.below(new.len() as u64) as usize;
            let b = rng.below(new.len() as u64) as usize;
            new.swap(a, b);
        }
        if rng.below(4) == 0 {
            *fresh += 1;
            new.push(*fresh);
        }
        new
    }

    #[test]
    fn random_edits_round_trip() {
        let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
        let mut differ = SequenceDiffer::new();
        let mut fresh = 1_000;
        for round in 0..500 {
            let len = rng.below(24) as usize;
            let old: Vec<u64> = (0..len as u64).map(|i| i * 3 + 1).collect();
            let new = mutate(&mut rng, &old, &mut fresh);

            let script = differ.diff(&old, &new).clone();
            assert_ne!(differ.outcome(), DiffOutcome::Fallback, "round {round}");
            assert_eq!(script.apply(&old, &new), new, "round {round}: {script:?}");
            assert_eq!(
                old.len() - script.removed_count() + script.added_count(),
                new.len(),
                "round {round}"
            );
            if old == new {
                assert!(script.is_unchanged(), "round {round}");
            }
        }
    }
}
