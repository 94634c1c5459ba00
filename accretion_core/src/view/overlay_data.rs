// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-overlay draw order and drawable slots.

use alloc::vec::Vec;
use core::ops::Range;

use crate::drawable::{DrawableKind, RegenFlags};
use crate::id::{DrawableKey, MetafileId, ModelId, ViewId};

/// Bookkeeping for one drawable within an overlay.
///
/// A slot owns the range `from..from + len` of the overlay's order buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawableSlot {
    pub(crate) key: DrawableKey,
    pub(crate) kind: DrawableKind,
    pub(crate) model: Option<ModelId>,
    pub(crate) from: usize,
    pub(crate) len: usize,
    pub(crate) flags: RegenFlags,
    pub(crate) detached: bool,
}

impl DrawableSlot {
    pub(crate) fn new(
        key: DrawableKey,
        kind: DrawableKind,
        model: Option<ModelId>,
        from: usize,
    ) -> Self {
        Self {
            key,
            kind,
            model,
            from,
            len: 0,
            flags: RegenFlags::FullRegeneration,
            detached: false,
        }
    }

    /// The drawable.
    #[must_use]
    pub fn key(&self) -> DrawableKey {
        self.key
    }

    /// Classification of the drawable.
    #[must_use]
    pub fn kind(&self) -> DrawableKind {
        self.kind
    }

    /// Owning model, if any.
    #[must_use]
    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    /// The slot's range in the order buffer.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.from..self.from + self.len
    }

    /// Pending regeneration.
    #[must_use]
    pub fn flags(&self) -> RegenFlags {
        self.flags
    }

    /// Whether the drawable was detached since the last synchronization.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

/// Draw-order state of one overlay of a view.
///
/// The order buffer's length equals the sum of the slot lengths, and the
/// slots tile it in table order (see [`check_ranges`](Self::check_ranges)).
#[derive(Clone, Debug)]
pub struct OverlayData {
    pub(crate) slots: Vec<DrawableSlot>,
    pub(crate) order: Vec<MetafileId>,
    pub(crate) order_valid: bool,
    pub(crate) changed: Option<Range<usize>>,
    pub(crate) inherited_from: Option<ViewId>,
    pub(crate) unlinked: bool,
}

impl Default for OverlayData {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            order_valid: true,
            changed: None,
            inherited_from: None,
            unlinked: false,
        }
    }
}

impl OverlayData {
    /// The current draw order.
    #[must_use]
    pub fn order(&self) -> &[MetafileId] {
        &self.order
    }

    /// The slot table, in draw order.
    #[must_use]
    pub fn slots(&self) -> &[DrawableSlot] {
        &self.slots
    }

    /// Whether consumers hold an up-to-date copy of the order.
    ///
    /// Cleared by full invalidation and by breaking inheritance; restored by
    /// the full-order notification at the end of the next synchronization.
    #[must_use]
    pub fn is_order_valid(&self) -> bool {
        self.order_valid
    }

    /// Range of the order buffer modified by the last synchronization.
    #[must_use]
    pub fn changed_range(&self) -> Option<Range<usize>> {
        self.changed.clone()
    }

    /// The view whose order this overlay reuses, if any.
    #[must_use]
    pub fn inherited_from(&self) -> Option<ViewId> {
        self.inherited_from
    }

    /// Keys of the attached drawables, in slot order.
    pub fn keys(&self) -> impl Iterator<Item = DrawableKey> + '_ {
        self.slots.iter().filter(|s| !s.detached).map(|s| s.key)
    }

    /// Sum of the slot lengths.
    #[must_use]
    pub fn slots_len(&self) -> usize {
        self.slots.iter().map(|s| s.len).sum()
    }

    /// Returns `true` if the slots tile the order buffer exactly.
    #[must_use]
    pub fn check_ranges(&self) -> bool {
        let mut expected = 0;
        for slot in &self.slots {
            if slot.from != expected {
                return false;
            }
            expected += slot.len;
        }
        expected == self.order.len()
    }

    /// Returns `true` if any slot has pending work.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(|s| s.detached || s.flags.is_set())
    }

    pub(crate) fn slot_mut(&mut self, key: DrawableKey) -> Option<&mut DrawableSlot> {
        self.slots.iter_mut().find(|s| s.key == key && !s.detached)
    }

    /// Drops the order and flags every slot for full regeneration.
    pub(crate) fn invalidate(&mut self) {
        self.order.clear();
        for slot in &mut self.slots {
            slot.from = 0;
            slot.len = 0;
            slot.flags = RegenFlags::FullRegeneration;
        }
        self.order_valid = false;
    }
}
