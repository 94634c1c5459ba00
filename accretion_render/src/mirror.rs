// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor-side copy of every view's draw orders.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use accretion_core::id::{MetafileId, ViewId};
use accretion_core::observer::OrderObserver;
use accretion_core::overlay::OverlayId;

/// Longest inheritance chain followed by [`OrderMirror::replay_order`].
const MAX_CHAIN: usize = 16;

/// Applies order notifications to per-view, per-overlay replay lists.
///
/// A view overlay that inherits another view's order receives no patches
/// while the link holds; [`replay_order`](Self::replay_order) follows the
/// link to the list that does.
#[derive(Clone, Debug, Default)]
pub struct OrderMirror {
    orders: BTreeMap<(ViewId, OverlayId), Vec<MetafileId>>,
    links: BTreeMap<(ViewId, OverlayId), ViewId>,
}

impl OrderMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The list `view` must replay for `overlay`.
    ///
    /// Inheritance links are followed up to a fixed depth; a cycle or an
    /// overlong chain yields the last list reached.
    #[must_use]
    pub fn replay_order(&self, view: ViewId, overlay: OverlayId) -> &[MetafileId] {
        let mut current = view;
        for _ in 0..MAX_CHAIN {
            match self.links.get(&(current, overlay)) {
                Some(&source) if source != current => current = source,
                _ => break,
            }
        }
        self.own_order(current, overlay)
    }

    /// The list received for `view` itself, ignoring inheritance.
    #[must_use]
    pub fn own_order(&self, view: ViewId, overlay: OverlayId) -> &[MetafileId] {
        self.orders
            .get(&(view, overlay))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The view `overlay` of `view` currently inherits from, if any.
    #[must_use]
    pub fn is_inherited(&self, view: ViewId, overlay: OverlayId) -> Option<ViewId> {
        self.links.get(&(view, overlay)).copied()
    }

    /// Drops everything recorded for `view`.
    pub fn forget_view(&mut self, view: ViewId) {
        self.orders.retain(|(v, _), _| *v != view);
        self.links.retain(|(v, _), _| *v != view);
    }
}

impl OrderObserver for OrderMirror {
    fn on_order_changed(
        &mut self,
        view: ViewId,
        overlay: OverlayId,
        from: usize,
        removed: usize,
        inserted: &[MetafileId],
    ) {
        let order = self.orders.entry((view, overlay)).or_default();
        let end = (from + removed).min(order.len());
        let from = from.min(end);
        order.splice(from..end, inserted.iter().copied());
    }

    fn on_order_reset(&mut self, view: ViewId, overlay: OverlayId, order: &[MetafileId]) {
        let list = self.orders.entry((view, overlay)).or_default();
        list.clear();
        list.extend_from_slice(order);
    }

    fn on_order_inheritance(&mut self, view: ViewId, overlay: OverlayId, source: Option<ViewId>) {
        match source {
            Some(source) => {
                self.links.insert((view, overlay), source);
            }
            None => {
                self.links.remove(&(view, overlay));
            }
        }
    }
}
