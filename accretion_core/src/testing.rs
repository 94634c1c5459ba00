// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::drawable::ReactorHost;
use crate::id::{DrawableKey, MetafileId, ModelId, ObjectId, ViewId};
use crate::metafile::AwareFlags;
use crate::observer::OrderObserver;
use crate::overlay::OverlayId;
use crate::scene::{OrderQuery, QueryTarget, SceneGraph};

pub(crate) fn entity(id: u64) -> DrawableKey {
    DrawableKey::Persistent(ObjectId(id))
}

pub(crate) fn ids(raw: &[u64]) -> Vec<MetafileId> {
    raw.iter().copied().map(MetafileId).collect()
}

/// A query the scene received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RecordedQuery {
    pub(crate) view: ViewId,
    pub(crate) overlay: OverlayId,
    pub(crate) key: DrawableKey,
    pub(crate) disable_nested: bool,
}

/// A scene graph answering queries from a per-drawable script.
#[derive(Debug, Default)]
pub(crate) struct ScriptedScene {
    orders: BTreeMap<DrawableKey, Vec<MetafileId>>,
    aware: BTreeMap<DrawableKey, AwareFlags>,
    pub(crate) queries: Vec<RecordedQuery>,
}

impl ScriptedScene {
    pub(crate) fn set(&mut self, key: DrawableKey, order: &[u64]) {
        self.orders.insert(key, ids(order));
    }

    pub(crate) fn set_aware(&mut self, key: DrawableKey, aware: AwareFlags) {
        self.aware.insert(key, aware);
    }

    fn append(&self, key: DrawableKey, out: &mut Vec<MetafileId>) {
        if let Some(order) = self.orders.get(&key) {
            out.extend_from_slice(order);
        }
    }
}

impl SceneGraph for ScriptedScene {
    fn query_draw_order(&mut self, query: &OrderQuery<'_>, out: &mut Vec<MetafileId>) {
        match query.target {
            QueryTarget::Drawable { key, .. } => {
                self.queries.push(RecordedQuery {
                    view: query.view,
                    overlay: query.overlay,
                    key,
                    disable_nested: query.disable_nested,
                });
                self.append(key, out);
            }
            QueryTarget::Overlay(keys) => {
                for &key in keys {
                    self.append(key, out);
                }
            }
        }
    }

    fn aware_flags(&self, drawable: DrawableKey) -> AwareFlags {
        self.aware.get(&drawable).copied().unwrap_or(AwareFlags::ALL)
    }
}

/// One order notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum OrderEvent {
    Changed {
        view: ViewId,
        overlay: OverlayId,
        from: usize,
        removed: usize,
        inserted: Vec<MetafileId>,
    },
    Reset {
        view: ViewId,
        overlay: OverlayId,
        order: Vec<MetafileId>,
    },
    Inheritance {
        view: ViewId,
        overlay: OverlayId,
        source: Option<ViewId>,
    },
}

/// An observer that records every notification.
///
/// Besides the clearable event log it keeps what a consumer would hold: one
/// order per view and overlay, patched as notifications arrive, plus the
/// inheritance links.
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) events: Vec<OrderEvent>,
    mirrors: BTreeMap<(ViewId, OverlayId), Vec<MetafileId>>,
    links: BTreeMap<(ViewId, OverlayId), ViewId>,
}

impl RecordingObserver {
    /// The order consumers hold for one overlay, ignoring inheritance.
    pub(crate) fn mirror(&self, view: ViewId, overlay: OverlayId) -> Vec<MetafileId> {
        self.mirrors
            .get(&(view, overlay))
            .cloned()
            .unwrap_or_default()
    }

    /// The order consumers would replay for one overlay, following
    /// inheritance links.
    pub(crate) fn resolved(&self, view: ViewId, overlay: OverlayId) -> Vec<MetafileId> {
        let mut current = view;
        for _ in 0..16 {
            match self.links.get(&(current, overlay)) {
                Some(&source) => current = source,
                None => break,
            }
        }
        self.mirror(current, overlay)
    }

    /// Number of patches and resets sent for `view` since the log was cleared.
    pub(crate) fn order_events(&self, view: ViewId) -> usize {
        self.events
            .iter()
            .filter(|e| match e {
                OrderEvent::Changed { view: v, .. } | OrderEvent::Reset { view: v, .. } => {
                    *v == view
                }
                OrderEvent::Inheritance { .. } => false,
            })
            .count()
    }
}

impl OrderObserver for RecordingObserver {
    fn on_order_changed(
        &mut self,
        view: ViewId,
        overlay: OverlayId,
        from: usize,
        removed: usize,
        inserted: &[MetafileId],
    ) {
        let order = self.mirrors.entry((view, overlay)).or_default();
        let end = (from + removed).min(order.len());
        order.splice(from.min(end)..end, inserted.iter().copied());
        self.events.push(OrderEvent::Changed {
            view,
            overlay,
            from,
            removed,
            inserted: inserted.to_vec(),
        });
    }

    fn on_order_reset(&mut self, view: ViewId, overlay: OverlayId, order: &[MetafileId]) {
        self.mirrors.insert((view, overlay), order.to_vec());
        self.events.push(OrderEvent::Reset {
            view,
            overlay,
            order: order.to_vec(),
        });
    }

    fn on_order_inheritance(&mut self, view: ViewId, overlay: OverlayId, source: Option<ViewId>) {
        match source {
            Some(source) => self.links.insert((view, overlay), source),
            None => self.links.remove(&(view, overlay)),
        };
        self.events.push(OrderEvent::Inheritance {
            view,
            overlay,
            source,
        });
    }
}

/// A reactor host that records registrations.
#[derive(Debug, Default)]
pub(crate) struct Reactors {
    pub(crate) attached: Vec<(ModelId, ViewId)>,
    pub(crate) detached: Vec<(ModelId, ViewId)>,
}

impl ReactorHost for Reactors {
    fn attach_reactor(&mut self, model: ModelId, view: ViewId) {
        self.attached.push((model, view));
    }

    fn detach_reactor(&mut self, model: ModelId, view: ViewId) {
        self.detached.push((model, view));
    }
}
