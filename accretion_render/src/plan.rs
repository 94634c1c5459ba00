// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replay plan: the metafiles one view draws, back to front.

use alloc::vec::Vec;

use accretion_core::id::{MetafileId, ViewId};
use accretion_core::metafile::{MetafileFlags, MetafileStore};
use accretion_core::overlay::{OverlayId, OverlayMask};

use crate::mirror::OrderMirror;

/// A single metafile to replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayItem {
    /// Overlay the metafile is composited in.
    pub overlay: OverlayId,
    /// The metafile.
    pub metafile: MetafileId,
    /// Cached display flags at planning time.
    pub flags: MetafileFlags,
}

/// An ordered list of metafiles for one view.
///
/// Items are produced overlay by overlay in compositing order, and within an
/// overlay in draw order. Invisible metafiles, shared empty metafiles and
/// ids unknown to the store are skipped.
#[derive(Clone, Debug, Default)]
pub struct ReplayPlan {
    /// The view this plan draws.
    pub view: ViewId,
    /// Items in back-to-front order.
    pub items: Vec<ReplayItem>,
}

impl ReplayPlan {
    /// Creates an empty plan for the given view.
    #[must_use]
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            items: Vec::new(),
        }
    }

    /// Builds the plan of `view` from the mirrored orders.
    #[must_use]
    pub fn build(
        mirror: &OrderMirror,
        store: &MetafileStore,
        view: ViewId,
        overlays: OverlayMask,
    ) -> Self {
        let mut plan = Self::new(view);
        plan.rebuild(mirror, store, overlays);
        plan
    }

    /// Rebuilds the plan in place, reusing its allocation.
    pub fn rebuild(&mut self, mirror: &OrderMirror, store: &MetafileStore, overlays: OverlayMask) {
        self.items.clear();
        for overlay in overlays.iter() {
            for &metafile in mirror.replay_order(self.view, overlay) {
                if metafile.is_reserved_empty() {
                    continue;
                }
                let Some(flags) = store.flags(metafile) else {
                    continue;
                };
                if flags.visible {
                    self.items.push(ReplayItem {
                        overlay,
                        metafile,
                        flags,
                    });
                }
            }
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use accretion_core::id::{DrawableKey, LayerKey, ObjectId};
    use accretion_core::metafile::{
        AwareFlags, DrawOp, EmptyMetafileCache, LayerTraits, MetafileDesc, TraitsSource,
    };
    use accretion_core::observer::{NoopObserver, OrderObserver};
    use kurbo::{Circle, Point};

    use super::*;

    /// Layer 1 is frozen; everything else is visible.
    struct Traits;

    impl TraitsSource for Traits {
        fn layer_traits(&self, layer: LayerKey) -> LayerTraits {
            LayerTraits {
                visible: layer != LayerKey(1),
                faded: false,
            }
        }

        fn is_highlighted(&self, _: DrawableKey) -> bool {
            false
        }
    }

    fn record(
        store: &mut MetafileStore,
        empty: &mut EmptyMetafileCache,
        object: u64,
        layer: u32,
        ops: &[DrawOp],
    ) -> MetafileId {
        store.begin_metafile(MetafileDesc {
            drawable: DrawableKey::Persistent(ObjectId(object)),
            layer: LayerKey(layer),
            aware: AwareFlags::NONE,
        });
        for op in ops {
            store.record(op.clone());
        }
        store.end_metafile(&Traits, empty, &mut NoopObserver)
    }

    #[test]
    fn plan_skips_hidden_and_empty_metafiles() {
        let mut store = MetafileStore::new();
        let mut empty = EmptyMetafileCache::new();
        let circle = DrawOp::Circle(Circle::new(Point::ORIGIN, 1.0));
        let shown = record(&mut store, &mut empty, 1, 0, &[circle.clone()]);
        let hidden = record(&mut store, &mut empty, 2, 1, &[circle.clone()]);
        let nothing = record(&mut store, &mut empty, 3, 0, &[DrawOp::SetColor(0)]);
        let top = record(&mut store, &mut empty, 4, 0, &[circle]);
        assert!(nothing.is_reserved_empty());

        let view = ViewId(0);
        let mut mirror = OrderMirror::new();
        mirror.on_order_reset(view, OverlayId::Main, &[shown, hidden, nothing]);
        mirror.on_order_reset(view, OverlayId::Sprite, &[top]);
        mirror.on_order_reset(view, OverlayId::UserBackground, &[MetafileId(999)]);

        let plan = ReplayPlan::build(&mirror, &store, view, OverlayMask::ALL);
        let got: Vec<_> = plan.items.iter().map(|i| (i.overlay, i.metafile)).collect();
        assert_eq!(got, [(OverlayId::Main, shown), (OverlayId::Sprite, top)]);

        let main_only = ReplayPlan::build(&mirror, &store, view, OverlayMask::MAIN_ONLY);
        assert_eq!(main_only.items.len(), 1);
    }

    #[test]
    fn inherited_views_replay_the_source_order() {
        let mut store = MetafileStore::new();
        let mut empty = EmptyMetafileCache::new();
        let line = DrawOp::Polyline(alloc::vec![Point::ORIGIN, Point::new(1.0, 1.0)]);
        let id = record(&mut store, &mut empty, 1, 0, &[line]);

        let (a, b) = (ViewId(0), ViewId(1));
        let mut mirror = OrderMirror::new();
        mirror.on_order_reset(a, OverlayId::Main, &[id]);
        mirror.on_order_inheritance(b, OverlayId::Main, Some(a));

        let mut plan = ReplayPlan::new(b);
        plan.rebuild(&mirror, &store, OverlayMask::ALL);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].metafile, id);
        assert!(plan.items[0].flags.visible);
        plan.clear();
        assert!(plan.items.is_empty());
    }
}
