// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification contract for the device / compositor layer.
//!
//! The core decides *what* must be redrawn and *in which order*; the device
//! owns the actual replay and compositing. It learns about changes through two
//! observer traits:
//!
//! - [`OrderObserver`]: per-view, per-overlay draw-order patches, full-order
//!   resets, and draw-order inheritance links. Fired by
//!   [`View::sync`](crate::view::View::sync) and the
//!   [`Device`](crate::device::Device).
//!
//! - [`MetafileObserver`]: metafile lifecycle and flag transitions, fired by
//!   the [`MetafileStore`](crate::metafile::MetafileStore) when metafiles are
//!   recorded, replayed, or erased. A device uses these to patch composited
//!   output without re-recording geometry.
//!
//! # Update loop pseudocode
//!
//! ```rust,ignore
//! fn on_update(device: &mut Device, scene: &mut Scene, compositor: &mut Compositor) {
//!     // Scene notifications were routed to the views since the last frame
//!     // (`View::add`, `View::erase`, `View::on_highlight`, ...).
//!
//!     // Preprocess every view, then synchronize draw orders in device order.
//!     device.update(scene, compositor, &mut Tracer::none());
//!
//!     // Replay: the compositor walks its mirrored orders and plays metafiles.
//!     for id in device.view_ids() {
//!         compositor.replay(id, &store);
//!     }
//! }
//! ```

use kurbo::Rect;

use crate::id::{MetafileId, ViewId};
use crate::metafile::MetafileFlags;
use crate::overlay::OverlayId;

/// Receives draw-order notifications.
///
/// Offsets are indices into the view's order buffer for `overlay`, valid at
/// the moment of the call; a consumer that applies every notification in
/// order reproduces the buffer exactly.
pub trait OrderObserver {
    /// `removed` ids starting at `from` were replaced by `inserted`.
    ///
    /// The synchronizer emits pure removals (`inserted` empty) and pure
    /// insertions (`removed == 0`).
    fn on_order_changed(
        &mut self,
        view: ViewId,
        overlay: OverlayId,
        from: usize,
        removed: usize,
        inserted: &[MetafileId],
    );

    /// The whole order of `overlay` is now `order`.
    fn on_order_reset(&mut self, view: ViewId, overlay: OverlayId, order: &[MetafileId]);

    /// `overlay` of `view` now composites by reusing the order of `source`,
    /// or stops doing so when `source` is `None`.
    fn on_order_inheritance(&mut self, view: ViewId, overlay: OverlayId, source: Option<ViewId>) {
        _ = (view, overlay, source);
    }
}

/// An observer that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl OrderObserver for NoopObserver {
    fn on_order_changed(&mut self, _: ViewId, _: OverlayId, _: usize, _: usize, _: &[MetafileId]) {}

    fn on_order_reset(&mut self, _: ViewId, _: OverlayId, _: &[MetafileId]) {}
}

/// Receives metafile lifecycle and flag-transition notifications.
///
/// All methods default to no-ops.
pub trait MetafileObserver {
    /// A metafile finished recording with the given initial state.
    fn on_metafile_added(&mut self, id: MetafileId, flags: MetafileFlags, extents: Rect) {
        _ = (id, flags, extents);
    }

    /// The layer visibility of a metafile changed since it was recorded or
    /// last replayed.
    fn on_visibility_changed(&mut self, id: MetafileId, visible: bool, extents: Rect) {
        _ = (id, visible, extents);
    }

    /// The fading state of a metafile changed.
    fn on_fading_changed(&mut self, id: MetafileId, faded: bool, extents: Rect) {
        _ = (id, faded, extents);
    }

    /// The highlight state of a metafile changed.
    fn on_highlighting_changed(&mut self, id: MetafileId, highlighted: bool, extents: Rect) {
        _ = (id, highlighted, extents);
    }

    /// A metafile was erased from the store.
    fn on_metafile_erased(&mut self, id: MetafileId, extents: Rect) {
        _ = (id, extents);
    }
}

impl MetafileObserver for NoopObserver {}
