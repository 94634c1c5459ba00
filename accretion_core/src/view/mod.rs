// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Views: per-viewport drawable registries and overlay draw orders.
//!
//! A [`View`] owns one [`DrawableRegistry`] and one [`OverlayData`] per
//! [`OverlayId`]. Each update runs in two steps:
//!
//! 1. [`preprocess`](View::preprocess) reconciles every overlay's slot table
//!    with the registry's live order and turns pending scene notifications
//!    into slot [`RegenFlags`](crate::drawable::RegenFlags).
//! 2. [`sync`](View::sync) walks each overlay's slots, re-queries flagged
//!    drawables, diffs the result against the slot's previous range and
//!    patches the order buffer, reporting every edit to an
//!    [`OrderObserver`](crate::observer::OrderObserver).
//!
//! Views are normally driven by a [`Device`](crate::device::Device), which
//! also resolves draw-order inheritance between views.

mod overlay_data;
mod preprocess;
mod props;
mod sync;

pub use overlay_data::{DrawableSlot, OverlayData};
pub use props::{RenderMode, ViewProps};
pub use sync::SyncOptions;

use alloc::vec::Vec;

use crate::diff::SequenceDiffer;
use crate::drawable::{DrawableKind, DrawableRegistry, ReactorHost};
use crate::id::{DrawableKey, MetafileId, ModelId, ObjectId, ViewId};
use crate::overlay::OverlayId;

/// One viewport onto the scene graph.
#[derive(Debug)]
pub struct View {
    id: ViewId,
    props: ViewProps,
    registry: DrawableRegistry,
    overlays: [OverlayData; OverlayId::COUNT],
    differ: SequenceDiffer,
    scratch: Vec<MetafileId>,
}

impl View {
    /// Creates an empty view.
    #[must_use]
    pub fn new(id: ViewId, props: ViewProps) -> Self {
        Self {
            id,
            props,
            registry: DrawableRegistry::new(id),
            overlays: core::array::from_fn(|_| OverlayData::default()),
            differ: SequenceDiffer::new(),
            scratch: Vec::new(),
        }
    }

    /// The view's identity.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The view's properties.
    #[must_use]
    pub fn props(&self) -> &ViewProps {
        &self.props
    }

    /// Replaces the view's properties.
    ///
    /// Recorded metafiles are not invalidated here; the caller invalidates
    /// the drawables whose aware flags cover the changed properties.
    pub fn set_props(&mut self, props: ViewProps) {
        self.props = props;
    }

    /// The drawable registry.
    #[must_use]
    pub fn registry(&self) -> &DrawableRegistry {
        &self.registry
    }

    /// Order data of one overlay.
    #[must_use]
    pub fn overlay(&self, overlay: OverlayId) -> &OverlayData {
        &self.overlays[overlay.index()]
    }

    /// The current draw order of one overlay.
    #[must_use]
    pub fn order(&self, overlay: OverlayId) -> &[MetafileId] {
        self.overlay(overlay).order()
    }

    // -- Drawable callbacks --

    /// Attaches a drawable. See [`DrawableRegistry::add`].
    pub fn add(
        &mut self,
        key: DrawableKey,
        kind: DrawableKind,
        model: Option<ModelId>,
        overlay: OverlayId,
        reactors: &mut dyn ReactorHost,
    ) -> bool {
        self.registry.add(key, kind, model, overlay, reactors)
    }

    /// Detaches a drawable. See [`DrawableRegistry::erase`].
    pub fn erase(&mut self, key: DrawableKey, reactors: &mut dyn ReactorHost) -> bool {
        self.registry.erase(key, reactors)
    }

    /// Detaches every drawable. See [`DrawableRegistry::erase_all`].
    pub fn erase_all(&mut self, reactors: &mut dyn ReactorHost) {
        self.registry.erase_all(reactors);
    }

    /// Moves a drawable to another overlay.
    pub fn set_overlay(&mut self, key: DrawableKey, overlay: OverlayId) -> bool {
        self.registry.set_overlay(key, overlay)
    }

    /// See [`DrawableRegistry::on_highlight`].
    pub fn on_highlight(&mut self, model: ModelId, path: &[DrawableKey]) {
        self.registry.on_highlight(model, path);
    }

    /// See [`DrawableRegistry::on_erased`].
    pub fn on_erased(&mut self, model: ModelId, erased: ObjectId, parent: ObjectId) -> bool {
        self.registry.on_erased(model, erased, parent)
    }

    /// See [`DrawableRegistry::on_modified`].
    pub fn on_modified(
        &mut self,
        model: ModelId,
        object: ObjectId,
        parent: Option<ObjectId>,
    ) -> bool {
        self.registry.on_modified(model, object, parent)
    }

    /// Marks one drawable for full regeneration.
    pub fn invalidate_drawable(&mut self, key: DrawableKey) -> bool {
        self.registry.invalidate(key)
    }

    // -- Full invalidation --

    /// Drops the order of one overlay; the next synchronization re-queries
    /// every drawable and rebroadcasts the whole order.
    pub fn invalidate_overlay(&mut self, overlay: OverlayId) {
        self.overlays[overlay.index()].invalidate();
    }

    /// Drops the orders of every overlay.
    pub fn invalidate(&mut self) {
        for data in &mut self.overlays {
            data.invalidate();
        }
    }
}
