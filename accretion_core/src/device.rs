// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The device: an ordered set of views updated together.

use alloc::vec::Vec;

use crate::drawable::ReactorHost;
use crate::id::ViewId;
use crate::inherit;
use crate::observer::OrderObserver;
use crate::overlay::{OverlayId, OverlayMask};
use crate::scene::SceneGraph;
use crate::trace::Tracer;
use crate::view::{SyncOptions, View, ViewProps};

/// Configuration for a [`Device`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Resolve draw-order inheritance between views.
    pub check_inheritance: bool,
    /// Defer re-querying flagged drawables (redraw-only updates).
    pub partial_update: bool,
    /// Overlays to synchronize.
    pub overlays: OverlayMask,
}

impl DeviceConfig {
    /// A device driving a single viewport: no inheritance checks.
    #[must_use]
    pub const fn single_view() -> Self {
        Self {
            check_inheritance: false,
            partial_update: false,
            overlays: OverlayMask::ALL,
        }
    }

    /// A device driving several viewports onto the same scene.
    #[must_use]
    pub const fn multi_view() -> Self {
        Self {
            check_inheritance: true,
            partial_update: false,
            overlays: OverlayMask::ALL,
        }
    }
}

/// Owns views and drives their updates in device order.
///
/// Device order is creation order. It matters for inheritance: a view can
/// only inherit the order of a view created before it, which is always
/// synchronized first.
#[derive(Debug)]
pub struct Device {
    config: DeviceConfig,
    views: Vec<View>,
    next_view_id: u32,
    frame_index: u64,
    check_inheritance: bool,
}

impl Device {
    /// Creates a device without views.
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            views: Vec::new(),
            next_view_id: 0,
            frame_index: 0,
            check_inheritance: config.check_inheritance,
        }
    }

    /// The device configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Switches partial-update mode.
    pub fn set_partial_update(&mut self, enabled: bool) {
        self.config.partial_update = enabled;
    }

    /// Enables or disables inheritance resolution.
    ///
    /// Enabling schedules a check for the next update. Existing links are
    /// kept when disabling; they break on their own once the views diverge.
    pub fn set_check_inheritance(&mut self, enabled: bool) {
        self.config.check_inheritance = enabled;
        self.check_inheritance |= enabled;
    }

    /// Schedules an inheritance check for the next update.
    pub fn request_inheritance_check(&mut self) {
        self.check_inheritance = true;
    }

    /// Number of completed updates.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Creates a view and returns its id.
    pub fn add_view(&mut self, props: ViewProps) -> ViewId {
        let id = ViewId(self.next_view_id);
        self.next_view_id += 1;
        self.views.push(View::new(id, props));
        self.check_inheritance = true;
        id
    }

    /// Destroys a view.
    ///
    /// Inheritance links to and from the view are broken first, and every
    /// drawable is detached so the view unregisters all its reactors.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a view of this device.
    pub fn remove_view(
        &mut self,
        id: ViewId,
        reactors: &mut dyn ReactorHost,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
    ) {
        self.break_overlay_compatibility(id, observer, tracer);
        let idx = self.index_of(id);
        let mut view = self.views.remove(idx);
        view.erase_all(reactors);
    }

    /// Returns the view with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a view of this device.
    #[must_use]
    pub fn view(&self, id: ViewId) -> &View {
        &self.views[self.index_of(id)]
    }

    /// Returns the view with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a view of this device.
    pub fn view_mut(&mut self, id: ViewId) -> &mut View {
        let idx = self.index_of(id);
        &mut self.views[idx]
    }

    /// Replaces the properties of a view and schedules an inheritance check,
    /// since metafile compatibility depends on them.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a view of this device.
    pub fn set_view_props(&mut self, id: ViewId, props: ViewProps) {
        self.view_mut(id).set_props(props);
        self.check_inheritance = true;
    }

    /// Returns `true` if `id` names a view of this device.
    #[must_use]
    pub fn contains_view(&self, id: ViewId) -> bool {
        self.views.iter().any(|v| v.id() == id)
    }

    /// The views, in device order.
    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// The view ids, in device order.
    pub fn view_ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.iter().map(View::id)
    }

    /// Runs one update: preprocess every view, resolve inheritance if
    /// needed, then synchronize every view in device order.
    pub fn update(
        &mut self,
        scene: &mut dyn SceneGraph,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
    ) {
        let frame_index = self.frame_index;

        let mut reshaped = false;
        for view in &mut self.views {
            reshaped |= view.preprocess();
        }

        let check = self.config.check_inheritance && (self.check_inheritance || reshaped);
        if check {
            self.resolve_inheritance(&*scene, observer, tracer);
        }
        self.check_inheritance = false;

        let options = SyncOptions {
            frame_index,
            partial_update: self.config.partial_update,
            overlays: self.config.overlays,
            inheritance_checked: check,
        };
        for idx in 0..self.views.len() {
            let (prior, rest) = self.views.split_at_mut(idx);
            if let Some((view, _)) = rest.split_first_mut() {
                view.sync(prior, scene, observer, tracer, &options);
            }
        }

        self.frame_index += 1;
    }

    /// Breaks every inheritance link of `view`, in both directions.
    ///
    /// # Panics
    ///
    /// Panics if `view` does not name a view of this device.
    pub fn break_overlay_compatibility(
        &mut self,
        view: ViewId,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
    ) {
        for overlay in OverlayId::ALL {
            self.break_overlay_compatibility_for(view, overlay, observer, tracer);
        }
    }

    /// Breaks the inheritance links of one overlay of `view`, in both
    /// directions.
    ///
    /// Every unlinked overlay immediately rebroadcasts its own order, which
    /// still matches what it last copied from its source.
    ///
    /// # Panics
    ///
    /// Panics if `view` does not name a view of this device.
    pub fn break_overlay_compatibility_for(
        &mut self,
        view: ViewId,
        overlay: OverlayId,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
    ) {
        let idx = self.index_of(view);
        let frame_index = self.frame_index;
        for (i, other) in self.views.iter_mut().enumerate() {
            let linked = if i == idx {
                other.overlay(overlay).inherited_from().is_some()
            } else {
                other.overlay(overlay).inherited_from() == Some(view)
            };
            if linked && other.set_inheritance(overlay, None, observer, tracer, frame_index) {
                other.rebroadcast(overlay, observer, tracer, frame_index);
            }
        }
    }

    fn resolve_inheritance(
        &mut self,
        scene: &dyn SceneGraph,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
    ) {
        let overlays = self.config.overlays;
        for idx in 0..self.views.len() {
            let (prior, rest) = self.views.split_at_mut(idx);
            let Some((view, _)) = rest.split_first_mut() else {
                continue;
            };
            for overlay in overlays.iter() {
                let source = inherit::resolve_source(view, prior, overlay, scene);
                view.set_inheritance(overlay, source, observer, tracer, self.frame_index);
            }
        }
    }

    fn index_of(&self, id: ViewId) -> usize {
        self.views
            .iter()
            .position(|v| v.id() == id)
            .unwrap_or_else(|| panic!("unknown view: {id:?}"))
    }
}
