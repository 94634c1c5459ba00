// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-order inheritance between views.
//!
//! Two views showing the same drawables of an overlay, in the same order,
//! with metafiles valid for both views' properties, produce the same draw
//! order. The later view (in device order) can then reuse the earlier one's
//! order instead of querying and diffing its own. The
//! [`Device`](crate::device::Device) resolves links before synchronizing and
//! breaks them as soon as either predicate stops holding.

use crate::id::ViewId;
use crate::overlay::OverlayId;
use crate::scene::SceneGraph;
use crate::view::{OverlayData, View};

/// Returns `true` if `other` shows exactly the drawables of `data`, in the
/// same order, in `overlay`.
#[must_use]
pub fn is_content_compatible_overlay(other: &View, data: &OverlayData, overlay: OverlayId) -> bool {
    other.overlay(overlay).keys().eq(data.keys())
}

/// Returns `true` if every drawable of `view`'s `overlay` reports its
/// metafiles valid for `other`'s properties.
#[must_use]
pub fn is_metafiles_compatible_overlays(
    view: &View,
    overlay: OverlayId,
    other: &View,
    scene: &dyn SceneGraph,
) -> bool {
    view.overlay(overlay)
        .keys()
        .all(|key| scene.metafiles_compatible(key, view.props(), other.props()))
}

/// Finds the first view in `prior` whose `overlay` order `view` can inherit.
///
/// Empty overlays never inherit.
#[must_use]
pub fn resolve_source(
    view: &View,
    prior: &[View],
    overlay: OverlayId,
    scene: &dyn SceneGraph,
) -> Option<ViewId> {
    let data = view.overlay(overlay);
    data.keys().next()?;
    prior
        .iter()
        .find(|other| {
            is_content_compatible_overlay(other, data, overlay)
                && is_metafiles_compatible_overlays(view, overlay, other, scene)
        })
        .map(View::id)
}
