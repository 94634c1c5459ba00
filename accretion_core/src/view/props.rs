// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View properties that metafiles may depend on.

use kurbo::Affine;

use crate::metafile::AwareFlags;

/// How a view shades geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// 2D wireframe.
    #[default]
    Wireframe2d,
    /// 3D wireframe.
    Wireframe3d,
    /// Wireframe with hidden lines removed.
    HiddenLine,
    /// Flat-shaded faces.
    FlatShaded,
    /// Smooth-shaded faces.
    GouraudShaded,
}

/// The properties of a view that recorded geometry can depend on.
///
/// A metafile records which of these it depends on in its
/// [`AwareFlags`]; two views can share a metafile (and inherit draw orders)
/// only if they agree on those properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewProps {
    /// World-to-device transform.
    pub transform: Affine,
    /// Unit viewing direction in world space.
    pub view_direction: [f64; 3],
    /// Shading mode.
    pub render_mode: RenderMode,
    /// Linetype pattern scale.
    pub linetype_scale: f64,
    /// Lineweight display scale.
    pub lineweight_scale: f64,
}

impl Default for ViewProps {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            view_direction: [0.0, 0.0, 1.0],
            render_mode: RenderMode::default(),
            linetype_scale: 1.0,
            lineweight_scale: 1.0,
        }
    }
}

impl ViewProps {
    /// Returns `true` if `self` and `other` agree on every property named by
    /// `aware`.
    #[must_use]
    pub fn is_compatible(&self, other: &Self, aware: AwareFlags) -> bool {
        (!aware.contains(AwareFlags::VIEWPORT_TRANSFORM) || self.transform == other.transform)
            && (!aware.contains(AwareFlags::VIEW_DIRECTION)
                || self.view_direction == other.view_direction)
            && (!aware.contains(AwareFlags::RENDER_MODE) || self.render_mode == other.render_mode)
            && (!aware.contains(AwareFlags::LINETYPE_SCALE)
                || self.linetype_scale == other.linetype_scale)
            && (!aware.contains(AwareFlags::LINEWEIGHT_SCALE)
                || self.lineweight_scale == other.lineweight_scale)
    }
}
