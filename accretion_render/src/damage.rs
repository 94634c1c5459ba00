// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial re-rendering.

use alloc::vec::Vec;

use accretion_core::id::MetafileId;
use accretion_core::metafile::MetafileFlags;
use accretion_core::observer::MetafileObserver;
use kurbo::Rect;

/// A region of the output that needs re-rendering.
///
/// Devices can use this to limit replay to the areas whose metafiles
/// changed since the last frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire output needs redrawing.
    #[default]
    Full,
    /// Axis-aligned rectangles in world coordinates.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Adds one rectangle. Zero-area rectangles are ignored.
    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_zero_area() {
            return;
        }
        match self {
            Self::Full => {}
            Self::Rects(rects) => rects.push(rect),
            Self::None => *self = Self::Rects(alloc::vec![rect]),
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match other {
            Self::None => {}
            Self::Full => *self = Self::Full,
            Self::Rects(b) => match self {
                Self::Full => {}
                Self::Rects(a) => a.extend_from_slice(b),
                Self::None => *self = Self::Rects(b.clone()),
            },
        }
    }

    /// Returns the accumulated damage and resets the region to
    /// [`None`](Self::None).
    pub fn take(&mut self) -> Self {
        core::mem::replace(self, Self::None)
    }

    /// Bounding box of the damage, or `None` for full or no damage.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::Full | Self::None => None,
        }
    }
}

/// Accumulates the extents of metafiles whose display state changed.
///
/// Additions, erasures, and visibility, fading and highlight transitions all
/// damage the metafile's extents.
#[derive(Clone, Debug, PartialEq)]
pub struct MetafileDamage {
    region: DamageRegion,
}

impl Default for MetafileDamage {
    fn default() -> Self {
        Self::new()
    }
}

impl MetafileDamage {
    /// Creates a tracker with no damage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            region: DamageRegion::None,
        }
    }

    /// The damage accumulated so far.
    #[must_use]
    pub fn region(&self) -> &DamageRegion {
        &self.region
    }

    /// Returns the accumulated damage and starts over.
    pub fn take(&mut self) -> DamageRegion {
        self.region.take()
    }
}

impl MetafileObserver for MetafileDamage {
    fn on_metafile_added(&mut self, _: MetafileId, _: MetafileFlags, extents: Rect) {
        self.region.add_rect(extents);
    }

    fn on_visibility_changed(&mut self, _: MetafileId, _: bool, extents: Rect) {
        self.region.add_rect(extents);
    }

    fn on_fading_changed(&mut self, _: MetafileId, _: bool, extents: Rect) {
        self.region.add_rect(extents);
    }

    fn on_highlighting_changed(&mut self, _: MetafileId, _: bool, extents: Rect) {
        self.region.add_rect(extents);
    }

    fn on_metafile_erased(&mut self, _: MetafileId, extents: Rect) {
        self.region.add_rect(extents);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn merge_follows_full_and_none() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut region = DamageRegion::None;
        region.merge(&DamageRegion::Rects(vec![r]));
        assert_eq!(region, DamageRegion::Rects(vec![r]));
        region.merge(&DamageRegion::None);
        assert_eq!(region, DamageRegion::Rects(vec![r]));
        region.merge(&DamageRegion::Full);
        assert_eq!(region, DamageRegion::Full);
        region.merge(&DamageRegion::Rects(vec![r]));
        assert_eq!(region, DamageRegion::Full, "full damage absorbs rects");
    }

    #[test]
    fn add_rect_and_take() {
        let mut region = DamageRegion::None;
        region.add_rect(Rect::new(0.0, 0.0, 0.0, 5.0));
        assert!(region.is_empty(), "zero-area rects do not damage");
        region.add_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        region.add_rect(Rect::new(4.0, 1.0, 6.0, 3.0));
        assert_eq!(region.bounds(), Some(Rect::new(0.0, 0.0, 6.0, 3.0)));

        let taken = region.take();
        assert!(region.is_empty());
        assert!(matches!(taken, DamageRegion::Rects(ref r) if r.len() == 2));
    }

    #[test]
    fn metafile_transitions_damage_extents() {
        let extents = Rect::new(1.0, 1.0, 3.0, 3.0);
        let mut damage = MetafileDamage::new();
        assert!(damage.region().is_empty());
        damage.on_visibility_changed(MetafileId(1), false, extents);
        damage.on_metafile_erased(MetafileId(2), extents);
        assert_eq!(damage.take(), DamageRegion::Rects(vec![extents, extents]));
        assert!(damage.region().is_empty());
    }
}
