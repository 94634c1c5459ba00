// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing overlays.
//!
//! Every view keeps an independent draw order per overlay. Overlays are
//! composited back-to-front in [`OverlayId::ALL`] order.

/// A compositing overlay of a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum OverlayId {
    /// User background graphics, composited below the main scene.
    UserBackground,
    /// The main scene.
    #[default]
    Main,
    /// Drawables rendered directly on top of the main scene.
    Direct,
    /// Highlighted geometry.
    Highlight,
    /// High-contrast geometry (e.g. grips in contrast style).
    Contrast,
    /// User foreground graphics.
    UserForeground,
    /// Sprite geometry, redrawn without touching lower overlays.
    Sprite,
    /// Direct-render geometry that must stay on top of everything.
    DirectTopmost,
}

impl OverlayId {
    /// Number of overlays.
    pub const COUNT: usize = 8;

    /// All overlays in compositing order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::UserBackground,
        Self::Main,
        Self::Direct,
        Self::Highlight,
        Self::Contrast,
        Self::UserForeground,
        Self::Sprite,
        Self::DirectTopmost,
    ];

    /// Returns the dense index of this overlay (its position in [`ALL`](Self::ALL)).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::UserBackground => 0,
            Self::Main => 1,
            Self::Direct => 2,
            Self::Highlight => 3,
            Self::Contrast => 4,
            Self::UserForeground => 5,
            Self::Sprite => 6,
            Self::DirectTopmost => 7,
        }
    }

    /// Returns the overlay with the given dense index.
    #[inline]
    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Self> {
        if idx < Self::COUNT {
            Some(Self::ALL[idx])
        } else {
            None
        }
    }
}

/// A set of overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct OverlayMask(u8);

impl OverlayMask {
    /// No overlays.
    pub const NONE: Self = Self(0);
    /// Every overlay.
    pub const ALL: Self = Self(u8::MAX);
    /// Only [`OverlayId::Main`].
    pub const MAIN_ONLY: Self = Self(1 << OverlayId::Main.index());

    /// Returns `true` if `overlay` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, overlay: OverlayId) -> bool {
        self.0 & (1 << overlay.index()) != 0
    }

    /// Returns a copy of the set with `overlay` added.
    #[inline]
    #[must_use]
    pub const fn with(self, overlay: OverlayId) -> Self {
        Self(self.0 | (1 << overlay.index()))
    }

    /// Returns a copy of the set with `overlay` removed.
    #[inline]
    #[must_use]
    pub const fn without(self, overlay: OverlayId) -> Self {
        Self(self.0 & !(1 << overlay.index()))
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the overlays in the set in compositing order.
    pub fn iter(self) -> impl Iterator<Item = OverlayId> {
        OverlayId::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

impl FromIterator<OverlayId> for OverlayMask {
    fn from_iter<I: IntoIterator<Item = OverlayId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn index_round_trips() {
        for (i, overlay) in OverlayId::ALL.iter().enumerate() {
            assert_eq!(overlay.index(), i);
            assert_eq!(OverlayId::from_index(i), Some(*overlay));
        }
        assert_eq!(OverlayId::from_index(OverlayId::COUNT), None);
    }

    #[test]
    fn mask_iterates_in_compositing_order() {
        let mask: OverlayMask = [OverlayId::Sprite, OverlayId::Main, OverlayId::UserBackground]
            .into_iter()
            .collect();
        let got: Vec<_> = mask.iter().collect();
        assert_eq!(
            got,
            [OverlayId::UserBackground, OverlayId::Main, OverlayId::Sprite]
        );
        assert!(!mask.without(OverlayId::Main).contains(OverlayId::Main));
        assert!(OverlayMask::MAIN_ONLY.contains(OverlayId::Main));
        assert!(!OverlayMask::MAIN_ONLY.contains(OverlayId::Direct));
        assert_eq!(OverlayMask::ALL.iter().count(), OverlayId::COUNT);
    }
}
