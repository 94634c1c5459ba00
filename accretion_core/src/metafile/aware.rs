// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-dependence flags of recorded metafiles.

use core::ops::{BitOr, BitOrAssign};

/// Bitmask of the view properties a cached metafile's validity depends on.
///
/// A metafile recorded for one view can be replayed in another view only if
/// every property named here is equal in both views (see
/// [`ViewProps::is_compatible`](crate::view::ViewProps::is_compatible)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AwareFlags(u32);

impl AwareFlags {
    /// Depends on nothing; replayable in any view.
    pub const NONE: Self = Self(0);
    /// Depends on the world-to-device transform (e.g. view-dependent tessellation).
    pub const VIEWPORT_TRANSFORM: Self = Self(1 << 0);
    /// Depends on the view direction (e.g. silhouettes).
    pub const VIEW_DIRECTION: Self = Self(1 << 1);
    /// Depends on the render mode (wireframe vs. shaded).
    pub const RENDER_MODE: Self = Self(1 << 2);
    /// Depends on the linetype scale.
    pub const LINETYPE_SCALE: Self = Self(1 << 3);
    /// Depends on the lineweight display scale.
    pub const LINEWEIGHT_SCALE: Self = Self(1 << 4);
    /// Depends on everything.
    pub const ALL: Self = Self(0b1_1111);

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds flags from raw bits, discarding unknown bits.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AwareFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AwareFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
