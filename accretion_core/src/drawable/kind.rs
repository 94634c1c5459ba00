// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable classification and regeneration flags.

/// Classification of a drawable attached to a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    /// Transient geometry without database identity or model.
    Transient,
    /// A container of nested drawables (a model space, a block).
    Container,
    /// A single persistent entity.
    Persistent,
}

impl DrawableKind {
    /// Whether drawables of this kind reference a model and receive its
    /// notifications.
    #[inline]
    #[must_use]
    pub const fn tracks_model(self) -> bool {
        !matches!(self, Self::Transient)
    }

    /// Regeneration needed when an object nested under this drawable is
    /// erased.
    ///
    /// A container only loses part of its order; an entity's whole order is
    /// stale.
    #[inline]
    #[must_use]
    pub const fn erase_regen(self) -> RegenFlags {
        match self {
            Self::Container => RegenFlags::PartialRegeneration,
            Self::Persistent | Self::Transient => RegenFlags::FullRegeneration,
        }
    }

    /// Whether an isolated draw-order query traverses nested graph nodes.
    #[inline]
    #[must_use]
    pub const fn queries_nested(self) -> bool {
        matches!(self, Self::Container)
    }
}

/// Pending regeneration of a drawable slot.
///
/// Ordered by strength; [`raise`](Self::raise) never weakens a flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegenFlags {
    /// Up to date.
    #[default]
    None,
    /// Only the highlight state changed; the order is assumed unchanged.
    HighlightModified,
    /// Part of the drawable changed; re-query and diff.
    PartialRegeneration,
    /// The drawable changed structurally; re-query and diff.
    FullRegeneration,
}

impl RegenFlags {
    /// Raises the flag to at least `to`.
    #[inline]
    pub fn raise(&mut self, to: Self) {
        if to > *self {
            *self = to;
        }
    }

    /// Returns `true` if a regeneration is pending.
    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns `true` if only the highlight state changed.
    #[inline]
    #[must_use]
    pub const fn is_highlight_only(self) -> bool {
        matches!(self, Self::HighlightModified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_keeps_the_stronger_flag() {
        let mut flags = RegenFlags::None;
        flags.raise(RegenFlags::HighlightModified);
        assert!(flags.is_highlight_only());
        flags.raise(RegenFlags::FullRegeneration);
        flags.raise(RegenFlags::PartialRegeneration);
        assert_eq!(flags, RegenFlags::FullRegeneration);
        assert!(flags.is_set());
        assert!(!RegenFlags::None.is_set());
    }

    #[test]
    fn per_kind_behavior() {
        assert!(!DrawableKind::Transient.tracks_model());
        assert!(DrawableKind::Container.tracks_model());
        assert_eq!(
            DrawableKind::Container.erase_regen(),
            RegenFlags::PartialRegeneration
        );
        assert_eq!(
            DrawableKind::Persistent.erase_regen(),
            RegenFlags::FullRegeneration
        );
        assert!(DrawableKind::Container.queries_nested());
        assert!(!DrawableKind::Persistent.queries_nested());
    }
}
