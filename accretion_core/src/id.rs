// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity types shared by the metafile store, the drawable registry and
//! the views.
//!
//! All identities are plain `Copy` newtypes. Core code never interprets the
//! wrapped values beyond equality and ordering; the scene graph and the
//! device assign them.

use core::fmt;

/// Identity of a recorded metafile.
///
/// These are the entries of a view's per-overlay draw order. Ids with the top
/// bit set are reserved for the shared empty metafiles handed out by
/// [`EmptyMetafileCache`](crate::metafile::EmptyMetafileCache).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetafileId(pub u64);

impl MetafileId {
    /// Bit marking ids reserved for cached empty metafiles.
    pub const EMPTY_BIT: u64 = 1 << 63;

    /// Returns `true` if this id refers to a cached empty metafile.
    #[inline]
    #[must_use]
    pub const fn is_reserved_empty(self) -> bool {
        self.0 & Self::EMPTY_BIT != 0
    }
}

impl fmt::Debug for MetafileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reserved_empty() {
            write!(f, "MetafileId(empty:{})", self.0 & !Self::EMPTY_BIT)
        } else {
            write!(f, "MetafileId({})", self.0)
        }
    }
}

/// Persistent database object id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:#x})", self.0)
    }
}

/// Handle of transient geometry that has no database identity.
///
/// The owner of the transient drawable picks the value; it only needs to be
/// unique among the transients attached to one view.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransientHandle(pub u64);

impl fmt::Debug for TransientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransientHandle({})", self.0)
    }
}

/// Stable identity of a drawable attached to a view.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum DrawableKey {
    /// A database-resident drawable (entity or container).
    Persistent(ObjectId),
    /// Transient geometry, identified by its handle.
    Transient(TransientHandle),
}

impl DrawableKey {
    /// Returns the persistent object id, if this is a persistent drawable.
    #[inline]
    #[must_use]
    pub const fn object_id(self) -> Option<ObjectId> {
        match self {
            Self::Persistent(id) => Some(id),
            Self::Transient(_) => None,
        }
    }
}

impl From<ObjectId> for DrawableKey {
    fn from(id: ObjectId) -> Self {
        Self::Persistent(id)
    }
}

impl From<TransientHandle> for DrawableKey {
    fn from(handle: TransientHandle) -> Self {
        Self::Transient(handle)
    }
}

/// Identifies a scene-graph model.
///
/// Values must stay below `2^31`; the upper half of the `u32` space is used
/// for model keys in the registry's dirty tracker.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelId(pub u32);

impl fmt::Debug for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelId({})", self.0)
    }
}

/// Identifies a view owned by a [`Device`](crate::device::Device).
///
/// Assigned by the device in creation order and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ViewId(pub u32);

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({})", self.0)
    }
}

/// Identifies a CAD layer for visibility and fading lookups.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LayerKey(pub u32);

impl fmt::Debug for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerKey({})", self.0)
    }
}
