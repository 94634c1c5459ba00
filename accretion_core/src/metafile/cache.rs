// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared empty metafiles.

use alloc::collections::BTreeMap;

use super::aware::AwareFlags;
use crate::id::MetafileId;

/// Cache of shared empty metafiles, keyed by [`AwareFlags`].
///
/// Drawables that record nothing still need a metafile id in the draw order
/// of views that can see them. Instead of allocating one empty metafile per
/// drawable, [`MetafileStore::end_metafile`](super::MetafileStore::end_metafile)
/// hands out one shared id per set of aware flags from this cache.
///
/// The cache has an explicit lifetime: create it when the graphics subsystem
/// starts, pass it to every store that records metafiles, and
/// [`clear`](Self::clear) or drop it at shutdown. Ids issued by a cache are
/// deterministic (`EMPTY_BIT | flags`), so separate caches agree on them.
#[derive(Clone, Debug, Default)]
pub struct EmptyMetafileCache {
    entries: BTreeMap<AwareFlags, MetafileId>,
}

impl EmptyMetafileCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared empty metafile for `aware`, creating it on first use.
    pub fn get_or_insert(&mut self, aware: AwareFlags) -> MetafileId {
        *self
            .entries
            .entry(aware)
            .or_insert(MetafileId(MetafileId::EMPTY_BIT | u64::from(aware.bits())))
    }

    /// Returns the shared empty metafile for `aware` if it was handed out.
    #[must_use]
    pub fn get(&self, aware: AwareFlags) -> Option<MetafileId> {
        self.entries.get(&aware).copied()
    }

    /// Returns `true` if `id` was issued by this cache.
    #[must_use]
    pub fn is_empty_metafile(&self, id: MetafileId) -> bool {
        id.is_reserved_empty()
            && u32::try_from(id.0 & !MetafileId::EMPTY_BIT)
                .is_ok_and(|bits| self.entries.contains_key(&AwareFlags::from_bits_truncate(bits)))
    }

    /// Number of distinct empty metafiles handed out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no empty metafile was handed out yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
