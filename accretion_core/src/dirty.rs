// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for drawable regeneration.
//!
//! The [`DrawableRegistry`](crate::drawable::DrawableRegistry) records scene
//! notifications (modification, nested erasure, highlighting) through
//! multi-channel dirty tracking (via [`understory_dirty`]) instead of touching
//! slot tables directly. Marks are consumed lazily by
//! [`View::preprocess`](crate::view::View::preprocess), which raises the
//! regeneration flags of the matching drawable slots.
//!
//! # Keys
//!
//! Drawables are keyed by their registry slot index. Models are keyed by
//! `MODEL_KEY_BIT | model`, so that a drawable can depend on its model.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`HIGHLIGHT`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with a dependency edge from
//!   each drawable to its model. Highlighting a whole model marks every
//!   drawable of that model.
//!
//! - **Local-only**: [`FULL`] and [`PARTIAL`] are marked with the default
//!   policy. Only the explicitly marked drawable appears in the drain output.

use understory_dirty::Channel;

/// The drawable changed structurally and must be fully re-queried.
pub const FULL: Channel = Channel::new(0);

/// Something nested under the drawable changed (e.g. a nested object was
/// erased); the drawable is re-queried and diffed against its old order.
pub const PARTIAL: Channel = Channel::new(1);

/// The highlight state changed; the draw order is assumed unchanged.
pub const HIGHLIGHT: Channel = Channel::new(2);

/// Tag bit distinguishing model keys from drawable keys.
pub(crate) const MODEL_KEY_BIT: u32 = 1 << 31;
