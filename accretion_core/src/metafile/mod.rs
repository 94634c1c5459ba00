// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metafiles: recorded, replayable draw-command lists.
//!
//! A *metafile* is the cached output of vectorizing one drawable for one set
//! of view properties. Each metafile has:
//!
//! - An identity ([`MetafileId`](crate::id::MetafileId)) used as the entry
//!   type of every view's draw order.
//! - The recorded [`DrawOp`]s and their bounding box.
//! - [`MetafileFlags`] (visible, highlighted, faded, filled), computed when
//!   recording ends and patched in place on replay.
//! - [`AwareFlags`] naming the view properties the recording depends on.
//!
//! Drawables that record nothing share one empty metafile per aware-flag set,
//! handed out by an explicitly owned [`EmptyMetafileCache`].

mod aware;
mod cache;
mod store;

pub use aware::AwareFlags;
pub use cache::EmptyMetafileCache;
pub use store::{
    DrawOp, LayerTraits, MetafileDesc, MetafileFlags, MetafileSink, MetafileStore, TraitsSource,
};
