// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawables attached to a view.
//!
//! A drawable is a scene-graph node (a persistent entity, a container such
//! as a block or model space, or transient geometry) that a view shows. The
//! [`DrawableRegistry`] keeps the live order of a view's drawables, counts
//! the references each model receives so that the view registers as a
//! reactor exactly once, and collects scene notifications as dirty marks
//! until the next preprocessing pass turns them into [`RegenFlags`].

mod kind;
mod refs;
mod registry;

pub use kind::{DrawableKind, RegenFlags};
pub use refs::{ModelRefs, ReactorHost, RefTransition};
pub use registry::{DrawableEntry, DrawableRegistry};
