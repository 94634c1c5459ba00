// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene-graph collaborator.
//!
//! The core never traverses geometry itself. Whenever it needs to know which
//! metafiles a drawable (or a whole overlay) produces, it hands the scene
//! graph an explicit [`OrderQuery`] describing exactly what to traverse.
//! Queries have no side effects on any view's persistent state.

use alloc::vec::Vec;

use crate::drawable::DrawableKind;
use crate::id::{DrawableKey, MetafileId, ViewId};
use crate::metafile::AwareFlags;
use crate::overlay::OverlayId;
use crate::view::ViewProps;

/// What a draw-order query traverses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryTarget<'a> {
    /// One drawable, isolated from the rest of the view.
    Drawable {
        /// The drawable.
        key: DrawableKey,
        /// Its classification.
        kind: DrawableKind,
    },
    /// Every listed drawable, in order.
    Overlay(&'a [DrawableKey]),
}

/// An isolated draw-order query context.
#[derive(Clone, Copy, Debug)]
pub struct OrderQuery<'a> {
    /// The view the order is computed for.
    pub view: ViewId,
    /// Properties of that view.
    pub props: &'a ViewProps,
    /// Overlay whose metafiles are collected.
    pub overlay: OverlayId,
    /// What to traverse.
    pub target: QueryTarget<'a>,
    /// Skip nested graph nodes (only containers traverse their children).
    pub disable_nested: bool,
}

/// Scene-graph services used by draw-order synchronization.
pub trait SceneGraph {
    /// Appends to `out` the metafile ids the query target would draw, in
    /// draw order.
    fn query_draw_order(&mut self, query: &OrderQuery<'_>, out: &mut Vec<MetafileId>);

    /// The view properties the metafiles of `drawable` depend on.
    fn aware_flags(&self, drawable: DrawableKey) -> AwareFlags {
        _ = drawable;
        AwareFlags::ALL
    }

    /// Whether the metafiles `drawable` recorded for a view with properties
    /// `a` are valid for a view with properties `b`.
    fn metafiles_compatible(&self, drawable: DrawableKey, a: &ViewProps, b: &ViewProps) -> bool {
        a.is_compatible(b, self.aware_flags(drawable))
    }
}
