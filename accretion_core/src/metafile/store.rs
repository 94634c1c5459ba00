// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, replay and flag tracking of metafiles.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{Circle, Point, Rect, Shape};

use super::aware::AwareFlags;
use super::cache::EmptyMetafileCache;
use crate::id::{DrawableKey, LayerKey, MetafileId};
use crate::observer::MetafileObserver;

/// A recorded draw command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Sets the current color (packed `0xAARRGGBB`).
    SetColor(u32),
    /// Sets the current lineweight in hundredths of a millimeter.
    SetLineweight(u16),
    /// An open polyline.
    Polyline(Vec<Point>),
    /// A closed, filled polygon.
    Polygon(Vec<Point>),
    /// A circle outline.
    Circle(Circle),
}

impl DrawOp {
    /// Returns the bounding box of the geometry drawn by this op, or `None`
    /// for state-only ops.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::SetColor(_) | Self::SetLineweight(_) => None,
            Self::Polyline(points) | Self::Polygon(points) => {
                let (first, rest) = points.split_first()?;
                Some(
                    rest.iter()
                        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
                )
            }
            Self::Circle(circle) => Some(circle.bounding_box()),
        }
    }

    /// Returns `true` if the op produces filled geometry.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Polygon(points) if !points.is_empty())
    }
}

/// Per-metafile display state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MetafileFlags {
    /// The metafile's layer is visible.
    pub visible: bool,
    /// The drawable is highlighted.
    pub highlighted: bool,
    /// The metafile's layer is faded (e.g. locked-layer fading).
    pub faded: bool,
    /// The metafile contains filled geometry.
    pub filled: bool,
}

/// Display traits of a CAD layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerTraits {
    /// Whether the layer is on and thawed.
    pub visible: bool,
    /// Whether the layer is drawn faded.
    pub faded: bool,
}

impl Default for LayerTraits {
    fn default() -> Self {
        Self {
            visible: true,
            faded: false,
        }
    }
}

/// Source of the layer and entity traits that determine metafile flags.
///
/// Implemented by the scene graph.
pub trait TraitsSource {
    /// Returns the current traits of `layer`.
    fn layer_traits(&self, layer: LayerKey) -> LayerTraits;

    /// Returns whether `drawable` is currently highlighted.
    fn is_highlighted(&self, drawable: DrawableKey) -> bool;
}

/// Target of [`MetafileStore::play_metafile`].
pub trait MetafileSink {
    /// Draws one recorded op with the metafile's current flags.
    fn draw(&mut self, op: &DrawOp, flags: MetafileFlags);
}

/// Describes the metafile being recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MetafileDesc {
    /// Drawable the metafile belongs to.
    pub drawable: DrawableKey,
    /// Layer the geometry lives on.
    pub layer: LayerKey,
    /// View properties the recorded geometry depends on.
    pub aware: AwareFlags,
}

#[derive(Clone, Debug)]
struct Metafile {
    desc: MetafileDesc,
    ops: Vec<DrawOp>,
    flags: MetafileFlags,
    extents: Rect,
}

#[derive(Clone, Debug)]
struct Recording {
    desc: MetafileDesc,
    ops: Vec<DrawOp>,
}

/// Owns the recorded metafiles of a device.
///
/// Recording is bracketed by [`begin_metafile`](Self::begin_metafile) and
/// [`end_metafile`](Self::end_metafile); at most one recording is open at a
/// time. Replaying a metafile re-checks its layer and highlight state and
/// patches the cached flags in place, so the device can react to visibility,
/// fading and highlighting changes without re-recording geometry.
#[derive(Debug, Default)]
pub struct MetafileStore {
    metafiles: BTreeMap<MetafileId, Metafile>,
    next_id: u64,
    recording: Option<Recording>,
}

impl MetafileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new recording.
    ///
    /// # Panics
    ///
    /// Panics if a recording is already open.
    pub fn begin_metafile(&mut self, desc: MetafileDesc) {
        assert!(
            self.recording.is_none(),
            "metafile recording already open"
        );
        self.recording = Some(Recording {
            desc,
            ops: Vec::new(),
        });
    }

    /// Appends an op to the open recording.
    ///
    /// # Panics
    ///
    /// Panics if no recording is open.
    pub fn record(&mut self, op: DrawOp) {
        let Some(recording) = self.recording.as_mut() else {
            panic!("no metafile recording open");
        };
        recording.ops.push(op);
    }

    /// Returns `true` while a recording is open.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Closes the open recording and returns the id to place in draw orders.
    ///
    /// The initial flags are computed from the current layer traits and the
    /// drawable's highlight state, and [`on_metafile_added`] is fired. A
    /// recording without any geometry is simply cleared; the shared empty
    /// metafile for its aware flags is returned instead and no notification
    /// is fired.
    ///
    /// # Panics
    ///
    /// Panics if no recording is open.
    ///
    /// [`on_metafile_added`]: MetafileObserver::on_metafile_added
    pub fn end_metafile(
        &mut self,
        traits: &dyn TraitsSource,
        empty: &mut EmptyMetafileCache,
        observer: &mut dyn MetafileObserver,
    ) -> MetafileId {
        let Some(Recording { desc, ops }) = self.recording.take() else {
            panic!("no metafile recording open");
        };

        let extents = ops
            .iter()
            .filter_map(DrawOp::bounds)
            .reduce(|a, b| a.union(b));
        let Some(extents) = extents else {
            return empty.get_or_insert(desc.aware);
        };

        let layer = traits.layer_traits(desc.layer);
        let flags = MetafileFlags {
            visible: layer.visible,
            highlighted: traits.is_highlighted(desc.drawable),
            faded: layer.faded,
            filled: ops.iter().any(DrawOp::is_filled),
        };

        let id = MetafileId(self.next_id);
        self.next_id += 1;
        self.metafiles.insert(
            id,
            Metafile {
                desc,
                ops,
                flags,
                extents,
            },
        );
        observer.on_metafile_added(id, flags, extents);
        id
    }

    /// Replays a metafile into `sink`.
    ///
    /// Before drawing, the metafile's layer visibility, fading and highlight
    /// state are compared with the cached flags; every transition updates the
    /// flags in place and fires the matching change notification. Invisible
    /// metafiles are not drawn. Shared empty metafiles draw nothing.
    ///
    /// Returns `false` if `id` is unknown.
    pub fn play_metafile(
        &mut self,
        id: MetafileId,
        traits: &dyn TraitsSource,
        sink: &mut dyn MetafileSink,
        observer: &mut dyn MetafileObserver,
    ) -> bool {
        if id.is_reserved_empty() {
            return true;
        }
        let Some(metafile) = self.metafiles.get_mut(&id) else {
            return false;
        };

        let layer = traits.layer_traits(metafile.desc.layer);
        let highlighted = traits.is_highlighted(metafile.desc.drawable);
        let flags = &mut metafile.flags;
        if flags.visible != layer.visible {
            flags.visible = layer.visible;
            observer.on_visibility_changed(id, layer.visible, metafile.extents);
        }
        if flags.faded != layer.faded {
            flags.faded = layer.faded;
            observer.on_fading_changed(id, layer.faded, metafile.extents);
        }
        if flags.highlighted != highlighted {
            flags.highlighted = highlighted;
            observer.on_highlighting_changed(id, highlighted, metafile.extents);
        }

        if metafile.flags.visible {
            for op in &metafile.ops {
                sink.draw(op, metafile.flags);
            }
        }
        true
    }

    /// Erases one metafile. Returns `false` if `id` is unknown.
    pub fn erase_metafile(&mut self, id: MetafileId, observer: &mut dyn MetafileObserver) -> bool {
        match self.metafiles.remove(&id) {
            Some(metafile) => {
                observer.on_metafile_erased(id, metafile.extents);
                true
            }
            None => false,
        }
    }

    /// Erases every metafile recorded for `drawable` and returns how many
    /// were erased.
    pub fn erase_drawable(
        &mut self,
        drawable: DrawableKey,
        observer: &mut dyn MetafileObserver,
    ) -> usize {
        let doomed: Vec<MetafileId> = self
            .metafiles
            .iter()
            .filter(|(_, m)| m.desc.drawable == drawable)
            .map(|(id, _)| *id)
            .collect();
        for &id in &doomed {
            self.erase_metafile(id, observer);
        }
        doomed.len()
    }

    /// Returns the cached flags of a metafile.
    #[must_use]
    pub fn flags(&self, id: MetafileId) -> Option<MetafileFlags> {
        self.metafiles.get(&id).map(|m| m.flags)
    }

    /// Returns the bounding box of a metafile's geometry.
    #[must_use]
    pub fn extents(&self, id: MetafileId) -> Option<Rect> {
        self.metafiles.get(&id).map(|m| m.extents)
    }

    /// Returns the drawable a metafile was recorded for.
    #[must_use]
    pub fn drawable_of(&self, id: MetafileId) -> Option<DrawableKey> {
        self.metafiles.get(&id).map(|m| m.desc.drawable)
    }

    /// Returns the layer a metafile was recorded on.
    #[must_use]
    pub fn layer_of(&self, id: MetafileId) -> Option<LayerKey> {
        self.metafiles.get(&id).map(|m| m.desc.layer)
    }

    /// Number of stored metafiles (shared empty metafiles are not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.metafiles.len()
    }

    /// Returns `true` if the store holds no metafile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metafiles.is_empty()
    }
}
