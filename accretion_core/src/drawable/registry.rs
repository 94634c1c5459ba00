// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-view registry of attached drawables.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::kind::{DrawableKind, RegenFlags};
use super::refs::{ModelRefs, ReactorHost, RefTransition};
use crate::dirty::{self, MODEL_KEY_BIT};
use crate::id::{DrawableKey, ModelId, ObjectId, ViewId};
use crate::overlay::OverlayId;

/// A drawable attached to a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DrawableEntry {
    /// Stable identity.
    pub key: DrawableKey,
    /// Classification.
    pub kind: DrawableKind,
    /// Owning model; always `None` for transients.
    pub model: Option<ModelId>,
    /// Overlay the drawable is composited in.
    pub overlay: OverlayId,
}

/// The live, ordered set of drawables attached to one view.
///
/// Entries live in an arena whose slot indices double as dirty-tracking keys.
/// Model references are counted so that the view registers as a reactor on
/// each model exactly once. Scene notifications only mark dirty channels;
/// [`take_pending`](Self::take_pending) drains them during preprocessing.
#[derive(Debug)]
pub struct DrawableRegistry {
    view: ViewId,
    entries: Vec<Option<DrawableEntry>>,
    free_list: Vec<u32>,
    live: Vec<u32>,
    refs: ModelRefs,
    dirty: DirtyTracker<u32>,
}

impl DrawableRegistry {
    /// Creates an empty registry for `view`.
    #[must_use]
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            entries: Vec::new(),
            free_list: Vec::new(),
            live: Vec::new(),
            refs: ModelRefs::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Attaches a drawable, appending it to the live order.
    ///
    /// On the first reference to `model` the view registers as a reactor on
    /// it. Transients never reference a model. Returns `false` (and changes
    /// nothing) if `key` is already attached.
    ///
    /// # Panics
    ///
    /// Panics if the registry is full. Debug builds also panic if `model`
    /// is `2^31` or above.
    pub fn add(
        &mut self,
        key: DrawableKey,
        kind: DrawableKind,
        model: Option<ModelId>,
        overlay: OverlayId,
        reactors: &mut dyn ReactorHost,
    ) -> bool {
        if self.find(key).is_some() {
            return false;
        }
        let model = model.filter(|_| kind.tracks_model());
        if let Some(model) = model {
            debug_assert!(
                model.0 < MODEL_KEY_BIT,
                "model id {model:?} collides with the model key bit"
            );
        }
        let entry = DrawableEntry {
            key,
            kind,
            model,
            overlay,
        };

        let idx = if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(entry);
            idx
        } else {
            let idx = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
            assert!(idx < MODEL_KEY_BIT, "drawable registry is full");
            self.entries.push(Some(entry));
            idx
        };

        if let Some(model) = model {
            if self.refs.acquire(model) == RefTransition::First {
                reactors.attach_reactor(model, self.view);
            }
            let _ = self
                .dirty
                .add_dependency(idx, model_key(model), dirty::HIGHLIGHT);
        }

        self.live.push(idx);
        self.dirty.mark(idx, dirty::FULL);
        true
    }

    /// Detaches a drawable.
    ///
    /// When the last drawable of a model goes away the view unregisters its
    /// reactor. Returns `false` if `key` is not attached.
    pub fn erase(&mut self, key: DrawableKey, reactors: &mut dyn ReactorHost) -> bool {
        let Some(pos) = self.live.iter().position(|&i| self.key_at(i) == Some(key)) else {
            return false;
        };
        let idx = self.live.remove(pos);
        let entry = self.entries[idx as usize].take();
        self.dirty.remove_key(idx);
        self.free_list.push(idx);

        if let Some(model) = entry.and_then(|e| e.model) {
            self.release_model(model, reactors);
        }
        true
    }

    /// Detaches every drawable and unregisters every reactor.
    pub fn erase_all(&mut self, reactors: &mut dyn ReactorHost) {
        for idx in core::mem::take(&mut self.live) {
            self.dirty.remove_key(idx);
        }
        for model in self.refs.release_all() {
            self.dirty.remove_key(model_key(model));
            reactors.detach_reactor(model, self.view);
        }
        self.entries.clear();
        self.free_list.clear();
    }

    /// Moves a drawable to another overlay. Returns `false` if `key` is not
    /// attached.
    pub fn set_overlay(&mut self, key: DrawableKey, overlay: OverlayId) -> bool {
        let Some(idx) = self.find(key) else {
            return false;
        };
        if let Some(entry) = self.entries[idx as usize].as_mut() {
            entry.overlay = overlay;
        }
        true
    }

    // -- Scene notifications (lazily consumed) --

    /// Records a highlight change for the next preprocessing pass.
    ///
    /// `path` leads from the view's drawable down to the highlighted
    /// subentity; its first element names the attached drawable. An empty
    /// path highlights every drawable of `model`.
    pub fn on_highlight(&mut self, model: ModelId, path: &[DrawableKey]) {
        match path.first() {
            None => {
                if self.refs.count(model) > 0 {
                    self.dirty
                        .mark_with(model_key(model), dirty::HIGHLIGHT, &EagerPolicy);
                }
            }
            Some(&top) => {
                if let Some(idx) = self.find(top) {
                    self.dirty.mark_with(idx, dirty::HIGHLIGHT, &EagerPolicy);
                }
            }
        }
    }

    /// Records that `erased`, nested under the drawable `parent`, was erased
    /// from `model`.
    ///
    /// The parent's regeneration is raised according to its kind (at least
    /// [`PartialRegeneration`](RegenFlags::PartialRegeneration)). Returns
    /// `false` if no attached drawable matches `parent`.
    pub fn on_erased(&mut self, model: ModelId, _erased: ObjectId, parent: ObjectId) -> bool {
        let Some(idx) = self.find_in_model(model, parent) else {
            return false;
        };
        self.mark_regen(idx, self.kind_at(idx).erase_regen());
        true
    }

    /// Records that `object` of `model` was modified.
    ///
    /// An attached drawable is marked for full regeneration; otherwise the
    /// attached container `parent` (if any) is marked for partial
    /// regeneration. Returns `false` if nothing matched.
    pub fn on_modified(
        &mut self,
        model: ModelId,
        object: ObjectId,
        parent: Option<ObjectId>,
    ) -> bool {
        if let Some(idx) = self.find_in_model(model, object) {
            self.dirty.mark(idx, dirty::FULL);
            return true;
        }
        match parent.and_then(|p| self.find_in_model(model, p)) {
            Some(idx) => {
                self.dirty.mark(idx, dirty::PARTIAL);
                true
            }
            None => false,
        }
    }

    /// Marks a drawable for full regeneration. Returns `false` if `key` is not
    /// attached.
    pub fn invalidate(&mut self, key: DrawableKey) -> bool {
        let Some(idx) = self.find(key) else {
            return false;
        };
        self.dirty.mark(idx, dirty::FULL);
        true
    }

    /// Drains every pending mark into per-drawable regeneration flags, in live
    /// order.
    pub fn take_pending(&mut self) -> Vec<(DrawableKey, RegenFlags)> {
        let mut merged: BTreeMap<u32, RegenFlags> = BTreeMap::new();

        let full: Vec<u32> = self.dirty.drain(dirty::FULL).deterministic().run().collect();
        let partial: Vec<u32> = self
            .dirty
            .drain(dirty::PARTIAL)
            .deterministic()
            .run()
            .collect();
        let highlight: Vec<u32> = self
            .dirty
            .drain(dirty::HIGHLIGHT)
            .affected()
            .deterministic()
            .run()
            .collect();

        let marks = [
            (full, RegenFlags::FullRegeneration),
            (partial, RegenFlags::PartialRegeneration),
            (highlight, RegenFlags::HighlightModified),
        ];
        for (keys, flag) in marks {
            for idx in keys.into_iter().filter(|k| k & MODEL_KEY_BIT == 0) {
                merged.entry(idx).or_default().raise(flag);
            }
        }

        self.live
            .iter()
            .filter_map(|&idx| {
                let flag = merged.get(&idx)?;
                Some((self.key_at(idx)?, *flag))
            })
            .collect()
    }

    // -- Queries --

    /// Returns `true` if `key` is attached.
    #[must_use]
    pub fn contains(&self, key: DrawableKey) -> bool {
        self.find(key).is_some()
    }

    /// Returns the entry of an attached drawable.
    #[must_use]
    pub fn entry(&self, key: DrawableKey) -> Option<&DrawableEntry> {
        self.find(key)
            .and_then(|idx| self.entries[idx as usize].as_ref())
    }

    /// Number of attached drawables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterates the attached drawables in live order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawableEntry> + '_ {
        self.live
            .iter()
            .filter_map(|&idx| self.entries[idx as usize].as_ref())
    }

    /// Iterates the drawables of one overlay in live order.
    pub fn iter_overlay(&self, overlay: OverlayId) -> impl Iterator<Item = &DrawableEntry> + '_ {
        self.iter().filter(move |e| e.overlay == overlay)
    }

    /// Returns how many attached drawables reference `model`.
    #[must_use]
    pub fn model_ref_count(&self, model: ModelId) -> u32 {
        self.refs.count(model)
    }

    // -- Internal helpers --

    fn find(&self, key: DrawableKey) -> Option<u32> {
        self.live
            .iter()
            .copied()
            .find(|&idx| self.key_at(idx) == Some(key))
    }

    fn find_in_model(&self, model: ModelId, object: ObjectId) -> Option<u32> {
        self.live.iter().copied().find(|&idx| {
            self.entries[idx as usize].is_some_and(|e| {
                e.key == DrawableKey::Persistent(object) && e.model == Some(model)
            })
        })
    }

    fn key_at(&self, idx: u32) -> Option<DrawableKey> {
        self.entries[idx as usize].map(|e| e.key)
    }

    fn kind_at(&self, idx: u32) -> DrawableKind {
        self.entries[idx as usize].map_or(DrawableKind::Persistent, |e| e.kind)
    }

    fn mark_regen(&mut self, idx: u32, regen: RegenFlags) {
        match regen {
            RegenFlags::FullRegeneration => self.dirty.mark(idx, dirty::FULL),
            RegenFlags::PartialRegeneration => self.dirty.mark(idx, dirty::PARTIAL),
            RegenFlags::HighlightModified => {
                self.dirty.mark_with(idx, dirty::HIGHLIGHT, &EagerPolicy);
            }
            RegenFlags::None => {}
        }
    }

    fn release_model(&mut self, model: ModelId, reactors: &mut dyn ReactorHost) {
        if self.refs.release(model) == RefTransition::Last {
            self.dirty.remove_key(model_key(model));
            reactors.detach_reactor(model, self.view);
        }
    }
}

/// Dirty-tracking key of a model.
const fn model_key(model: ModelId) -> u32 {
    MODEL_KEY_BIT | model.0
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::testing::{Reactors, entity};

    const VIEW: ViewId = ViewId(4);
    const MODEL: ModelId = ModelId(1);

    fn registry_with(keys: &[u64], reactors: &mut Reactors) -> DrawableRegistry {
        let mut registry = DrawableRegistry::new(VIEW);
        for &k in keys {
            assert!(registry.add(
                entity(k),
                DrawableKind::Persistent,
                Some(MODEL),
                OverlayId::Main,
                reactors
            ));
        }
        registry
    }

    #[test]
    fn reactor_registered_once_per_model() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1, 2, 3], &mut reactors);
        assert_eq!(reactors.attached, vec![(MODEL, VIEW)]);
        assert_eq!(registry.model_ref_count(MODEL), 3);

        assert!(registry.erase(entity(1), &mut reactors));
        assert!(registry.erase(entity(2), &mut reactors));
        assert!(reactors.detached.is_empty());
        assert!(registry.erase(entity(3), &mut reactors));
        assert_eq!(reactors.detached, vec![(MODEL, VIEW)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_add_and_unknown_erase_are_rejected() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1], &mut reactors);
        assert!(!registry.add(
            entity(1),
            DrawableKind::Persistent,
            Some(MODEL),
            OverlayId::Main,
            &mut reactors
        ));
        assert_eq!(registry.model_ref_count(MODEL), 1);
        assert!(!registry.erase(entity(9), &mut reactors));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "collides with the model key bit")]
    fn oversized_model_id_panics() {
        let mut registry = DrawableRegistry::new(VIEW);
        registry.add(
            entity(1),
            DrawableKind::Persistent,
            Some(ModelId(MODEL_KEY_BIT | 1)),
            OverlayId::Main,
            &mut Reactors::default(),
        );
    }

    #[test]
    fn transients_do_not_reference_models() {
        let mut reactors = Reactors::default();
        let mut registry = DrawableRegistry::new(VIEW);
        let key = DrawableKey::Transient(crate::id::TransientHandle(5));
        assert!(registry.add(
            key,
            DrawableKind::Transient,
            Some(MODEL),
            OverlayId::Sprite,
            &mut reactors
        ));
        assert!(reactors.attached.is_empty());
        assert_eq!(registry.entry(key).and_then(|e| e.model), None);
        assert_eq!(registry.iter_overlay(OverlayId::Sprite).count(), 1);
    }

    #[test]
    fn erase_all_unregisters_every_model() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1, 2], &mut reactors);
        registry.add(
            entity(7),
            DrawableKind::Container,
            Some(ModelId(2)),
            OverlayId::Main,
            &mut reactors,
        );
        registry.erase_all(&mut reactors);
        assert!(registry.is_empty());
        assert_eq!(reactors.detached.len(), 2);
        assert_eq!(registry.model_ref_count(MODEL), 0);
    }

    #[test]
    fn new_drawables_are_pending_full_regeneration() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1, 2], &mut reactors);
        let pending = registry.take_pending();
        assert_eq!(
            pending,
            vec![
                (entity(1), RegenFlags::FullRegeneration),
                (entity(2), RegenFlags::FullRegeneration),
            ]
        );
        assert!(registry.take_pending().is_empty(), "marks are drained");
    }

    #[test]
    fn on_erased_raises_parent_by_kind() {
        let mut reactors = Reactors::default();
        let mut registry = DrawableRegistry::new(VIEW);
        registry.add(
            entity(10),
            DrawableKind::Container,
            Some(MODEL),
            OverlayId::Main,
            &mut reactors,
        );
        registry.add(
            entity(11),
            DrawableKind::Persistent,
            Some(MODEL),
            OverlayId::Main,
            &mut reactors,
        );
        let _ = registry.take_pending();

        assert!(registry.on_erased(MODEL, ObjectId(100), ObjectId(10)));
        assert!(registry.on_erased(MODEL, ObjectId(101), ObjectId(11)));
        assert!(!registry.on_erased(MODEL, ObjectId(102), ObjectId(12)));
        assert!(!registry.on_erased(ModelId(9), ObjectId(100), ObjectId(10)));

        assert_eq!(
            registry.take_pending(),
            vec![
                (entity(10), RegenFlags::PartialRegeneration),
                (entity(11), RegenFlags::FullRegeneration),
            ]
        );
    }

    #[test]
    fn highlight_of_whole_model_reaches_every_drawable() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1, 2], &mut reactors);
        let _ = registry.take_pending();

        registry.on_highlight(MODEL, &[]);
        assert_eq!(
            registry.take_pending(),
            vec![
                (entity(1), RegenFlags::HighlightModified),
                (entity(2), RegenFlags::HighlightModified),
            ]
        );
    }

    #[test]
    fn highlight_path_targets_one_drawable_and_merges_with_stronger_marks() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1, 2], &mut reactors);
        let _ = registry.take_pending();

        registry.on_highlight(MODEL, &[entity(2), entity(55)]);
        registry.on_highlight(MODEL, &[entity(1)]);
        registry.invalidate(entity(1));
        assert_eq!(
            registry.take_pending(),
            vec![
                (entity(1), RegenFlags::FullRegeneration),
                (entity(2), RegenFlags::HighlightModified),
            ]
        );
    }

    #[test]
    fn on_modified_prefers_the_drawable_then_its_container() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1], &mut reactors);
        registry.add(
            entity(20),
            DrawableKind::Container,
            Some(MODEL),
            OverlayId::Main,
            &mut reactors,
        );
        let _ = registry.take_pending();

        assert!(registry.on_modified(MODEL, ObjectId(1), None));
        assert!(registry.on_modified(MODEL, ObjectId(300), Some(ObjectId(20))));
        assert!(!registry.on_modified(MODEL, ObjectId(300), None));
        assert_eq!(
            registry.take_pending(),
            vec![
                (entity(1), RegenFlags::FullRegeneration),
                (entity(20), RegenFlags::PartialRegeneration),
            ]
        );
    }

    #[test]
    fn erased_slots_are_reused_without_stale_marks() {
        let mut reactors = Reactors::default();
        let mut registry = registry_with(&[1, 2], &mut reactors);
        let _ = registry.take_pending();
        registry.invalidate(entity(1));
        registry.erase(entity(1), &mut reactors);
        registry.add(
            entity(3),
            DrawableKind::Persistent,
            Some(MODEL),
            OverlayId::Direct,
            &mut reactors,
        );
        assert_eq!(
            registry.take_pending(),
            vec![(entity(3), RegenFlags::FullRegeneration)]
        );
        let order: Vec<_> = registry.iter().map(|e| e.key).collect();
        assert_eq!(order, vec![entity(2), entity(3)]);
    }
}
