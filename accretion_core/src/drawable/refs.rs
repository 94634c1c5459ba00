// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model reference counting.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::id::{ModelId, ViewId};

/// Registers views as reactors on scene-graph models.
///
/// Implemented by the scene graph. A view registers exactly once per model,
/// no matter how many of the model's drawables it shows.
pub trait ReactorHost {
    /// Starts delivering `model`'s notifications to `view`.
    fn attach_reactor(&mut self, model: ModelId, view: ViewId);

    /// Stops delivering `model`'s notifications to `view`.
    fn detach_reactor(&mut self, model: ModelId, view: ViewId);
}

/// Result of a reference-count change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefTransition {
    /// The count went from zero to one.
    First,
    /// The count changed but the model is still referenced (or was already).
    Shared,
    /// The count dropped to zero.
    Last,
    /// The model was not referenced.
    Unknown,
}

/// Reference counts of the models a view shows drawables of.
///
/// The view never owns a model; it only tracks how many of its drawables
/// refer to each one.
#[derive(Clone, Debug, Default)]
pub struct ModelRefs {
    counts: BTreeMap<ModelId, u32>,
}

impl ModelRefs {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference to `model`.
    pub fn acquire(&mut self, model: ModelId) -> RefTransition {
        let count = self.counts.entry(model).or_insert(0);
        *count += 1;
        if *count == 1 {
            RefTransition::First
        } else {
            RefTransition::Shared
        }
    }

    /// Drops a reference to `model`.
    pub fn release(&mut self, model: ModelId) -> RefTransition {
        let Some(count) = self.counts.get_mut(&model) else {
            return RefTransition::Unknown;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&model);
            RefTransition::Last
        } else {
            RefTransition::Shared
        }
    }

    /// Returns the number of references to `model`.
    #[must_use]
    pub fn count(&self, model: ModelId) -> u32 {
        self.counts.get(&model).copied().unwrap_or(0)
    }

    /// Iterates the referenced models in ascending order.
    pub fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.counts.keys().copied()
    }

    /// Drops every reference and returns the models that were referenced.
    pub fn release_all(&mut self) -> Vec<ModelId> {
        let models = self.counts.keys().copied().collect();
        self.counts.clear();
        models
    }
}
