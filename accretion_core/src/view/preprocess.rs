// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot-table reconciliation.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use super::View;
use super::overlay_data::{DrawableSlot, OverlayData};
use crate::drawable::{DrawableKind, RegenFlags};
use crate::id::{DrawableKey, ModelId};
use crate::overlay::OverlayId;

type LiveEntry = (DrawableKey, DrawableKind, Option<ModelId>);

impl View {
    /// Brings every overlay's slot table up to date with the registry and
    /// applies pending scene notifications as slot flags.
    ///
    /// - Drawables attached since the last call get an empty slot at their
    ///   position, flagged [`FullRegeneration`](RegenFlags::FullRegeneration).
    /// - Slots of detached drawables keep their range and are marked
    ///   detached; the next [`sync`](Self::sync) removes their entries and
    ///   drops them.
    /// - If the surviving drawables changed relative order, the overlay is
    ///   fully invalidated.
    ///
    /// Returns `true` if any slot table changed shape, which may affect
    /// draw-order inheritance.
    pub fn preprocess(&mut self) -> bool {
        let mut reshaped = false;
        for overlay in OverlayId::ALL {
            let live: Vec<LiveEntry> = self
                .registry
                .iter_overlay(overlay)
                .map(|e| (e.key, e.kind, e.model))
                .collect();
            reshaped |= reconcile(&mut self.overlays[overlay.index()], &live);
        }

        for (key, flags) in self.registry.take_pending() {
            let Some(entry) = self.registry.entry(key) else {
                continue;
            };
            if let Some(slot) = self.overlays[entry.overlay.index()].slot_mut(key) {
                slot.flags.raise(flags);
            }
        }
        reshaped
    }
}

fn reconcile(data: &mut OverlayData, live: &[LiveEntry]) -> bool {
    let unchanged = data.slots.len() == live.len()
        && data
            .slots
            .iter()
            .zip(live)
            .all(|(slot, &(key, kind, _))| slot.key == key && slot.kind == kind && !slot.detached);
    if unchanged {
        return false;
    }

    let live_keys: BTreeSet<DrawableKey> = live.iter().map(|e| e.0).collect();
    let old_keys: BTreeSet<DrawableKey> = data.slots.iter().map(|s| s.key).collect();

    let kept_old = data
        .slots
        .iter()
        .map(|s| s.key)
        .filter(|k| live_keys.contains(k));
    let kept_new = live.iter().map(|e| e.0).filter(|k| old_keys.contains(k));
    if !kept_old.eq(kept_new) {
        data.slots = live
            .iter()
            .map(|&(key, kind, model)| DrawableSlot::new(key, kind, model, 0))
            .collect();
        data.invalidate();
        return true;
    }

    let old = core::mem::take(&mut data.slots);
    let mut slots = Vec::with_capacity(old.len().max(live.len()));
    let (mut i, mut j) = (0, 0);
    loop {
        match (old.get(i).copied(), live.get(j).copied()) {
            (Some(mut slot), _) if !live_keys.contains(&slot.key) => {
                slot.detached = true;
                slots.push(slot);
                i += 1;
            }
            (_, Some((key, kind, model))) if !old_keys.contains(&key) => {
                let from = slots.last().map_or(0, |s: &DrawableSlot| s.from + s.len);
                slots.push(DrawableSlot::new(key, kind, model, from));
                j += 1;
            }
            (Some(mut slot), Some((_, kind, model))) => {
                if slot.detached || slot.kind != kind {
                    slot.flags = RegenFlags::FullRegeneration;
                }
                slot.detached = false;
                slot.kind = kind;
                slot.model = model;
                slots.push(slot);
                i += 1;
                j += 1;
            }
            _ => break,
        }
    }
    data.slots = slots;
    true
}
