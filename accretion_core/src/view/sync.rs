// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-order synchronization.

use alloc::vec::Vec;
use core::ops::Range;

use super::View;
use super::overlay_data::OverlayData;
use crate::diff::DiffOutcome;
use crate::drawable::RegenFlags;
use crate::id::{DrawableKey, ViewId};
use crate::inherit;
use crate::observer::OrderObserver;
use crate::overlay::{OverlayId, OverlayMask};
use crate::scene::{OrderQuery, QueryTarget, SceneGraph};
use crate::trace::{
    DiffFallbackEvent, InheritanceEvent, OrderPatchEvent, OrderResetEvent, OverlaySyncEvent,
    RangeRepairEvent, ResetReason, SyncBeginEvent, Tracer,
};

#[cfg(feature = "trace-rich")]
use crate::trace::SlotChange;

/// Settings of one synchronization pass.
///
/// Normally derived from a [`DeviceConfig`](crate::device::DeviceConfig) by
/// the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncOptions {
    /// Device update counter, for tracing.
    pub frame_index: u64,
    /// Defer re-querying flagged slots to a later pass.
    ///
    /// Deferred slots keep their flags instead of being cleared, so the next
    /// pass without this option re-queries them. Only overlays with a valid
    /// order defer. Detached and highlight-only slots are always resolved.
    pub partial_update: bool,
    /// Overlays to synchronize.
    pub overlays: OverlayMask,
    /// Whether inheritance was resolved before this pass, for tracing.
    pub inheritance_checked: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            frame_index: 0,
            partial_update: false,
            overlays: OverlayMask::ALL,
            inheritance_checked: false,
        }
    }
}

impl View {
    /// Synchronizes the draw order of every overlay in `options.overlays`.
    ///
    /// For each overlay the slots are walked in table order:
    ///
    /// - Unflagged slots are skipped.
    /// - [`HighlightModified`](RegenFlags::HighlightModified)-only slots are
    ///   cleared without a query.
    /// - Other flagged slots (and detached ones, which query as empty) are
    ///   re-queried in isolation and diffed against their previous range.
    ///   Removals are applied and reported first, then insertions.
    ///
    /// Incremental notifications are only sent while the overlay's order is
    /// valid and not inherited. An invalid order is rebroadcast in full once
    /// the pass completes.
    ///
    /// An overlay inheriting the order of a view in `sources` copies that
    /// view's order instead of querying, without notifications. If the source
    /// is gone or no longer matches, the link is broken first.
    pub fn sync(
        &mut self,
        sources: &[Self],
        scene: &mut dyn SceneGraph,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
        options: &SyncOptions,
    ) {
        tracer.sync_begin(&SyncBeginEvent {
            frame_index: options.frame_index,
            view: self.id,
            inheritance_checked: options.inheritance_checked,
        });

        for overlay in options.overlays.iter() {
            let mut event = None;
            if let Some(source_id) = self.overlay(overlay).inherited_from {
                match sources.iter().find(|v| v.id == source_id) {
                    Some(source) if self.copy_inherited(overlay, source) => {
                        let data = self.overlay(overlay);
                        event = Some(OverlaySyncEvent {
                            frame_index: options.frame_index,
                            view: self.id,
                            overlay,
                            slots: count(data.slots.len()),
                            order_len: count(data.order.len()),
                            inherited: true,
                            ..OverlaySyncEvent::default()
                        });
                    }
                    _ => {
                        self.set_inheritance(overlay, None, observer, tracer, options.frame_index);
                    }
                }
            }
            let event = match event {
                Some(event) => event,
                None => self.sync_overlay(overlay, scene, observer, tracer, options),
            };
            tracer.overlay_sync(&event);
        }
    }

    /// Issues a whole-overlay query and compares it with the order buffer.
    pub fn verify_order(&mut self, overlay: OverlayId, scene: &mut dyn SceneGraph) -> bool {
        let keys: Vec<DrawableKey> = self.overlay(overlay).keys().collect();
        self.scratch.clear();
        let query = OrderQuery {
            view: self.id,
            props: &self.props,
            overlay,
            target: QueryTarget::Overlay(&keys),
            disable_nested: false,
        };
        scene.query_draw_order(&query, &mut self.scratch);
        self.scratch == self.overlay(overlay).order
    }

    /// Links `overlay` to `source`'s order, or unlinks it.
    ///
    /// Unlinking invalidates the local order so that the next pass
    /// rebroadcasts it. Returns `false` if the link was already in place.
    pub(crate) fn set_inheritance(
        &mut self,
        overlay: OverlayId,
        source: Option<ViewId>,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
        frame_index: u64,
    ) -> bool {
        let data = &mut self.overlays[overlay.index()];
        if data.inherited_from == source {
            return false;
        }
        if source.is_none() {
            data.order_valid = false;
            data.unlinked = true;
        }
        data.inherited_from = source;
        observer.on_order_inheritance(self.id, overlay, source);
        tracer.inheritance(&InheritanceEvent {
            frame_index,
            view: self.id,
            overlay,
            source,
        });
        true
    }

    /// Sends the whole order of `overlay` and marks it valid.
    pub(crate) fn rebroadcast(
        &mut self,
        overlay: OverlayId,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
        frame_index: u64,
    ) {
        let data = &mut self.overlays[overlay.index()];
        observer.on_order_reset(self.id, overlay, &data.order);
        tracer.order_reset(&OrderResetEvent {
            frame_index,
            view: self.id,
            overlay,
            len: count(data.order.len()),
            reason: if data.unlinked {
                ResetReason::InheritanceBroken
            } else {
                ResetReason::Invalidated
            },
        });
        data.order_valid = true;
        data.unlinked = false;
    }

    fn copy_inherited(&mut self, overlay: OverlayId, source: &Self) -> bool {
        let data = &mut self.overlays[overlay.index()];
        if !inherit::is_content_compatible_overlay(source, data, overlay) {
            return false;
        }
        data.slots.retain(|s| !s.detached);
        let src = source.overlay(overlay);
        data.order.clone_from(&src.order);
        for (slot, from) in data.slots.iter_mut().zip(&src.slots) {
            slot.from = from.from;
            slot.len = from.len;
            // A slot the source deferred is still stale here.
            if from.flags.is_set() {
                slot.flags.raise(from.flags);
            } else {
                slot.flags = RegenFlags::None;
            }
        }
        data.changed.clone_from(&src.changed);
        data.order_valid = true;
        true
    }

    fn sync_overlay(
        &mut self,
        overlay: OverlayId,
        scene: &mut dyn SceneGraph,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
        options: &SyncOptions,
    ) -> OverlaySyncEvent {
        let view = self.id;
        let frame_index = options.frame_index;
        let Self {
            props,
            overlays,
            differ,
            scratch,
            ..
        } = &mut *self;
        let props = &*props;
        let data = &mut overlays[overlay.index()];

        let mut event = OverlaySyncEvent {
            frame_index,
            view,
            overlay,
            slots: count(data.slots.len()),
            ..OverlaySyncEvent::default()
        };
        let mut changed = None;
        let mut ctx = PatchContext {
            view,
            overlay,
            frame_index,
            notify: data.order_valid && data.inherited_from.is_none(),
        };
        repair_ranges(data, &ctx, observer, tracer, &mut changed);
        ctx.notify = data.order_valid && data.inherited_from.is_none();
        // Deferring only makes sense while consumers hold a usable order.
        let defer = options.partial_update && data.order_valid;

        #[cfg(feature = "trace-rich")]
        let mut slot_changes = Vec::new();

        let mut offset = 0;
        for (index, slot) in data.slots.iter_mut().enumerate() {
            #[cfg(not(feature = "trace-rich"))]
            let _ = index;
            slot.from = offset;
            let flags = slot.flags;
            if !slot.detached {
                if !flags.is_set() {
                    offset += slot.len;
                    continue;
                }
                if flags.is_highlight_only() {
                    slot.flags = RegenFlags::None;
                    event.highlight_only += 1;
                    offset += slot.len;
                    continue;
                }
                if defer {
                    event.deferred += 1;
                    offset += slot.len;
                    continue;
                }
            }

            scratch.clear();
            if !slot.detached {
                let query = OrderQuery {
                    view,
                    props,
                    overlay,
                    target: QueryTarget::Drawable {
                        key: slot.key,
                        kind: slot.kind,
                    },
                    disable_nested: !slot.kind.queries_nested(),
                };
                scene.query_draw_order(&query, scratch);
            }

            let from = slot.from;
            differ.set_original(&data.order[from..from + slot.len]);
            differ.compare(scratch.as_slice());
            if differ.outcome() == DiffOutcome::Fallback {
                tracer.diff_fallback(&DiffFallbackEvent {
                    frame_index,
                    view,
                    overlay,
                    drawable: slot.key,
                    old_len: count(slot.len),
                    new_len: count(scratch.len()),
                });
            }

            let script = differ.actions();
            for (at, n) in script.removals() {
                let pos = from + at;
                data.order.drain(pos..pos + n);
                ctx.patch(observer, tracer, pos, n, &[]);
            }
            for (at, src, n) in script.insertions() {
                let pos = from + at;
                let ids = &scratch[src..src + n];
                data.order.splice(pos..pos, ids.iter().copied());
                ctx.patch(observer, tracer, pos, 0, ids);
            }
            if !script.is_unchanged() {
                merge_range(&mut changed, from..from + scratch.len());
            }
            event.removed += count(script.removed_count());
            event.added += count(script.added_count());
            event.queried += 1;

            #[cfg(feature = "trace-rich")]
            slot_changes.push(SlotChange {
                slot_index: count(index),
                drawable: slot.key,
                flags,
                old_len: count(slot.len),
                new_len: count(scratch.len()),
            });

            slot.len = scratch.len();
            slot.flags = RegenFlags::None;
            offset += slot.len;
        }

        data.slots.retain(|s| !s.detached);
        data.changed = changed;
        event.order_len = count(data.order.len());

        #[cfg(feature = "trace-rich")]
        if !slot_changes.is_empty() {
            tracer.slot_changes(frame_index, view, overlay, &slot_changes);
        }

        if !data.order_valid && data.inherited_from.is_none() {
            self.rebroadcast(overlay, observer, tracer, frame_index);
        }
        event
    }
}

/// Where incremental notifications of one overlay pass go.
struct PatchContext {
    view: ViewId,
    overlay: OverlayId,
    frame_index: u64,
    notify: bool,
}

impl PatchContext {
    fn patch(
        &self,
        observer: &mut dyn OrderObserver,
        tracer: &mut Tracer<'_>,
        from: usize,
        removed: usize,
        inserted: &[crate::id::MetafileId],
    ) {
        if !self.notify {
            return;
        }
        observer.on_order_changed(self.view, self.overlay, from, removed, inserted);
        tracer.order_patch(&OrderPatchEvent {
            frame_index: self.frame_index,
            view: self.view,
            overlay: self.overlay,
            from: count(from),
            removed: count(removed),
            inserted: count(inserted.len()),
        });
    }
}

/// Makes the slot ranges tile the order buffer again.
///
/// A buffer longer than the slots loses its tail. Slots reaching past a
/// shorter buffer are clamped and flagged for full regeneration, and the
/// order is invalidated: consumers still hold the longer list.
fn repair_ranges(
    data: &mut OverlayData,
    ctx: &PatchContext,
    observer: &mut dyn OrderObserver,
    tracer: &mut Tracer<'_>,
    changed: &mut Option<Range<usize>>,
) {
    let slots_len = data.slots_len();
    let order_len = data.order.len();
    if slots_len == order_len {
        return;
    }
    tracer.range_repair(&RangeRepairEvent {
        frame_index: ctx.frame_index,
        view: ctx.view,
        overlay: ctx.overlay,
        order_len: count(order_len),
        slots_len: count(slots_len),
    });

    if order_len > slots_len {
        data.order.truncate(slots_len);
        ctx.patch(observer, tracer, slots_len, order_len - slots_len, &[]);
        merge_range(changed, slots_len..slots_len);
        return;
    }

    data.order_valid = false;
    let mut offset = 0;
    for slot in &mut data.slots {
        slot.from = offset;
        let available = order_len - offset;
        if slot.len > available {
            slot.len = available;
            slot.flags = RegenFlags::FullRegeneration;
        }
        offset += slot.len;
    }
}

fn merge_range(changed: &mut Option<Range<usize>>, range: Range<usize>) {
    *changed = Some(match changed.take() {
        Some(prev) => prev.start.min(range.start)..prev.end.max(range.end),
        None => range,
    });
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
