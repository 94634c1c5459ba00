// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for draw-order synchronization.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! device update loop calls at each stage. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`SyncSummaryBuilder`] is a convenience helper that folds the events of
//! one update into a [`SyncSummary`].
//!
//! Data-level problems the synchronizer recovers from on its own (corrupt
//! diff input, order/slot range mismatches) are only visible here.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates per-slot [`SlotChange`] events
//!   and the corresponding `TraceSink` method.

use crate::id::{DrawableKey, ViewId};
use crate::overlay::OverlayId;

#[cfg(feature = "trace-rich")]
use crate::drawable::RegenFlags;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why an overlay's whole order was rebroadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResetReason {
    /// The overlay was invalidated (explicitly, by a reorder, or on first
    /// use).
    Invalidated,
    /// The overlay stopped inheriting another view's order.
    InheritanceBroken,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a view starts its synchronization pass.
#[derive(Clone, Copy, Debug)]
pub struct SyncBeginEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The view being synchronized.
    pub view: ViewId,
    /// Whether inheritance was resolved before this pass.
    pub inheritance_checked: bool,
}

/// Per-overlay result of a synchronization pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlaySyncEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The view.
    pub view: ViewId,
    /// The overlay.
    pub overlay: OverlayId,
    /// Slots in the overlay's table at the start of the pass.
    pub slots: u32,
    /// Slots re-queried and diffed.
    pub queried: u32,
    /// Flagged slots left for a later pass (partial-update mode).
    pub deferred: u32,
    /// Highlight-only slots cleared without a query.
    pub highlight_only: u32,
    /// Entries removed from the order.
    pub removed: u32,
    /// Entries inserted into the order.
    pub added: u32,
    /// Order length after the pass.
    pub order_len: u32,
    /// Whether the overlay reused another view's order.
    pub inherited: bool,
}

/// Emitted for every incremental order notification.
#[derive(Clone, Copy, Debug)]
pub struct OrderPatchEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The view.
    pub view: ViewId,
    /// The overlay.
    pub overlay: OverlayId,
    /// Offset of the patch in the order buffer.
    pub from: u32,
    /// Entries removed at `from`.
    pub removed: u32,
    /// Entries inserted at `from`.
    pub inserted: u32,
}

/// Emitted when an overlay's whole order is rebroadcast.
#[derive(Clone, Copy, Debug)]
pub struct OrderResetEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The view.
    pub view: ViewId,
    /// The overlay.
    pub overlay: OverlayId,
    /// Length of the rebroadcast order.
    pub len: u32,
    /// Why the order was rebroadcast.
    pub reason: ResetReason,
}

/// Emitted when an overlay starts or stops inheriting another view's order.
#[derive(Clone, Copy, Debug)]
pub struct InheritanceEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The inheriting view.
    pub view: ViewId,
    /// The overlay.
    pub overlay: OverlayId,
    /// The view whose order is reused, or `None` when the link is broken.
    pub source: Option<ViewId>,
}

/// Emitted when the differ rejected its input and replaced a slot wholesale.
#[derive(Clone, Copy, Debug)]
pub struct DiffFallbackEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The view.
    pub view: ViewId,
    /// The overlay.
    pub overlay: OverlayId,
    /// The drawable whose order was replaced.
    pub drawable: DrawableKey,
    /// Previous order length of the slot.
    pub old_len: u32,
    /// Queried order length of the slot.
    pub new_len: u32,
}

/// Emitted when an overlay's order and slot ranges disagreed and were
/// repaired.
#[derive(Clone, Copy, Debug)]
pub struct RangeRepairEvent {
    /// Device update counter.
    pub frame_index: u64,
    /// The view.
    pub view: ViewId,
    /// The overlay.
    pub overlay: OverlayId,
    /// Order length before the repair.
    pub order_len: u32,
    /// Sum of the slot lengths before the repair.
    pub slots_len: u32,
}

/// Per-update summary produced by [`SyncSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Device update counter.
    pub frame_index: u64,
    /// Views synchronized.
    pub views: u32,
    /// Overlay passes run.
    pub overlays: u32,
    /// Slots re-queried.
    pub queried: u32,
    /// Slots deferred by partial-update mode.
    pub deferred: u32,
    /// Incremental notifications sent.
    pub patches: u32,
    /// Full-order notifications sent.
    pub resets: u32,
    /// Entries removed across all overlays.
    pub removed: u32,
    /// Entries inserted across all overlays.
    pub added: u32,
    /// Differ fallbacks.
    pub fallbacks: u32,
    /// Range repairs.
    pub repairs: u32,
    /// Overlay passes that reused another view's order.
    pub inherited: u32,
}

/// A per-slot change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct SlotChange {
    /// Position of the slot in the overlay's table.
    pub slot_index: u32,
    /// The drawable.
    pub drawable: DrawableKey,
    /// Flags the slot carried into the pass.
    pub flags: RegenFlags,
    /// Slot length before the pass.
    pub old_len: u32,
    /// Slot length after the pass.
    pub new_len: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the device update loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a view starts synchronizing.
    fn on_sync_begin(&mut self, e: &SyncBeginEvent) {
        _ = e;
    }

    /// Called after each overlay pass.
    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        _ = e;
    }

    /// Called for each incremental order notification.
    fn on_order_patch(&mut self, e: &OrderPatchEvent) {
        _ = e;
    }

    /// Called for each full-order notification.
    fn on_order_reset(&mut self, e: &OrderResetEvent) {
        _ = e;
    }

    /// Called when an inheritance link is made or broken.
    fn on_inheritance(&mut self, e: &InheritanceEvent) {
        _ = e;
    }

    /// Called when the differ falls back to a full replace.
    fn on_diff_fallback(&mut self, e: &DiffFallbackEvent) {
        _ = e;
    }

    /// Called when an overlay's ranges are repaired.
    fn on_range_repair(&mut self, e: &RangeRepairEvent) {
        _ = e;
    }

    /// Called with a per-update summary.
    fn on_sync_summary(&mut self, s: &SyncSummary) {
        _ = s;
    }

    /// Called with per-slot changes of one overlay pass (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_slot_changes(
        &mut self,
        frame_index: u64,
        view: ViewId,
        overlay: OverlayId,
        changes: &[SlotChange],
    ) {
        _ = (frame_index, view, overlay, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident, $method:ident, $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`SyncBeginEvent`].
        sync_begin, on_sync_begin, SyncBeginEvent
    );
    dispatch!(
        /// Emits an [`OverlaySyncEvent`].
        overlay_sync, on_overlay_sync, OverlaySyncEvent
    );
    dispatch!(
        /// Emits an [`OrderPatchEvent`].
        order_patch, on_order_patch, OrderPatchEvent
    );
    dispatch!(
        /// Emits an [`OrderResetEvent`].
        order_reset, on_order_reset, OrderResetEvent
    );
    dispatch!(
        /// Emits an [`InheritanceEvent`].
        inheritance, on_inheritance, InheritanceEvent
    );
    dispatch!(
        /// Emits a [`DiffFallbackEvent`].
        diff_fallback, on_diff_fallback, DiffFallbackEvent
    );
    dispatch!(
        /// Emits a [`RangeRepairEvent`].
        range_repair, on_range_repair, RangeRepairEvent
    );
    dispatch!(
        /// Emits a [`SyncSummary`].
        sync_summary, on_sync_summary, SyncSummary
    );

    /// Emits per-slot changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn slot_changes(
        &mut self,
        frame_index: u64,
        view: ViewId,
        overlay: OverlayId,
        changes: &[SlotChange],
    ) {
        if let Some(s) = &mut self.sink {
            s.on_slot_changes(frame_index, view, overlay, changes);
        }
    }
}

// ---------------------------------------------------------------------------
// SyncSummaryBuilder
// ---------------------------------------------------------------------------

/// Folds the events of one device update into a [`SyncSummary`].
///
/// The builder is itself a [`TraceSink`]: hand it to a [`Tracer`] for the
/// duration of an update, then call [`finish`](Self::finish).
#[derive(Debug)]
pub struct SyncSummaryBuilder {
    summary: SyncSummary,
}

impl SyncSummaryBuilder {
    /// Starts building a summary for the given update.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            summary: SyncSummary {
                frame_index,
                ..SyncSummary::default()
            },
        }
    }

    /// Consumes the builder and produces the final [`SyncSummary`].
    #[must_use]
    pub fn finish(self) -> SyncSummary {
        self.summary
    }
}

impl TraceSink for SyncSummaryBuilder {
    fn on_sync_begin(&mut self, _: &SyncBeginEvent) {
        self.summary.views += 1;
    }

    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        let s = &mut self.summary;
        s.overlays += 1;
        s.queried += e.queried;
        s.deferred += e.deferred;
        s.removed += e.removed;
        s.added += e.added;
        if e.inherited {
            s.inherited += 1;
        }
    }

    fn on_order_patch(&mut self, _: &OrderPatchEvent) {
        self.summary.patches += 1;
    }

    fn on_order_reset(&mut self, _: &OrderResetEvent) {
        self.summary.resets += 1;
    }

    fn on_diff_fallback(&mut self, _: &DiffFallbackEvent) {
        self.summary.fallbacks += 1;
    }

    fn on_range_repair(&mut self, _: &RangeRepairEvent) {
        self.summary.repairs += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay_event(queried: u32, removed: u32, added: u32) -> OverlaySyncEvent {
        OverlaySyncEvent {
            frame_index: 3,
            view: ViewId(1),
            overlay: OverlayId::Main,
            slots: 4,
            queried,
            removed,
            added,
            order_len: 10,
            ..OverlaySyncEvent::default()
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_sync_begin(&SyncBeginEvent {
            frame_index: 0,
            view: ViewId(0),
            inheritance_checked: false,
        });
        sink.on_overlay_sync(&overlay_event(1, 0, 0));
        sink.on_sync_summary(&SyncSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.overlay_sync(&overlay_event(1, 2, 3));
        tracer.inheritance(&InheritanceEvent {
            frame_index: 0,
            view: ViewId(2),
            overlay: OverlayId::Main,
            source: Some(ViewId(1)),
        });
    }

    #[test]
    fn summary_builder_accumulates() {
        let mut builder = SyncSummaryBuilder::new(3);
        builder.on_sync_begin(&SyncBeginEvent {
            frame_index: 3,
            view: ViewId(1),
            inheritance_checked: true,
        });
        builder.on_overlay_sync(&overlay_event(2, 1, 4));
        builder.on_overlay_sync(&OverlaySyncEvent {
            inherited: true,
            ..overlay_event(0, 0, 0)
        });
        let patch = OrderPatchEvent {
            frame_index: 3,
            view: ViewId(1),
            overlay: OverlayId::Main,
            from: 0,
            removed: 1,
            inserted: 0,
        };
        builder.on_order_patch(&patch);
        builder.on_order_patch(&patch);

        let summary = builder.finish();
        assert_eq!(summary.frame_index, 3);
        assert_eq!(summary.views, 1);
        assert_eq!(summary.overlays, 2);
        assert_eq!(summary.queried, 2);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.added, 4);
        assert_eq!(summary.patches, 2);
        assert_eq!(summary.inherited, 1);
        assert_eq!(summary.resets, 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            sources: Vec<Option<ViewId>>,
        }
        impl TraceSink for RecordingSink {
            fn on_inheritance(&mut self, e: &InheritanceEvent) {
                self.sources.push(e.source);
            }
        }

        let mut sink = RecordingSink {
            sources: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.inheritance(&InheritanceEvent {
            frame_index: 1,
            view: ViewId(2),
            overlay: OverlayId::Direct,
            source: None,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.sources, &[None]);
    }
}
