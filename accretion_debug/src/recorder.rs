// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_slot_changes`](TraceSink::on_slot_changes)) store only
//! the count.

use accretion_core::id::{DrawableKey, ObjectId, TransientHandle, ViewId};
use accretion_core::overlay::OverlayId;
use accretion_core::trace::{
    DiffFallbackEvent, InheritanceEvent, OrderPatchEvent, OrderResetEvent, OverlaySyncEvent,
    RangeRepairEvent, ResetReason, SlotChange, SyncBeginEvent, SyncSummary, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SYNC_BEGIN: u8 = 1;
const TAG_OVERLAY_SYNC: u8 = 2;
const TAG_ORDER_PATCH: u8 = 3;
const TAG_ORDER_RESET: u8 = 4;
const TAG_INHERITANCE: u8 = 5;
const TAG_DIFF_FALLBACK: u8 = 6;
const TAG_RANGE_REPAIR: u8 = 7;
const TAG_SYNC_SUMMARY: u8 = 8;
const TAG_SLOT_CHANGES_COUNT: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_header(&mut self, tag: u8, frame_index: u64, view: ViewId) {
        self.write_u8(tag);
        self.write_u64(frame_index);
        self.write_u32(view.0);
    }

    fn write_overlay(&mut self, overlay: OverlayId) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "overlay indices are below OverlayId::COUNT"
        )]
        self.write_u8(overlay.index() as u8);
    }

    fn write_option_view(&mut self, v: Option<ViewId>) {
        match v {
            Some(view) => {
                self.write_u8(1);
                self.write_u32(view.0);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
        }
    }

    fn write_drawable(&mut self, key: DrawableKey) {
        match key {
            DrawableKey::Persistent(id) => {
                self.write_u8(0);
                self.write_u64(id.0);
            }
            DrawableKey::Transient(handle) => {
                self.write_u8(1);
                self.write_u64(handle.0);
            }
        }
    }

    fn write_reason(&mut self, reason: ResetReason) {
        self.write_u8(match reason {
            ResetReason::Invalidated => 0,
            ResetReason::InheritanceBroken => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_sync_begin(&mut self, e: &SyncBeginEvent) {
        self.write_header(TAG_SYNC_BEGIN, e.frame_index, e.view);
        self.write_bool(e.inheritance_checked);
    }

    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        self.write_header(TAG_OVERLAY_SYNC, e.frame_index, e.view);
        self.write_overlay(e.overlay);
        self.write_u32(e.slots);
        self.write_u32(e.queried);
        self.write_u32(e.deferred);
        self.write_u32(e.highlight_only);
        self.write_u32(e.removed);
        self.write_u32(e.added);
        self.write_u32(e.order_len);
        self.write_bool(e.inherited);
    }

    fn on_order_patch(&mut self, e: &OrderPatchEvent) {
        self.write_header(TAG_ORDER_PATCH, e.frame_index, e.view);
        self.write_overlay(e.overlay);
        self.write_u32(e.from);
        self.write_u32(e.removed);
        self.write_u32(e.inserted);
    }

    fn on_order_reset(&mut self, e: &OrderResetEvent) {
        self.write_header(TAG_ORDER_RESET, e.frame_index, e.view);
        self.write_overlay(e.overlay);
        self.write_u32(e.len);
        self.write_reason(e.reason);
    }

    fn on_inheritance(&mut self, e: &InheritanceEvent) {
        self.write_header(TAG_INHERITANCE, e.frame_index, e.view);
        self.write_overlay(e.overlay);
        self.write_option_view(e.source);
    }

    fn on_diff_fallback(&mut self, e: &DiffFallbackEvent) {
        self.write_header(TAG_DIFF_FALLBACK, e.frame_index, e.view);
        self.write_overlay(e.overlay);
        self.write_drawable(e.drawable);
        self.write_u32(e.old_len);
        self.write_u32(e.new_len);
    }

    fn on_range_repair(&mut self, e: &RangeRepairEvent) {
        self.write_header(TAG_RANGE_REPAIR, e.frame_index, e.view);
        self.write_overlay(e.overlay);
        self.write_u32(e.order_len);
        self.write_u32(e.slots_len);
    }

    fn on_sync_summary(&mut self, s: &SyncSummary) {
        self.write_u8(TAG_SYNC_SUMMARY);
        self.write_u64(s.frame_index);
        for v in [
            s.views,
            s.overlays,
            s.queried,
            s.deferred,
            s.patches,
            s.resets,
            s.removed,
            s.added,
            s.fallbacks,
            s.repairs,
            s.inherited,
        ] {
            self.write_u32(v);
        }
    }

    fn on_slot_changes(
        &mut self,
        frame_index: u64,
        view: ViewId,
        overlay: OverlayId,
        changes: &[SlotChange],
    ) {
        self.write_header(TAG_SLOT_CHANGES_COUNT, frame_index, view);
        self.write_overlay(overlay);
        self.write_u32(u32::try_from(changes.len()).unwrap_or(u32::MAX));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`SyncBeginEvent`].
    SyncBegin(SyncBeginEvent),
    /// An [`OverlaySyncEvent`].
    OverlaySync(OverlaySyncEvent),
    /// An [`OrderPatchEvent`].
    OrderPatch(OrderPatchEvent),
    /// An [`OrderResetEvent`].
    OrderReset(OrderResetEvent),
    /// An [`InheritanceEvent`].
    Inheritance(InheritanceEvent),
    /// A [`DiffFallbackEvent`].
    DiffFallback(DiffFallbackEvent),
    /// A [`RangeRepairEvent`].
    RangeRepair(RangeRepairEvent),
    /// A [`SyncSummary`].
    SyncSummary(SyncSummary),
    /// Slot-change count for one overlay pass.
    SlotChangesCount {
        /// Device update counter.
        frame_index: u64,
        /// The view.
        view: ViewId,
        /// The overlay.
        overlay: OverlayId,
        /// Number of slot changes.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_view(&mut self) -> Option<ViewId> {
        self.read_u32().map(ViewId)
    }

    fn read_overlay(&mut self) -> Option<OverlayId> {
        OverlayId::from_index(usize::from(self.read_u8()?))
    }

    fn read_option_view(&mut self) -> Option<Option<ViewId>> {
        let present = self.read_u8()?;
        let view = self.read_view()?;
        Some((present != 0).then_some(view))
    }

    fn read_drawable(&mut self) -> Option<DrawableKey> {
        let kind = self.read_u8()?;
        let raw = self.read_u64()?;
        Some(match kind {
            0 => DrawableKey::Persistent(ObjectId(raw)),
            _ => DrawableKey::Transient(TransientHandle(raw)),
        })
    }

    fn read_reason(&mut self) -> Option<ResetReason> {
        Some(match self.read_u8()? {
            0 => ResetReason::Invalidated,
            _ => ResetReason::InheritanceBroken,
        })
    }

    fn decode_sync_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SyncBegin(SyncBeginEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            inheritance_checked: self.read_bool()?,
        }))
    }

    fn decode_overlay_sync(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OverlaySync(OverlaySyncEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            slots: self.read_u32()?,
            queried: self.read_u32()?,
            deferred: self.read_u32()?,
            highlight_only: self.read_u32()?,
            removed: self.read_u32()?,
            added: self.read_u32()?,
            order_len: self.read_u32()?,
            inherited: self.read_bool()?,
        }))
    }

    fn decode_order_patch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OrderPatch(OrderPatchEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            from: self.read_u32()?,
            removed: self.read_u32()?,
            inserted: self.read_u32()?,
        }))
    }

    fn decode_order_reset(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OrderReset(OrderResetEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            len: self.read_u32()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_inheritance(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Inheritance(InheritanceEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            source: self.read_option_view()?,
        }))
    }

    fn decode_diff_fallback(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DiffFallback(DiffFallbackEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            drawable: self.read_drawable()?,
            old_len: self.read_u32()?,
            new_len: self.read_u32()?,
        }))
    }

    fn decode_range_repair(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RangeRepair(RangeRepairEvent {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            order_len: self.read_u32()?,
            slots_len: self.read_u32()?,
        }))
    }

    fn decode_sync_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SyncSummary(SyncSummary {
            frame_index: self.read_u64()?,
            views: self.read_u32()?,
            overlays: self.read_u32()?,
            queried: self.read_u32()?,
            deferred: self.read_u32()?,
            patches: self.read_u32()?,
            resets: self.read_u32()?,
            removed: self.read_u32()?,
            added: self.read_u32()?,
            fallbacks: self.read_u32()?,
            repairs: self.read_u32()?,
            inherited: self.read_u32()?,
        }))
    }

    fn decode_slot_changes_count(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotChangesCount {
            frame_index: self.read_u64()?,
            view: self.read_view()?,
            overlay: self.read_overlay()?,
            count: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SYNC_BEGIN => self.decode_sync_begin(),
            TAG_OVERLAY_SYNC => self.decode_overlay_sync(),
            TAG_ORDER_PATCH => self.decode_order_patch(),
            TAG_ORDER_RESET => self.decode_order_reset(),
            TAG_INHERITANCE => self.decode_inheritance(),
            TAG_DIFF_FALLBACK => self.decode_diff_fallback(),
            TAG_RANGE_REPAIR => self.decode_range_repair(),
            TAG_SYNC_SUMMARY => self.decode_sync_summary(),
            TAG_SLOT_CHANGES_COUNT => self.decode_slot_changes_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use accretion_core::device::{Device, DeviceConfig};
    use accretion_core::drawable::{DrawableKind, ReactorHost};
    use accretion_core::id::{MetafileId, ModelId};
    use accretion_core::observer::NoopObserver;
    use accretion_core::scene::{OrderQuery, QueryTarget, SceneGraph};
    use accretion_core::trace::{SyncSummaryBuilder, Tracer};
    use accretion_core::view::ViewProps;

    fn sample_overlay_sync() -> OverlaySyncEvent {
        OverlaySyncEvent {
            frame_index: 7,
            view: ViewId(2),
            overlay: OverlayId::Highlight,
            slots: 12,
            queried: 3,
            deferred: 1,
            highlight_only: 2,
            removed: 4,
            added: 5,
            order_len: 40,
            inherited: false,
        }
    }

    #[test]
    fn round_trip_overlay_sync() {
        let mut rec = RecorderSink::new();
        let orig = sample_overlay_sync();
        rec.on_overlay_sync(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::OverlaySync(e) => {
                assert_eq!(e.frame_index, orig.frame_index);
                assert_eq!(e.view, orig.view);
                assert_eq!(e.overlay, orig.overlay);
                assert_eq!(e.queried, orig.queried);
                assert_eq!(e.deferred, orig.deferred);
                assert_eq!(e.highlight_only, orig.highlight_only);
                assert_eq!(e.order_len, orig.order_len);
            }
            other => panic!("expected OverlaySync, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_inheritance_and_fallback() {
        let mut rec = RecorderSink::new();
        rec.on_inheritance(&InheritanceEvent {
            frame_index: 1,
            view: ViewId(3),
            overlay: OverlayId::Main,
            source: Some(ViewId(0)),
        });
        rec.on_inheritance(&InheritanceEvent {
            frame_index: 2,
            view: ViewId(3),
            overlay: OverlayId::Main,
            source: None,
        });
        rec.on_diff_fallback(&DiffFallbackEvent {
            frame_index: 2,
            view: ViewId(3),
            overlay: OverlayId::Main,
            drawable: DrawableKey::Transient(TransientHandle(9)),
            old_len: 2,
            new_len: 5,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            RecordedEvent::Inheritance(InheritanceEvent {
                source: Some(ViewId(0)),
                ..
            })
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::Inheritance(InheritanceEvent { source: None, .. })
        ));
        match &events[2] {
            RecordedEvent::DiffFallback(e) => {
                assert_eq!(e.drawable, DrawableKey::Transient(TransientHandle(9)));
                assert_eq!((e.old_len, e.new_len), (2, 5));
            }
            other => panic!("expected DiffFallback, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_summary() {
        let mut rec = RecorderSink::new();
        let orig = SyncSummary {
            frame_index: 9,
            views: 2,
            overlays: 16,
            queried: 3,
            patches: 4,
            resets: 1,
            added: 6,
            inherited: 8,
            ..SyncSummary::default()
        };
        rec.on_sync_summary(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::SyncSummary(s)] => assert_eq!(*s, orig),
            other => panic!("expected one SyncSummary, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_order_reset(&OrderResetEvent {
            frame_index: 1,
            view: ViewId(0),
            overlay: OverlayId::Sprite,
            len: 3,
            reason: ResetReason::InheritanceBroken,
        });
        rec.on_order_patch(&OrderPatchEvent {
            frame_index: 1,
            view: ViewId(0),
            overlay: OverlayId::Sprite,
            from: 0,
            removed: 1,
            inserted: 0,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1, "the partial patch record is dropped");
        assert!(matches!(
            events[0],
            RecordedEvent::OrderReset(OrderResetEvent {
                reason: ResetReason::InheritanceBroken,
                ..
            })
        ));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    /// Every drawable draws one metafile named after its object id.
    struct OnePerDrawable;

    impl SceneGraph for OnePerDrawable {
        fn query_draw_order(&mut self, query: &OrderQuery<'_>, out: &mut Vec<MetafileId>) {
            if let QueryTarget::Drawable {
                key: DrawableKey::Persistent(id),
                ..
            } = query.target
            {
                out.push(MetafileId(id.0));
            }
        }
    }

    struct NoReactors;

    impl ReactorHost for NoReactors {
        fn attach_reactor(&mut self, _: ModelId, _: ViewId) {}

        fn detach_reactor(&mut self, _: ModelId, _: ViewId) {}
    }

    #[test]
    fn records_a_device_update() {
        let mut device = Device::new(DeviceConfig::single_view());
        let view = device.add_view(ViewProps::default());
        for n in 1..=3 {
            device.view_mut(view).add(
                DrawableKey::Persistent(ObjectId(n)),
                DrawableKind::Persistent,
                None,
                OverlayId::Main,
                &mut NoReactors,
            );
        }

        let mut rec = RecorderSink::new();
        let mut summary = SyncSummaryBuilder::new(device.frame_index());
        device.update(&mut OnePerDrawable, &mut NoopObserver, &mut Tracer::new(&mut rec));
        device.update(&mut OnePerDrawable, &mut NoopObserver, &mut Tracer::new(&mut summary));
        rec.on_sync_summary(&summary.finish());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(matches!(events[0], RecordedEvent::SyncBegin(_)));
        let patches = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::OrderPatch(_)))
            .count();
        assert_eq!(patches, 3, "one insertion per drawable");
        let slot_changes = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::SlotChangesCount { count: 3, .. }))
            .count();
        assert_eq!(slot_changes, 1);
        match events.last() {
            Some(RecordedEvent::SyncSummary(s)) => {
                assert_eq!(s.views, 1);
                assert_eq!(s.queried, 0, "the second update has nothing to do");
                assert_eq!(s.overlays, 8);
            }
            other => panic!("expected SyncSummary, got {other:?}"),
        }
    }
}
