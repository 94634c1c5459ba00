// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use accretion_core::id::{DrawableKey, ViewId};
use accretion_core::overlay::OverlayId;
use accretion_core::trace::{
    DiffFallbackEvent, InheritanceEvent, OrderPatchEvent, OrderResetEvent, OverlaySyncEvent,
    RangeRepairEvent, ResetReason, SlotChange, SyncBeginEvent, SyncSummary, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

pub(crate) fn overlay_name(overlay: OverlayId) -> &'static str {
    match overlay {
        OverlayId::UserBackground => "user-bg",
        OverlayId::Main => "main",
        OverlayId::Direct => "direct",
        OverlayId::Highlight => "highlight",
        OverlayId::Contrast => "contrast",
        OverlayId::UserForeground => "user-fg",
        OverlayId::Sprite => "sprite",
        OverlayId::DirectTopmost => "direct-top",
    }
}

fn reason_name(reason: ResetReason) -> &'static str {
    match reason {
        ResetReason::Invalidated => "invalidated",
        ResetReason::InheritanceBroken => "unlinked",
    }
}

fn drawable(key: DrawableKey) -> String {
    match key {
        DrawableKey::Persistent(id) => format!("#{}", id.0),
        DrawableKey::Transient(handle) => format!("~{}", handle.0),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_sync_begin(&mut self, e: &SyncBeginEvent) {
        let checked = if e.inheritance_checked { " inherit-check" } else { "" };
        let _ = writeln!(
            self.writer,
            "[sync] frame={} view={}{checked}",
            e.frame_index, e.view.0,
        );
    }

    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        if e.inherited {
            let _ = writeln!(
                self.writer,
                "[overlay] frame={} view={} {} inherited len={}",
                e.frame_index,
                e.view.0,
                overlay_name(e.overlay),
                e.order_len,
            );
            return;
        }
        let _ = writeln!(
            self.writer,
            "[overlay] frame={} view={} {} slots={} queried={} deferred={} \
             highlight={} -{} +{} len={}",
            e.frame_index,
            e.view.0,
            overlay_name(e.overlay),
            e.slots,
            e.queried,
            e.deferred,
            e.highlight_only,
            e.removed,
            e.added,
            e.order_len,
        );
    }

    fn on_order_patch(&mut self, e: &OrderPatchEvent) {
        let _ = writeln!(
            self.writer,
            "[patch] frame={} view={} {} at={} -{} +{}",
            e.frame_index,
            e.view.0,
            overlay_name(e.overlay),
            e.from,
            e.removed,
            e.inserted,
        );
    }

    fn on_order_reset(&mut self, e: &OrderResetEvent) {
        let _ = writeln!(
            self.writer,
            "[reset] frame={} view={} {} len={} reason={}",
            e.frame_index,
            e.view.0,
            overlay_name(e.overlay),
            e.len,
            reason_name(e.reason),
        );
    }

    fn on_inheritance(&mut self, e: &InheritanceEvent) {
        let source = match e.source {
            Some(source) => format!("view={}", source.0),
            None => "none".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[inherit] frame={} view={} {} source={source}",
            e.frame_index,
            e.view.0,
            overlay_name(e.overlay),
        );
    }

    fn on_diff_fallback(&mut self, e: &DiffFallbackEvent) {
        let _ = writeln!(
            self.writer,
            "[fallback] frame={} view={} {} drawable={} {}->{}",
            e.frame_index,
            e.view.0,
            overlay_name(e.overlay),
            drawable(e.drawable),
            e.old_len,
            e.new_len,
        );
    }

    fn on_range_repair(&mut self, e: &RangeRepairEvent) {
        let _ = writeln!(
            self.writer,
            "[repair] frame={} view={} {} order={} slots={}",
            e.frame_index,
            e.view.0,
            overlay_name(e.overlay),
            e.order_len,
            e.slots_len,
        );
    }

    fn on_sync_summary(&mut self, s: &SyncSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} views={} overlays={} queried={} deferred={} \
             patches={} resets={} -{} +{} fallbacks={} repairs={} inherited={}",
            s.frame_index,
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
        );
    }

    fn on_slot_changes(
        &mut self,
        frame_index: u64,
        view: ViewId,
        overlay: OverlayId,
        changes: &[SlotChange],
    ) {
        let _ = writeln!(
            self.writer,
            "[slots] frame={frame_index} view={} {} changes={}",
            view.0,
            overlay_name(overlay),
            changes.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accretion_core::id::ObjectId;

    #[test]
    fn pretty_print_patch() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_order_patch(&OrderPatchEvent {
            frame_index: 1,
            view: ViewId(2),
            overlay: OverlayId::Main,
            from: 4,
            removed: 1,
            inserted: 0,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[patch]"), "got: {output}");
        assert!(output.contains("view=2 main at=4 -1 +0"), "got: {output}");
    }

    #[test]
    fn pretty_print_inheritance_and_fallback() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_inheritance(&InheritanceEvent {
            frame_index: 0,
            view: ViewId(1),
            overlay: OverlayId::Sprite,
            source: None,
        });
        sink.on_diff_fallback(&DiffFallbackEvent {
            frame_index: 0,
            view: ViewId(1),
            overlay: OverlayId::Main,
            drawable: DrawableKey::Persistent(ObjectId(7)),
            old_len: 3,
            new_len: 2,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("sprite source=none"), "got: {output}");
        assert!(output.contains("drawable=#7 3->2"), "got: {output}");
    }
}
