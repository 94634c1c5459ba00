// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Synchronization events carry no wall-clock time. Each event is placed at
//! `frame_index * FRAME_SPAN_US + sequence`, where `sequence` counts events
//! within the frame, so frames appear as separate bursts on the timeline.
//! Views map to processes and overlays to threads.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use accretion_core::overlay::OverlayId;

use crate::pretty::overlay_name;
use crate::recorder::{RecordedEvent, decode};

/// Timeline width reserved for one device update, in microseconds.
pub const FRAME_SPAN_US: u64 = 10_000;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut clock = Clock::default();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::SyncBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SyncBegin",
                    "cat": "Sync",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "inheritance_checked": e.inheritance_checked,
                    }
                }));
            }
            RecordedEvent::OverlaySync(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Overlay:{}", overlay_name(e.overlay)),
                    "cat": "Sync",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": tid(e.overlay),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "slots": e.slots,
                        "queried": e.queried,
                        "deferred": e.deferred,
                        "highlight_only": e.highlight_only,
                        "removed": e.removed,
                        "added": e.added,
                        "order_len": e.order_len,
                        "inherited": e.inherited,
                    }
                }));
            }
            RecordedEvent::OrderPatch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "OrderPatch",
                    "cat": "Order",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": tid(e.overlay),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "from": e.from,
                        "removed": e.removed,
                        "inserted": e.inserted,
                    }
                }));
            }
            RecordedEvent::OrderReset(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "OrderReset",
                    "cat": "Order",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": tid(e.overlay),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "len": e.len,
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::Inheritance(e) => {
                let name = if e.source.is_some() {
                    "InheritanceLinked"
                } else {
                    "InheritanceBroken"
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Inheritance",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": tid(e.overlay),
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "source": e.source.map(|v| v.0),
                    }
                }));
            }
            RecordedEvent::DiffFallback(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "DiffFallback",
                    "cat": "Recovery",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": tid(e.overlay),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "drawable": format!("{:?}", e.drawable),
                        "old_len": e.old_len,
                        "new_len": e.new_len,
                    }
                }));
            }
            RecordedEvent::RangeRepair(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RangeRepair",
                    "cat": "Recovery",
                    "ts": clock.tick(e.frame_index),
                    "pid": e.view.0,
                    "tid": tid(e.overlay),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "order_len": e.order_len,
                        "slots_len": e.slots_len,
                    }
                }));
            }
            RecordedEvent::SyncSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "SyncSummary",
                    "cat": "Summary",
                    "ts": clock.tick(s.frame_index),
                    "pid": 0,
                    "args": {
                        "queried": s.queried,
                        "deferred": s.deferred,
                        "patches": s.patches,
                        "resets": s.resets,
                        "removed": s.removed,
                        "added": s.added,
                        "inherited": s.inherited,
                    }
                }));
            }
            RecordedEvent::SlotChangesCount {
                frame_index,
                view,
                overlay,
                count,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "SlotChanges",
                    "cat": "Rich",
                    "ts": clock.tick(frame_index),
                    "pid": view.0,
                    "tid": tid(overlay),
                    "s": "t",
                    "args": {
                        "frame_index": frame_index,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn tid(overlay: OverlayId) -> usize {
    overlay.index() + 1
}

/// Synthetic timestamps: one burst per frame.
#[derive(Default)]
struct Clock {
    frame: u64,
    sequence: u64,
}

impl Clock {
    fn tick(&mut self, frame_index: u64) -> u64 {
        if frame_index != self.frame {
            self.frame = frame_index;
            self.sequence = 0;
        }
        let ts = frame_index
            .saturating_mul(FRAME_SPAN_US)
            .saturating_add(self.sequence.min(FRAME_SPAN_US - 1));
        self.sequence += 1;
        ts
    }
}
