// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental metafile cache and draw-order synchronization for CAD views.
//!
//! `accretion_core` keeps, for every view and compositing overlay, an
//! ordered list of cached metafile ids (the *draw order*) in step with an
//! external scene graph. Scene notifications only mark drawables dirty;
//! synchronization re-queries the marked drawables in isolation, diffs each
//! result against its previous range, and reports minimal patches to the
//! compositor. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   scene notifications
//!       │  View::add / erase / on_modified / on_erased / on_highlight
//!       ▼
//!   DrawableRegistry (understory_dirty marks)
//!       │
//!       ▼
//!   View::preprocess() ──► slot tables + regeneration flags
//!       │
//!       ▼
//!   Device::update() ──► inheritance resolution ──► View::sync()
//!                                                      │
//!               SceneGraph::query_draw_order ◄─────────┤
//!               SequenceDiffer::compare ◄──────────────┤
//!                                                      ▼
//!                                           OrderObserver patches
//! ```
//!
//! **[`metafile`]**: recording, replay and erasure of metafiles, with
//! flag notifications through [`MetafileObserver`](observer::MetafileObserver).
//!
//! **[`drawable`]**: the per-view registry of attached drawables, model
//! reference counts and lazily consumed regeneration marks.
//!
//! **[`dirty`]**: channel constants for the registry's dirty tracking.
//!
//! **[`diff`]**: the sequence differ turning an old and a new metafile
//! sequence into a run-length action script.
//!
//! **[`view`]**: per-overlay slot tables, order buffers and the
//! synchronization state machine.
//!
//! **[`inherit`]**: predicates deciding when one view may reuse another's
//! draw order.
//!
//! **[`device`]**: an ordered set of views updated together.
//!
//! **[`scene`]** and **[`observer`]**: the traits connecting the core to the
//! scene graph and to the compositor.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! synchronization instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-slot
//!   change events.
//!
//! # Minimum supported Rust version
//!
//! Rust 1.92.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod device;
pub mod diff;
pub mod dirty;
pub mod drawable;
pub mod id;
pub mod inherit;
pub mod metafile;
pub mod observer;
pub mod overlay;
pub mod scene;
pub mod trace;
pub mod view;

#[cfg(test)]
mod testing;
