// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor-side consumers of [`accretion_core`] notifications.
//!
//! This crate sits between the core's draw-order synchronization and a
//! device's actual replay. It defines:
//!
//! - [`OrderMirror`]: per-view, per-overlay replay lists kept in step by
//!   applying order notifications, with inheritance links resolved
//! - [`ReplayPlan`]: the ordered metafiles one view draws in a frame
//! - [`DamageRegion`] and [`MetafileDamage`]: spatial damage from metafile
//!   state transitions, for partial re-rendering

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod damage;
mod mirror;
mod plan;

pub use damage::{DamageRegion, MetafileDamage};
pub use mirror::OrderMirror;
pub use plan::{ReplayItem, ReplayPlan};
