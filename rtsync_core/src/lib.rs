// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types and contracts for frame-synchronized surface transactions.
//!
//! `rtsync_core` describes *what* should happen to a set of surfaces on the
//! next rendered frame, and the contract a platform must fulfil for it to
//! happen atomically. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! A UI client decides on surface mutations eagerly, but the mutations are
//! only committed once the render thread reports the frame they belong to:
//!
//! ```text
//!   SurfaceParams::builder() ──► SurfaceParams (immutable)
//!                                     │
//!                                     ▼
//!   FrameAnchor::register_frame_callback ──► frame N
//!                                     │
//!                                     ▼
//!   Compositor::begin() ──► apply_batch() ──► Transaction::apply()
//! ```
//!
//! **[`surface`]**: Generational surface handles and a registry that can tell
//! live handles from stale ones.
//!
//! **[`params`]**: [`SurfaceParams`](params::SurfaceParams), its builder, and
//! the [`SurfaceFlags`](params::SurfaceFlags) field mask.
//!
//! **[`backend`]**: Traits that platform integrations implement: the
//! transaction, the compositor that opens transactions, the frame anchor, and
//! the attach target.
//!
//! **[`apply`]**: The batch routine that turns a list of params into one
//! atomic transaction.
//!
//! **[`frame`]**: Frame numbers delivered by the render thread.
//!
//! **[`trace`]**: [`ApplyTraceSink`](trace::ApplyTraceSink) trait and event
//! types for observing scheduled, applied, and dropped batches.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod apply;
pub mod backend;
pub mod frame;
pub mod params;
pub mod surface;
pub mod trace;
