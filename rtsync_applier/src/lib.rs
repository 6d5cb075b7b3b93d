// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applies surface transactions in sync with a render thread frame.
//!
//! [`SyncRtApplier`] decouples *deciding* on surface mutations, which may
//! happen at any time on the UI thread, from *committing* them, which happens
//! exactly once on the render thread for the next frame of a synchronization
//! anchor, and only if that anchor is still alive.
//!
//! ```text
//!   schedule_apply(params) ──► FrameAnchor::register_frame_callback
//!           │                              │
//!           └──► FrameAnchor::request_frame │ (render thread, frame N)
//!                                          ▼
//!                        anchor valid? ── no ──► drop batch
//!                                          │
//!                                         yes
//!                                          ▼
//!                     defer_until(N) + attributes ──► Transaction::apply
//! ```
//!
//! Appliers bound to an element that is not attached yet are built with
//! [`create`], which waits for the attach event and hands the applier to a
//! continuation.
//!
//! Failures are not reported to the caller: a missing anchor or an anchor
//! released before its frame fires simply drops the batch. Attach an
//! [`ApplyTraceSink`](rtsync_core::trace::ApplyTraceSink) with
//! [`SyncRtApplier::with_trace_sink`] to observe drops.

mod applier;
mod deferred;

pub use applier::{ApplierState, SharedTraceSink, SyncRtApplier};
pub use deferred::{Creation, PendingApplier, PendingStatus, create};
