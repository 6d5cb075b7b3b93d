// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles and diagnostics for rtsync.
//!
//! This crate provides in-process implementations of the
//! [`backend`](rtsync_core::backend) traits and
//! [`ApplyTraceSink`](rtsync_core::trace::ApplyTraceSink) implementations for
//! development and tests:
//!
//! - [`capture::CaptureCompositor`]: records every committed transaction as a
//!   list of [`capture::TransactionOp`].
//! - [`anchor::ManualAnchor`]: a frame anchor whose frames are fired by hand.
//! - [`anchor::ManualTarget`]: an attach target whose attach/detach events
//!   are fired by hand.
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: keeps every event in memory for inspection.

pub mod anchor;
pub mod capture;
pub mod pretty;
pub mod recorder;
