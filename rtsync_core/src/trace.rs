// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observability for scheduled batches.
//!
//! Dropping a batch is silent by default: surface teardown racing with a
//! pending frame is routine. Callers that want to see drops (or every
//! commit) implement [`ApplyTraceSink`] and hand it to the applier. All
//! methods default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn ApplyTraceSink` so call sites can
//! report events with one branch each.

use thiserror::Error;

use crate::frame::FrameNumber;
use crate::params::SurfaceFlags;
use crate::surface::SurfaceId;

// ---------------------------------------------------------------------------
// Drop reasons
// ---------------------------------------------------------------------------

/// Why a batch was discarded instead of applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum DropReason {
    /// The applier was never bound to an attached element.
    #[error("applier target was never attached")]
    UnattachedTarget,
    /// The anchor surface was missing or released before the frame fired.
    #[error("anchor surface became invalid before the frame callback")]
    StaleTarget,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a batch is handed to the applier.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleEvent {
    /// Anchor surface resolved at scheduling time.
    pub anchor: Option<SurfaceId>,
    /// Number of params in the batch.
    pub params: usize,
    /// Whether early wakeup was requested.
    pub early_wakeup: bool,
}

/// Emitted right before a batch's transaction is committed.
#[derive(Clone, Copy, Debug)]
pub struct ApplyEvent {
    /// Anchor the batch was synchronized to, if any.
    pub anchor: Option<SurfaceId>,
    /// Frame the batch was deferred until, if synchronized.
    pub frame: Option<FrameNumber>,
    /// Number of params in the batch.
    pub params: usize,
    /// Union of the field masks of every params.
    pub flags: SurfaceFlags,
    /// Whether early wakeup was set on the transaction.
    pub early_wakeup: bool,
}

/// Emitted when a batch is discarded.
#[derive(Clone, Copy, Debug)]
pub struct DropEvent {
    /// Why the batch was dropped.
    pub reason: DropReason,
    /// Frame the callback fired for, if it fired.
    pub frame: Option<FrameNumber>,
    /// Number of params in the batch.
    pub params: usize,
}

// ---------------------------------------------------------------------------
// ApplyTraceSink trait
// ---------------------------------------------------------------------------

/// Receives batch lifecycle events from an applier.
pub trait ApplyTraceSink {
    /// Called when a batch is scheduled.
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        _ = e;
    }

    /// Called when a batch is about to be committed.
    fn on_apply(&mut self, e: &ApplyEvent) {
        _ = e;
    }

    /// Called when a batch is dropped.
    fn on_drop(&mut self, e: &DropEvent) {
        _ = e;
    }
}

/// An [`ApplyTraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ApplyTraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`ApplyTraceSink`].
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn ApplyTraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn ApplyTraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Emits a [`ScheduleEvent`].
    #[inline]
    pub fn schedule(&mut self, e: &ScheduleEvent) {
        if let Some(s) = &mut self.sink {
            s.on_schedule(e);
        }
    }

    /// Emits an [`ApplyEvent`].
    #[inline]
    pub fn apply(&mut self, e: &ApplyEvent) {
        if let Some(s) = &mut self.sink {
            s.on_apply(e);
        }
    }

    /// Emits a [`DropEvent`].
    #[inline]
    pub fn drop_batch(&mut self, e: &DropEvent) {
        if let Some(s) = &mut self.sink {
            s.on_drop(e);
        }
    }
}
