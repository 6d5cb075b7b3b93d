// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`ApplyTraceSink`] and keeps every event as a
//! [`RecordedEvent`], in arrival order.

use rtsync_core::trace::{ApplyEvent, ApplyTraceSink, DropEvent, DropReason, ScheduleEvent};

/// A single recorded event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A batch was scheduled.
    Schedule(ScheduleEvent),
    /// A batch was committed.
    Apply(ApplyEvent),
    /// A batch was dropped.
    Drop(DropEvent),
}

/// An [`ApplyTraceSink`] that stores events in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Returns the number of applied batches.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Apply(_)))
            .count()
    }

    /// Returns the reasons of every dropped batch.
    #[must_use]
    pub fn drop_reasons(&self) -> Vec<DropReason> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Drop(d) => Some(d.reason),
                _ => None,
            })
            .collect()
    }
}

impl ApplyTraceSink for RecorderSink {
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.events.push(RecordedEvent::Schedule(*e));
    }

    fn on_apply(&mut self, e: &ApplyEvent) {
        self.events.push(RecordedEvent::Apply(*e));
    }

    fn on_drop(&mut self, e: &DropEvent) {
        self.events.push(RecordedEvent::Drop(*e));
    }
}
