// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`ApplyTraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use rtsync_core::frame::FrameNumber;
use rtsync_core::surface::SurfaceId;
use rtsync_core::trace::{ApplyEvent, ApplyTraceSink, DropEvent, ScheduleEvent};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
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
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn surface(s: Option<SurfaceId>) -> String {
    match s {
        Some(s) => format!("{}@{}", s.index(), s.generation()),
        None => "-".to_owned(),
    }
}

fn frame(f: Option<FrameNumber>) -> String {
    match f {
        Some(f) => f.get().to_string(),
        None => "-".to_owned(),
    }
}

impl<W: Write> ApplyTraceSink for PrettyPrintSink<W> {
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        let _ = writeln!(
            self.writer,
            "[schedule] anchor={} params={} early_wakeup={}",
            surface(e.anchor),
            e.params,
            e.early_wakeup,
        );
    }

    fn on_apply(&mut self, e: &ApplyEvent) {
        let _ = writeln!(
            self.writer,
            "[apply] anchor={} frame={} params={} flags={:#04x} early_wakeup={}",
            surface(e.anchor),
            frame(e.frame),
            e.params,
            e.flags.bits(),
            e.early_wakeup,
        );
    }

    fn on_drop(&mut self, e: &DropEvent) {
        let _ = writeln!(
            self.writer,
            "[drop] frame={} params={} reason={}",
            frame(e.frame),
            e.params,
            e.reason,
        );
    }
}
