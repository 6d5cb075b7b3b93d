// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-thread frame identification.
//!
//! [`FrameNumber`] names a specific frame drawn by the render thread that
//! owns a synchronization anchor. Backends assign these; core only compares
//! and forwards them.

use core::fmt;

/// Identifies one frame produced by the render thread of an anchor.
///
/// Frame numbers increase monotonically for a given anchor surface. A
/// transaction deferred until frame `N` is released by the compositor once the
/// anchor surface has presented frame `N`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameNumber(pub u64);

impl FrameNumber {
    /// Returns the raw frame counter.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the frame that follows this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for FrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameNumber({})", self.0)
    }
}
