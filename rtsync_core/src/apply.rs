// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning a batch of [`SurfaceParams`] into one atomic transaction.
//!
//! Ordering within a batch is fixed:
//!
//! 1. Params are visited last-to-first.
//! 2. For each params, the deferred-until link (if the batch is synchronized)
//!    is added before any attribute.
//! 3. Attributes follow in the order matrix, window crop, alpha, layer,
//!    corner radius, background blur, visibility. Absent attributes are
//!    skipped entirely.
//! 4. Early wakeup, if requested, is set once after every params.
//! 5. The transaction is applied exactly once.
//!
//! [`apply_batch`] returns the [`ApplyEvent`] for the commit instead of
//! reporting it, so callers can emit it after the commit without holding a
//! sink across [`Transaction::apply`].

use crate::backend::Transaction;
use crate::frame::FrameNumber;
use crate::params::{SurfaceFlags, SurfaceParams};
use crate::surface::SurfaceId;
use crate::trace::ApplyEvent;

/// Anchor and frame a batch is held back until.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameSync {
    /// The anchor surface.
    pub anchor: SurfaceId,
    /// The anchor frame that releases the batch.
    pub frame: FrameNumber,
}

/// Applies the attributes present in `params` to `tx`.
///
/// Does not add a deferred-until link and does not commit.
pub fn apply_surface_params<T: Transaction>(tx: &mut T, params: &SurfaceParams) {
    let surface = params.surface();
    if let Some(matrix) = params.matrix() {
        tx.set_matrix(surface, matrix);
    }
    if let Some(crop) = params.window_crop() {
        tx.set_window_crop(surface, crop);
    }
    if let Some(alpha) = params.alpha() {
        tx.set_alpha(surface, alpha);
    }
    if let Some(layer) = params.layer() {
        tx.set_layer(surface, layer);
    }
    if let Some(radius) = params.corner_radius() {
        tx.set_corner_radius(surface, radius);
    }
    if let Some(radius) = params.background_blur_radius() {
        tx.set_background_blur_radius(surface, radius);
    }
    if let Some(visible) = params.visible() {
        tx.set_visibility(surface, visible);
    }
}

/// Applies a whole batch to `tx` and commits it.
///
/// When `sync` is `Some`, every params' surface is deferred until the anchor
/// presents the given frame. When `None`, the batch is released on commit.
///
/// Returns the event describing the commit.
pub fn apply_batch<T: Transaction>(
    mut tx: T,
    sync: Option<FrameSync>,
    early_wakeup: bool,
    params: &[SurfaceParams],
) -> ApplyEvent {
    let mut flags = SurfaceFlags::empty();
    for p in params.iter().rev() {
        if let Some(sync) = sync {
            tx.defer_until(p.surface(), sync.anchor, sync.frame);
        }
        apply_surface_params(&mut tx, p);
        flags |= p.flags();
    }
    if early_wakeup {
        tx.set_early_wakeup();
    }
    tx.apply();

    ApplyEvent {
        anchor: sync.map(|s| s.anchor),
        frame: sync.map(|s| s.frame),
        params: params.len(),
        flags,
        early_wakeup,
    }
}
