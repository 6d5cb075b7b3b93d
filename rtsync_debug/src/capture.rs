// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A compositor that records transactions instead of presenting them.
//!
//! [`CaptureCompositor`] owns a [`SurfaceRegistry`] for validity checks and
//! keeps one [`Commit`] per applied transaction. Clones share state, so a
//! test can keep one handle while an applier owns another.
//!
//! A commit hook set with [`CaptureCompositor::set_commit_hook`] runs inside
//! every [`Transaction::apply`] before the commit is recorded, which lets a
//! test hold a commit open on the render thread.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kurbo::{Affine, Rect};
use rtsync_core::backend::{Compositor, Transaction};
use rtsync_core::frame::FrameNumber;
use rtsync_core::surface::{SurfaceId, SurfaceRegistry};

/// One recorded transaction call.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionOp {
    /// `defer_until(surface, anchor, frame)`.
    DeferUntil {
        /// Deferred surface.
        surface: SurfaceId,
        /// Anchor surface.
        anchor: SurfaceId,
        /// Anchor frame.
        frame: FrameNumber,
    },
    /// `set_matrix`.
    Matrix(SurfaceId, Affine),
    /// `set_window_crop`.
    WindowCrop(SurfaceId, Rect),
    /// `set_alpha`.
    Alpha(SurfaceId, f32),
    /// `set_layer`.
    Layer(SurfaceId, i32),
    /// `set_corner_radius`.
    CornerRadius(SurfaceId, f32),
    /// `set_background_blur_radius`.
    BackgroundBlurRadius(SurfaceId, u32),
    /// `set_visibility(surface, true)`.
    Show(SurfaceId),
    /// `set_visibility(surface, false)`.
    Hide(SurfaceId),
    /// `set_early_wakeup`.
    EarlyWakeup,
}

impl TransactionOp {
    /// Returns `true` for the deferred-until link.
    #[must_use]
    pub fn is_defer(&self) -> bool {
        matches!(self, Self::DeferUntil { .. })
    }

    /// Returns `true` for operations that change a surface attribute.
    #[must_use]
    pub fn is_attribute(&self) -> bool {
        !matches!(self, Self::DeferUntil { .. } | Self::EarlyWakeup)
    }
}

/// The operations of one applied transaction, in call order.
pub type Commit = Vec<TransactionOp>;

type CommitHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct CaptureState {
    registry: SurfaceRegistry,
    commits: Vec<Commit>,
    begun: usize,
    hook: Option<CommitHook>,
}

impl fmt::Debug for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureState")
            .field("registry", &self.registry)
            .field("commits", &self.commits.len())
            .field("begun", &self.begun)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// Records every transaction applied through it.
#[derive(Clone, Debug, Default)]
pub struct CaptureCompositor {
    state: Arc<Mutex<CaptureState>>,
}

impl CaptureCompositor {
    /// Creates a compositor with no surfaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates a live surface.
    pub fn create_surface(&self) -> SurfaceId {
        self.state().registry.create_surface()
    }

    /// Releases a surface; later validity checks for it fail.
    ///
    /// # Panics
    ///
    /// Panics if the handle is already stale.
    pub fn release_surface(&self, id: SurfaceId) {
        self.state().registry.release_surface(id);
    }

    /// Returns every applied transaction so far.
    #[must_use]
    pub fn commits(&self) -> Vec<Commit> {
        self.state().commits.clone()
    }

    /// Returns the number of applied transactions.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.state().commits.len()
    }

    /// Runs `hook` at the start of every [`Transaction::apply`], without any
    /// compositor lock held.
    pub fn set_commit_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.state().hook = Some(Arc::new(hook));
    }

    /// Returns the number of transactions opened, applied or not.
    #[must_use]
    pub fn transactions_begun(&self) -> usize {
        self.state().begun
    }
}

impl Compositor for CaptureCompositor {
    type Transaction = CaptureTransaction;

    fn begin(&self) -> CaptureTransaction {
        self.state().begun += 1;
        CaptureTransaction {
            ops: Vec::new(),
            state: Arc::clone(&self.state),
        }
    }

    fn is_valid(&self, surface: SurfaceId) -> bool {
        self.state().registry.is_alive(surface)
    }
}

/// A transaction opened by [`CaptureCompositor`].
///
/// Operations are buffered locally and only become visible in
/// [`CaptureCompositor::commits`] when applied.
#[derive(Debug)]
pub struct CaptureTransaction {
    ops: Vec<TransactionOp>,
    state: Arc<Mutex<CaptureState>>,
}

impl Transaction for CaptureTransaction {
    fn defer_until(&mut self, surface: SurfaceId, anchor: SurfaceId, frame: FrameNumber) {
        self.ops.push(TransactionOp::DeferUntil {
            surface,
            anchor,
            frame,
        });
    }

    fn set_matrix(&mut self, surface: SurfaceId, matrix: Affine) {
        self.ops.push(TransactionOp::Matrix(surface, matrix));
    }

    fn set_window_crop(&mut self, surface: SurfaceId, crop: Rect) {
        self.ops.push(TransactionOp::WindowCrop(surface, crop));
    }

    fn set_alpha(&mut self, surface: SurfaceId, alpha: f32) {
        self.ops.push(TransactionOp::Alpha(surface, alpha));
    }

    fn set_layer(&mut self, surface: SurfaceId, layer: i32) {
        self.ops.push(TransactionOp::Layer(surface, layer));
    }

    fn set_corner_radius(&mut self, surface: SurfaceId, radius: f32) {
        self.ops.push(TransactionOp::CornerRadius(surface, radius));
    }

    fn set_background_blur_radius(&mut self, surface: SurfaceId, radius: u32) {
        self.ops.push(TransactionOp::BackgroundBlurRadius(surface, radius));
    }

    fn set_visibility(&mut self, surface: SurfaceId, visible: bool) {
        self.ops.push(if visible {
            TransactionOp::Show(surface)
        } else {
            TransactionOp::Hide(surface)
        });
    }

    fn set_early_wakeup(&mut self) {
        self.ops.push(TransactionOp::EarlyWakeup);
    }

    fn apply(self) {
        let Self { ops, state } = self;
        let lock = || state.lock().unwrap_or_else(PoisonError::into_inner);
        let hook = lock().hook.clone();
        if let Some(hook) = hook {
            hook();
        }
        lock().commits.push(ops);
    }
}
