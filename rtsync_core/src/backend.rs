// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! rtsync splits platform-specific work from the scheduling logic. A platform
//! provides the following pieces:
//!
//! - **Transaction**: Implements [`Transaction`]: a batch of surface
//!   mutations that becomes visible to the display pipeline in one step when
//!   [`apply`](Transaction::apply) is called.
//!
//! - **Compositor**: Implements [`Compositor`]: opens transactions and
//!   answers whether a surface handle still refers to a live surface.
//!
//! - **Frame anchor**: Implements [`FrameAnchor`]: the render-thread-backed
//!   root whose surface acts as the synchronization anchor. It delivers one-shot
//!   frame callbacks and can be asked to schedule a frame.
//!
//! - **Attach target**: Implements [`AttachTarget`]: the UI element an
//!   applier binds to. It yields its anchor once attached to a rendering
//!   context and notifies listeners of attach/detach.
//!
//! # Threading
//!
//! Frame callbacks run on the render thread, so [`FrameCallback`] is `Send`
//! and [`Compositor`] must be usable from there. Everything else is called
//! from the owning UI thread.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use kurbo::{Affine, Rect};

use crate::frame::FrameNumber;
use crate::surface::SurfaceId;

/// A batch of surface mutations committed atomically.
///
/// Implementations buffer every call and make the whole batch visible at once
/// in [`apply`](Self::apply). Dropping a transaction without applying it
/// discards the batch.
pub trait Transaction {
    /// Holds back this transaction's changes to `surface` until `anchor` has
    /// presented `frame`.
    fn defer_until(&mut self, surface: SurfaceId, anchor: SurfaceId, frame: FrameNumber);

    /// Sets the affine transform of `surface`.
    fn set_matrix(&mut self, surface: SurfaceId, matrix: Affine);

    /// Sets the window crop of `surface`.
    fn set_window_crop(&mut self, surface: SurfaceId, crop: Rect);

    /// Sets the opacity of `surface`.
    fn set_alpha(&mut self, surface: SurfaceId, alpha: f32);

    /// Sets the stacking order of `surface` among its siblings.
    fn set_layer(&mut self, surface: SurfaceId, layer: i32);

    /// Sets the rounded-corner radius of `surface`.
    fn set_corner_radius(&mut self, surface: SurfaceId, radius: f32);

    /// Sets the radius used to blur whatever is behind `surface`.
    fn set_background_blur_radius(&mut self, surface: SurfaceId, radius: u32);

    /// Shows (`true`) or hides (`false`) `surface`.
    fn set_visibility(&mut self, surface: SurfaceId, visible: bool);

    /// Asks the compositor to wake early for this transaction.
    fn set_early_wakeup(&mut self);

    /// Commits the batch.
    fn apply(self);
}

/// Opens transactions and validates surface handles.
pub trait Compositor {
    /// The transaction type this compositor produces.
    type Transaction: Transaction;

    /// Opens a new, empty transaction.
    fn begin(&self) -> Self::Transaction;

    /// Returns whether `surface` still refers to a live surface.
    fn is_valid(&self, surface: SurfaceId) -> bool;
}

/// One-shot callback fired by the render thread with the frame it drew.
pub type FrameCallback = Box<dyn FnOnce(FrameNumber) + Send + 'static>;

/// The render-thread root that acts as a synchronization anchor.
pub trait FrameAnchor {
    /// Returns the surface the render thread currently draws into.
    ///
    /// The result may change between frames (e.g. after a surface is
    /// recreated), so callers re-query it rather than caching it.
    fn render_surface(&self) -> Option<SurfaceId>;

    /// Registers `callback` to run once, on the render thread, for the next
    /// frame it draws.
    fn register_frame_callback(&self, callback: FrameCallback);

    /// Ensures a frame is scheduled even if nothing else is invalid.
    fn request_frame(&self);
}

/// Identifies a listener registered with an [`AttachTarget`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// Receives attach-state changes of an [`AttachTarget`].
pub trait AttachListener<T: ?Sized> {
    /// The target was attached to a rendering context.
    fn on_attached(&self, target: &T);

    /// The target was detached from its rendering context.
    fn on_detached(&self, target: &T);
}

/// A UI element that can be attached to a rendering context.
pub trait AttachTarget {
    /// The anchor type exposed once attached.
    type Anchor: FrameAnchor;

    /// Returns the anchor if the element is attached.
    fn anchor(&self) -> Option<Arc<Self::Anchor>>;

    /// Registers a listener for attach-state changes.
    fn add_attach_listener(&self, listener: Arc<dyn AttachListener<Self>>) -> ListenerId;

    /// Unregisters a listener. Unknown ids are ignored.
    fn remove_attach_listener(&self, id: ListenerId);
}
