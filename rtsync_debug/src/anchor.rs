// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hand-driven frame anchors and attach targets.
//!
//! [`ManualAnchor`] stands in for a render thread: frame callbacks queue up
//! until [`fire_frame`](ManualAnchor::fire_frame) delivers them.
//! [`ManualTarget`] stands in for a UI element whose attach state is flipped
//! by the test.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use rtsync_core::backend::{AttachListener, AttachTarget, FrameAnchor, FrameCallback, ListenerId};
use rtsync_core::frame::FrameNumber;
use rtsync_core::surface::SurfaceId;

struct AnchorState {
    surface: Option<SurfaceId>,
    callbacks: Vec<FrameCallback>,
    frames_requested: usize,
    last_frame: FrameNumber,
}

/// A [`FrameAnchor`] whose frames are produced on demand.
pub struct ManualAnchor {
    state: Mutex<AnchorState>,
}

impl fmt::Debug for ManualAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ManualAnchor")
            .field("surface", &state.surface)
            .field("pending_callbacks", &state.callbacks.len())
            .field("frames_requested", &state.frames_requested)
            .field("last_frame", &state.last_frame)
            .finish()
    }
}

impl ManualAnchor {
    /// Creates an anchor drawing into `surface`, starting at frame 0.
    #[must_use]
    pub fn new(surface: Option<SurfaceId>) -> Self {
        Self {
            state: Mutex::new(AnchorState {
                surface,
                callbacks: Vec::new(),
                frames_requested: 0,
                last_frame: FrameNumber(0),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, AnchorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the surface reported by [`render_surface`](FrameAnchor::render_surface).
    pub fn set_render_surface(&self, surface: Option<SurfaceId>) {
        self.state().surface = surface;
    }

    /// Returns the number of callbacks waiting for the next frame.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.state().callbacks.len()
    }

    /// Returns how many times a frame was requested.
    #[must_use]
    pub fn frames_requested(&self) -> usize {
        self.state().frames_requested
    }

    /// Draws the next frame on the calling thread, running every pending
    /// callback in registration order. Returns the frame number delivered.
    pub fn fire_frame(&self) -> FrameNumber {
        let (frame, callbacks) = self.take_frame();
        for callback in callbacks {
            callback(frame);
        }
        frame
    }

    /// Like [`fire_frame`](Self::fire_frame), but runs the callbacks on a
    /// separate thread and waits for it, the way a render thread would.
    pub fn fire_frame_on_thread(&self) -> FrameNumber {
        let (frame, callbacks) = self.take_frame();
        let handle = thread::spawn(move || {
            for callback in callbacks {
                callback(frame);
            }
        });
        if let Err(panic) = handle.join() {
            std::panic::resume_unwind(panic);
        }
        frame
    }

    /// Drops every pending callback without running it, the way a render
    /// thread being torn down would. Returns how many were dropped.
    pub fn discard_callbacks(&self) -> usize {
        let callbacks = std::mem::take(&mut self.state().callbacks);
        callbacks.len()
    }

    fn take_frame(&self) -> (FrameNumber, Vec<FrameCallback>) {
        // Callbacks run without the lock held so they may re-register.
        let mut state = self.state();
        state.last_frame = state.last_frame.next();
        (state.last_frame, std::mem::take(&mut state.callbacks))
    }
}

impl FrameAnchor for ManualAnchor {
    fn render_surface(&self) -> Option<SurfaceId> {
        self.state().surface
    }

    fn register_frame_callback(&self, callback: FrameCallback) {
        self.state().callbacks.push(callback);
    }

    fn request_frame(&self) {
        self.state().frames_requested += 1;
    }
}

type Listener = Arc<dyn AttachListener<ManualTarget>>;

/// An [`AttachTarget`] whose attach state is driven by the caller.
#[derive(Default)]
pub struct ManualTarget {
    anchor: RefCell<Option<Arc<ManualAnchor>>>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

impl fmt::Debug for ManualTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTarget")
            .field("attached", &self.anchor.borrow().is_some())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl ManualTarget {
    /// Creates a detached target.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Creates a target already attached to `anchor`.
    #[must_use]
    pub fn attached(anchor: Arc<ManualAnchor>) -> Self {
        let target = Self::default();
        *target.anchor.borrow_mut() = Some(anchor);
        target
    }

    /// Attaches the target to `anchor` and notifies listeners.
    pub fn attach(&self, anchor: Arc<ManualAnchor>) {
        *self.anchor.borrow_mut() = Some(anchor);
        for listener in self.snapshot() {
            listener.on_attached(self);
        }
    }

    /// Detaches the target and notifies listeners.
    pub fn detach(&self) {
        self.anchor.borrow_mut().take();
        for listener in self.snapshot() {
            listener.on_detached(self);
        }
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    // Listeners may unregister themselves while being notified.
    fn snapshot(&self) -> Vec<Listener> {
        self.listeners
            .borrow()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }
}

impl AttachTarget for ManualTarget {
    type Anchor = ManualAnchor;

    fn anchor(&self) -> Option<Arc<ManualAnchor>> {
        self.anchor.borrow().clone()
    }

    fn add_attach_listener(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_attach_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }
}
