// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building an applier once its target is attached.
//!
//! An applier needs its target's anchor, which only exists once the target
//! is attached to a rendering context. [`create`] hands the applier to a
//! continuation immediately when it can, and otherwise registers an attach
//! listener that does so on the first attach event. A detach event arriving
//! first cancels the creation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rtsync_core::backend::{AttachListener, AttachTarget, Compositor, ListenerId};

use crate::SyncRtApplier;

type Continuation<A, C> = Box<dyn FnOnce(SyncRtApplier<A, C>)>;

/// Where a deferred creation stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingStatus {
    /// Waiting for the target to attach.
    Pending,
    /// The applier was built and handed to the continuation.
    Completed,
    /// The target detached first; the continuation was dropped.
    Cancelled,
}

enum PendingState<A, C> {
    Pending(Continuation<A, C>),
    Completed,
    Cancelled,
}

impl<A, C> PendingState<A, C> {
    fn status(&self) -> PendingStatus {
        match self {
            Self::Pending(_) => PendingStatus::Pending,
            Self::Completed => PendingStatus::Completed,
            Self::Cancelled => PendingStatus::Cancelled,
        }
    }
}

struct Pending<T: AttachTarget + ?Sized, C> {
    state: RefCell<PendingState<T::Anchor, C>>,
    listener: Cell<Option<ListenerId>>,
    compositor: Arc<C>,
    _target: PhantomData<fn(&T)>,
}

impl<T: AttachTarget + ?Sized, C> Pending<T, C> {
    /// Moves out of `Pending` into `next`, returning the continuation if the
    /// creation was still pending.
    fn settle(&self, next: PendingState<T::Anchor, C>) -> Option<Continuation<T::Anchor, C>> {
        let mut state = self.state.borrow_mut();
        if !matches!(*state, PendingState::Pending(_)) {
            return None;
        }
        match std::mem::replace(&mut *state, next) {
            PendingState::Pending(continuation) => Some(continuation),
            PendingState::Completed | PendingState::Cancelled => None,
        }
    }

    fn unregister(&self, target: &T) {
        if let Some(id) = self.listener.take() {
            target.remove_attach_listener(id);
        }
    }
}

impl<T, C> AttachListener<T> for Pending<T, C>
where
    T: AttachTarget + ?Sized,
    C: Compositor + Send + Sync + 'static,
{
    fn on_attached(&self, target: &T) {
        let Some(continuation) = self.settle(PendingState::Completed) else {
            return;
        };
        self.unregister(target);
        continuation(SyncRtApplier::new(Some(target), Arc::clone(&self.compositor)));
    }

    fn on_detached(&self, target: &T) {
        if self.settle(PendingState::Cancelled).is_some() {
            tracing::debug!("target detached before attach; applier creation cancelled");
            self.unregister(target);
        }
    }
}

/// Handle to a creation waiting for its target to attach.
pub struct PendingApplier<T: AttachTarget + ?Sized, C> {
    inner: Arc<Pending<T, C>>,
}

impl<T: AttachTarget + ?Sized, C> PendingApplier<T, C> {
    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> PendingStatus {
        self.inner.state.borrow().status()
    }
}

impl<T: AttachTarget + ?Sized, C> fmt::Debug for PendingApplier<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingApplier")
            .field("status", &self.status())
            .field("listener", &self.inner.listener.get())
            .finish()
    }
}

/// Outcome of [`create`].
pub enum Creation<T: AttachTarget + ?Sized, C> {
    /// The continuation already ran.
    Ready,
    /// The continuation runs when the target attaches.
    Pending(PendingApplier<T, C>),
}

impl<T: AttachTarget + ?Sized, C> fmt::Debug for Creation<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::Pending(p) => f.debug_tuple("Pending").field(p).finish(),
        }
    }
}

impl<T: AttachTarget + ?Sized, C> Creation<T, C> {
    /// Returns `true` if the continuation already ran.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns the pending handle, if creation was deferred.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingApplier<T, C>> {
        match self {
            Self::Ready => None,
            Self::Pending(p) => Some(p),
        }
    }
}

/// Creates an applier for `target`, waiting for it to attach if necessary.
///
/// - `None` target: `continuation` runs now with an
///   [inert](SyncRtApplier::inert) applier.
/// - Attached target: `continuation` runs now with a bound applier.
/// - Detached target: an attach listener is registered. The first attach
///   event builds the applier, removes the listener, and runs
///   `continuation`. A detach event before that removes the listener and
///   drops `continuation` without running it.
pub fn create<T, C, F>(target: Option<&T>, compositor: Arc<C>, continuation: F) -> Creation<T, C>
where
    T: AttachTarget + ?Sized + 'static,
    C: Compositor + Send + Sync + 'static,
    F: FnOnce(SyncRtApplier<T::Anchor, C>) + 'static,
{
    let Some(target) = target else {
        continuation(SyncRtApplier::inert(compositor));
        return Creation::Ready;
    };
    if target.anchor().is_some() {
        continuation(SyncRtApplier::new(Some(target), compositor));
        return Creation::Ready;
    }

    let inner = Arc::new(Pending {
        state: RefCell::new(PendingState::Pending(Box::new(continuation))),
        listener: Cell::new(None),
        compositor,
        _target: PhantomData,
    });
    let id = target.add_attach_listener(Arc::clone(&inner) as Arc<dyn AttachListener<T>>);
    if inner.state.borrow().status() == PendingStatus::Pending {
        inner.listener.set(Some(id));
    } else {
        // Settled during registration, before the id was known.
        target.remove_attach_listener(id);
    }
    Creation::Pending(PendingApplier { inner })
}
