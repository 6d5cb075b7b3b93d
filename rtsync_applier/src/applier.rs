// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame-synchronized batch applier.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rtsync_core::apply::{FrameSync, apply_batch};
use rtsync_core::backend::{AttachTarget, Compositor, FrameAnchor};
use rtsync_core::frame::FrameNumber;
use rtsync_core::params::SurfaceParams;
use rtsync_core::surface::SurfaceId;
use rtsync_core::trace::{ApplyTraceSink, DropEvent, DropReason, ScheduleEvent, Tracer};

/// A trace sink shared between the UI thread and the render thread.
///
/// The lock is only held while a single event is delivered.
pub type SharedTraceSink = Arc<Mutex<dyn ApplyTraceSink + Send>>;

/// Where an applier is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApplierState {
    /// Never bound to an attached element; every call is a no-op.
    Unbound,
    /// Bound, with no batch waiting for a frame.
    Idle,
    /// Bound, with this many batches waiting for their frame callback.
    AwaitingFrame(usize),
}

/// Schedules batches of [`SurfaceParams`] to be applied atomically on the
/// next frame of a synchronization anchor.
///
/// Each [`schedule_apply`](Self::schedule_apply) call registers its own
/// one-shot frame callback and produces its own commit; calls are never
/// coalesced. Ordering between commits is whatever order the render thread
/// delivers frame callbacks in.
pub struct SyncRtApplier<A, C> {
    anchor: Option<Arc<A>>,
    compositor: Arc<C>,
    /// Last anchor surface resolved by `schedule_apply`.
    bound_target: Mutex<Option<SurfaceId>>,
    pending: Arc<AtomicUsize>,
    trace: Option<SharedTraceSink>,
}

impl<A, C> fmt::Debug for SyncRtApplier<A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRtApplier")
            .field("state", &self.state())
            .field("bound_target", &self.bound_target())
            .field("traced", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

impl<A, C> SyncRtApplier<A, C> {
    /// Creates an applier that ignores every call.
    #[must_use]
    pub fn inert(compositor: Arc<C>) -> Self {
        Self::with_anchor(None, compositor)
    }

    fn with_anchor(anchor: Option<Arc<A>>, compositor: Arc<C>) -> Self {
        Self {
            anchor,
            compositor,
            bound_target: Mutex::new(None),
            pending: Arc::new(AtomicUsize::new(0)),
            trace: None,
        }
    }

    /// Reports scheduled, applied, and dropped batches to `sink`.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: SharedTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Returns `true` if this applier was never bound to an attached element.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.anchor.is_none()
    }

    /// Returns the anchor surface resolved by the most recent
    /// [`schedule_apply`](Self::schedule_apply), if any.
    #[must_use]
    pub fn bound_target(&self) -> Option<SurfaceId> {
        *self.bound_target_slot()
    }

    fn bound_target_slot(&self) -> MutexGuard<'_, Option<SurfaceId>> {
        self.bound_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ApplierState {
        if self.anchor.is_none() {
            return ApplierState::Unbound;
        }
        match self.pending.load(Ordering::Acquire) {
            0 => ApplierState::Idle,
            n => ApplierState::AwaitingFrame(n),
        }
    }
}

impl<A, C> SyncRtApplier<A, C>
where
    A: FrameAnchor,
    C: Compositor + Send + Sync + 'static,
{
    /// Binds an applier to `target`.
    ///
    /// If `target` is `None` or is not attached to a rendering context, the
    /// applier is inert. Use [`create`](crate::create) to wait for attachment
    /// instead.
    #[must_use]
    pub fn new<T>(target: Option<&T>, compositor: Arc<C>) -> Self
    where
        T: AttachTarget<Anchor = A> + ?Sized,
    {
        let anchor = target.and_then(AttachTarget::anchor);
        Self::with_anchor(anchor, compositor)
    }

    /// Schedules `params` to be applied on the next frame of the anchor.
    ///
    /// Returns immediately. When the frame callback fires, the batch is
    /// applied in one transaction, with every surface deferred until the
    /// anchor presents that frame, or dropped whole if the anchor surface is
    /// gone. A frame is requested so the callback fires even if nothing else
    /// is drawing.
    pub fn schedule_apply(&self, early_wakeup: bool, params: impl Into<Box<[SurfaceParams]>>) {
        let params: Box<[SurfaceParams]> = params.into();
        let Some(anchor) = &self.anchor else {
            tracing::trace!(params = params.len(), "applier is unbound; ignoring batch");
            self.with_tracer(|t| {
                t.drop_batch(&DropEvent {
                    reason: DropReason::UnattachedTarget,
                    frame: None,
                    params: params.len(),
                });
            });
            return;
        };

        // The render surface can change between frames; resolve it per call.
        let target = anchor.render_surface();
        *self.bound_target_slot() = target;

        self.with_tracer(|t| {
            t.schedule(&ScheduleEvent {
                anchor: target,
                params: params.len(),
                early_wakeup,
            });
        });
        tracing::trace!(?target, params = params.len(), early_wakeup, "scheduling batch");

        let pending = PendingFrame::new(&self.pending);
        let compositor = Arc::clone(&self.compositor);
        let trace = self.trace.clone();
        anchor.register_frame_callback(Box::new(move |frame| {
            let _pending = pending;
            apply_on_frame(
                &*compositor,
                target,
                frame,
                early_wakeup,
                &params,
                trace.as_ref(),
            );
        }));

        anchor.request_frame();
    }

    /// Applies `params` right away on the calling thread, without waiting for
    /// a frame and without deferring any surface.
    ///
    /// Does nothing if the applier is inert.
    pub fn apply_now(&self, early_wakeup: bool, params: &[SurfaceParams]) {
        if self.anchor.is_none() {
            self.with_tracer(|t| {
                t.drop_batch(&DropEvent {
                    reason: DropReason::UnattachedTarget,
                    frame: None,
                    params: params.len(),
                });
            });
            return;
        }
        let event = apply_batch(self.compositor.begin(), None, early_wakeup, params);
        self.with_tracer(|t| t.apply(&event));
    }

    fn with_tracer(&self, f: impl FnOnce(&mut Tracer<'_>)) {
        with_tracer(self.trace.as_ref(), f);
    }
}

/// One batch awaiting its frame; dropping it releases the count.
struct PendingFrame(Arc<AtomicUsize>);

impl PendingFrame {
    fn new(pending: &Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(pending))
    }
}

impl Drop for PendingFrame {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

fn with_tracer(trace: Option<&SharedTraceSink>, f: impl FnOnce(&mut Tracer<'_>)) {
    match trace {
        Some(sink) => {
            let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut Tracer::new(&mut *sink));
        }
        None => f(&mut Tracer::none()),
    }
}

/// Runs on the render thread when the frame for a batch is drawn.
fn apply_on_frame<C: Compositor>(
    compositor: &C,
    target: Option<SurfaceId>,
    frame: FrameNumber,
    early_wakeup: bool,
    params: &[SurfaceParams],
    trace: Option<&SharedTraceSink>,
) {
    let Some(anchor) = target.filter(|&t| compositor.is_valid(t)) else {
        tracing::debug!(
            ?target,
            frame = frame.get(),
            params = params.len(),
            reason = %DropReason::StaleTarget,
            "dropping surface batch"
        );
        with_tracer(trace, |t| {
            t.drop_batch(&DropEvent {
                reason: DropReason::StaleTarget,
                frame: Some(frame),
                params: params.len(),
            });
        });
        return;
    };

    let sync = FrameSync { anchor, frame };
    let event = apply_batch(compositor.begin(), Some(sync), early_wakeup, params);
    with_tracer(trace, |t| t.apply(&event));
    tracing::trace!(?anchor, frame = frame.get(), params = params.len(), "applied batch");
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use kurbo::{Affine, Rect};
    use proptest::prelude::*;
    use rtsync_core::params::SurfaceFlags;
    use rtsync_debug::anchor::{ManualAnchor, ManualTarget};
    use rtsync_debug::capture::{CaptureCompositor, TransactionOp};
    use rtsync_debug::recorder::RecorderSink;

    use super::*;

    type Applier = SyncRtApplier<ManualAnchor, CaptureCompositor>;

    struct Fixture {
        compositor: CaptureCompositor,
        anchor: Arc<ManualAnchor>,
        anchor_surface: SurfaceId,
        applier: Applier,
    }

    fn fixture() -> Fixture {
        let compositor = CaptureCompositor::new();
        let anchor_surface = compositor.create_surface();
        let anchor = Arc::new(ManualAnchor::new(Some(anchor_surface)));
        let target = ManualTarget::attached(Arc::clone(&anchor));
        let applier = SyncRtApplier::new(Some(&target), Arc::new(compositor.clone()));
        Fixture {
            compositor,
            anchor,
            anchor_surface,
            applier,
        }
    }

    #[test]
    fn two_params_commit_once() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        let s2 = f.compositor.create_surface();
        let d1 = SurfaceParams::builder(s1).with_alpha(0.5).build();
        let d2 = SurfaceParams::builder(s2).with_visibility(false).build();

        f.applier.schedule_apply(false, [d1, d2]);
        assert_eq!(f.compositor.commit_count(), 0, "nothing applied before frame");
        assert_eq!(f.anchor.frames_requested(), 1);

        let frame = f.anchor.fire_frame();
        let commits = f.compositor.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            commits[0],
            vec![
                TransactionOp::DeferUntil {
                    surface: s2,
                    anchor: f.anchor_surface,
                    frame,
                },
                TransactionOp::Hide(s2),
                TransactionOp::DeferUntil {
                    surface: s1,
                    anchor: f.anchor_surface,
                    frame,
                },
                TransactionOp::Alpha(s1, 0.5),
            ]
        );
    }

    #[test]
    fn early_wakeup_is_set_before_commit() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        let s2 = f.compositor.create_surface();
        f.applier.schedule_apply(
            true,
            [
                SurfaceParams::builder(s1).with_alpha(0.5).build(),
                SurfaceParams::builder(s2).with_visibility(false).build(),
            ],
        );
        f.anchor.fire_frame();

        let commits = f.compositor.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].last(), Some(&TransactionOp::EarlyWakeup));
        assert_eq!(
            commits[0]
                .iter()
                .filter(|op| **op == TransactionOp::EarlyWakeup)
                .count(),
            1
        );
    }

    #[test]
    fn stale_anchor_drops_whole_batch() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        f.applier
            .schedule_apply(false, [SurfaceParams::builder(s1).with_layer(2).build()]);

        f.compositor.release_surface(f.anchor_surface);
        f.anchor.fire_frame();

        assert_eq!(f.compositor.transactions_begun(), 0);
        assert_eq!(f.compositor.commit_count(), 0);
        assert_eq!(f.applier.state(), ApplierState::Idle);
    }

    #[test]
    fn missing_render_surface_drops_batch() {
        let f = fixture();
        f.anchor.set_render_surface(None);
        let s1 = f.compositor.create_surface();
        f.applier
            .schedule_apply(false, [SurfaceParams::builder(s1).with_alpha(1.0).build()]);
        f.anchor.fire_frame();
        assert_eq!(f.compositor.transactions_begun(), 0);
        assert_eq!(f.applier.bound_target(), None);
    }

    #[test]
    fn unbound_applier_is_a_no_op() {
        let compositor = CaptureCompositor::new();
        let s1 = compositor.create_surface();
        let applier: Applier =
            SyncRtApplier::new(None::<&ManualTarget>, Arc::new(compositor.clone()));
        assert!(applier.is_inert());
        assert_eq!(applier.state(), ApplierState::Unbound);

        for early in [false, true] {
            applier.schedule_apply(early, [SurfaceParams::builder(s1).with_alpha(0.1).build()]);
            applier.schedule_apply(early, Vec::<SurfaceParams>::new());
            applier.apply_now(early, &[SurfaceParams::builder(s1).with_layer(1).build()]);
        }
        assert_eq!(compositor.transactions_begun(), 0);
        assert_eq!(applier.bound_target(), None);
    }

    #[test]
    fn detached_target_yields_inert_applier() {
        let compositor = CaptureCompositor::new();
        let target = ManualTarget::detached();
        let applier: Applier = SyncRtApplier::new(Some(&target), Arc::new(compositor));
        assert!(applier.is_inert());
    }

    #[test]
    fn anchor_surface_is_resolved_per_call() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        let params = [SurfaceParams::builder(s1).with_alpha(0.3).build()];

        f.applier.schedule_apply(false, params);
        assert_eq!(f.applier.bound_target(), Some(f.anchor_surface));

        let replacement = f.compositor.create_surface();
        f.anchor.set_render_surface(Some(replacement));
        f.applier.schedule_apply(false, params);
        assert_eq!(f.applier.bound_target(), Some(replacement));

        f.anchor.fire_frame();
        let commits = f.compositor.commits();
        assert_eq!(commits.len(), 2);
        let anchors: Vec<_> = commits
            .iter()
            .map(|c| match c[0] {
                TransactionOp::DeferUntil { anchor, .. } => anchor,
                ref other => panic!("expected defer first, got {other:?}"),
            })
            .collect();
        assert_eq!(anchors, [f.anchor_surface, replacement]);
    }

    #[test]
    fn schedules_are_not_coalesced() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        for i in 0..3 {
            f.applier
                .schedule_apply(false, [SurfaceParams::builder(s1).with_layer(i).build()]);
        }
        assert_eq!(f.applier.state(), ApplierState::AwaitingFrame(3));
        assert_eq!(f.anchor.pending_callbacks(), 3);
        assert_eq!(f.anchor.frames_requested(), 3);

        f.anchor.fire_frame();
        assert_eq!(f.compositor.commit_count(), 3);
        assert_eq!(f.applier.state(), ApplierState::Idle);
    }

    #[test]
    fn applier_is_reusable_across_frames() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        let params = [SurfaceParams::builder(s1).with_corner_radius(4.0).build()];

        f.applier.schedule_apply(false, params);
        let first = f.anchor.fire_frame();
        f.applier.schedule_apply(false, params);
        let second = f.anchor.fire_frame();

        let frames: Vec<_> = f
            .compositor
            .commits()
            .iter()
            .map(|c| match c[0] {
                TransactionOp::DeferUntil { frame, .. } => frame,
                ref other => panic!("expected defer first, got {other:?}"),
            })
            .collect();
        assert_eq!(frames, [first, second]);
    }

    #[test]
    fn frame_callback_runs_on_render_thread() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        f.applier.schedule_apply(
            false,
            vec![
                SurfaceParams::builder(s1)
                    .with_matrix(Affine::rotate(0.5))
                    .with_window_crop(Rect::new(0.0, 0.0, 32.0, 32.0))
                    .build(),
            ],
        );
        f.anchor.fire_frame_on_thread();
        assert_eq!(f.compositor.commit_count(), 1);
    }

    #[test]
    fn apply_now_skips_defer() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        f.applier
            .apply_now(true, &[SurfaceParams::builder(s1).with_background_blur(12).build()]);
        assert_eq!(
            f.compositor.commits(),
            vec![vec![
                TransactionOp::BackgroundBlurRadius(s1, 12),
                TransactionOp::EarlyWakeup,
            ]]
        );
        assert_eq!(f.anchor.pending_callbacks(), 0);
    }

    #[test]
    fn trace_sink_observes_apply_and_drop() {
        let compositor = CaptureCompositor::new();
        let anchor_surface = compositor.create_surface();
        let anchor = Arc::new(ManualAnchor::new(Some(anchor_surface)));
        let target = ManualTarget::attached(Arc::clone(&anchor));
        let recorder = Arc::new(Mutex::new(RecorderSink::new()));
        let applier = SyncRtApplier::new(Some(&target), Arc::new(compositor.clone()))
            .with_trace_sink(recorder.clone());

        let s1 = compositor.create_surface();
        let params = [SurfaceParams::builder(s1).with_alpha(0.5).build()];
        applier.schedule_apply(false, params);
        anchor.fire_frame();
        compositor.release_surface(anchor_surface);
        applier.schedule_apply(false, params);
        anchor.fire_frame();

        let recorder = recorder.lock().unwrap();
        assert_eq!(recorder.applied(), 1);
        assert_eq!(recorder.drop_reasons(), [DropReason::StaleTarget]);
        assert_eq!(recorder.events().len(), 4);
    }

    #[test]
    fn inert_applier_reports_unattached_drop() {
        let recorder = Arc::new(Mutex::new(RecorderSink::new()));
        let applier: Applier = SyncRtApplier::inert(Arc::new(CaptureCompositor::new()))
            .with_trace_sink(recorder.clone());
        applier.schedule_apply(false, Vec::<SurfaceParams>::new());
        assert_eq!(
            recorder.lock().unwrap().drop_reasons(),
            [DropReason::UnattachedTarget]
        );
    }

    #[test]
    fn slow_commit_does_not_block_scheduling() {
        let f = fixture();
        let recorder = Arc::new(Mutex::new(RecorderSink::new()));
        let applier = SyncRtApplier::new(
            Some(&ManualTarget::attached(Arc::clone(&f.anchor))),
            Arc::new(f.compositor.clone()),
        )
        .with_trace_sink(recorder.clone());

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        f.compositor.set_commit_hook(move || {
            entered_tx.send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
        });

        let s1 = f.compositor.create_surface();
        let params = [SurfaceParams::builder(s1).with_alpha(0.5).build()];
        applier.schedule_apply(false, params);

        thread::scope(|scope| {
            scope.spawn(|| f.anchor.fire_frame());
            entered_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("commit started on render thread");

            // The render thread is now inside `Transaction::apply`.
            let (done_tx, done_rx) = mpsc::channel();
            let applier = &applier;
            scope.spawn(move || {
                applier.schedule_apply(true, params);
                done_tx.send(()).unwrap();
            });
            let scheduled = done_rx.recv_timeout(Duration::from_secs(5));
            release_tx.send(()).unwrap();
            assert!(scheduled.is_ok(), "schedule_apply waited for the commit");
        });

        assert_eq!(f.compositor.commit_count(), 1);
        assert_eq!(f.anchor.pending_callbacks(), 1);
        let recorder = recorder.lock().unwrap();
        assert_eq!(recorder.applied(), 1);
        assert_eq!(recorder.events().len(), 3);
    }

    #[test]
    fn discarded_callback_returns_to_idle() {
        let f = fixture();
        let s1 = f.compositor.create_surface();
        f.applier
            .schedule_apply(false, [SurfaceParams::builder(s1).with_layer(3).build()]);
        assert_eq!(f.applier.state(), ApplierState::AwaitingFrame(1));

        assert_eq!(f.anchor.discard_callbacks(), 1);
        assert_eq!(f.applier.state(), ApplierState::Idle);
        assert_eq!(f.compositor.transactions_begun(), 0);
    }

    #[test]
    fn any_surface_handle_is_reported_as_bound() {
        let compositor = CaptureCompositor::new();
        let last = SurfaceId::from_raw_parts(u32::MAX, u32::MAX);
        let anchor = Arc::new(ManualAnchor::new(Some(last)));
        let target = ManualTarget::attached(anchor);
        let applier = SyncRtApplier::new(Some(&target), Arc::new(compositor));
        assert_eq!(applier.bound_target(), None);

        applier.schedule_apply(false, Vec::<SurfaceParams>::new());
        assert_eq!(applier.bound_target(), Some(last));
    }

    #[test]
    fn schedules_from_many_threads_each_commit() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 5;

        let f = fixture();
        let surfaces: Vec<_> = (0..THREADS)
            .map(|_| f.compositor.create_surface())
            .collect();
        thread::scope(|scope| {
            for &surface in &surfaces {
                let applier = &f.applier;
                scope.spawn(move || {
                    for i in 0..PER_THREAD {
                        let layer = i32::try_from(i).unwrap();
                        let params = [SurfaceParams::builder(surface).with_layer(layer).build()];
                        applier.schedule_apply(false, params);
                    }
                });
            }
        });
        assert_eq!(
            f.applier.state(),
            ApplierState::AwaitingFrame(THREADS * PER_THREAD)
        );

        f.anchor.fire_frame_on_thread();
        assert_eq!(f.compositor.commit_count(), THREADS * PER_THREAD);
        assert_eq!(f.applier.state(), ApplierState::Idle);
        for &surface in &surfaces {
            let layers: Vec<_> = f
                .compositor
                .commits()
                .iter()
                .filter_map(|c| match c[1] {
                    TransactionOp::Layer(s, layer) if s == surface => Some(layer),
                    _ => None,
                })
                .collect();
            assert_eq!(layers, [0, 1, 2, 3, 4]);
        }
    }

    type Attrs = (
        Option<f32>,
        Option<f64>,
        Option<f64>,
        Option<i32>,
        Option<f32>,
        Option<u32>,
        Option<bool>,
    );

    fn arb_attrs() -> impl Strategy<Value = Attrs> {
        (
            proptest::option::of(0.0_f32..=1.0),
            proptest::option::of(-10.0_f64..10.0),
            proptest::option::of(1.0_f64..100.0),
            proptest::option::of(-5_i32..5),
            proptest::option::of(0.0_f32..16.0),
            proptest::option::of(0_u32..64),
            proptest::option::of(any::<bool>()),
        )
    }

    fn build_params(surface: SurfaceId, attrs: Attrs) -> SurfaceParams {
        let (alpha, dx, crop, layer, corner, blur, visible) = attrs;
        let mut b = SurfaceParams::builder(surface);
        if let Some(alpha) = alpha {
            b = b.with_alpha(alpha);
        }
        if let Some(dx) = dx {
            b = b.with_matrix(Affine::translate((dx, 0.0)));
        }
        if let Some(w) = crop {
            b = b.with_window_crop(Rect::new(0.0, 0.0, w, w));
        }
        if let Some(layer) = layer {
            b = b.with_layer(layer);
        }
        if let Some(corner) = corner {
            b = b.with_corner_radius(corner);
        }
        if let Some(blur) = blur {
            b = b.with_background_blur(blur);
        }
        if let Some(visible) = visible {
            b = b.with_visibility(visible);
        }
        b.build()
    }

    fn op_flag(op: &TransactionOp) -> SurfaceFlags {
        match op {
            TransactionOp::Matrix(..) => SurfaceFlags::MATRIX,
            TransactionOp::WindowCrop(..) => SurfaceFlags::WINDOW_CROP,
            TransactionOp::Alpha(..) => SurfaceFlags::ALPHA,
            TransactionOp::Layer(..) => SurfaceFlags::LAYER,
            TransactionOp::CornerRadius(..) => SurfaceFlags::CORNER_RADIUS,
            TransactionOp::BackgroundBlurRadius(..) => SurfaceFlags::BACKGROUND_BLUR_RADIUS,
            TransactionOp::Show(_) | TransactionOp::Hide(_) => SurfaceFlags::VISIBILITY,
            TransactionOp::DeferUntil { .. } | TransactionOp::EarlyWakeup => SurfaceFlags::empty(),
        }
    }

    fn op_surface(op: &TransactionOp) -> Option<SurfaceId> {
        match *op {
            TransactionOp::DeferUntil { surface, .. }
            | TransactionOp::Matrix(surface, _)
            | TransactionOp::WindowCrop(surface, _)
            | TransactionOp::Alpha(surface, _)
            | TransactionOp::Layer(surface, _)
            | TransactionOp::CornerRadius(surface, _)
            | TransactionOp::BackgroundBlurRadius(surface, _)
            | TransactionOp::Show(surface)
            | TransactionOp::Hide(surface) => Some(surface),
            TransactionOp::EarlyWakeup => None,
        }
    }

    proptest! {
        #[test]
        fn one_commit_with_exactly_the_masked_attributes(
            attrs in proptest::collection::vec(arb_attrs(), 0..6),
            early_wakeup in any::<bool>(),
        ) {
            let f = fixture();
            // One distinct surface per params.
            let batch: Vec<SurfaceParams> = attrs
                .into_iter()
                .map(|a| build_params(f.compositor.create_surface(), a))
                .collect();

            f.applier.schedule_apply(early_wakeup, batch.clone());
            f.anchor.fire_frame();

            let commits = f.compositor.commits();
            prop_assert_eq!(commits.len(), 1);
            let ops = &commits[0];

            for p in &batch {
                let mut seen = SurfaceFlags::empty();
                let mut defers = 0;
                for op in ops.iter().filter(|op| op_surface(op) == Some(p.surface())) {
                    if op.is_defer() {
                        prop_assert_eq!(seen, SurfaceFlags::empty(), "defer precedes attributes");
                        defers += 1;
                    }
                    seen |= op_flag(op);
                }
                prop_assert_eq!(defers, 1);
                prop_assert_eq!(seen, p.flags());
            }
            prop_assert_eq!(
                ops.iter().filter(|op| **op == TransactionOp::EarlyWakeup).count(),
                usize::from(early_wakeup)
            );
        }
    }
}
