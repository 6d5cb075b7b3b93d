// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-surface mutation descriptors.
//!
//! [`SurfaceParams`] records the desired state of one surface for the next
//! atomic application. Every attribute is optional; an absent attribute is
//! left untouched by the transaction. Params are built once with
//! [`SurfaceParamsBuilder`] and never change afterwards, so a batch can be
//! handed to another thread without copying.
//!
//! The attribute values are all `Copy` (`kurbo::Affine`, `kurbo::Rect`,
//! scalars), so the builder stores its own copy of everything it is given:
//! mutating a caller-held matrix or rect after [`build`](SurfaceParamsBuilder::build)
//! cannot reach a pending descriptor.

use bitflags::bitflags;
use kurbo::{Affine, Rect};

use crate::surface::SurfaceId;

bitflags! {
    /// Which optional attributes of a [`SurfaceParams`] carry a value.
    ///
    /// Bit values match the platform constants so masks can be compared
    /// directly with values logged by the compositor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SurfaceFlags: u32 {
        /// Opacity.
        const ALPHA = 1;
        /// Affine transform.
        const MATRIX = 1 << 1;
        /// Window crop rectangle.
        const WINDOW_CROP = 1 << 2;
        /// Stacking order.
        const LAYER = 1 << 3;
        /// Rounded-corner radius.
        const CORNER_RADIUS = 1 << 4;
        /// Background blur radius.
        const BACKGROUND_BLUR_RADIUS = 1 << 5;
        /// Show or hide.
        const VISIBILITY = 1 << 6;
        /// Every bit set.
        const ALL = 0xffff_ffff;
    }
}

/// The desired state of one surface, applied as part of a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceParams {
    surface: SurfaceId,
    alpha: Option<f32>,
    matrix: Option<Affine>,
    window_crop: Option<Rect>,
    layer: Option<i32>,
    corner_radius: Option<f32>,
    background_blur_radius: Option<u32>,
    visible: Option<bool>,
}

impl SurfaceParams {
    /// Starts building params for `surface`.
    #[inline]
    #[must_use]
    pub fn builder(surface: SurfaceId) -> SurfaceParamsBuilder {
        SurfaceParamsBuilder::new(surface)
    }

    /// The surface these params mutate.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Returns the field mask: one bit per attribute that carries a value.
    #[must_use]
    pub fn flags(&self) -> SurfaceFlags {
        let mut flags = SurfaceFlags::empty();
        flags.set(SurfaceFlags::ALPHA, self.alpha.is_some());
        flags.set(SurfaceFlags::MATRIX, self.matrix.is_some());
        flags.set(SurfaceFlags::WINDOW_CROP, self.window_crop.is_some());
        flags.set(SurfaceFlags::LAYER, self.layer.is_some());
        flags.set(SurfaceFlags::CORNER_RADIUS, self.corner_radius.is_some());
        flags.set(
            SurfaceFlags::BACKGROUND_BLUR_RADIUS,
            self.background_blur_radius.is_some(),
        );
        flags.set(SurfaceFlags::VISIBILITY, self.visible.is_some());
        flags
    }

    /// Opacity, if set.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> Option<f32> {
        self.alpha
    }

    /// Affine transform, if set.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Option<Affine> {
        self.matrix
    }

    /// Window crop, if set.
    #[inline]
    #[must_use]
    pub fn window_crop(&self) -> Option<Rect> {
        self.window_crop
    }

    /// Stacking order, if set.
    #[inline]
    #[must_use]
    pub fn layer(&self) -> Option<i32> {
        self.layer
    }

    /// Corner radius, if set.
    #[inline]
    #[must_use]
    pub fn corner_radius(&self) -> Option<f32> {
        self.corner_radius
    }

    /// Background blur radius, if set.
    #[inline]
    #[must_use]
    pub fn background_blur_radius(&self) -> Option<u32> {
        self.background_blur_radius
    }

    /// Visibility, if set.
    #[inline]
    #[must_use]
    pub fn visible(&self) -> Option<bool> {
        self.visible
    }
}

/// Builder for [`SurfaceParams`].
///
/// Each `with_*` setter stores a value and marks the attribute present.
/// Calling a setter twice keeps the last value.
#[derive(Clone, Copy, Debug)]
#[must_use = "builders do nothing until `build` is called"]
pub struct SurfaceParamsBuilder {
    params: SurfaceParams,
}

impl SurfaceParamsBuilder {
    /// Creates a builder for `surface` with every attribute absent.
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            params: SurfaceParams {
                surface,
                alpha: None,
                matrix: None,
                window_crop: None,
                layer: None,
                corner_radius: None,
                background_blur_radius: None,
                visible: None,
            },
        }
    }

    /// Sets the opacity to apply to the surface.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.params.alpha = Some(alpha);
        self
    }

    /// Sets the affine transform to apply to the surface.
    pub fn with_matrix(mut self, matrix: Affine) -> Self {
        self.params.matrix = Some(matrix);
        self
    }

    /// Sets the window crop to apply to the surface.
    pub fn with_window_crop(mut self, window_crop: Rect) -> Self {
        self.params.window_crop = Some(window_crop);
        self
    }

    /// Sets the stacking order of the surface.
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.params.layer = Some(layer);
        self
    }

    /// Sets the radius for rounded corners.
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.params.corner_radius = Some(radius);
        self
    }

    /// Sets the blur radius applied to the surfaces behind this one.
    pub fn with_background_blur(mut self, radius: u32) -> Self {
        self.params.background_blur_radius = Some(radius);
        self
    }

    /// Sets whether the surface is shown or hidden.
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.params.visible = Some(visible);
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> SurfaceParams {
        self.params
    }
}
