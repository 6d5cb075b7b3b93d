// Copyright 2026 the Rtsync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface identity and liveness tracking.
//!
//! A surface is an externally owned compositor object (a window, a layer, a
//! leash) that transactions mutate. [`SurfaceId`] is a generational handle to
//! it: once the surface is released and its slot reused, the old handle no
//! longer validates. [`SurfaceRegistry`] is the reference allocator for such
//! handles and is what compositors and test doubles consult to answer
//! [`Compositor::is_valid`](crate::backend::Compositor::is_valid).

use alloc::vec::Vec;
use core::fmt;

/// A handle to a surface owned by a compositor.
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a surface is released and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    /// Slot index into the registry's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the registry's generation for this slot.
    pub(crate) generation: u32,
}

impl SurfaceId {
    /// Creates a handle from raw parts.
    ///
    /// Backends that mirror platform handles (which carry their own identity)
    /// use this; handles from a [`SurfaceRegistry`] come from
    /// [`create_surface`](SurfaceRegistry::create_surface).
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Packs the handle into a single `u64` (generation in the high half).
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.idx as u64
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "each half of the packed value is exactly 32 bits"
    )]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            idx: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({}@gen{})", self.idx, self.generation)
    }
}

/// Allocates surface handles and tracks which of them are still alive.
///
/// Released slots are recycled via a free list; bumping the slot generation on
/// release makes every outstanding handle to the old surface stale.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    generation: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
}

impl SurfaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new surface and returns its handle.
    pub fn create_surface(&mut self) -> SurfaceId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.alive[idx as usize] = true;
            idx
        } else {
            let idx = u32::try_from(self.generation.len())
                .unwrap_or_else(|_| panic!("surface registry exhausted"));
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        SurfaceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Releases a surface, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn release_surface(&mut self, id: SurfaceId) {
        assert!(self.is_alive(id), "stale SurfaceId: {id:?}");
        let idx = id.idx as usize;
        self.alive[idx] = false;
        // Bump generation so old handles immediately fail validation.
        self.generation[idx] = self.generation[idx].wrapping_add(1);
        self.free_list.push(id.idx);
    }

    /// Returns whether the given handle refers to a live surface.
    #[must_use]
    pub fn is_alive(&self, id: SurfaceId) -> bool {
        let idx = id.idx as usize;
        idx < self.generation.len() && self.alive[idx] && self.generation[idx] == id.generation
    }

    /// Returns the number of live surfaces.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&alive| alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_release() {
        let mut registry = SurfaceRegistry::new();
        let id = registry.create_surface();
        assert!(registry.is_alive(id));
        registry.release_surface(id);
        assert!(!registry.is_alive(id));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut registry = SurfaceRegistry::new();
        let id1 = registry.create_surface();
        registry.release_surface(id1);
        let id2 = registry.create_surface();
        // id2 reuses the same slot but has a different generation.
        assert!(!registry.is_alive(id1));
        assert!(registry.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
    }

    #[test]
    fn foreign_handle_is_not_alive() {
        let registry = SurfaceRegistry::new();
        assert!(!registry.is_alive(SurfaceId::from_raw_parts(3, 0)));
    }

    #[test]
    fn bits_round_trip() {
        let id = SurfaceId::from_raw_parts(0xdead, 0xbeef);
        assert_eq!(SurfaceId::from_bits(id.to_bits()), id);
    }

    #[test]
    #[should_panic(expected = "stale SurfaceId")]
    fn double_release_panics() {
        let mut registry = SurfaceRegistry::new();
        let id = registry.create_surface();
        registry.release_surface(id);
        registry.release_surface(id);
    }
}
