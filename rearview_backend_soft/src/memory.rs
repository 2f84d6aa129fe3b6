// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heap-backed graphics memory shared between the allocator, the client, and
//! the window.
//!
//! A [`MemoryHandle`] issued by [`SoftAllocator`](crate::SoftAllocator) is
//! only a number. [`SoftMemory`] maps it to the pixels behind it so that the
//! client can draw and the window can read without either owning the block.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rearview_core::buffer::MemoryHandle;

#[derive(Debug, Default)]
struct Registry {
    last_handle: u64,
    blocks: HashMap<MemoryHandle, Vec<u32>>,
}

/// Shared registry of software pixel blocks, one `u32` per pixel.
///
/// Cloning yields another view of the same registry.
#[derive(Clone, Debug, Default)]
pub struct SoftMemory {
    registry: Arc<Mutex<Registry>>,
}

impl SoftMemory {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `pixels` under a fresh handle.
    ///
    /// Returns `None` once the handle space is exhausted.
    pub(crate) fn insert(&self, pixels: Vec<u32>) -> Option<MemoryHandle> {
        let mut registry = self.registry.lock();
        let raw = registry.last_handle.checked_add(1)?;
        let handle = MemoryHandle::new(raw)?;
        registry.last_handle = raw;
        registry.blocks.insert(handle, pixels);
        Some(handle)
    }

    /// Drops the block behind `handle`. Returns `false` if it was unknown.
    pub(crate) fn remove(&self, handle: MemoryHandle) -> bool {
        self.registry.lock().blocks.remove(&handle).is_some()
    }

    /// Runs `f` over the pixels behind `handle`.
    ///
    /// Returns `None` if the handle is unknown or was freed.
    pub fn with_pixels<R>(&self, handle: MemoryHandle, f: impl FnOnce(&[u32]) -> R) -> Option<R> {
        let registry = self.registry.lock();
        registry.blocks.get(&handle).map(|pixels| f(pixels))
    }

    /// Runs `f` over the pixels behind `handle`, mutably.
    pub fn with_pixels_mut<R>(
        &self,
        handle: MemoryHandle,
        f: impl FnOnce(&mut [u32]) -> R,
    ) -> Option<R> {
        let mut registry = self.registry.lock();
        registry.blocks.get_mut(&handle).map(|pixels| f(pixels))
    }

    /// Runs `f` over the raw bytes behind `handle`, in native byte order.
    pub fn with_bytes<R>(&self, handle: MemoryHandle, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        self.with_pixels(handle, |pixels| f(bytemuck::cast_slice(pixels)))
    }

    /// Number of live blocks.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.registry.lock().blocks.len()
    }

    /// Total bytes held by live blocks.
    #[must_use]
    pub fn bytes_in_use(&self) -> usize {
        self.registry
            .lock()
            .blocks
            .values()
            .map(|pixels| size_of_val(pixels.as_slice()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::SoftMemory;

    #[test]
    fn handles_are_distinct_and_views_are_shared() {
        let memory = SoftMemory::new();
        let a = memory.insert(vec![0; 4]).unwrap();
        let b = memory.insert(vec![0; 2]).unwrap();
        assert_ne!(a, b);

        let view = memory.clone();
        view.with_pixels_mut(a, |p| p[3] = 0x0102_0304).unwrap();
        assert_eq!(memory.with_pixels(a, |p| p[3]), Some(0x0102_0304));
        assert_eq!(memory.bytes_in_use(), 24);

        let bytes = memory.with_bytes(a, <[u8]>::len).unwrap();
        assert_eq!(bytes, 16);
    }

    #[test]
    fn freed_blocks_are_gone() {
        let memory = SoftMemory::new();
        let handle = memory.insert(vec![7; 8]).unwrap();
        assert!(memory.remove(handle));
        assert!(!memory.remove(handle));
        assert_eq!(memory.with_pixels(handle, |p| p.len()), None);
        assert_eq!(memory.live_blocks(), 0);
    }
}
