// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heap allocator for render targets.

use std::collections::HashMap;

use rearview_core::backend::FrameBufferAllocator;
use rearview_core::buffer::{Allocation, AllocationRequest, MemoryHandle};
use rearview_core::error::AllocationError;

use crate::memory::SoftMemory;

/// Tunable parameters for [`SoftAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftAllocatorConfig {
    /// Rows are padded to a multiple of this many pixels. Zero is treated as
    /// one.
    pub row_alignment: u32,
    /// Upper bound on bytes held by live allocations.
    pub memory_budget: usize,
}

impl SoftAllocatorConfig {
    /// 16-pixel rows and a 64 MiB budget.
    pub const DEFAULT: Self = Self {
        row_alignment: 16,
        memory_budget: 64 << 20,
    };

    /// Unpadded rows and no budget.
    pub const UNLIMITED: Self = Self {
        row_alignment: 1,
        memory_budget: usize::MAX,
    };
}

impl Default for SoftAllocatorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A [`FrameBufferAllocator`] that hands out blocks of a [`SoftMemory`].
#[derive(Debug)]
pub struct SoftAllocator {
    memory: SoftMemory,
    config: SoftAllocatorConfig,
    live: HashMap<MemoryHandle, usize>,
    in_use: usize,
}

impl SoftAllocator {
    /// Creates an allocator that registers its blocks in `memory`.
    #[must_use]
    pub fn new(memory: SoftMemory, config: SoftAllocatorConfig) -> Self {
        Self {
            memory,
            config,
            live: HashMap::new(),
            in_use: 0,
        }
    }

    /// Bytes held by allocations that have not been freed.
    #[must_use]
    pub fn bytes_in_use(&self) -> usize {
        self.in_use
    }
}

impl FrameBufferAllocator for SoftAllocator {
    fn allocate(&mut self, request: &AllocationRequest) -> Result<Allocation, AllocationError> {
        let invalid = AllocationError::InvalidGeometry {
            width: request.width,
            height: request.height,
        };
        if request.width == 0 || request.height == 0 {
            return Err(invalid);
        }
        let stride = request
            .width
            .checked_next_multiple_of(self.config.row_alignment.max(1))
            .ok_or(invalid)?;

        let pixels = stride as usize * request.height as usize;
        let bytes = pixels.saturating_mul(size_of::<u32>());
        let available = self.config.memory_budget.saturating_sub(self.in_use);
        if bytes > available {
            return Err(AllocationError::OutOfMemory { requested: bytes });
        }

        let handle = self
            .memory
            .insert(vec![0; pixels])
            .ok_or(AllocationError::OutOfMemory { requested: bytes })?;
        self.live.insert(handle, bytes);
        self.in_use += bytes;
        log::debug!(
            "soft allocation {handle:?}: {}x{} stride {stride}, {bytes} bytes",
            request.width,
            request.height
        );
        Ok(Allocation { handle, stride })
    }

    fn free(&mut self, handle: MemoryHandle) {
        match self.live.remove(&handle) {
            Some(bytes) => {
                self.in_use -= bytes;
                self.memory.remove(handle);
                log::debug!("soft allocation {handle:?} freed");
            }
            None => log::warn!("free of unknown soft allocation {handle:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rearview_core::buffer::{BufferUsage, PixelFormat};

    fn request(width: u32, height: u32) -> AllocationRequest {
        AllocationRequest {
            width,
            height,
            format: PixelFormat::Rgba8888,
            usage: BufferUsage::HW_RENDER,
        }
    }

    #[test]
    fn rows_are_padded_to_alignment() {
        let memory = SoftMemory::new();
        let mut allocator = SoftAllocator::new(memory.clone(), SoftAllocatorConfig::DEFAULT);
        let allocation = allocator.allocate(&request(100, 10)).unwrap();
        assert_eq!(allocation.stride, 112);
        assert_eq!(allocator.bytes_in_use(), 112 * 10 * 4);
        assert_eq!(memory.with_pixels(allocation.handle, <[u32]>::len), Some(1120));
    }

    #[test]
    fn budget_is_enforced_and_restored_on_free() {
        let config = SoftAllocatorConfig {
            row_alignment: 1,
            memory_budget: 4 * 64,
        };
        let memory = SoftMemory::new();
        let mut allocator = SoftAllocator::new(memory.clone(), config);

        let first = allocator.allocate(&request(8, 8)).unwrap();
        assert_eq!(
            allocator.allocate(&request(1, 1)),
            Err(AllocationError::OutOfMemory { requested: 4 })
        );

        allocator.free(first.handle);
        assert_eq!(allocator.bytes_in_use(), 0);
        assert_eq!(memory.live_blocks(), 0);
        assert!(allocator.allocate(&request(8, 8)).is_ok());
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let mut allocator = SoftAllocator::new(SoftMemory::new(), SoftAllocatorConfig::UNLIMITED);
        assert_eq!(
            allocator.allocate(&request(0, 480)),
            Err(AllocationError::InvalidGeometry {
                width: 0,
                height: 480
            })
        );
    }

    #[test]
    fn unknown_free_is_ignored() {
        let mut allocator = SoftAllocator::new(SoftMemory::new(), SoftAllocatorConfig::DEFAULT);
        allocator.free(MemoryHandle::new(99).unwrap());
        assert_eq!(allocator.bytes_in_use(), 0);
    }
}
