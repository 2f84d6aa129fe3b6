// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-target buffer description.
//!
//! The controller owns exactly one long-lived buffer, described by a
//! [`FrameBufferDescriptor`]. The descriptor carries the geometry the client
//! needs to write pixels and, once allocated, the [`MemoryHandle`] of the
//! backing graphics memory.

use core::fmt;
use core::num::NonZeroU64;
use core::ops::{BitOr, BitOrAssign};

/// Numeric identity of a render-target buffer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BufferId(pub u32);

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({:#x})", self.0)
    }
}

/// Self-recognition id stamped on the controller's single buffer.
pub const DEFAULT_DISPLAY_BUFFER_ID: BufferId = BufferId(0x3870);

/// Opaque handle to allocated graphics memory.
///
/// Handles are issued by a
/// [`FrameBufferAllocator`](crate::backend::FrameBufferAllocator) and are
/// never zero; a missing ("null") handle is expressed as `None`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryHandle(NonZeroU64);

impl MemoryHandle {
    /// Wraps a raw handle value. Returns `None` for the null handle.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryHandle({:#x})", self.0.get())
    }
}

/// Pixel layout of the render target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8 bits per channel, R in the lowest byte.
    #[default]
    Rgba8888,
    /// As [`Rgba8888`](Self::Rgba8888) with the alpha byte ignored.
    Rgbx8888,
    /// 8 bits per channel, B in the lowest byte.
    Bgra8888,
}

impl PixelFormat {
    /// Size of one pixel in bytes.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8888 | Self::Rgbx8888 | Self::Bgra8888 => 4,
        }
    }
}

/// Intended uses of a graphics buffer, as a set of flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferUsage(u64);

impl BufferUsage {
    /// No usage.
    pub const NONE: Self = Self(0);
    /// CPU reads the buffer often.
    pub const SW_READ_OFTEN: Self = Self(0x0000_0003);
    /// CPU writes the buffer often.
    pub const SW_WRITE_OFTEN: Self = Self(0x0000_0030);
    /// GPU renders into the buffer.
    pub const HW_RENDER: Self = Self(0x0000_0200);
    /// The hardware composer scans the buffer out.
    pub const HW_COMPOSER: Self = Self(0x0000_0800);

    /// Creates a usage set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for BufferUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BufferUsage {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for BufferUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferUsage({:#x})", self.0)
    }
}

/// Parameters handed to the allocator for a new render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocationRequest {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Usage flags.
    pub usage: BufferUsage,
}

/// Successful allocation returned by the allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    /// Handle of the new memory.
    pub handle: MemoryHandle,
    /// Row stride in pixels (at least the requested width).
    pub stride: u32,
}

/// Describes the controller's render-target buffer.
///
/// `mem_handle` is `Some` exactly while backing memory is allocated. The same
/// descriptor, handle included, is handed to the client on checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameBufferDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Usage flags requested at allocation.
    pub usage: BufferUsage,
    /// Identity of the buffer.
    pub buffer_id: BufferId,
    /// Size of one pixel in bytes.
    pub pixel_size: u32,
    /// Row stride in pixels. Zero until allocated.
    pub stride: u32,
    /// Backing memory, if allocated.
    pub mem_handle: Option<MemoryHandle>,
}

impl FrameBufferDescriptor {
    /// Creates an unallocated descriptor.
    #[must_use]
    pub const fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        usage: BufferUsage,
        buffer_id: BufferId,
    ) -> Self {
        Self {
            width,
            height,
            format,
            usage,
            buffer_id,
            pixel_size: format.bytes_per_pixel(),
            stride: 0,
            mem_handle: None,
        }
    }

    /// Returns `true` if backing memory is attached.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.mem_handle.is_some()
    }

    /// The request the allocator should receive for this descriptor.
    #[must_use]
    pub const fn allocation_request(&self) -> AllocationRequest {
        AllocationRequest {
            width: self.width,
            height: self.height,
            format: self.format,
            usage: self.usage,
        }
    }

    /// Attaches freshly allocated memory.
    pub fn attach(&mut self, allocation: Allocation) {
        self.stride = allocation.stride;
        self.mem_handle = Some(allocation.handle);
    }

    /// Detaches the memory handle, returning it so it can be freed.
    pub fn detach(&mut self) -> Option<MemoryHandle> {
        self.mem_handle.take()
    }

    /// Size in bytes of the pixel storage implied by stride and height.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.stride as usize * self.height as usize * self.pixel_size as usize
    }
}
