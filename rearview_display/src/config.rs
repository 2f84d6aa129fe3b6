// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller configuration.

use rearview_core::buffer::{
    BufferId, BufferUsage, DEFAULT_DISPLAY_BUFFER_ID, FrameBufferDescriptor, PixelFormat,
};
use rearview_core::display::{DisplayDesc, DisplayId};

/// Static configuration of a
/// [`DisplaySurfaceController`](crate::DisplaySurfaceController).
///
/// The default describes a 640x360 RGBA render target on display 0, used
/// whenever no presentation window reports its own size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Self description returned by `display_info`.
    pub desc: DisplayDesc,
    /// Physical display the controller owns.
    pub display_id: DisplayId,
    /// Render-target width when no window is available.
    pub default_width: u32,
    /// Render-target height when no window is available.
    pub default_height: u32,
    /// Pixel layout of the render target.
    pub format: PixelFormat,
    /// Usage flags passed to the allocator.
    pub usage: BufferUsage,
    /// Identity stamped on the render target.
    pub buffer_id: BufferId,
}

impl DisplayConfig {
    /// Default render-target width.
    pub const DEFAULT_WIDTH: u32 = 640;
    /// Default render-target height.
    pub const DEFAULT_HEIGHT: u32 = 360;

    /// Default configuration for `display_id`.
    #[must_use]
    pub fn for_display(display_id: DisplayId) -> Self {
        Self {
            desc: DisplayDesc::default(),
            display_id,
            default_width: Self::DEFAULT_WIDTH,
            default_height: Self::DEFAULT_HEIGHT,
            format: PixelFormat::Rgba8888,
            usage: BufferUsage::HW_RENDER | BufferUsage::HW_COMPOSER,
            buffer_id: DEFAULT_DISPLAY_BUFFER_ID,
        }
    }

    /// An unallocated descriptor of the given size using this configuration.
    #[must_use]
    pub const fn descriptor(&self, width: u32, height: u32) -> FrameBufferDescriptor {
        FrameBufferDescriptor::new(width, height, self.format, self.usage, self.buffer_id)
    }

    /// An unallocated descriptor of the default size.
    #[must_use]
    pub const fn default_descriptor(&self) -> FrameBufferDescriptor {
        self.descriptor(self.default_width, self.default_height)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::for_display(DisplayId(0))
    }
}

#[cfg(test)]
mod tests {
    use super::DisplayConfig;
    use rearview_core::buffer::{BufferUsage, DEFAULT_DISPLAY_BUFFER_ID, PixelFormat};

    #[test]
    fn default_describes_mock_display() {
        let config = DisplayConfig::default();
        assert_eq!(config.desc.display_id, "Mock Display");
        assert_eq!(config.desc.vendor_flags, 3870);

        let desc = config.default_descriptor();
        assert_eq!((desc.width, desc.height), (640, 360));
        assert_eq!(desc.format, PixelFormat::Rgba8888);
        assert_eq!(desc.pixel_size, 4);
        assert_eq!(desc.buffer_id, DEFAULT_DISPLAY_BUFFER_ID);
        assert!(desc.usage.contains(BufferUsage::HW_COMPOSER));
        assert!(!desc.is_allocated());
    }
}
