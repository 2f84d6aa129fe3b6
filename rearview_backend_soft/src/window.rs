// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory presentation window.
//!
//! [`SoftWindow`] keeps a texture and a front buffer as plain pixel arrays.
//! `update_texture` copies the returned render target out of
//! [`SoftMemory`], and `render` latches the texture into the front buffer and
//! stamps the present time. A [`ScreenHandle`] lets the owner of the window
//! inspect the result after the window has been handed to a controller.

use std::sync::Arc;

use parking_lot::Mutex;
use rearview_core::backend::{DisplayProxy, PresentationWindow};
use rearview_core::buffer::FrameBufferDescriptor;
use rearview_core::display::{DisplayId, Rotation};
use rearview_core::error::WindowError;
use rearview_core::time::HostTime;

use crate::memory::SoftMemory;
use crate::pattern::FrameChecker;
use crate::time;

/// Tunable parameters for [`SoftWindow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftWindowConfig {
    /// Surface width used when no display proxy is available.
    pub fallback_width: u32,
    /// Surface height used when no display proxy is available.
    pub fallback_height: u32,
    /// Verify the test pattern on every `update_texture`.
    pub validate_pattern: bool,
}

impl SoftWindowConfig {
    /// 640x360 fallback, no validation.
    pub const DEFAULT: Self = Self {
        fallback_width: 640,
        fallback_height: 360,
        validate_pattern: false,
    };

    /// As [`DEFAULT`](Self::DEFAULT), but every frame must carry the test
    /// pattern with a fresh signature.
    pub const VALIDATING: Self = Self {
        validate_pattern: true,
        ..Self::DEFAULT
    };
}

impl Default for SoftWindowConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Default)]
struct Screen {
    initialized: bool,
    visible: bool,
    width: u32,
    height: u32,
    texture: Vec<u32>,
    front: Vec<u32>,
    frames_rendered: u64,
    last_present: Option<HostTime>,
}

impl Screen {
    fn configure(&mut self, width: u32, height: u32) {
        let pixels = width as usize * height as usize;
        *self = Self {
            initialized: true,
            width,
            height,
            texture: vec![0; pixels],
            front: vec![0; pixels],
            ..Self::default()
        };
    }
}

/// Read-only view of a [`SoftWindow`]'s surface.
#[derive(Clone, Debug)]
pub struct ScreenHandle {
    screen: Arc<Mutex<Screen>>,
}

impl ScreenHandle {
    /// Whether the window is bound to a display.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.screen.lock().initialized
    }

    /// Whether the surface is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.screen.lock().visible
    }

    /// Surface size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let screen = self.screen.lock();
        (screen.width, screen.height)
    }

    /// Number of `render` calls since initialization.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.screen.lock().frames_rendered
    }

    /// Host time of the most recent `render`.
    #[must_use]
    pub fn last_present(&self) -> Option<HostTime> {
        self.screen.lock().last_present
    }

    /// Front-buffer pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        let screen = self.screen.lock();
        if x >= screen.width || y >= screen.height {
            return None;
        }
        let index = y as usize * screen.width as usize + x as usize;
        screen.front.get(index).copied()
    }
}

/// A [`PresentationWindow`] that renders into memory.
#[derive(Debug)]
pub struct SoftWindow {
    memory: SoftMemory,
    config: SoftWindowConfig,
    screen: Arc<Mutex<Screen>>,
    checker: FrameChecker,
}

impl SoftWindow {
    /// Creates a window that reads render targets out of `memory`.
    #[must_use]
    pub fn new(memory: SoftMemory, config: SoftWindowConfig) -> Self {
        Self {
            memory,
            config,
            screen: Arc::default(),
            checker: FrameChecker::new(),
        }
    }

    /// A handle for inspecting the surface.
    #[must_use]
    pub fn screen(&self) -> ScreenHandle {
        ScreenHandle {
            screen: Arc::clone(&self.screen),
        }
    }
}

impl PresentationWindow for SoftWindow {
    fn initialize(
        &mut self,
        proxy: Option<&dyn DisplayProxy>,
        display: DisplayId,
    ) -> Result<(), WindowError> {
        let (width, height) = match proxy {
            Some(proxy) => {
                let (config, state) = proxy.display_info(display);
                if config.width == 0 || config.height == 0 {
                    log::error!("{display:?} reports no active mode");
                    return Err(WindowError::InitializationFailed);
                }
                match state.rotation {
                    Rotation::Deg90 | Rotation::Deg270 => (config.height, config.width),
                    Rotation::Deg0 | Rotation::Deg180 => (config.width, config.height),
                }
            }
            None => (self.config.fallback_width, self.config.fallback_height),
        };

        log::debug!("soft window bound to {display:?} at {width}x{height}");
        self.screen.lock().configure(width, height);
        self.checker.reset();
        Ok(())
    }

    fn width(&self) -> u32 {
        self.screen.lock().width
    }

    fn height(&self) -> u32 {
        self.screen.lock().height
    }

    fn show(&mut self, _proxy: Option<&dyn DisplayProxy>, display: DisplayId) {
        log::debug!("soft window shown on {display:?}");
        self.screen.lock().visible = true;
    }

    fn hide(&mut self, _proxy: Option<&dyn DisplayProxy>, display: DisplayId) {
        log::debug!("soft window hidden on {display:?}");
        self.screen.lock().visible = false;
    }

    fn update_texture(&mut self, buffer: &FrameBufferDescriptor) -> Result<(), WindowError> {
        if !self.screen.lock().initialized {
            return Err(WindowError::NotInitialized);
        }
        let handle = buffer.mem_handle.ok_or(WindowError::InvalidBuffer)?;
        if buffer.stride < buffer.width || buffer.stride == 0 {
            return Err(WindowError::InvalidBuffer);
        }

        let validate = self.config.validate_pattern;
        let checker = &mut self.checker;
        let screen = &self.screen;
        self.memory
            .with_pixels(handle, |pixels| {
                if validate {
                    checker.check(buffer, pixels)?;
                }
                let mut screen = screen.lock();
                let width = screen.width as usize;
                let copy_width = width.min(buffer.width as usize);
                if width == 0 {
                    return Ok(());
                }
                let rows = pixels
                    .chunks(buffer.stride as usize)
                    .take(buffer.height as usize);
                for (src, dst) in rows.zip(screen.texture.chunks_exact_mut(width)) {
                    let n = copy_width.min(src.len());
                    dst[..n].copy_from_slice(&src[..n]);
                }
                Ok(())
            })
            .ok_or(WindowError::InvalidBuffer)?
    }

    fn render(&mut self) {
        let mut screen = self.screen.lock();
        if !screen.initialized {
            log::warn!("render on an uninitialized soft window");
            return;
        }
        let Screen { texture, front, .. } = &mut *screen;
        front.copy_from_slice(texture);
        screen.frames_rendered += 1;
        screen.last_present = Some(time::now());
    }

    fn shutdown(&mut self) {
        log::debug!("soft window shut down");
        *self.screen.lock() = Screen::default();
        self.checker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{SoftAllocator, SoftAllocatorConfig};
    use crate::pattern;
    use crate::proxy::SoftDisplayProxy;
    use rearview_core::backend::FrameBufferAllocator;
    use rearview_core::buffer::{BufferId, BufferUsage, PixelFormat};

    fn allocated(memory: &SoftMemory, width: u32, height: u32) -> FrameBufferDescriptor {
        let mut allocator = SoftAllocator::new(memory.clone(), SoftAllocatorConfig::DEFAULT);
        let mut desc = FrameBufferDescriptor::new(
            width,
            height,
            PixelFormat::Rgba8888,
            BufferUsage::HW_RENDER,
            BufferId(1),
        );
        desc.attach(allocator.allocate(&desc.allocation_request()).unwrap());
        desc
    }

    #[test]
    fn size_follows_proxy_and_rotation() {
        let proxy = SoftDisplayProxy::single(DisplayId(0), 1280, 720);
        let mut window = SoftWindow::new(SoftMemory::new(), SoftWindowConfig::DEFAULT);
        window.initialize(Some(&proxy), DisplayId(0)).unwrap();
        assert_eq!((window.width(), window.height()), (1280, 720));

        proxy.set_rotation(DisplayId(0), Rotation::Deg270);
        window.initialize(Some(&proxy), DisplayId(0)).unwrap();
        assert_eq!((window.width(), window.height()), (720, 1280));
    }

    #[test]
    fn unknown_display_fails_and_no_proxy_uses_fallback() {
        let proxy = SoftDisplayProxy::new();
        let mut window = SoftWindow::new(SoftMemory::new(), SoftWindowConfig::DEFAULT);
        assert_eq!(
            window.initialize(Some(&proxy), DisplayId(3)),
            Err(WindowError::InitializationFailed)
        );
        window.initialize(None, DisplayId(3)).unwrap();
        assert_eq!((window.width(), window.height()), (640, 360));
    }

    #[test]
    fn rendered_frame_reaches_front_buffer() {
        let memory = SoftMemory::new();
        let desc = allocated(&memory, 20, 10);
        let handle = desc.mem_handle.unwrap();
        memory
            .with_pixels_mut(handle, |p| pattern::write(&desc, p, 9))
            .unwrap()
            .unwrap();

        let config = SoftWindowConfig {
            fallback_width: 20,
            fallback_height: 10,
            validate_pattern: true,
        };
        let mut window = SoftWindow::new(memory, config);
        let screen = window.screen();
        window.initialize(None, DisplayId(0)).unwrap();
        window.show(None, DisplayId(0));
        window.update_texture(&desc).unwrap();
        window.render();

        assert!(screen.is_visible());
        assert_eq!(screen.frames_rendered(), 1);
        assert!(screen.last_present().is_some());
        assert_eq!(screen.pixel(7, 3), Some(pattern::expected_pixel(3, 7)));
        assert_eq!(screen.pixel(20, 0), None);

        // Same frame again: stale.
        assert_eq!(
            window.update_texture(&desc),
            Err(WindowError::StaleFrame { signature: 9 })
        );
    }

    #[test]
    fn texture_requires_initialization_and_memory() {
        let memory = SoftMemory::new();
        let desc = allocated(&memory, 4, 4);
        let mut window = SoftWindow::new(memory, SoftWindowConfig::DEFAULT);
        assert_eq!(
            window.update_texture(&desc),
            Err(WindowError::NotInitialized)
        );

        window.initialize(None, DisplayId(0)).unwrap();
        let mut unbacked = desc;
        unbacked.detach();
        assert_eq!(
            window.update_texture(&unbacked),
            Err(WindowError::InvalidBuffer)
        );
        window.update_texture(&desc).unwrap();
    }

    #[test]
    fn each_render_stamps_the_present_time() {
        let memory = SoftMemory::new();
        let desc = allocated(&memory, 4, 4);
        let mut window = SoftWindow::new(memory, SoftWindowConfig::DEFAULT);
        let screen = window.screen();
        window.initialize(None, DisplayId(0)).unwrap();
        assert_eq!(screen.last_present(), None);

        window.update_texture(&desc).unwrap();
        window.render();
        let first = screen.last_present().unwrap();
        window.update_texture(&desc).unwrap();
        window.render();
        let second = screen.last_present().unwrap();
        assert!(second >= first, "{second:?} before {first:?}");

        window.shutdown();
        assert_eq!(screen.last_present(), None);
    }

    #[test]
    fn shutdown_clears_the_surface() {
        let mut window = SoftWindow::new(SoftMemory::new(), SoftWindowConfig::DEFAULT);
        let screen = window.screen();
        window.initialize(None, DisplayId(0)).unwrap();
        window.show(None, DisplayId(0));
        window.shutdown();
        assert!(!screen.is_initialized());
        assert!(!screen.is_visible());
        assert_eq!(screen.size(), (0, 0));
    }
}
