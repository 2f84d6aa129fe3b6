// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumented collaborators for exercising a display controller.
//!
//! Each double is created together with a probe that shares its state. The
//! double is moved into the controller; the probe stays with the test to
//! count calls and inject failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rearview_core::backend::{DisplayProxy, FrameBufferAllocator, PresentationWindow};
use rearview_core::buffer::{Allocation, AllocationRequest, FrameBufferDescriptor, MemoryHandle};
use rearview_core::display::{DisplayId, HwDisplayConfig, HwDisplayState};
use rearview_core::error::{AllocationError, WindowError};

/// First raw handle value handed out by [`CountingAllocator`].
const HANDLE_BASE: u64 = 0x1000;

// ---------------------------------------------------------------------------
// Allocator
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct AllocatorState {
    allocations: u64,
    freed: Vec<MemoryHandle>,
    fail_next: Option<AllocationError>,
}

/// A [`FrameBufferAllocator`] that hands out fake handles and counts calls.
///
/// Strides equal the requested width.
#[derive(Debug)]
pub struct CountingAllocator {
    state: Arc<Mutex<AllocatorState>>,
}

/// Observer and failure switch for a [`CountingAllocator`].
#[derive(Clone, Debug)]
pub struct AllocatorProbe {
    state: Arc<Mutex<AllocatorState>>,
}

impl CountingAllocator {
    /// Creates an allocator and its probe.
    #[must_use]
    pub fn new() -> (Self, AllocatorProbe) {
        let state = Arc::new(Mutex::new(AllocatorState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            AllocatorProbe { state },
        )
    }
}

impl FrameBufferAllocator for CountingAllocator {
    fn allocate(&mut self, request: &AllocationRequest) -> Result<Allocation, AllocationError> {
        let mut state = self.state.lock();
        if let Some(e) = state.fail_next.take() {
            return Err(e);
        }
        let raw = HANDLE_BASE + state.allocations;
        let handle = MemoryHandle::new(raw).ok_or(AllocationError::Status(-1))?;
        state.allocations += 1;
        Ok(Allocation {
            handle,
            stride: request.width,
        })
    }

    fn free(&mut self, handle: MemoryHandle) {
        self.state.lock().freed.push(handle);
    }
}

impl AllocatorProbe {
    /// Successful allocations so far.
    #[must_use]
    pub fn allocations(&self) -> u64 {
        self.state.lock().allocations
    }

    /// `free` calls so far.
    #[must_use]
    pub fn frees(&self) -> usize {
        self.state.lock().freed.len()
    }

    /// Handles passed to `free`, in call order.
    #[must_use]
    pub fn freed_handles(&self) -> Vec<MemoryHandle> {
        self.state.lock().freed.clone()
    }

    /// Makes the next `allocate` fail with `error`.
    pub fn fail_next(&self, error: AllocationError) {
        self.state.lock().fail_next = Some(error);
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Per-method call counts of a [`RecordingWindow`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowCalls {
    /// `initialize` calls, failed ones included.
    pub initialize: u32,
    /// `show` calls.
    pub show: u32,
    /// `hide` calls.
    pub hide: u32,
    /// `update_texture` calls, failed ones included.
    pub update_texture: u32,
    /// `render` calls.
    pub render: u32,
    /// `shutdown` calls.
    pub shutdown: u32,
}

#[derive(Debug, Default)]
struct WindowState {
    calls: WindowCalls,
    width: u32,
    height: u32,
    visible: bool,
    fail_initialize: bool,
    fail_update: Option<WindowError>,
    last_texture: Option<FrameBufferDescriptor>,
}

/// A [`PresentationWindow`] that records every call.
#[derive(Debug)]
pub struct RecordingWindow {
    state: Arc<Mutex<WindowState>>,
}

/// Observer and failure switches for a [`RecordingWindow`].
#[derive(Clone, Debug)]
pub struct WindowProbe {
    state: Arc<Mutex<WindowState>>,
}

impl RecordingWindow {
    /// Creates a window reporting `width` x `height`, and its probe.
    #[must_use]
    pub fn new(width: u32, height: u32) -> (Self, WindowProbe) {
        let state = Arc::new(Mutex::new(WindowState {
            width,
            height,
            ..WindowState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            WindowProbe { state },
        )
    }
}

impl PresentationWindow for RecordingWindow {
    fn initialize(
        &mut self,
        _proxy: Option<&dyn DisplayProxy>,
        _display: DisplayId,
    ) -> Result<(), WindowError> {
        let mut state = self.state.lock();
        state.calls.initialize += 1;
        if state.fail_initialize {
            Err(WindowError::InitializationFailed)
        } else {
            Ok(())
        }
    }

    fn width(&self) -> u32 {
        self.state.lock().width
    }

    fn height(&self) -> u32 {
        self.state.lock().height
    }

    fn show(&mut self, _proxy: Option<&dyn DisplayProxy>, _display: DisplayId) {
        let mut state = self.state.lock();
        state.calls.show += 1;
        state.visible = true;
    }

    fn hide(&mut self, _proxy: Option<&dyn DisplayProxy>, _display: DisplayId) {
        let mut state = self.state.lock();
        state.calls.hide += 1;
        state.visible = false;
    }

    fn update_texture(&mut self, buffer: &FrameBufferDescriptor) -> Result<(), WindowError> {
        let mut state = self.state.lock();
        state.calls.update_texture += 1;
        if let Some(e) = state.fail_update {
            return Err(e);
        }
        state.last_texture = Some(*buffer);
        Ok(())
    }

    fn render(&mut self) {
        self.state.lock().calls.render += 1;
    }

    fn shutdown(&mut self) {
        let mut state = self.state.lock();
        state.calls.shutdown += 1;
        state.visible = false;
    }
}

impl WindowProbe {
    /// Call counts so far.
    #[must_use]
    pub fn calls(&self) -> WindowCalls {
        self.state.lock().calls
    }

    /// Whether the last `show`/`hide`/`shutdown` left the window shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    /// The last descriptor accepted by `update_texture`.
    #[must_use]
    pub fn last_texture(&self) -> Option<FrameBufferDescriptor> {
        self.state.lock().last_texture
    }

    /// Makes every following `initialize` fail, or succeed again.
    pub fn fail_initialize(&self, fail: bool) {
        self.state.lock().fail_initialize = fail;
    }

    /// Makes every following `update_texture` fail with `error`, or succeed
    /// again with `None`.
    pub fn fail_update(&self, error: Option<WindowError>) {
        self.state.lock().fail_update = error;
    }
}

// ---------------------------------------------------------------------------
// Display proxy
// ---------------------------------------------------------------------------

/// A [`DisplayProxy`] that reports the same answer for every display.
#[derive(Debug)]
pub struct FixedDisplayProxy {
    config: HwDisplayConfig,
    state: HwDisplayState,
    queries: AtomicU64,
}

impl FixedDisplayProxy {
    /// Creates a proxy reporting `config` and `state`.
    #[must_use]
    pub fn new(config: HwDisplayConfig, state: HwDisplayState) -> Self {
        Self {
            config,
            state,
            queries: AtomicU64::new(0),
        }
    }

    /// Number of `display_info` calls so far.
    #[must_use]
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

impl DisplayProxy for FixedDisplayProxy {
    fn display_info(&self, _display: DisplayId) -> (HwDisplayConfig, HwDisplayState) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        (self.config, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rearview_core::buffer::{BufferUsage, PixelFormat};

    fn request() -> AllocationRequest {
        AllocationRequest {
            width: 32,
            height: 8,
            format: PixelFormat::Rgba8888,
            usage: BufferUsage::HW_RENDER,
        }
    }

    #[test]
    fn allocator_counts_and_injects_failures() {
        let (mut allocator, probe) = CountingAllocator::new();
        let a = allocator.allocate(&request()).unwrap();
        assert_eq!(a.stride, 32);

        probe.fail_next(AllocationError::OutOfMemory { requested: 1024 });
        assert!(allocator.allocate(&request()).is_err());
        let b = allocator.allocate(&request()).unwrap();
        assert_ne!(a.handle, b.handle);

        allocator.free(a.handle);
        assert_eq!(probe.allocations(), 2);
        assert_eq!(probe.freed_handles(), vec![a.handle]);
    }

    #[test]
    fn window_records_calls() {
        let (mut window, probe) = RecordingWindow::new(10, 20);
        assert_eq!((window.width(), window.height()), (10, 20));

        probe.fail_initialize(true);
        assert!(window.initialize(None, DisplayId(0)).is_err());
        window.show(None, DisplayId(0));
        assert!(probe.is_visible());
        window.render();
        window.shutdown();

        let calls = probe.calls();
        assert_eq!(calls.initialize, 1);
        assert_eq!(calls.show, 1);
        assert_eq!(calls.render, 1);
        assert_eq!(calls.shutdown, 1);
        assert!(!probe.is_visible());
    }

    #[test]
    fn proxy_counts_queries() {
        let proxy = FixedDisplayProxy::new(HwDisplayConfig::default(), HwDisplayState::default());
        let _ = proxy.display_info(DisplayId(1));
        let _ = proxy.display_info(DisplayId(2));
        assert_eq!(proxy.queries(), 2);
    }
}
