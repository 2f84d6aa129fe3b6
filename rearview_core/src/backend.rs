// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contract for platform integrations.
//!
//! The display controller drives three external services. Each is a trait
//! here so backends (and test doubles) can supply their own:
//!
//! - **Allocator** — [`FrameBufferAllocator`] hands out and frees the
//!   graphics memory behind the render target.
//!
//! - **Window** — [`PresentationWindow`] owns the on-screen surface. It turns
//!   a returned buffer into a texture and renders it. The window is optional:
//!   a controller without one still arbitrates buffers but presents nothing.
//!
//! - **Proxy** — [`DisplayProxy`] is the system service owning the physical
//!   display. It is shared (the controller holds it behind an `Arc`) and only
//!   answers queries.
//!
//! # Crate boundaries
//!
//! `rearview_core` owns the data model and this contract module. Backend
//! crates implement the traits; `rearview_display` owns the controller that
//! calls them, always while holding its state lock.

use crate::buffer::{Allocation, AllocationRequest, FrameBufferDescriptor, MemoryHandle};
use crate::display::{DisplayId, HwDisplayConfig, HwDisplayState};
use crate::error::{AllocationError, WindowError};

/// Allocates and frees graphics memory for render targets.
pub trait FrameBufferAllocator {
    /// Allocates memory for `request`, returning its handle and row stride.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if the memory cannot be provided.
    fn allocate(&mut self, request: &AllocationRequest) -> Result<Allocation, AllocationError>;

    /// Returns previously allocated memory.
    ///
    /// Called at most once per handle.
    fn free(&mut self, handle: MemoryHandle);
}

/// The on-screen compositing surface that turns a pixel buffer into an image.
///
/// # Lifecycle
///
/// ```rust,ignore
/// window.initialize(proxy, display)?;            // first buffer checkout
/// let (w, h) = (window.width(), window.height()); // size the render target
/// window.show(proxy, display);
/// window.update_texture(&buffer)?;                // each returned frame
/// window.render();
/// window.hide(proxy, display);
/// window.shutdown();                              // ownership lost
/// ```
pub trait PresentationWindow {
    /// Binds the window to `display`.
    ///
    /// # Errors
    ///
    /// Returns a [`WindowError`] if the display cannot be used. The
    /// controller then drops the window and continues without one.
    fn initialize(
        &mut self,
        proxy: Option<&dyn DisplayProxy>,
        display: DisplayId,
    ) -> Result<(), WindowError>;

    /// Current width of the surface in pixels.
    fn width(&self) -> u32;

    /// Current height of the surface in pixels.
    fn height(&self) -> u32;

    /// Makes the surface visible on `display`.
    fn show(&mut self, proxy: Option<&dyn DisplayProxy>, display: DisplayId);

    /// Hides the surface on `display`.
    fn hide(&mut self, proxy: Option<&dyn DisplayProxy>, display: DisplayId);

    /// Copies the contents of `buffer` into the window's texture.
    ///
    /// # Errors
    ///
    /// Returns a [`WindowError`] on a driver or content failure. The
    /// controller reports it to the client and does not retry.
    fn update_texture(&mut self, buffer: &FrameBufferDescriptor) -> Result<(), WindowError>;

    /// Draws the current texture to the screen.
    fn render(&mut self);

    /// Releases everything acquired by [`initialize`](Self::initialize).
    fn shutdown(&mut self);
}

/// System service that owns the physical displays.
pub trait DisplayProxy {
    /// Returns the active configuration and runtime state of `display`.
    fn display_info(&self, display: DisplayId) -> (HwDisplayConfig, HwDisplayState);
}
