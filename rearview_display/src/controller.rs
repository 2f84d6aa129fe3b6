// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The display surface controller.
//!
//! [`DisplaySurfaceController`] owns one render-target buffer and the
//! visibility state of one physical display. Every public operation takes the
//! same lock, computes its state change with
//! [`transition`](rearview_core::transition::transition), and then applies the
//! resulting effects to the collaborators.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rearview_core::backend::{DisplayProxy, FrameBufferAllocator, PresentationWindow};
use rearview_core::buffer::{BufferId, FrameBufferDescriptor, MemoryHandle};
use rearview_core::display::{DisplayDesc, HwDisplayConfig, HwDisplayState};
use rearview_core::error::{DisplayError, EvsResult};
use rearview_core::state::VisibilityState;
use rearview_core::trace::{
    AcquireEvent, AcquireRejectedEvent, BufferAllocatedEvent, PresentEvent, ReturnEvent,
    ShutdownEvent, StateChangeEvent, TraceSink, Tracer,
};
use rearview_core::transition::{Effect, Event, Transition, transition};

use crate::config::DisplayConfig;

type SharedProxy = Arc<dyn DisplayProxy + Send + Sync>;

/// Mutable controller state. Only ever touched with the lock held.
struct Inner {
    state: VisibilityState,
    /// The client holds the buffer.
    frame_busy: bool,
    buffer: FrameBufferDescriptor,
    window: Option<Box<dyn PresentationWindow + Send>>,
    allocator: Box<dyn FrameBufferAllocator + Send>,
    sink: Option<Box<dyn TraceSink + Send>>,
    checkouts: u64,
    frames_presented: u64,
}

impl Inner {
    fn tracer(&mut self) -> Tracer<'_> {
        match self.sink.as_deref_mut() {
            Some(sink) => Tracer::new(Some(sink)),
            None => Tracer::none(),
        }
    }
}

/// Single-owner controller of an exterior-view display.
///
/// One client at a time drives the display by checking out its single
/// render-target buffer, drawing into it, and returning it. Returned frames
/// are presented according to the [`VisibilityState`] the client requested.
///
/// When another party takes the display, [`force_shutdown`] releases every
/// resource and leaves the controller permanently [`Dead`]; later calls from
/// the old client are rejected with [`DisplayError::OwnershipLost`]. Dropping
/// the controller performs the same shutdown.
///
/// All operations are safe to call from any thread.
///
/// [`force_shutdown`]: Self::force_shutdown
/// [`Dead`]: VisibilityState::Dead
pub struct DisplaySurfaceController {
    config: DisplayConfig,
    proxy: Option<SharedProxy>,
    inner: Mutex<Inner>,
}

impl fmt::Debug for DisplaySurfaceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("DisplaySurfaceController")
            .field("display", &self.config.display_id)
            .field("state", &inner.state)
            .field("frame_busy", &inner.frame_busy)
            .field("buffer", &inner.buffer)
            .finish_non_exhaustive()
    }
}

impl DisplaySurfaceController {
    /// Starts building a controller around `allocator`.
    pub fn builder(allocator: impl FrameBufferAllocator + Send + 'static) -> ControllerBuilder {
        ControllerBuilder {
            config: DisplayConfig::default(),
            allocator: Box::new(allocator),
            window: None,
            proxy: None,
            sink: None,
        }
    }

    /// Creates a controller with the default configuration, no window, and
    /// no display proxy.
    pub fn new(allocator: impl FrameBufferAllocator + Send + 'static) -> Self {
        Self::builder(allocator).build()
    }

    fn proxy(&self) -> Option<&dyn DisplayProxy> {
        self.proxy.as_deref().map(|p| p as &dyn DisplayProxy)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The display's self description. Valid in every state.
    pub fn display_info(&self) -> &DisplayDesc {
        log::debug!("display_info");
        &self.config.desc
    }

    /// Active configuration and runtime state of the physical display.
    ///
    /// Without a display proxy both values are their defaults.
    pub fn display_info_ext(&self) -> (HwDisplayConfig, HwDisplayState) {
        log::debug!("display_info_ext");
        match self.proxy() {
            Some(proxy) => proxy.display_info(self.config.display_id),
            None => {
                log::warn!("display proxy is unavailable, reporting an empty configuration");
                (HwDisplayConfig::default(), HwDisplayState::default())
            }
        }
    }

    /// The currently recorded visibility state.
    pub fn visibility_state(&self) -> VisibilityState {
        let state = self.inner.lock().state;
        log::debug!("visibility_state -> {state}");
        state
    }

    /// Whether the client currently holds the render target.
    pub fn is_frame_busy(&self) -> bool {
        self.inner.lock().frame_busy
    }

    /// Number of frames that have reached the screen.
    pub fn frames_presented(&self) -> u64 {
        self.inner.lock().frames_presented
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Records the client's requested visibility.
    ///
    /// `Visible` shows the window immediately and `NotVisible` hides it.
    /// `VisibleOnNextFrame` defers showing until the next returned frame.
    /// Requesting `Dead` releases resources as [`force_shutdown`] does.
    ///
    /// # Errors
    ///
    /// [`DisplayError::OwnershipLost`] once the controller is dead.
    ///
    /// [`force_shutdown`]: Self::force_shutdown
    pub fn set_visibility_state(&self, requested: VisibilityState) -> Result<(), DisplayError> {
        log::debug!("set_visibility_state({requested})");
        let mut guard = self.inner.lock();
        self.request(&mut guard, requested)
    }

    /// Records the client's requested visibility from its raw wire value.
    ///
    /// # Errors
    ///
    /// [`DisplayError::OwnershipLost`] once the controller is dead, whatever
    /// `raw` holds. Otherwise [`DisplayError::InvalidArgument`] when `raw`
    /// names no state.
    pub fn set_visibility_state_raw(&self, raw: u32) -> Result<(), DisplayError> {
        log::debug!("set_visibility_state_raw({raw})");
        let mut guard = self.inner.lock();
        if guard.state.is_dead() {
            log::warn!("rejecting visibility change after ownership was lost");
            return Err(DisplayError::OwnershipLost);
        }
        let requested = VisibilityState::try_from(raw).inspect_err(|_| {
            log::error!("set_visibility_state called with unrecognized display state {raw}");
        })?;
        self.request(&mut guard, requested)
    }

    fn request(&self, inner: &mut Inner, requested: VisibilityState) -> Result<(), DisplayError> {
        let event = Event::Request(requested);
        let t = transition(inner.state, event).inspect_err(|_| {
            log::warn!("rejecting visibility change to {requested} after ownership was lost");
        })?;
        self.apply(inner, event, t)
    }

    // -----------------------------------------------------------------------
    // Buffer checkout
    // -----------------------------------------------------------------------

    /// Checks out the render target, allocating it on first use.
    ///
    /// The first call initializes the presentation window, if one was
    /// configured, and sizes the buffer to it; a window that fails to
    /// initialize is dropped and the configured default size is used.
    ///
    /// # Errors
    ///
    /// - [`DisplayError::OwnershipLost`] once the controller is dead.
    /// - [`DisplayError::AllocationFailed`] if memory could not be allocated.
    /// - [`DisplayError::BufferNotAvailable`] while the client already holds
    ///   the buffer.
    pub fn try_acquire_buffer(&self) -> Result<FrameBufferDescriptor, DisplayError> {
        log::debug!("acquire_buffer");
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let result = self.check_out(inner);
        if let Err(reason) = result {
            inner
                .tracer()
                .acquire_rejected(&AcquireRejectedEvent { reason });
        }
        result
    }

    /// Checks out the render target, or `None` when none can be handed out.
    ///
    /// See [`try_acquire_buffer`](Self::try_acquire_buffer) for the reasons.
    pub fn acquire_buffer(&self) -> Option<FrameBufferDescriptor> {
        self.try_acquire_buffer().ok()
    }

    fn check_out(&self, inner: &mut Inner) -> Result<FrameBufferDescriptor, DisplayError> {
        if inner.state.is_dead() {
            log::error!("rejecting buffer request from a controller that lost the display");
            return Err(DisplayError::OwnershipLost);
        }

        if !inner.buffer.is_allocated() {
            self.allocate(inner)?;
        }

        if inner.frame_busy {
            log::error!("acquire_buffer called while the only buffer is checked out");
            return Err(DisplayError::BufferNotAvailable);
        }

        debug_assert!(inner.buffer.is_allocated(), "free buffer has no memory");
        inner.frame_busy = true;
        inner.checkouts += 1;

        let buffer = inner.buffer;
        let checkout = inner.checkouts;
        log::debug!(
            "providing display buffer {:?} as {:?}",
            buffer.mem_handle,
            buffer.buffer_id
        );
        inner.tracer().acquire(&AcquireEvent {
            buffer_id: buffer.buffer_id,
            checkout,
        });
        Ok(buffer)
    }

    fn allocate(&self, inner: &mut Inner) -> Result<(), DisplayError> {
        let display = self.config.display_id;
        let fallback = (self.config.default_width, self.config.default_height);
        let initialized = inner.window.as_mut().map(|window| {
            window
                .initialize(self.proxy(), display)
                .map(|()| (window.width(), window.height()))
        });
        let (width, height) = match initialized {
            Some(Ok(size)) => size,
            Some(Err(e)) => {
                log::warn!("presentation window unavailable, continuing without one: {e}");
                inner.window = None;
                fallback
            }
            None => fallback,
        };

        inner.buffer = self.config.descriptor(width, height);
        match inner.allocator.allocate(&inner.buffer.allocation_request()) {
            Ok(allocation) => {
                inner.buffer.attach(allocation);
                inner.frame_busy = false;
                log::debug!(
                    "allocated {width}x{height} display buffer {:?} with stride {}",
                    allocation.handle,
                    allocation.stride
                );
                let buffer_id = inner.buffer.buffer_id;
                inner.tracer().buffer_allocated(&BufferAllocatedEvent {
                    buffer_id,
                    handle: allocation.handle,
                    width,
                    height,
                    stride: allocation.stride,
                });
                Ok(())
            }
            Err(e) => {
                log::error!("error allocating {width}x{height} graphics buffer: {e}");
                if let Some(window) = inner.window.as_mut() {
                    window.shutdown();
                }
                Err(DisplayError::AllocationFailed)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Buffer return
    // -----------------------------------------------------------------------

    /// Returns the render target, presenting it according to the current
    /// visibility.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// - [`DisplayError::InvalidArgument`] if `handle` is `None` or
    ///   `buffer_id` is not the render target. The checkout is unaffected.
    /// - [`DisplayError::OwnershipLost`] once the controller is dead. The
    ///   checkout is cleared.
    /// - [`DisplayError::BufferNotAvailable`] if the buffer was not checked
    ///   out.
    /// - [`DisplayError::UnderlyingServiceError`] if the window could not
    ///   take the frame. The buffer is back with the controller regardless.
    ///
    /// Once the controller is dead every well-formed return reports
    /// `OwnershipLost`, even when no buffer was checked out.
    pub fn release_buffer(
        &self,
        buffer_id: BufferId,
        handle: Option<MemoryHandle>,
    ) -> Result<(), DisplayError> {
        log::debug!("release_buffer({buffer_id:?})");
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let result = self.take_back(inner, buffer_id, handle);
        let checkout = inner.checkouts;
        inner.tracer().buffer_returned(&ReturnEvent {
            buffer_id,
            checkout,
            status: EvsResult::from_result(&result),
        });
        result
    }

    /// Returns a descriptor previously handed out by
    /// [`acquire_buffer`](Self::acquire_buffer).
    ///
    /// # Errors
    ///
    /// As [`release_buffer`](Self::release_buffer).
    pub fn return_buffer(&self, buffer: &FrameBufferDescriptor) -> Result<(), DisplayError> {
        self.release_buffer(buffer.buffer_id, buffer.mem_handle)
    }

    fn take_back(
        &self,
        inner: &mut Inner,
        buffer_id: BufferId,
        handle: Option<MemoryHandle>,
    ) -> Result<(), DisplayError> {
        if handle.is_none() {
            log::error!("release_buffer called without a valid buffer handle");
            return Err(DisplayError::InvalidArgument);
        }
        if buffer_id != inner.buffer.buffer_id {
            log::error!("got an unrecognized frame returned: {buffer_id:?}");
            return Err(DisplayError::InvalidArgument);
        }
        if inner.state.is_dead() {
            log::warn!("frame returned after ownership was lost");
            inner.frame_busy = false;
            return Err(DisplayError::OwnershipLost);
        }
        if !inner.frame_busy {
            log::error!("a frame was returned with no outstanding frames");
            return Err(DisplayError::BufferNotAvailable);
        }

        inner.frame_busy = false;
        let event = Event::FrameReturned;
        let t = transition(inner.state, event)?;
        if t.effects.is_empty() {
            log::warn!("got a frame returned while not visible, ignoring");
        }
        self.apply(inner, event, t)
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Releases all resources and marks the controller permanently dead.
    ///
    /// Called when another party takes ownership of the display. Idempotent
    /// and safe to call concurrently with any other operation.
    pub fn force_shutdown(&self) {
        log::debug!("force_shutdown");
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let event = Event::ForceShutdown;
        let result = transition(inner.state, event).and_then(|t| self.apply(inner, event, t));
        debug_assert!(result.is_ok(), "shutdown cannot fail: {result:?}");
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    fn apply(&self, inner: &mut Inner, cause: Event, t: Transition) -> Result<(), DisplayError> {
        let from = inner.state;
        inner.state = t.next;
        if from != t.next {
            log::info!("display state {from} -> {}", t.next);
            inner.tracer().state_change(&StateChangeEvent {
                from,
                to: t.next,
                cause,
            });
        }

        let display = self.config.display_id;
        for effect in t.effects {
            match effect {
                Effect::ShowWindow => {
                    if let Some(window) = inner.window.as_mut() {
                        window.show(self.proxy(), display);
                    }
                }
                Effect::HideWindow => {
                    if let Some(window) = inner.window.as_mut() {
                        window.hide(self.proxy(), display);
                    }
                }
                Effect::PresentFrame => Self::present(inner)?,
                Effect::ReleaseResources => self.release_resources(inner),
            }
        }
        Ok(())
    }

    fn present(inner: &mut Inner) -> Result<(), DisplayError> {
        let Some(window) = inner.window.as_mut() else {
            return Ok(());
        };
        if let Err(e) = window.update_texture(&inner.buffer) {
            log::error!("failed to update the window texture: {e}");
            return Err(DisplayError::UnderlyingServiceError);
        }
        window.render();

        inner.frames_presented += 1;
        let frame_index = inner.frames_presented;
        let buffer_id = inner.buffer.buffer_id;
        inner.tracer().present(&PresentEvent {
            buffer_id,
            frame_index,
        });
        Ok(())
    }

    fn release_resources(&self, inner: &mut Inner) {
        let Some(handle) = inner.buffer.detach() else {
            return;
        };
        let outstanding = inner.frame_busy;
        if outstanding {
            log::warn!("display going down while the client still holds a buffer");
        }
        inner.allocator.free(handle);
        log::debug!("freed display buffer {handle:?}");

        if let Some(window) = inner.window.as_mut() {
            window.hide(self.proxy(), self.config.display_id);
            window.shutdown();
        }

        inner.tracer().shutdown(&ShutdownEvent {
            freed: Some(handle),
            buffer_outstanding: outstanding,
        });
    }
}

impl Drop for DisplaySurfaceController {
    fn drop(&mut self) {
        log::debug!("display controller dropped");
        self.force_shutdown();
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`DisplaySurfaceController`].
///
/// Created by [`DisplaySurfaceController::builder`].
pub struct ControllerBuilder {
    config: DisplayConfig,
    allocator: Box<dyn FrameBufferAllocator + Send>,
    window: Option<Box<dyn PresentationWindow + Send>>,
    proxy: Option<SharedProxy>,
    sink: Option<Box<dyn TraceSink + Send>>,
}

impl fmt::Debug for ControllerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerBuilder")
            .field("config", &self.config)
            .field("window", &self.window.is_some())
            .field("proxy", &self.proxy.is_some())
            .finish_non_exhaustive()
    }
}

impl ControllerBuilder {
    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: DisplayConfig) -> Self {
        self.config = config;
        self
    }

    /// Presents returned frames through `window`.
    #[must_use]
    pub fn window(mut self, window: impl PresentationWindow + Send + 'static) -> Self {
        self.window = Some(Box::new(window));
        self
    }

    /// Queries and drives the physical display through `proxy`.
    #[must_use]
    pub fn proxy(mut self, proxy: Arc<dyn DisplayProxy + Send + Sync>) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Reports controller events to `sink`.
    ///
    /// Events are only emitted when the `trace` feature is enabled.
    #[must_use]
    pub fn trace_sink(mut self, sink: impl TraceSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Builds the controller in the `NotVisible` state with no buffer
    /// allocated.
    pub fn build(self) -> DisplaySurfaceController {
        log::debug!("display controller created for {:?}", self.config.display_id);
        let buffer = self.config.default_descriptor();
        DisplaySurfaceController {
            config: self.config,
            proxy: self.proxy,
            inner: Mutex::new(Inner {
                state: VisibilityState::NotVisible,
                frame_busy: false,
                buffer,
                window: self.window,
                allocator: self.allocator,
                sink: self.sink,
                checkouts: 0,
                frames_presented: 0,
            }),
        }
    }
}
