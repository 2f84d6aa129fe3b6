// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation for the display controller.
//!
//! This module provides a [`TraceSink`] trait with one method per controller
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::buffer::{BufferId, MemoryHandle};
use crate::error::{DisplayError, EvsResult};
use crate::state::VisibilityState;
use crate::transition::Event;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted whenever the recorded visibility state changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChangeEvent {
    /// State before the transition.
    pub from: VisibilityState,
    /// State after the transition.
    pub to: VisibilityState,
    /// What caused it.
    pub cause: Event,
}

/// Emitted after the render target's memory is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferAllocatedEvent {
    /// Identity of the buffer.
    pub buffer_id: BufferId,
    /// Handle of the new memory.
    pub handle: MemoryHandle,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row stride in pixels.
    pub stride: u32,
}

/// Emitted when the buffer is checked out to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireEvent {
    /// Identity of the buffer.
    pub buffer_id: BufferId,
    /// Monotonic checkout counter, starting at 1.
    pub checkout: u64,
}

/// Emitted when an acquire produces an empty buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireRejectedEvent {
    /// Why no buffer was handed out.
    pub reason: DisplayError,
}

/// Emitted for every buffer return, successful or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReturnEvent {
    /// Buffer id the client passed in.
    pub buffer_id: BufferId,
    /// Checkout counter at the time of return.
    pub checkout: u64,
    /// Status reported to the client.
    pub status: EvsResult,
}

/// Emitted after a returned frame was rendered to the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentEvent {
    /// Identity of the buffer.
    pub buffer_id: BufferId,
    /// Count of presented frames, starting at 1.
    pub frame_index: u64,
}

/// Emitted when the controller releases its resources on entering `Dead`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownEvent {
    /// Memory that was freed, if any was allocated.
    pub freed: Option<MemoryHandle>,
    /// Whether the client still held the buffer.
    pub buffer_outstanding: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the display controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the recorded visibility state changes.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called after the render target is allocated.
    fn on_buffer_allocated(&mut self, e: &BufferAllocatedEvent) {
        _ = e;
    }

    /// Called when the buffer is checked out.
    fn on_acquire(&mut self, e: &AcquireEvent) {
        _ = e;
    }

    /// Called when an acquire is answered with an empty buffer.
    fn on_acquire_rejected(&mut self, e: &AcquireRejectedEvent) {
        _ = e;
    }

    /// Called for every buffer return.
    fn on_return(&mut self, e: &ReturnEvent) {
        _ = e;
    }

    /// Called after a frame reaches the screen.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called when resources are released on entering `Dead`.
    fn on_shutdown(&mut self, e: &ShutdownEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to `sink` when present.
    #[inline]
    #[must_use]
    pub fn new(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::new(None)
    }

    /// Emits a [`StateChangeEvent`].
    #[inline]
    pub fn state_change(&mut self, e: &StateChangeEvent) {
        emit!(self, on_state_change, e);
    }

    /// Emits a [`BufferAllocatedEvent`].
    #[inline]
    pub fn buffer_allocated(&mut self, e: &BufferAllocatedEvent) {
        emit!(self, on_buffer_allocated, e);
    }

    /// Emits an [`AcquireEvent`].
    #[inline]
    pub fn acquire(&mut self, e: &AcquireEvent) {
        emit!(self, on_acquire, e);
    }

    /// Emits an [`AcquireRejectedEvent`].
    #[inline]
    pub fn acquire_rejected(&mut self, e: &AcquireRejectedEvent) {
        emit!(self, on_acquire_rejected, e);
    }

    /// Emits a [`ReturnEvent`].
    #[inline]
    pub fn buffer_returned(&mut self, e: &ReturnEvent) {
        emit!(self, on_return, e);
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        emit!(self, on_present, e);
    }

    /// Emits a [`ShutdownEvent`].
    #[inline]
    pub fn shutdown(&mut self, e: &ShutdownEvent) {
        emit!(self, on_shutdown, e);
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        presents: u32,
        shutdowns: u32,
    }

    impl TraceSink for Counting {
        fn on_present(&mut self, _: &PresentEvent) {
            self.presents += 1;
        }

        fn on_shutdown(&mut self, _: &ShutdownEvent) {
            self.shutdowns += 1;
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = Counting::default();
        {
            let mut tracer = Tracer::new(Some(&mut sink));
            tracer.present(&PresentEvent {
                buffer_id: BufferId(1),
                frame_index: 1,
            });
            tracer.shutdown(&ShutdownEvent {
                freed: None,
                buffer_outstanding: false,
            });
            // Unhandled events fall through to the no-op defaults.
            tracer.acquire(&AcquireEvent {
                buffer_id: BufferId(1),
                checkout: 1,
            });
        }
        assert_eq!(sink.presents, 1);
        assert_eq!(sink.shutdowns, 1);
    }

    #[test]
    fn empty_tracer_is_silent() {
        let mut tracer = Tracer::none();
        tracer.acquire_rejected(&AcquireRejectedEvent {
            reason: DisplayError::BufferNotAvailable,
        });

        let mut noop = NoopSink;
        Tracer::new(Some(&mut noop)).state_change(&StateChangeEvent {
            from: VisibilityState::NotVisible,
            to: VisibilityState::Dead,
            cause: Event::ForceShutdown,
        });
    }
}
