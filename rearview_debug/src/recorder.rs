// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event to a
//! bounded log shared with a [`RecorderHandle`]. Once the log is full the
//! oldest events are dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use rearview_core::trace::{
    AcquireEvent, AcquireRejectedEvent, BufferAllocatedEvent, PresentEvent, ReturnEvent,
    ShutdownEvent, StateChangeEvent, TraceSink,
};

use crate::queue::BoundedLog;

/// A recorded controller event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`StateChangeEvent`].
    StateChange(StateChangeEvent),
    /// A [`BufferAllocatedEvent`].
    BufferAllocated(BufferAllocatedEvent),
    /// An [`AcquireEvent`].
    Acquire(AcquireEvent),
    /// An [`AcquireRejectedEvent`].
    AcquireRejected(AcquireRejectedEvent),
    /// A [`ReturnEvent`].
    Return(ReturnEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`ShutdownEvent`].
    Shutdown(ShutdownEvent),
}

impl RecordedEvent {
    /// Short snake-case name of the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StateChange(_) => "state_change",
            Self::BufferAllocated(_) => "buffer_allocated",
            Self::Acquire(_) => "acquire",
            Self::AcquireRejected(_) => "acquire_rejected",
            Self::Return(_) => "return",
            Self::Present(_) => "present",
            Self::Shutdown(_) => "shutdown",
        }
    }
}

type SharedLog = Arc<Mutex<BoundedLog<RecordedEvent>>>;

/// A [`TraceSink`] that records events into a bounded log.
#[derive(Debug)]
pub struct RecorderSink {
    log: SharedLog,
}

/// Read side of a [`RecorderSink`].
#[derive(Clone, Debug)]
pub struct RecorderHandle {
    log: SharedLog,
}

impl RecorderSink {
    /// Default number of events kept.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Creates a sink keeping the last [`DEFAULT_CAPACITY`] events.
    ///
    /// [`DEFAULT_CAPACITY`]: Self::DEFAULT_CAPACITY
    #[must_use]
    pub fn new() -> (Self, RecorderHandle) {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a sink keeping the last `capacity` events (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, RecorderHandle) {
        let log = Arc::new(Mutex::new(BoundedLog::with_capacity(capacity)));
        (
            Self {
                log: Arc::clone(&log),
            },
            RecorderHandle { log },
        )
    }

    fn record(&self, event: RecordedEvent) {
        self.log.lock().push(event);
    }
}

impl RecorderHandle {
    /// Copies out the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.log.lock().snapshot()
    }

    /// Removes and returns the recorded events, oldest first.
    pub fn take(&self) -> Vec<RecordedEvent> {
        self.log.lock().drain()
    }

    /// Number of events dropped because the log was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.log.lock().dropped()
    }
}

impl TraceSink for RecorderSink {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.record(RecordedEvent::StateChange(*e));
    }

    fn on_buffer_allocated(&mut self, e: &BufferAllocatedEvent) {
        self.record(RecordedEvent::BufferAllocated(*e));
    }

    fn on_acquire(&mut self, e: &AcquireEvent) {
        self.record(RecordedEvent::Acquire(*e));
    }

    fn on_acquire_rejected(&mut self, e: &AcquireRejectedEvent) {
        self.record(RecordedEvent::AcquireRejected(*e));
    }

    fn on_return(&mut self, e: &ReturnEvent) {
        self.record(RecordedEvent::Return(*e));
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.record(RecordedEvent::Present(*e));
    }

    fn on_shutdown(&mut self, e: &ShutdownEvent) {
        self.record(RecordedEvent::Shutdown(*e));
    }
}
