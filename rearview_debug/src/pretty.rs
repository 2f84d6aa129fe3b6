// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use rearview_core::transition::Event;
use rearview_core::trace::{
    AcquireEvent, AcquireRejectedEvent, BufferAllocatedEvent, PresentEvent, ReturnEvent,
    ShutdownEvent, StateChangeEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn cause_name(cause: Event) -> &'static str {
    match cause {
        Event::Request(_) => "request",
        Event::FrameReturned => "frame",
        Event::ForceShutdown => "shutdown",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] {} -> {} ({})",
            e.from,
            e.to,
            cause_name(e.cause),
        );
    }

    fn on_buffer_allocated(&mut self, e: &BufferAllocatedEvent) {
        let _ = writeln!(
            self.writer,
            "[alloc] buffer={:#x} {}x{} stride={} handle={:?}",
            e.buffer_id.0, e.width, e.height, e.stride, e.handle,
        );
    }

    fn on_acquire(&mut self, e: &AcquireEvent) {
        let _ = writeln!(
            self.writer,
            "[acquire] buffer={:#x} checkout={}",
            e.buffer_id.0, e.checkout,
        );
    }

    fn on_acquire_rejected(&mut self, e: &AcquireRejectedEvent) {
        let _ = writeln!(self.writer, "[acquire] REJECTED: {}", e.reason);
    }

    fn on_return(&mut self, e: &ReturnEvent) {
        let _ = writeln!(
            self.writer,
            "[return] buffer={:#x} checkout={} status={:?}",
            e.buffer_id.0, e.checkout, e.status,
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        let _ = writeln!(
            self.writer,
            "[present] buffer={:#x} frame={}",
            e.buffer_id.0, e.frame_index,
        );
    }

    fn on_shutdown(&mut self, e: &ShutdownEvent) {
        let held = if e.buffer_outstanding {
            "HELD"
        } else {
            "returned"
        };
        let _ = writeln!(
            self.writer,
            "[shutdown] freed={:?} buffer={held}",
            e.freed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rearview_core::buffer::{BufferId, MemoryHandle};
    use rearview_core::error::{DisplayError, EvsResult};
    use rearview_core::state::VisibilityState;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn state_change_line() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_state_change(&StateChangeEvent {
            from: VisibilityState::VisibleOnNextFrame,
            to: VisibilityState::Visible,
            cause: Event::FrameReturned,
        });
        let output = output(sink);
        assert!(output.starts_with("[state]"), "got: {output}");
        assert!(output.contains("(frame)"), "got: {output}");
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_acquire_rejected(&AcquireRejectedEvent {
            reason: DisplayError::OwnershipLost,
        });
        sink.on_return(&ReturnEvent {
            buffer_id: BufferId(0x3870),
            checkout: 2,
            status: EvsResult::OwnershipLost,
        });
        sink.on_shutdown(&ShutdownEvent {
            freed: MemoryHandle::new(5),
            buffer_outstanding: true,
        });
        let output = output(sink);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3, "got: {output}");
        assert!(lines[1].contains("buffer=0x3870"), "got: {output}");
        assert!(lines[2].contains("HELD"), "got: {output}");
    }
}
