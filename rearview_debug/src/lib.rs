// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording and pretty-printing for rearview diagnostics.
//!
//! This crate provides [`TraceSink`](rearview_core::trace::TraceSink)
//! implementations for development and tests:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — bounded in-memory event log, readable
//!   through a [`recorder::RecorderHandle`] after the sink has been handed to
//!   a controller.

mod queue;

pub mod pretty;
pub mod recorder;
