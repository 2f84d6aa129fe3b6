// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types and contracts for a single-owner exterior-view display.
//!
//! `rearview_core` holds everything about the display controller that does
//! not need a lock or an operating system: the buffer model, the visibility
//! state machine, the error taxonomy, and the traits that platform backends
//! implement. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! A client drives the controller through one render-target buffer:
//!
//! ```text
//!   client                       controller                    backends
//!   ──────                       ──────────                    ────────
//!   set_visibility_state ──► transition(state, Request) ──► show / hide
//!   acquire_buffer ────────► allocate on first use ───────► FrameBufferAllocator
//!        │  (writes pixels out-of-band)
//!        ▼
//!   release_buffer ────────► transition(state, FrameReturned)
//!                                 │
//!                                 └──► PresentationWindow::update_texture + render
//!
//!   other owner ───────────► force_shutdown ──► free buffer, shut window, Dead
//! ```
//!
//! **[`state`]** — [`VisibilityState`](state::VisibilityState), the
//! client-requested phase of the display.
//!
//! **[`transition`]** — The state machine as a pure function returning the
//! next state and a list of effects.
//!
//! **[`buffer`]** — The render-target descriptor, memory handles, pixel
//! formats, and usage flags.
//!
//! **[`display`]** — Display identity, self description, and the hardware
//! configuration reported by the display proxy.
//!
//! **[`error`]** — Controller and collaborator errors, plus the flat
//! [`EvsResult`](error::EvsResult) status code.
//!
//! **[`backend`]** — The allocator, presentation window, and display proxy
//! traits.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! controller instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! **[`time`]** — Monotonic timestamps for backends that stamp presented
//! frames.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod buffer;
pub mod display;
pub mod error;
pub mod state;
pub mod time;
pub mod trace;
pub mod transition;
