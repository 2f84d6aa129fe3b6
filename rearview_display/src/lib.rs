// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-owner display surface controller.
//!
//! `rearview_display` arbitrates one exterior-view display between a client
//! and the rest of the system. The client checks out the display's only
//! render-target buffer, fills it, and hands it back; the controller presents
//! it when the client asked to be visible. When another party takes the
//! display, [`DisplaySurfaceController::force_shutdown`] frees everything and
//! the old client is locked out for good.
//!
//! The state machine, buffer model, and collaborator traits live in
//! [`rearview_core`]. This crate adds the locking controller that ties them
//! together.
//!
//! ```rust,ignore
//! use rearview_display::DisplaySurfaceController;
//! use rearview_core::state::VisibilityState;
//!
//! let display = DisplaySurfaceController::builder(allocator)
//!     .window(window)
//!     .build();
//! display.set_visibility_state(VisibilityState::VisibleOnNextFrame)?;
//! let buffer = display.acquire_buffer().ok_or(Error::NoBuffer)?;
//! draw(&buffer);
//! display.return_buffer(&buffer)?;
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): emits controller events to the
//!   configured [`TraceSink`](rearview_core::trace::TraceSink).

mod config;
mod controller;

pub use config::DisplayConfig;
pub use controller::{ControllerBuilder, DisplaySurfaceController};
