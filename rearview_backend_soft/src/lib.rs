// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software backend for rearview.
//!
//! Implements the collaborator traits from
//! [`rearview_core::backend`] without any graphics hardware:
//!
//! - [`SoftAllocator`] hands out heap blocks registered in a shared
//!   [`SoftMemory`], which is also how clients reach the pixels behind a
//!   [`MemoryHandle`](rearview_core::buffer::MemoryHandle).
//! - [`SoftWindow`] copies returned frames into an in-memory surface,
//!   optionally verifying the [`pattern`] on the way.
//! - [`SoftDisplayProxy`] answers display queries from a table of simulated
//!   panels.
//!
//! [`time::now`] reads `CLOCK_MONOTONIC` through `rustix` for present
//! timestamps.

mod allocator;
mod memory;
mod proxy;
mod window;

pub mod pattern;
pub mod time;

pub use allocator::{SoftAllocator, SoftAllocatorConfig};
pub use memory::SoftMemory;
pub use proxy::SoftDisplayProxy;
pub use window::{ScreenHandle, SoftWindow, SoftWindowConfig};
