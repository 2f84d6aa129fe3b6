// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display identification and self description.
//!
//! [`DisplayId`] is a lightweight handle naming one physical display known to
//! the [`DisplayProxy`](crate::backend::DisplayProxy). Core code passes it
//! through without interpreting the value.

use alloc::string::String;
use core::fmt;

/// Identifies a physical display owned by the display proxy service.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DisplayId(pub u64);

impl fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

/// Static identity and capability information reported to clients.
///
/// Built once when the controller is constructed and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DisplayDesc {
    /// Human-readable identifier of the display.
    pub display_id: String,
    /// Opaque vendor-specific flags.
    pub vendor_flags: u32,
}

impl Default for DisplayDesc {
    fn default() -> Self {
        Self {
            display_id: String::from("Mock Display"),
            vendor_flags: 3870,
        }
    }
}

/// Rotation of the physical panel relative to its native orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Native orientation.
    #[default]
    Deg0,
    /// Rotated 90 degrees clockwise.
    Deg90,
    /// Rotated 180 degrees.
    Deg180,
    /// Rotated 270 degrees clockwise.
    Deg270,
}

/// Active mode of a physical display as reported by the display proxy.
///
/// The default value is the "null" configuration reported when no proxy is
/// available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HwDisplayConfig {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Refresh interval in nanoseconds, if known.
    pub refresh_interval_nanos: Option<u64>,
}

/// Runtime state of a physical display as reported by the display proxy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HwDisplayState {
    /// Whether the panel is powered on.
    pub powered: bool,
    /// Current panel rotation.
    pub rotation: Rotation,
}
