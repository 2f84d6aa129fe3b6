// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client-requested visibility phases of the display surface.

use core::fmt;

use crate::error::DisplayError;

/// The visibility phase most recently requested for the display.
///
/// This is the *requested* state. It may run ahead of what is physically on
/// screen: `VisibleOnNextFrame` only becomes `Visible` once the client hands
/// back a frame. The controller never changes the state on its own initiative
/// except when ownership of the display is lost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityState {
    /// Nothing is shown. Initial state.
    #[default]
    NotVisible,
    /// The display turns visible when the next frame is returned.
    VisibleOnNextFrame,
    /// Returned frames are presented on screen.
    Visible,
    /// Ownership of the display was lost. Terminal.
    Dead,
}

impl VisibilityState {
    /// Number of defined states. Raw values at or above this are invalid.
    pub const COUNT: u32 = 4;

    /// Returns the wire value of this state.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::NotVisible => 0,
            Self::VisibleOnNextFrame => 1,
            Self::Visible => 2,
            Self::Dead => 3,
        }
    }

    /// Returns `true` for the terminal [`Dead`](Self::Dead) state.
    #[must_use]
    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Short lowercase label used in log and trace output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotVisible => "not-visible",
            Self::VisibleOnNextFrame => "visible-on-next-frame",
            Self::Visible => "visible",
            Self::Dead => "dead",
        }
    }
}

impl TryFrom<u32> for VisibilityState {
    type Error = DisplayError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::NotVisible),
            1 => Ok(Self::VisibleOnNextFrame),
            2 => Ok(Self::Visible),
            3 => Ok(Self::Dead),
            _ => Err(DisplayError::InvalidArgument),
        }
    }
}

impl From<VisibilityState> for u32 {
    fn from(state: VisibilityState) -> Self {
        state.to_raw()
    }
}

impl fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
