// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy and client status codes.
//!
//! [`DisplayError`] is what controller operations return. Collaborator
//! failures are described by [`AllocationError`] and [`WindowError`]; they
//! stay inside the controller unless they escalate into a
//! [`DisplayError`].
//!
//! [`EvsResult`] is the flat status code an RPC shim sends back to a client,
//! paired with whatever payload the call produces.

use thiserror::Error;

/// Failure of a display controller operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum DisplayError {
    /// Malformed state value, null memory handle, or unrecognized buffer id.
    #[error("invalid argument")]
    InvalidArgument,
    /// Another owner took over the display; this controller is dead.
    #[error("ownership of the display was lost")]
    OwnershipLost,
    /// No buffer is checked out, or the only buffer is already checked out.
    #[error("no buffer available")]
    BufferNotAvailable,
    /// The presentation window failed to take the returned frame.
    #[error("underlying display service failed")]
    UnderlyingServiceError,
    /// Graphics memory for the render target could not be allocated.
    ///
    /// The controller stays usable; a later acquire retries the allocation.
    #[error("render target allocation failed")]
    AllocationFailed,
}

/// Failure reported by a
/// [`FrameBufferAllocator`](crate::backend::FrameBufferAllocator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum AllocationError {
    /// The request exceeds the memory the allocator can hand out.
    #[error("out of graphics memory ({requested} bytes requested)")]
    OutOfMemory {
        /// Bytes the request would need.
        requested: usize,
    },
    /// Width or height is zero or otherwise unusable.
    #[error("unsupported buffer geometry {width}x{height}")]
    InvalidGeometry {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The allocator service returned an error status.
    #[error("allocator returned status {0}")]
    Status(i32),
}

/// Failure reported by a
/// [`PresentationWindow`](crate::backend::PresentationWindow).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum WindowError {
    /// The window could not bind to the physical display.
    #[error("presentation window failed to initialize")]
    InitializationFailed,
    /// The window has not been initialized, or was shut down.
    #[error("presentation window is not initialized")]
    NotInitialized,
    /// The buffer handed to the window has no memory or unknown memory.
    #[error("buffer memory is not accessible to the window")]
    InvalidBuffer,
    /// The frame content failed validation.
    #[error("frame content check failed")]
    BadFrame,
    /// The same frame was handed over twice without being rewritten.
    #[error("stale frame: signature {signature:#04x} seen twice")]
    StaleFrame {
        /// The repeated frame signature.
        signature: u8,
    },
}

/// Status code returned to clients alongside a call's payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EvsResult {
    /// Success.
    #[default]
    Ok = 0,
    /// See [`DisplayError::InvalidArgument`].
    InvalidArg = 1,
    /// A stream is already running. Not produced by the display controller.
    StreamAlreadyRunning = 2,
    /// See [`DisplayError::BufferNotAvailable`].
    BufferNotAvailable = 3,
    /// See [`DisplayError::OwnershipLost`].
    OwnershipLost = 4,
    /// See [`DisplayError::UnderlyingServiceError`].
    UnderlyingServiceError = 5,
}

impl EvsResult {
    /// Flattens an operation result into a status code.
    #[must_use]
    pub fn from_result<T>(result: &Result<T, DisplayError>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => Self::from(*e),
        }
    }
}

impl From<DisplayError> for EvsResult {
    fn from(e: DisplayError) -> Self {
        match e {
            DisplayError::InvalidArgument => Self::InvalidArg,
            DisplayError::OwnershipLost => Self::OwnershipLost,
            // Allocation failures surface as an empty buffer, which clients
            // read the same way as "nothing available".
            DisplayError::BufferNotAvailable | DisplayError::AllocationFailed => {
                Self::BufferNotAvailable
            }
            DisplayError::UnderlyingServiceError => Self::UnderlyingServiceError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayError, EvsResult};

    #[test]
    fn status_codes_match_wire_values() {
        assert_eq!(EvsResult::Ok as u32, 0);
        assert_eq!(EvsResult::InvalidArg as u32, 1);
        assert_eq!(EvsResult::BufferNotAvailable as u32, 3);
        assert_eq!(EvsResult::OwnershipLost as u32, 4);
        assert_eq!(EvsResult::UnderlyingServiceError as u32, 5);
    }

    #[test]
    fn errors_flatten_to_status_codes() {
        assert_eq!(
            EvsResult::from(DisplayError::InvalidArgument),
            EvsResult::InvalidArg
        );
        assert_eq!(
            EvsResult::from(DisplayError::AllocationFailed),
            EvsResult::BufferNotAvailable
        );
        assert_eq!(EvsResult::from_result(&Ok::<(), _>(())), EvsResult::Ok);
        assert_eq!(
            EvsResult::from_result(&Err::<(), _>(DisplayError::OwnershipLost)),
            EvsResult::OwnershipLost
        );
    }
}
