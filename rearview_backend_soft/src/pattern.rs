// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame test pattern.
//!
//! Every pixel `(row, col)` holds `0xFF` in its most and least significant
//! bytes, a vertical gradient (`row & 0xFF`) in the second byte, and a
//! horizontal gradient (`col & 0xFF`) in the third. The low byte of pixel
//! `(0, 0)` instead carries a per-frame signature, so a frame that is handed
//! over twice without being redrawn can be told apart from a fresh one.
//!
//! Padding pixels beyond the row width are never inspected.

use rearview_core::buffer::FrameBufferDescriptor;
use rearview_core::error::WindowError;
use thiserror::Error;

/// Mismatch found by [`check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pixel slice is smaller than `stride * height`.
    #[error("pixel buffer holds {len} pixels, geometry needs {needed}")]
    Truncated {
        /// Pixels available.
        len: usize,
        /// Pixels the geometry needs.
        needed: usize,
    },
    /// A pixel does not hold its expected value.
    #[error("pixel ({row}, {col}) is {found:#010x}, expected {expected:#010x}")]
    Mismatch {
        /// Row of the first bad pixel.
        row: u32,
        /// Column of the first bad pixel.
        col: u32,
        /// Value the pattern requires.
        expected: u32,
        /// Value found.
        found: u32,
    },
}

impl From<PatternError> for WindowError {
    fn from(e: PatternError) -> Self {
        match e {
            PatternError::Truncated { .. } => Self::InvalidBuffer,
            PatternError::Mismatch { .. } => Self::BadFrame,
        }
    }
}

/// The pattern value of pixel `(row, col)`.
#[inline]
#[must_use]
pub const fn expected_pixel(row: u32, col: u32) -> u32 {
    0xFF00_00FF | ((row & 0xFF) << 8) | ((col & 0xFF) << 16)
}

fn needed_len(buffer: &FrameBufferDescriptor) -> usize {
    buffer.stride as usize * buffer.height as usize
}

/// Fills `pixels` with the test pattern for `buffer`'s geometry, stamping
/// `signature` into the first pixel.
///
/// # Errors
///
/// [`PatternError::Truncated`] if `pixels` cannot hold the geometry.
pub fn write(
    buffer: &FrameBufferDescriptor,
    pixels: &mut [u32],
    signature: u8,
) -> Result<(), PatternError> {
    let needed = needed_len(buffer);
    if pixels.len() < needed || buffer.stride < buffer.width {
        return Err(PatternError::Truncated {
            len: pixels.len(),
            needed,
        });
    }
    if needed == 0 {
        return Ok(());
    }

    for (row, line) in (0..buffer.height).zip(pixels.chunks_exact_mut(buffer.stride as usize)) {
        for (col, pixel) in (0..buffer.width).zip(line.iter_mut()) {
            *pixel = expected_pixel(row, col);
        }
    }
    pixels[0] = (pixels[0] & !0xFF) | u32::from(signature);
    Ok(())
}

/// Verifies the test pattern, returning the frame signature.
///
/// # Errors
///
/// [`PatternError::Truncated`] if `pixels` cannot hold the geometry, or
/// [`PatternError::Mismatch`] at the first wrong pixel in row-major order.
pub fn check(buffer: &FrameBufferDescriptor, pixels: &[u32]) -> Result<u8, PatternError> {
    let needed = needed_len(buffer);
    if pixels.len() < needed || buffer.stride < buffer.width || needed == 0 {
        return Err(PatternError::Truncated {
            len: pixels.len(),
            needed,
        });
    }

    for (row, line) in (0..buffer.height).zip(pixels.chunks_exact(buffer.stride as usize)) {
        for (col, &found) in (0..buffer.width).zip(line) {
            let expected = expected_pixel(row, col);
            let matches = if (row | col) == 0 {
                (found & !0xFF) == (expected & !0xFF)
            } else {
                found == expected
            };
            if !matches {
                return Err(PatternError::Mismatch {
                    row,
                    col,
                    expected,
                    found,
                });
            }
        }
    }
    Ok(pixels[0].to_le_bytes()[0])
}

/// Checks successive frames for the pattern and for repeated signatures.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameChecker {
    last_signature: Option<u8>,
}

impl FrameChecker {
    /// Creates a checker that has seen no frames.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_signature: None,
        }
    }

    /// Forgets the previous frame.
    pub fn reset(&mut self) {
        self.last_signature = None;
    }

    /// Checks one frame.
    ///
    /// # Errors
    ///
    /// [`WindowError::InvalidBuffer`] or [`WindowError::BadFrame`] if the
    /// pattern is wrong, [`WindowError::StaleFrame`] if the signature repeats
    /// the previous frame's.
    pub fn check(
        &mut self,
        buffer: &FrameBufferDescriptor,
        pixels: &[u32],
    ) -> Result<(), WindowError> {
        let signature = check(buffer, pixels).inspect_err(|e| {
            log::error!("pixel check mismatch in frame buffer: {e}");
        })?;
        if self.last_signature == Some(signature) {
            log::error!("duplicate, likely stale frame buffer detected");
            return Err(WindowError::StaleFrame { signature });
        }
        self.last_signature = Some(signature);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rearview_core::buffer::{BufferId, BufferUsage, MemoryHandle, PixelFormat};

    fn buffer(width: u32, height: u32, stride: u32) -> FrameBufferDescriptor {
        let mut desc = FrameBufferDescriptor::new(
            width,
            height,
            PixelFormat::Rgba8888,
            BufferUsage::SW_WRITE_OFTEN,
            BufferId(1),
        );
        desc.attach(rearview_core::buffer::Allocation {
            handle: MemoryHandle::new(1).unwrap(),
            stride,
        });
        desc
    }

    #[test]
    fn expected_pixel_layout() {
        assert_eq!(expected_pixel(0, 0), 0xFF00_00FF);
        assert_eq!(expected_pixel(1, 2), 0xFF02_01FF);
        assert_eq!(expected_pixel(0x1AB, 0x2CD), 0xFFCD_ABFF);
    }

    #[test]
    fn written_pattern_checks_out() {
        let desc = buffer(300, 4, 304);
        let mut pixels = vec![0; 304 * 4];
        write(&desc, &mut pixels, 0x5A).unwrap();
        assert_eq!(check(&desc, &pixels), Ok(0x5A));
        // Padding is left alone.
        assert_eq!(pixels[300], 0);
    }

    #[test]
    fn corrupted_pixel_is_reported() {
        let desc = buffer(8, 8, 8);
        let mut pixels = vec![0; 64];
        write(&desc, &mut pixels, 1).unwrap();
        pixels[8 * 3 + 5] = 0;
        assert_eq!(
            check(&desc, &pixels),
            Err(PatternError::Mismatch {
                row: 3,
                col: 5,
                expected: expected_pixel(3, 5),
                found: 0,
            })
        );
    }

    #[test]
    fn short_slice_is_truncated() {
        let desc = buffer(8, 8, 8);
        let pixels = vec![0; 10];
        assert_eq!(
            check(&desc, &pixels),
            Err(PatternError::Truncated { len: 10, needed: 64 })
        );
    }

    #[test]
    fn errors_describe_the_bad_pixel() {
        let desc = buffer(8, 8, 8);
        let mut pixels = vec![0; 64];
        write(&desc, &mut pixels, 1).unwrap();
        pixels[8 * 2 + 1] = 0x1234;
        let err = check(&desc, &pixels).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "pixel (2, 1) is 0x00001234, expected {:#010x}",
                expected_pixel(2, 1)
            )
        );
        assert_eq!(
            check(&desc, &pixels[..10]).unwrap_err().to_string(),
            "pixel buffer holds 10 pixels, geometry needs 64"
        );
    }

    #[test]
    fn repeated_signature_is_stale() {
        let desc = buffer(4, 4, 4);
        let mut pixels = vec![0; 16];
        let mut checker = FrameChecker::new();

        write(&desc, &mut pixels, 1).unwrap();
        checker.check(&desc, &pixels).unwrap();
        assert_eq!(
            checker.check(&desc, &pixels),
            Err(WindowError::StaleFrame { signature: 1 })
        );

        write(&desc, &mut pixels, 2).unwrap();
        checker.check(&desc, &pixels).unwrap();

        checker.reset();
        checker.check(&desc, &pixels).unwrap();
    }

    #[test]
    fn blank_frame_is_bad() {
        let desc = buffer(4, 4, 4);
        let pixels = vec![0; 16];
        assert_eq!(
            FrameChecker::new().check(&desc, &pixels),
            Err(WindowError::BadFrame)
        );
    }
}
