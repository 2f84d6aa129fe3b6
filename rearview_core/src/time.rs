// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time.
//!
//! Core never reads a clock. Backends stamp events with [`HostTime`] values
//! read from their own monotonic source.

use core::fmt;

/// A point on the host's monotonic clock, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({}ns)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::HostTime;
    use alloc::format;

    #[test]
    fn orders_by_nanoseconds() {
        assert!(HostTime(5) < HostTime(6));
        assert_eq!(format!("{:?}", HostTime(42)), "HostTime(42ns)");
    }
}
