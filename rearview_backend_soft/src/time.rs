// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software backend host clock reads.

use rearview_core::time::HostTime;
use rustix::time::{ClockId, Timespec, clock_gettime};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Returns the current `CLOCK_MONOTONIC` time in nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    timespec_to_host_time(clock_gettime(ClockId::Monotonic))
}

fn timespec_to_host_time(timespec: Timespec) -> HostTime {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);

    let ticks = u128::from(seconds)
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(u128::from(nanos));
    HostTime(u64::try_from(ticks).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_does_not_go_backwards() {
        let a = now();
        let b = now();
        assert!(b >= a);
    }

    #[test]
    fn negative_fields_clamp_to_zero() {
        let t = timespec_to_host_time(Timespec {
            tv_sec: -3,
            tv_nsec: -1,
        });
        assert_eq!(t, HostTime(0));
    }

    #[test]
    fn seconds_and_nanos_combine() {
        let t = timespec_to_host_time(Timespec {
            tv_sec: 2,
            tv_nsec: 5,
        });
        assert_eq!(t, HostTime(2_000_000_005));
    }
}
