//! Conversions between simulated nanoseconds and seconds.

use crate::SimTime;

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Simulated nanoseconds as fractional seconds.
pub fn nanos_to_secs(nanos: SimTime) -> f64 {
    nanos as f64 / NANOS_PER_SEC as f64
}

/// Fractional seconds as simulated nanoseconds, rounded to the nearest
/// nanosecond. Negative and NaN inputs map to zero.
pub fn secs_to_nanos(secs: f64) -> SimTime {
    if secs.is_nan() || secs <= 0.0 {
        return 0;
    }
    (secs * NANOS_PER_SEC as f64).round() as SimTime
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(secs_to_nanos(0.01), 10_000_000);
        assert_eq!(nanos_to_secs(10_000_000), 0.01);
        assert_eq!(secs_to_nanos(-1.0), 0);
        assert_eq!(secs_to_nanos(f64::NAN), 0);
    }
}
