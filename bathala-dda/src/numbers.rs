//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a f64 into `[min, max]`, mapping NaN to `min`.
#[must_use]
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Replace negative or non-finite values with zero.
#[must_use]
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Convert u32 to f64 in a single location.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    cast::<u32, f64>(value).unwrap_or(0.0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Divide two counts, treating a zero denominator as one.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    u32_to_f64(numerator) / u32_to_f64(denominator.max(1))
}
