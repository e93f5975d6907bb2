//! Level and mixing math for the dynamics path.
//!
//! All conversions work in `f64` and are allocation-free, suitable for `no_std`.
//!
//! # Level Conversions
//!
//! | Function | Direction | Silence handling |
//! |----------|-----------|------------------|
//! | [`linear_to_db`] | amplitude → dB | floored at [`MIN_DECIBEL`] |
//! | [`db_to_linear`] | dB → amplitude | exact |
//! | [`power_to_db`] | mean square → dB | floored at [`MIN_DECIBEL`] |
//!
//! # Time Constants
//!
//! - [`settle_coefficient`] - one-pole coefficient that leaves `residual` of a
//!   step after `time_s` seconds (`residual^(Δt / time_s)`)

use libm::{exp, log, log10, pow};

/// Floor for every decibel value produced by this crate.
///
/// Silence and denormal levels map here instead of `-inf`, which keeps
/// envelope followers and meters well-defined when fed zeros.
pub const MIN_DECIBEL: f64 = -70.01;

/// Convert decibels to linear gain.
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear gain value (e.g., 0 dB → 1.0, -6 dB → 0.5, +6 dB → 2.0)
///
/// # Example
/// ```rust
/// use squeeze_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f64 = core::f64::consts::LN_10 / 20.0;
    exp(db * FACTOR)
}

/// Convert an amplitude to decibels, floored at [`MIN_DECIBEL`].
///
/// Sign is ignored, so raw samples can be passed directly.
///
/// # Example
/// ```rust
/// use squeeze_core::{linear_to_db, MIN_DECIBEL};
///
/// assert!((linear_to_db(1.0)).abs() < 1e-12);
/// assert!((linear_to_db(-0.1) + 20.0).abs() < 1e-9);
/// assert_eq!(linear_to_db(0.0), MIN_DECIBEL);
/// ```
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    let magnitude = linear.abs();
    if magnitude == 0.0 {
        return MIN_DECIBEL;
    }
    let db = 20.0 * log10(magnitude);
    if db < MIN_DECIBEL { MIN_DECIBEL } else { db }
}

/// Convert a mean-square (power) value to decibels, floored at [`MIN_DECIBEL`].
///
/// Equivalent to `linear_to_db(sqrt(power))` without the square root.
#[inline]
pub fn power_to_db(power: f64) -> f64 {
    if power <= 0.0 {
        return MIN_DECIBEL;
    }
    let db = 10.0 * log10(power);
    if db < MIN_DECIBEL { MIN_DECIBEL } else { db }
}

/// One-pole coefficient reaching `1 - residual` of a step in `time_s` seconds.
///
/// For a smoother `y += (1 - c) * (x - y)`, after `time_s * sample_rate`
/// samples the remaining error is `residual` of the initial step.
/// A non-positive or `NaN` time yields `0.0` (instantaneous response).
///
/// # Arguments
/// * `residual` - Fraction of the step left after `time_s` (e.g. `0.05` for 95%)
/// * `time_s` - Settle time in seconds
/// * `sample_rate` - Sample rate in Hz
///
/// # Example
/// ```rust
/// use squeeze_core::settle_coefficient;
///
/// let c = settle_coefficient(0.05, 0.010, 1000.0);
/// // 10 samples at 1 kHz leave 5% of the step
/// assert!((libm::pow(c, 10.0) - 0.05).abs() < 1e-12);
/// assert_eq!(settle_coefficient(0.05, 0.0, 48000.0), 0.0);
/// ```
#[inline]
pub fn settle_coefficient(residual: f64, time_s: f64, sample_rate: f64) -> f64 {
    if time_s.is_nan() || time_s <= 0.0 {
        return 0.0;
    }
    pow(residual, 1.0 / (time_s * sample_rate))
}

/// Natural-log form of [`settle_coefficient`], `exp(ln(residual) / (t·fs))`.
///
/// Used where tables of many coefficients are generated at once.
#[inline]
pub fn settle_coefficient_exp(residual: f64, time_s: f64, sample_rate: f64) -> f64 {
    if time_s.is_nan() || time_s <= 0.0 {
        return 0.0;
    }
    exp(log(residual) / (time_s * sample_rate))
}

/// Clamp `value` to `min..=max`, returning `fallback` for `NaN`.
///
/// `f64::clamp` passes `NaN` through; setters use this so a bad value never
/// reaches filter or envelope state.
///
/// ```rust
/// use squeeze_core::clamp_or;
///
/// assert_eq!(clamp_or(30.0, 1.0, 20.0, 4.0), 20.0);
/// assert_eq!(clamp_or(f64::NAN, 1.0, 20.0, 4.0), 4.0);
/// ```
#[inline]
pub fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Flush very small values to zero.
///
/// Keeps IIR history out of the denormal range during long silences.
#[inline]
pub fn flush_denormal(x: f64) -> f64 {
    if x.abs() < 1e-30 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals.
///
/// Equivalent to `dry * (1 - mix) + wet * mix` but uses one fewer multiply:
/// `dry + (wet - dry) * mix`. Both endpoints are exact: `mix = 0.0`
/// returns `dry` and `mix = 1.0` returns `wet`.
///
/// # Arguments
///
/// * `dry` - Unprocessed signal
/// * `wet` - Processed signal
/// * `mix` - Blend factor in \[0.0, 1.0\]: 0.0 = all dry, 1.0 = all wet
#[inline]
pub fn wet_dry_mix(dry: f64, wet: f64, mix: f64) -> f64 {
    if mix <= 0.0 {
        dry
    } else if mix >= 1.0 {
        wet
    } else {
        dry + (wet - dry) * mix
    }
}
