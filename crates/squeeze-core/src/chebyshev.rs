//! Even-order Chebyshev low/high-pass filter as a cascade of biquads.
//!
//! Pole placement follows the classic recipe: poles on the unit circle,
//! warped onto an ellipse for the requested pass-band ripple, mapped to the
//! z-plane with a bilinear transform at a normalised cutoff, then moved to the
//! target cutoff with an LP→LP or LP→HP spectral transform. Every stage is
//! normalised to unity gain at DC (low-pass) or Nyquist (high-pass).
//!
//! A ripple of `0.0` gives a Butterworth response.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use core::f64::consts::PI;
use libm::{cos, cosh, log, sin, sinh, sqrt, tan};

use crate::biquad::{BiquadCoefficients, BiquadFilter};

/// Largest supported pass-band ripple in percent.
pub const MAX_RIPPLE_PERCENT: f64 = 29.0;

/// Largest supported pole count.
pub const MAX_POLES: usize = 20;

/// Designs the biquad for pole pair `pole_pair` (1-based) of an
/// `poles`-pole Chebyshev filter.
///
/// `relative_cutoff` is `cutoff / sample_rate`, in `(0.0, 0.5)`.
pub fn stage_coefficients(
    relative_cutoff: f64,
    is_high_pass: bool,
    percent_ripple: f64,
    poles: usize,
    pole_pair: usize,
) -> BiquadCoefficients {
    let np = poles as f64;
    let angle = PI / (np * 2.0) + (pole_pair as f64 - 1.0) * PI / np;
    let mut rp = -cos(angle);
    let mut ip = sin(angle);

    // circle -> ellipse
    if percent_ripple > 0.0 {
        let es = sqrt((100.0 / (100.0 - percent_ripple)).powi(2) - 1.0);
        let vx = (1.0 / np) * log(1.0 / es + sqrt(1.0 / (es * es) + 1.0));
        let kx = (1.0 / np) * log(1.0 / es + sqrt(1.0 / (es * es) - 1.0));
        let kx = cosh(kx);
        rp *= sinh(vx) / kx;
        ip *= cosh(vx) / kx;
    }

    // s-domain -> z-domain
    let t = 2.0 * tan(0.5);
    let w = 2.0 * PI * relative_cutoff;
    let m = rp * rp + ip * ip;
    let d = 4.0 - 4.0 * rp * t + m * t * t;
    let x0 = t * t / d;
    let x1 = 2.0 * t * t / d;
    let x2 = t * t / d;
    let y1 = (8.0 - 2.0 * m * t * t) / d;
    let y2 = (-4.0 - 4.0 * rp * t - m * t * t) / d;

    let k = if is_high_pass {
        -cos(w / 2.0 + 0.5) / cos(w / 2.0 - 0.5)
    } else {
        sin(0.5 - w / 2.0) / sin(0.5 + w / 2.0)
    };
    let k2 = k * k;

    let d = 1.0 + y1 * k - y2 * k2;
    let mut a0 = (x0 - x1 * k + x2 * k2) / d;
    let mut a1 = (-2.0 * x0 * k + x1 + x1 * k2 - 2.0 * x2 * k) / d;
    let mut a2 = (x0 * k2 - x1 * k + x2) / d;
    // recursion taps, added to the output
    let mut r1 = (2.0 * k + y1 + y1 * k2 - 2.0 * y2 * k) / d;
    let r2 = (-k2 - y1 * k + y2) / d;

    if is_high_pass {
        a1 = -a1;
        r1 = -r1;
    }

    let (sa, sb) = if is_high_pass {
        (a0 - a1 + a2, -r1 + r2)
    } else {
        (a0 + a1 + a2, r1 + r2)
    };
    let gain = sa / (1.0 - sb);
    a0 /= gain;
    a1 /= gain;
    a2 /= gain;

    BiquadCoefficients::new(a0, a1, a2, -r1, -r2)
}

/// Mono Chebyshev filter built from `poles / 2` cascaded biquads.
///
/// # Example
///
/// ```rust
/// use squeeze_core::ChebyshevFilter;
///
/// // 4-pole low-pass at 0.1 * fs with 0.5% ripple
/// let mut filter = ChebyshevFilter::new(0.1, false, 0.5, 4);
/// let mut y = 0.0;
/// for _ in 0..2000 {
///     y = filter.filter_sample(1.0);
/// }
/// assert!((y - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct ChebyshevFilter {
    stages: Box<[BiquadFilter]>,
    percent_ripple: f64,
    poles: usize,
}

impl ChebyshevFilter {
    /// Creates a filter with `poles` poles (even, `2..=20`).
    ///
    /// `percent_ripple` is clamped to `0.0..=29.0`.
    ///
    /// # Panics
    ///
    /// Panics if `poles` is odd, zero, or above [`MAX_POLES`].
    pub fn new(relative_cutoff: f64, is_high_pass: bool, percent_ripple: f64, poles: usize) -> Self {
        assert!(
            (2..=MAX_POLES).contains(&poles) && poles % 2 == 0,
            "Chebyshev pole count must be even and within 2..=20, got {poles}"
        );
        let stages: Vec<BiquadFilter> = (0..poles / 2).map(|_| BiquadFilter::new(1)).collect();
        let mut filter = Self {
            stages: stages.into_boxed_slice(),
            percent_ripple: percent_ripple.clamp(0.0, MAX_RIPPLE_PERCENT),
            poles,
        };
        filter.change_parameters(relative_cutoff, is_high_pass);
        filter
    }

    /// Redesigns every stage for a new cutoff or response type.
    ///
    /// Stage history is kept, so a sweep does not click.
    pub fn change_parameters(&mut self, relative_cutoff: f64, is_high_pass: bool) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "chebyshev_design: {} poles, cutoff {relative_cutoff} fs, high_pass={is_high_pass}",
            self.poles
        );
        for (index, stage) in self.stages.iter_mut().enumerate() {
            stage.set(stage_coefficients(
                relative_cutoff,
                is_high_pass,
                self.percent_ripple,
                self.poles,
                index + 1,
            ));
        }
    }

    /// Number of poles.
    pub fn poles(&self) -> usize {
        self.poles
    }

    /// Clears the history of every stage.
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset_delays();
        }
    }

    /// Runs one sample through the cascade.
    #[inline]
    pub fn filter_sample(&mut self, input: f64) -> f64 {
        self.stages
            .iter_mut()
            .fold(input, |x, stage| stage.process_sample(x, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::magnitude_response;
    use crate::math::linear_to_db;

    fn cascade_db(filter: &ChebyshevFilter, relative: f64) -> f64 {
        // sample_rate = 1.0 lets the response helper take relative frequency
        filter
            .stages
            .iter()
            .map(|s| linear_to_db(magnitude_response(&s.coefficients(), relative, 1.0)))
            .sum()
    }

    #[test]
    fn test_low_pass_unity_dc_and_stopband() {
        let filter = ChebyshevFilter::new(0.1, false, 0.5, 6);
        assert!(cascade_db(&filter, 1e-6).abs() < 1e-6);
        assert!(cascade_db(&filter, 0.3) < -40.0);
    }

    #[test]
    fn test_high_pass_unity_nyquist_and_stopband() {
        let filter = ChebyshevFilter::new(0.2, true, 0.5, 4);
        assert!(cascade_db(&filter, 0.5 - 1e-6).abs() < 1e-6);
        assert!(cascade_db(&filter, 0.02) < -40.0);
    }

    #[test]
    fn test_butterworth_half_power_at_cutoff() {
        let filter = ChebyshevFilter::new(0.05, false, 0.0, 2);
        assert!((cascade_db(&filter, 0.05) + 3.01).abs() < 0.05);
    }

    #[test]
    fn test_ripple_stays_bounded_in_passband() {
        // 10% ripple is about 0.9 dB peak to peak; even orders sit at the
        // bottom of the ripple at DC, so the pass band rises above 0 dB.
        let filter = ChebyshevFilter::new(0.2, false, 10.0, 8);
        for i in 1..40 {
            let f = 0.19 * f64::from(i) / 40.0;
            let db = cascade_db(&filter, f);
            assert!(db > -0.01 && db < 1.0, "passband {f}: {db} dB");
        }
    }

    #[test]
    fn test_stages_are_stable() {
        for poles in (2..=MAX_POLES).step_by(2) {
            for pair in 1..=poles / 2 {
                let c = stage_coefficients(0.25, pair % 2 == 0, 5.0, poles, pair);
                // Stability triangle for z^2 + b1 z + b2
                assert!(c.b2.abs() < 1.0);
                assert!(c.b1.abs() < 1.0 + c.b2);
            }
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = ChebyshevFilter::new(0.1, false, 0.5, 4);
        let first = filter.filter_sample(1.0);
        for _ in 0..50 {
            filter.filter_sample(1.0);
        }
        filter.reset();
        assert_eq!(filter.filter_sample(1.0), first);
    }

    #[test]
    #[should_panic]
    fn test_odd_pole_count_panics() {
        let _ = ChebyshevFilter::new(0.1, false, 0.5, 3);
    }
}
