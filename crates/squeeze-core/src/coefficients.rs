//! Biquad coefficient designer.
//!
//! Pure functions from `(cutoff, sample_rate[, q, gain])` to
//! [`BiquadCoefficients`]. Nothing here allocates or keeps state, so the
//! designs can be recomputed from a parameter setter at any time.
//!
//! | Design | Order | Uses post-mix |
//! |--------|-------|---------------|
//! | [`low_pass_first_order`] / [`high_pass_first_order`] | 1 | no |
//! | [`low_pass_second_order`] / [`high_pass_second_order`] | 2 | no |
//! | [`low_shelf_first_order`] / [`high_shelf_first_order`] | 1 | yes (`c0 = μ - 1`, `d0 = 1`) |
//! | [`peaking_variable_q`] | 2 | yes (`c0 = μ - 1`, `d0 = 1`) |
//! | [`peaking_constant_q`] | 2 | no |
//!
//! # Preconditions
//!
//! `0 < cutoff_hz < sample_rate / 2` and `q > 0`. These are not checked at
//! runtime; violating them yields unstable or non-finite coefficients, so
//! callers clamp their inputs before designing.

use core::f64::consts::PI;
use libm::{cos, exp2, pow, sin, sqrt, tan};

use crate::biquad::BiquadCoefficients;

/// Q of a second-order Butterworth section.
pub const BUTTERWORTH_Q: f64 = core::f64::consts::FRAC_1_SQRT_2;

/// Converts an octave bandwidth to a quality factor.
///
/// `Q = sqrt(2^N) / (2^N - 1)`
///
/// # Example
///
/// ```rust
/// use squeeze_core::coefficients::bandwidth_to_q;
///
/// // One octave is Q ≈ 1.414
/// assert!((bandwidth_to_q(1.0) - 1.41421).abs() < 1e-4);
/// ```
pub fn bandwidth_to_q(octaves: f64) -> f64 {
    let bw2 = exp2(octaves);
    sqrt(bw2) / (bw2 - 1.0)
}

#[inline]
fn theta_c(cutoff_hz: f64, sample_rate: f64) -> f64 {
    2.0 * PI * cutoff_hz / sample_rate
}

/// First-order low-pass.
pub fn low_pass_first_order(cutoff_hz: f64, sample_rate: f64) -> BiquadCoefficients {
    let theta = theta_c(cutoff_hz, sample_rate);
    let gamma = cos(theta) / (1.0 + sin(theta));
    let a0 = (1.0 - gamma) / 2.0;
    BiquadCoefficients::new(a0, a0, 0.0, -gamma, 0.0)
}

/// First-order high-pass.
pub fn high_pass_first_order(cutoff_hz: f64, sample_rate: f64) -> BiquadCoefficients {
    let theta = theta_c(cutoff_hz, sample_rate);
    let gamma = cos(theta) / (1.0 + sin(theta));
    let a0 = (1.0 + gamma) / 2.0;
    BiquadCoefficients::new(a0, -a0, 0.0, -gamma, 0.0)
}

/// `(beta, gamma)` shared by the second-order pass designs.
fn second_order_terms(cutoff_hz: f64, sample_rate: f64, q: f64) -> (f64, f64) {
    let theta = theta_c(cutoff_hz, sample_rate);
    let half_d_sin = 0.5 / q * sin(theta);
    let beta = 0.5 * (1.0 - half_d_sin) / (1.0 + half_d_sin);
    let gamma = (0.5 + beta) * cos(theta);
    (beta, gamma)
}

/// Second-order low-pass with resonance `q` (use [`BUTTERWORTH_Q`] for a
/// maximally flat response).
pub fn low_pass_second_order(cutoff_hz: f64, sample_rate: f64, q: f64) -> BiquadCoefficients {
    let (beta, gamma) = second_order_terms(cutoff_hz, sample_rate, q);
    let a1 = 0.5 + beta - gamma;
    let a0 = a1 / 2.0;
    BiquadCoefficients::new(a0, a1, a0, -2.0 * gamma, 2.0 * beta)
}

/// Second-order high-pass with resonance `q`.
pub fn high_pass_second_order(cutoff_hz: f64, sample_rate: f64, q: f64) -> BiquadCoefficients {
    let (beta, gamma) = second_order_terms(cutoff_hz, sample_rate, q);
    let sum = 0.5 + beta + gamma;
    let a0 = sum / 2.0;
    BiquadCoefficients::new(a0, -sum, a0, -2.0 * gamma, 2.0 * beta)
}

/// First-order low shelf: `gain_db` below `cutoff_hz`, unity above.
pub fn low_shelf_first_order(cutoff_hz: f64, sample_rate: f64, gain_db: f64) -> BiquadCoefficients {
    let theta = theta_c(cutoff_hz, sample_rate);
    let mu = pow(10.0, gain_db / 20.0);
    let beta = 4.0 / (1.0 + mu);
    let delta = beta * tan(theta / 2.0);
    let gamma = (1.0 - delta) / (1.0 + delta);
    let a0 = (1.0 - gamma) / 2.0;
    BiquadCoefficients::new(a0, a0, 0.0, -gamma, 0.0).with_mix(mu - 1.0, 1.0)
}

/// First-order high shelf: unity below `cutoff_hz`, `gain_db` above.
pub fn high_shelf_first_order(
    cutoff_hz: f64,
    sample_rate: f64,
    gain_db: f64,
) -> BiquadCoefficients {
    let theta = theta_c(cutoff_hz, sample_rate);
    let mu = pow(10.0, gain_db / 20.0);
    let beta = (1.0 + mu) / 4.0;
    let delta = beta * tan(theta / 2.0);
    let gamma = (1.0 - delta) / (1.0 + delta);
    let a0 = (1.0 + gamma) / 2.0;
    BiquadCoefficients::new(a0, -a0, 0.0, -gamma, 0.0).with_mix(mu - 1.0, 1.0)
}

/// Peaking EQ whose bandwidth narrows as the gain grows.
///
/// Built as a unity-peak band-pass mixed with the dry signal. The
/// `θc / 2Q` argument is clamped to `π/2 - 0.15` so very low Q at high
/// cutoffs stays stable.
pub fn peaking_variable_q(
    cutoff_hz: f64,
    sample_rate: f64,
    gain_db: f64,
    q: f64,
) -> BiquadCoefficients {
    const LIMIT: f64 = PI / 2.0 - 0.15;

    let theta = theta_c(cutoff_hz, sample_rate);
    let mu = pow(10.0, gain_db / 20.0);
    let zeta = 4.0 / (1.0 + mu);
    let theta_by_q = (theta / (2.0 * q)).min(LIMIT);

    let zeta_tan = zeta * tan(theta_by_q);
    let beta = 0.5 * (1.0 - zeta_tan) / (1.0 + zeta_tan);
    let gamma = (0.5 + beta) * cos(theta);

    BiquadCoefficients::new(0.5 - beta, 0.0, beta - 0.5, -2.0 * gamma, 2.0 * beta)
        .with_mix(mu - 1.0, 1.0)
}

/// Peaking EQ with a bandwidth independent of the gain.
///
/// Boost and cut use mirrored designs so a cut exactly inverts a boost of
/// the same magnitude.
pub fn peaking_constant_q(
    cutoff_hz: f64,
    sample_rate: f64,
    gain_db: f64,
    q: f64,
) -> BiquadCoefficients {
    let k = tan(PI * cutoff_hz / sample_rate);
    let v0 = pow(10.0, gain_db / 20.0);
    let k2 = k * k;
    let k_by_q = k / q;

    let d0 = 1.0 + k_by_q + k2;
    let e0 = 1.0 + k_by_q / v0 + k2;
    let alpha = 1.0 + k_by_q * v0 + k2;
    let beta = 2.0 * (k2 - 1.0);
    let gamma = 1.0 - k_by_q * v0 + k2;
    let delta = 1.0 - k_by_q + k2;
    let eta = 1.0 - k_by_q / v0 + k2;

    if gain_db > 0.0 {
        BiquadCoefficients::new(
            alpha / d0,
            beta / d0,
            gamma / d0,
            beta / d0,
            delta / d0,
        )
    } else {
        BiquadCoefficients::new(d0 / e0, beta / e0, delta / e0, beta / e0, eta / e0)
    }
}

/// Magnitude of the filter's frequency response at `frequency_hz`,
/// including the post-mix stage.
///
/// Handy for inspecting designs; not meant for the audio path.
pub fn magnitude_response(
    coefficients: &BiquadCoefficients,
    frequency_hz: f64,
    sample_rate: f64,
) -> f64 {
    let w = theta_c(frequency_hz, sample_rate);
    let (c1, s1) = (cos(w), -sin(w));
    let (c2, s2) = (cos(2.0 * w), -sin(2.0 * w));
    let c = coefficients;

    let num_re = c.a0 + c.a1 * c1 + c.a2 * c2;
    let num_im = c.a1 * s1 + c.a2 * s2;
    let den_re = 1.0 + c.b1 * c1 + c.b2 * c2;
    let den_im = c.b1 * s1 + c.b2 * s2;

    let den_mag2 = den_re * den_re + den_im * den_im;
    let mut re = (num_re * den_re + num_im * den_im) / den_mag2;
    let mut im = (num_im * den_re - num_re * den_im) / den_mag2;

    if c.d0 != 0.0 {
        re = c.c0 * re + c.d0;
        im *= c.c0;
    }
    sqrt(re * re + im * im)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linear_to_db;

    const SR: f64 = 48000.0;

    fn db_at(c: &BiquadCoefficients, hz: f64) -> f64 {
        linear_to_db(magnitude_response(c, hz, SR))
    }

    #[test]
    fn test_first_order_pass_edges() {
        let lp = low_pass_first_order(1000.0, SR);
        assert!(db_at(&lp, 1.0).abs() < 0.01);
        assert!((db_at(&lp, 1000.0) + 3.01).abs() < 0.2);

        let hp = high_pass_first_order(1000.0, SR);
        assert!(db_at(&hp, 23999.0).abs() < 0.01);
        assert!((db_at(&hp, 1000.0) + 3.01).abs() < 0.2);
    }

    #[test]
    fn test_second_order_butterworth() {
        let lp = low_pass_second_order(2000.0, SR, BUTTERWORTH_Q);
        assert!(db_at(&lp, 10.0).abs() < 0.01);
        assert!((db_at(&lp, 2000.0) + 3.01).abs() < 0.1);
        // 12 dB/octave well above cutoff
        assert!(db_at(&lp, 8000.0) < -20.0);

        let hp = high_pass_second_order(200.0, SR, BUTTERWORTH_Q);
        assert!(db_at(&hp, 20000.0).abs() < 0.05);
        assert!((db_at(&hp, 200.0) + 3.01).abs() < 0.1);
        assert!(db_at(&hp, 50.0) < -20.0);
    }

    #[test]
    fn test_resonance_peaks_near_cutoff() {
        let lp = low_pass_second_order(1000.0, SR, 4.0);
        assert!(db_at(&lp, 1000.0) > 10.0);
    }

    #[test]
    fn test_shelves() {
        let low = low_shelf_first_order(300.0, SR, 6.0);
        assert!((db_at(&low, 5.0) - 6.0).abs() < 0.05);
        assert!(db_at(&low, 20000.0).abs() < 0.1);

        let high = high_shelf_first_order(3000.0, SR, -6.0);
        assert!(db_at(&high, 5.0).abs() < 0.05);
        assert!((db_at(&high, 23900.0) + 6.0).abs() < 0.1);
    }

    #[test]
    fn test_peaking_center_gain() {
        for gain in [-12.0, -3.0, 3.0, 12.0] {
            let variable = peaking_variable_q(1000.0, SR, gain, 1.0);
            assert!(
                (db_at(&variable, 1000.0) - gain).abs() < 0.01,
                "variable-Q center gain for {gain} dB"
            );

            let constant = peaking_constant_q(1000.0, SR, gain, 1.0);
            assert!(
                (db_at(&constant, 1000.0) - gain).abs() < 0.01,
                "constant-Q center gain for {gain} dB"
            );
            assert!(db_at(&constant, 10.0).abs() < 0.05);
        }
    }

    #[test]
    fn test_constant_q_cut_inverts_boost() {
        let boost = peaking_constant_q(2500.0, SR, 9.0, 2.0);
        let cut = peaking_constant_q(2500.0, SR, -9.0, 2.0);
        for hz in [100.0, 1000.0, 2500.0, 6000.0, 15000.0] {
            let sum = db_at(&boost, hz) + db_at(&cut, hz);
            assert!(sum.abs() < 1e-6, "boost + cut at {hz} Hz = {sum}");
        }
    }

    #[test]
    fn test_zero_gain_designs_are_flat() {
        let designs = [
            low_shelf_first_order(500.0, SR, 0.0),
            high_shelf_first_order(500.0, SR, 0.0),
            peaking_variable_q(500.0, SR, 0.0, 0.7),
            peaking_constant_q(500.0, SR, 0.0, 0.7),
        ];
        for c in &designs {
            for hz in [50.0, 500.0, 5000.0] {
                assert!(db_at(c, hz).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_variable_q_argument_clamp() {
        // Tiny Q at a high cutoff would push tan() past its pole.
        let c = peaking_variable_q(15000.0, SR, 6.0, 0.05);
        assert!(c.a0.is_finite() && c.b1.is_finite() && c.b2.is_finite());
        assert!(c.b2.abs() < 1.0);
    }

    #[test]
    fn test_bandwidth_to_q() {
        assert!((bandwidth_to_q(1.0) - core::f64::consts::SQRT_2).abs() < 1e-12);
        assert!(bandwidth_to_q(2.0) < bandwidth_to_q(1.0));
    }
}
