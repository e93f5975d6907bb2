//! Property-based tests for squeeze-core DSP primitives.
//!
//! Tests filter stability, identity behaviour, and level-math floors using
//! proptest for randomized input generation.

use proptest::prelude::*;
use squeeze_core::{
    BiquadCoefficients, BiquadFilter, ChebyshevFilter, MIN_DECIBEL, chebyshev::stage_coefficients,
    coefficients, coefficients::magnitude_response, db_to_linear, linear_to_db, wet_dry_mix,
};

const SR: f64 = 48000.0;

/// Coefficient designs indexed 0..6.
fn design(variant: usize, freq: f64, q: f64, gain_db: f64) -> BiquadCoefficients {
    match variant % 6 {
        0 => coefficients::low_pass_second_order(freq, SR, q),
        1 => coefficients::high_pass_second_order(freq, SR, q),
        2 => coefficients::low_shelf_first_order(freq, SR, gain_db),
        3 => coefficients::high_shelf_first_order(freq, SR, gain_db),
        4 => coefficients::peaking_variable_q(freq, SR, gain_db, q),
        5 => coefficients::peaking_constant_q(freq, SR, gain_db, q),
        _ => unreachable!(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any valid cutoff, Q and gain, every design produces finite output
    /// for random finite input.
    #[test]
    fn biquad_stability(
        freq in 20.0f64..20000.0f64,
        q in 0.1f64..10.0f64,
        gain_db in -24.0f64..24.0f64,
        variant in 0usize..6,
        input in prop::array::uniform32(-1.0f64..=1.0f64),
    ) {
        let mut filter = BiquadFilter::new(1);
        filter.set(design(variant, freq, q, gain_db));

        for &sample in &input {
            let out = filter.process_sample(sample, 0);
            prop_assert!(
                out.is_finite(),
                "design {} (freq={}, q={}, gain={}) produced {} for input {}",
                variant % 6, freq, q, gain_db, out, sample
            );
        }
    }

    /// Neutral coefficients pass any sequence through unchanged, on every channel.
    #[test]
    fn neutral_biquad_is_identity(
        channel in 0usize..4,
        input in prop::array::uniform32(-10.0f64..=10.0f64),
    ) {
        let mut filter = BiquadFilter::new(4);
        filter.neutral();
        for &sample in &input {
            prop_assert_eq!(filter.process_sample(sample, channel), sample);
        }
    }

    /// Level conversion never leaves the floor or produces non-finite values.
    #[test]
    fn level_to_db_is_floored(level in -10.0f64..10.0f64) {
        let db = linear_to_db(level);
        prop_assert!(db.is_finite());
        prop_assert!(db >= MIN_DECIBEL);
        if level.abs() > 1e-3 {
            prop_assert!((db_to_linear(db) - level.abs()).abs() < 1e-9);
        }
    }

    /// Mixing stays between dry and wet.
    #[test]
    fn wet_dry_mix_is_bounded(
        dry in -1.0f64..1.0f64,
        wet in -1.0f64..1.0f64,
        mix in 0.0f64..=1.0f64,
    ) {
        let out = wet_dry_mix(dry, wet, mix);
        prop_assert!(out >= dry.min(wet) - 1e-12 && out <= dry.max(wet) + 1e-12);
    }

    /// Chebyshev low-pass stages are normalised to unity gain at DC.
    #[test]
    fn chebyshev_unity_dc_gain(
        cutoff in 0.02f64..0.45f64,
        ripple in 0.0f64..29.0f64,
        pairs in 1usize..=10,
    ) {
        let poles = pairs * 2;
        let mut gain = 1.0;
        for pair in 1..=pairs {
            let c = stage_coefficients(cutoff, false, ripple, poles, pair);
            gain *= magnitude_response(&c, 0.0, 1.0);
        }
        prop_assert!((gain - 1.0).abs() < 1e-6, "DC gain {} for {} poles", gain, poles);

        let mut filter = ChebyshevFilter::new(cutoff, false, ripple, poles);
        prop_assert!(filter.filter_sample(1.0).is_finite());
    }
}
