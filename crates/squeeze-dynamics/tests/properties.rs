//! Property-based tests for the compressor and its parts.
//!
//! Every combination of in-range parameters must keep the output finite,
//! never add gain beyond the configured makeup, and leave the static curve
//! monotonic.

use proptest::prelude::*;
use squeeze_core::ParameterInfo;
use squeeze_dynamics::{Compressor, GainComputer};

/// Sets every parameter from normalized `[0, 1]` values.
fn set_normalized_params(comp: &mut Compressor, values: &[f64; 20]) {
    for i in 0..comp.param_count() {
        if let Some(desc) = comp.param_info(i) {
            comp.set_param(i, desc.denormalize(values[i % values.len()]));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn gain_reduction_is_monotonic_in_level(
        threshold in -48.0f64..=18.0,
        ratio in 1.0f64..=20.0,
        knee in 0.0f64..=48.0,
        a in -80.0f64..=30.0,
        b in -80.0f64..=30.0,
    ) {
        let gc = GainComputer::new(threshold, ratio, knee);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let gr_lo = gc.gain_reduction_db(lo);
        let gr_hi = gc.gain_reduction_db(hi);
        prop_assert!(gr_lo >= 0.0);
        prop_assert!(gr_hi + 1e-12 >= gr_lo);
        // output level never decreases with input level either
        prop_assert!(hi - gr_hi + 1e-9 >= lo - gr_lo);
    }

    #[test]
    fn gain_reduction_never_exceeds_overshoot(
        threshold in -48.0f64..=18.0,
        ratio in 1.0f64..=20.0,
        knee in 0.0f64..=48.0,
        level in -80.0f64..=30.0,
    ) {
        let gc = GainComputer::new(threshold, ratio, knee);
        let gr = gc.gain_reduction_db(level);
        let reach = (level - threshold + knee / 2.0).max(0.0);
        prop_assert!(gr <= reach + 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn compressor_output_is_finite(
        input in prop::array::uniform32(-1.0f64..=1.0),
        params in prop::array::uniform20(0.0f64..=1.0),
        channels in 1usize..=4,
    ) {
        let mut comp = Compressor::new(channels, 48000.0);
        set_normalized_params(&mut comp, &params);

        let mut buffers: Vec<Vec<f64>> = vec![input.to_vec(); channels];
        for _ in 0..8 {
            let mut refs: Vec<&mut [f64]> = buffers.iter_mut().map(Vec::as_mut_slice).collect();
            comp.process(&mut refs, None);
        }

        for buffer in &buffers {
            for &x in buffer {
                prop_assert!(x.is_finite(), "non-finite output {x}");
            }
        }
        for ch in 0..channels {
            let gr = comp.gain_reduction_db(ch);
            prop_assert!(gr.is_finite() && gr >= 0.0);
        }
    }

    #[test]
    fn compression_never_adds_gain(
        input in prop::array::uniform32(-1.0f64..=1.0),
        threshold in -48.0f64..=18.0,
        ratio in 1.0f64..=20.0,
        knee in 0.0f64..=48.0,
        attack in 0.0f64..=50.0,
        release in 0.0f64..=500.0,
    ) {
        let mut comp = Compressor::new(1, 48000.0);
        comp.set_threshold_db(threshold);
        comp.set_ratio(ratio);
        comp.set_knee_db(knee);
        comp.set_attack_ms(attack);
        comp.set_release_ms(release);

        let mut block = input;
        comp.process(&mut [&mut block[..]], None);
        for (out, inp) in block.iter().zip(&input) {
            prop_assert!(out.abs() <= inp.abs() + 1e-15);
        }
    }

    #[test]
    fn reset_restores_initial_output(
        input in prop::array::uniform32(-1.0f64..=1.0),
        params in prop::array::uniform20(0.0f64..=1.0),
    ) {
        let mut comp = Compressor::new(2, 44100.0);
        set_normalized_params(&mut comp, &params);

        let run = |comp: &mut Compressor| {
            let mut left = input;
            let mut right = input;
            comp.process(&mut [&mut left[..], &mut right[..]], None);
            left
        };

        let first = run(&mut comp);
        comp.reset();
        let second = run(&mut comp);
        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
