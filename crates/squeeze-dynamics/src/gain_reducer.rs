//! Envelope follower turning detector levels into smoothed gain reduction.
//!
//! Each sample the [`GainComputer`] proposes a target reduction; the
//! reducer glides towards it with attack ballistics when the target asks for
//! more reduction and release ballistics when it asks for less.
//!
//! # Ballistics
//!
//! ```text
//! attack_coef  = 0.05 ^ (Δt / attack)     95% of a step within `attack`
//! release_coef = 0.01 ^ (Δt / release)    99% of a step within `release`
//! gr = coef · (gr - target) + target
//! ```
//!
//! The two residuals differ on purpose: the release is specified to settle
//! further than the attack. A time of zero makes that phase instantaneous.
//!
//! # Release Curves
//!
//! | Curve | Attack | Release |
//! |-------|--------|---------|
//! | [`ReleaseCurve::Logarithmic`] | one-pole | one-pole, branching on direction |
//! | [`ReleaseCurve::Smooth`] | one-pole | release peak-follower feeding the attack stage |
//! | [`ReleaseCurve::Linear`] | one-pole | constant dB/s, 10 dB per release time |
//!
//! # Auto Makeup
//!
//! [`gain_compensation`](GainReducer::gain_compensation) is the curve's
//! reduction at [`AUTO_GAIN_REFERENCE_DB`]. It is recomputed whenever the
//! curve changes; the smoothed state is never reset by a curve change.

use squeeze_core::{clamp_or, db_to_linear, settle_coefficient};

use crate::gain_computer::GainComputer;

/// Residual of a step left after the attack time.
pub const ATTACK_RESIDUAL: f64 = 0.05;

/// Residual of a step left after the release time.
pub const RELEASE_RESIDUAL: f64 = 0.01;

/// Detector level at which the auto-makeup compensation is measured.
pub const AUTO_GAIN_REFERENCE_DB: f64 = -20.0;

/// dB travelled by the linear release within one release time.
pub const LINEAR_RELEASE_DB: f64 = 10.0;

/// Longest attack time in ms.
pub const ATTACK_MAX_MS: f64 = 500.0;

/// Longest release time in ms.
pub const RELEASE_MAX_MS: f64 = 8000.0;

/// Shape of the release phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseCurve {
    /// One-pole attack and release, switching on direction.
    #[default]
    Logarithmic,
    /// Release-smoothed peak follower feeding the attack smoother.
    Smooth,
    /// One-pole attack, constant-rate release.
    Linear,
}

impl ReleaseCurve {
    /// All curves, indexed like [`LABELS`](Self::LABELS).
    pub const ALL: [ReleaseCurve; 3] = [
        ReleaseCurve::Logarithmic,
        ReleaseCurve::Smooth,
        ReleaseCurve::Linear,
    ];

    /// Display labels.
    pub const LABELS: &'static [&'static str] = &["Logarithmic", "Smooth", "Linear"];
}

/// Gain-reduction envelope for one detector stream.
///
/// # Example
///
/// ```rust
/// use squeeze_dynamics::GainReducer;
///
/// let mut reducer = GainReducer::new(48000.0);
/// reducer.set_threshold_db(-20.0);
/// reducer.set_ratio(4.0);
/// reducer.set_attack_ms(0.0);
///
/// // 10 dB over the threshold, instantaneous attack
/// let gr = reducer.process_level(-10.0);
/// assert!((gr - 7.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct GainReducer {
    computer: GainComputer,
    sample_rate: f64,
    attack_ms: f64,
    release_ms: f64,
    attack_coef: f64,
    release_coef: f64,
    /// dB per sample for the linear release.
    release_step_db: f64,
    curve: ReleaseCurve,
    gain_reduction: f64,
    intermediate: f64,
    target: f64,
    gain_compensation: f64,
}

impl GainReducer {
    /// Creates a reducer with the default curve (threshold -12 dB, 2:1,
    /// hard knee, 10 ms attack, 150 ms release).
    pub fn new(sample_rate: f64) -> Self {
        let mut reducer = Self {
            computer: GainComputer::default(),
            sample_rate,
            attack_ms: 10.0,
            release_ms: 150.0,
            attack_coef: 0.0,
            release_coef: 0.0,
            release_step_db: 0.0,
            curve: ReleaseCurve::default(),
            gain_reduction: 0.0,
            intermediate: 0.0,
            target: 0.0,
            gain_compensation: 0.0,
        };
        reducer.recalculate_attack();
        reducer.recalculate_release();
        reducer.update_compensation();
        reducer
    }

    /// The static curve in use.
    pub fn computer(&self) -> &GainComputer {
        &self.computer
    }

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f64 {
        self.computer.threshold_db()
    }

    /// Sets the threshold (clamped) and refreshes the compensation.
    pub fn set_threshold_db(&mut self, threshold_db: f64) {
        self.computer.set_threshold_db(threshold_db);
        self.update_compensation();
    }

    /// Ratio.
    pub fn ratio(&self) -> f64 {
        self.computer.ratio()
    }

    /// Sets the ratio (clamped) and refreshes the compensation.
    pub fn set_ratio(&mut self, ratio: f64) {
        self.computer.set_ratio(ratio);
        self.update_compensation();
    }

    /// Knee width in dB.
    pub fn knee_db(&self) -> f64 {
        self.computer.knee_db()
    }

    /// Sets the knee width (clamped) and refreshes the compensation.
    pub fn set_knee_db(&mut self, knee_db: f64) {
        self.computer.set_knee_db(knee_db);
        self.update_compensation();
    }

    /// Attack time in ms.
    pub fn attack_ms(&self) -> f64 {
        self.attack_ms
    }

    /// Sets the attack time, clamped to `0..=500` ms.
    pub fn set_attack_ms(&mut self, attack_ms: f64) {
        self.attack_ms = clamp_or(attack_ms, 0.0, ATTACK_MAX_MS, self.attack_ms);
        self.recalculate_attack();
    }

    /// Release time in ms.
    pub fn release_ms(&self) -> f64 {
        self.release_ms
    }

    /// Sets the release time, clamped to `0..=8000` ms.
    pub fn set_release_ms(&mut self, release_ms: f64) {
        self.release_ms = clamp_or(release_ms, 0.0, RELEASE_MAX_MS, self.release_ms);
        self.recalculate_release();
    }

    /// Release curve.
    pub fn release_curve(&self) -> ReleaseCurve {
        self.curve
    }

    /// Switches the release curve. The smoothed reduction carries over.
    pub fn set_release_curve(&mut self, curve: ReleaseCurve) {
        self.curve = curve;
        self.intermediate = self.gain_reduction;
    }

    /// Attack coefficient (`0.0` = instantaneous).
    pub fn attack_coefficient(&self) -> f64 {
        self.attack_coef
    }

    /// Release coefficient (`0.0` = instantaneous).
    pub fn release_coefficient(&self) -> f64 {
        self.release_coef
    }

    /// Reduction the curve assigns to [`AUTO_GAIN_REFERENCE_DB`].
    pub fn gain_compensation(&self) -> f64 {
        self.gain_compensation
    }

    /// Current smoothed gain reduction in dB (non-negative).
    pub fn gain_reduction(&self) -> f64 {
        self.gain_reduction
    }

    /// Smoothed reduction minus the auto-makeup compensation.
    ///
    /// Negative values mean the signal is turned up.
    pub fn gain_reduction_with_makeup(&self) -> f64 {
        self.gain_reduction - self.gain_compensation
    }

    /// Un-smoothed target from the last processed level.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advances the envelope by one sample and returns the smoothed
    /// reduction in dB.
    ///
    /// `level_db` is expected to be floored already (see
    /// [`squeeze_core::linear_to_db`]).
    #[inline]
    pub fn process_level(&mut self, level_db: f64) -> f64 {
        let target = self.computer.gain_reduction_db(level_db);
        self.target = target;

        match self.curve {
            ReleaseCurve::Logarithmic => {
                let coef = if target > self.gain_reduction {
                    self.attack_coef
                } else {
                    self.release_coef
                };
                self.gain_reduction = smooth(self.gain_reduction, target, coef);
            }
            ReleaseCurve::Smooth => {
                self.intermediate = smooth(self.intermediate, target, self.release_coef).max(target);
                self.gain_reduction = smooth(self.gain_reduction, self.intermediate, self.attack_coef);
            }
            ReleaseCurve::Linear => {
                if target >= self.gain_reduction {
                    self.gain_reduction = smooth(self.gain_reduction, target, self.attack_coef);
                } else if self.release_step_db == 0.0 {
                    self.gain_reduction = target;
                } else {
                    self.gain_reduction = (self.gain_reduction - self.release_step_db).max(target);
                }
            }
        }

        self.gain_reduction
    }

    /// Applies the current reduction, including auto makeup, to a sample:
    /// `x · 10^(-(gr - compensation) / 20)`.
    #[inline]
    pub fn process_sample(&self, sample: f64) -> f64 {
        sample * db_to_linear(-self.gain_reduction_with_makeup())
    }

    /// Clears the envelope. Settings are kept.
    pub fn reset(&mut self) {
        self.gain_reduction = 0.0;
        self.intermediate = 0.0;
        self.target = 0.0;
    }

    fn update_compensation(&mut self) {
        self.gain_compensation = self.computer.gain_reduction_db(AUTO_GAIN_REFERENCE_DB);
    }

    fn recalculate_attack(&mut self) {
        self.attack_coef = settle_coefficient(ATTACK_RESIDUAL, self.attack_ms / 1000.0, self.sample_rate);
    }

    fn recalculate_release(&mut self) {
        let release_s = self.release_ms / 1000.0;
        self.release_coef = settle_coefficient(RELEASE_RESIDUAL, release_s, self.sample_rate);
        self.release_step_db = if release_s > 0.0 {
            LINEAR_RELEASE_DB / (release_s * self.sample_rate)
        } else {
            0.0
        };
    }
}

#[inline]
fn smooth(current: f64, target: f64, coef: f64) -> f64 {
    coef * (current - target) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn reducer(curve: ReleaseCurve) -> GainReducer {
        let mut r = GainReducer::new(SR);
        r.set_threshold_db(-20.0);
        r.set_ratio(4.0);
        r.set_attack_ms(10.0);
        r.set_release_ms(100.0);
        r.set_release_curve(curve);
        r
    }

    fn samples(ms: f64) -> usize {
        (ms / 1000.0 * SR) as usize
    }

    #[test]
    fn test_attack_reaches_95_percent_in_attack_time() {
        for curve in ReleaseCurve::ALL {
            let mut r = reducer(curve);
            let n = samples(10.0);
            let mut gr = 0.0;
            for _ in 0..n + 1 {
                gr = r.process_level(-10.0);
            }
            assert!(gr >= 0.95 * 7.5, "{curve:?}: {gr} after {n} samples");

            let mut early = reducer(curve);
            for _ in 0..n / 2 {
                gr = early.process_level(-10.0);
            }
            assert!(gr < 0.95 * 7.5, "{curve:?} settled too early");
        }
    }

    #[test]
    fn test_release_reaches_99_percent_in_release_time() {
        let mut r = reducer(ReleaseCurve::Logarithmic);
        r.set_attack_ms(0.0);
        r.process_level(-10.0);
        assert!((r.gain_reduction() - 7.5).abs() < 1e-12);

        let n = samples(100.0);
        for _ in 0..n + 1 {
            r.process_level(-60.0);
        }
        assert!(r.gain_reduction() <= 0.01 * 7.5 + 1e-9);
    }

    #[test]
    fn test_attack_and_release_residuals_differ() {
        // Intentional: 95% for attack, 99% for release over the same time.
        let mut r = GainReducer::new(1000.0);
        r.set_attack_ms(100.0);
        r.set_release_ms(100.0);
        let a = libm::pow(r.attack_coefficient(), 100.0);
        let b = libm::pow(r.release_coefficient(), 100.0);
        assert!((a - ATTACK_RESIDUAL).abs() < 1e-12);
        assert!((b - RELEASE_RESIDUAL).abs() < 1e-12);
        assert!(r.attack_coefficient() > r.release_coefficient());
    }

    #[test]
    fn test_zero_times_are_instantaneous() {
        let mut r = reducer(ReleaseCurve::Logarithmic);
        r.set_attack_ms(0.0);
        r.set_release_ms(0.0);
        assert_eq!(r.process_level(-10.0), 7.5);
        assert_eq!(r.process_level(-40.0), 0.0);

        let mut lin = reducer(ReleaseCurve::Linear);
        lin.set_attack_ms(0.0);
        lin.set_release_ms(0.0);
        lin.process_level(-10.0);
        assert_eq!(lin.process_level(-40.0), 0.0);
    }

    #[test]
    fn test_linear_release_rate() {
        let mut r = reducer(ReleaseCurve::Linear);
        r.set_attack_ms(0.0);
        r.set_threshold_db(-40.0);
        r.set_ratio(20.0);
        r.process_level(0.0);
        let start = r.gain_reduction();

        // 10 dB per release time (100 ms)
        for _ in 0..samples(50.0) {
            r.process_level(-80.0);
        }
        assert!((start - r.gain_reduction() - 5.0).abs() < 1e-6);

        // clamps at the target instead of overshooting
        for _ in 0..samples(2000.0) {
            r.process_level(-80.0);
        }
        assert_eq!(r.gain_reduction(), 0.0);
    }

    #[test]
    fn test_smooth_curve_holds_peaks_longer_than_attack_stage_alone() {
        let mut r = reducer(ReleaseCurve::Smooth);
        r.set_attack_ms(0.0);
        r.process_level(-10.0);
        let after_one = r.process_level(-60.0);
        // intermediate decays with the release coefficient
        assert!((after_one - 7.5 * r.release_coefficient()).abs() < 1e-9);
    }

    #[test]
    fn test_settings_do_not_reset_envelope() {
        let mut r = reducer(ReleaseCurve::Logarithmic);
        for _ in 0..samples(50.0) {
            r.process_level(-10.0);
        }
        let before = r.gain_reduction();
        r.set_threshold_db(-30.0);
        r.set_ratio(8.0);
        r.set_knee_db(12.0);
        r.set_release_curve(ReleaseCurve::Smooth);
        assert_eq!(r.gain_reduction(), before);
    }

    #[test]
    fn test_gain_compensation_tracks_curve() {
        let mut r = GainReducer::new(SR);
        r.set_threshold_db(-12.0);
        assert_eq!(r.gain_compensation(), 0.0);

        r.set_threshold_db(-40.0);
        r.set_ratio(4.0);
        // (−20 − (−40)) · 0.75
        assert!((r.gain_compensation() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_process_sample_applies_reduction_and_makeup() {
        let mut r = GainReducer::new(SR);
        r.set_threshold_db(-40.0);
        r.set_ratio(4.0);
        r.set_attack_ms(0.0);
        r.process_level(-20.0);
        // reduction equals compensation at the reference level: unity gain
        assert!((r.process_sample(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut r = reducer(ReleaseCurve::Smooth);
        r.process_level(0.0);
        r.reset();
        assert_eq!(r.gain_reduction(), 0.0);
        assert_eq!(r.target(), 0.0);
        assert_eq!(r.threshold_db(), -20.0);
    }
}
