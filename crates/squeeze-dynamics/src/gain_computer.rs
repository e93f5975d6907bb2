//! Static compression curve.
//!
//! Maps a detector level in dB to the gain reduction in dB that the curve
//! asks for, before any ballistics. Reduction is reported as a positive
//! number of decibels (`7.5` means "turn the signal down by 7.5 dB").
//!
//! ```text
//! overshoot = level - threshold
//!
//! overshoot < -W/2          0
//! |overshoot| <= W/2        (overshoot + W/2)² / (2W) · (1 - 1/ratio)
//! overshoot > W/2           overshoot · (1 - 1/ratio)
//! ```
//!
//! The quadratic knee meets both straight segments with matching slope, so
//! widening the knee only ever smooths the transition.

use squeeze_core::clamp_or;

/// Lowest threshold in dB.
pub const THRESHOLD_MIN_DB: f64 = -48.0;
/// Highest threshold in dB.
pub const THRESHOLD_MAX_DB: f64 = 18.0;
/// Lowest ratio (no compression).
pub const RATIO_MIN: f64 = 1.0;
/// Highest ratio.
pub const RATIO_MAX: f64 = 20.0;
/// Widest knee in dB.
pub const KNEE_MAX_DB: f64 = 48.0;

/// Knee presets offered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KneeKind {
    /// Abrupt transition at the threshold.
    #[default]
    Hard,
    /// 12 dB wide transition.
    Medium,
    /// 48 dB wide transition.
    Soft,
}

impl KneeKind {
    /// All presets, in increasing width.
    pub const ALL: [KneeKind; 3] = [KneeKind::Hard, KneeKind::Medium, KneeKind::Soft];

    /// Display labels, indexed like [`ALL`](Self::ALL).
    pub const LABELS: &'static [&'static str] = &["Hard", "Medium", "Soft"];

    /// Knee width in dB.
    pub const fn width_db(self) -> f64 {
        match self {
            KneeKind::Hard => 0.0,
            KneeKind::Medium => 12.0,
            KneeKind::Soft => 48.0,
        }
    }

    /// Preset whose width matches `width_db` exactly, if any.
    pub fn from_width_db(width_db: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.width_db() == width_db)
    }
}

/// Threshold/ratio/knee transfer function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainComputer {
    threshold_db: f64,
    ratio: f64,
    knee_db: f64,
    /// `1 - 1/ratio`, cached.
    slope: f64,
}

impl Default for GainComputer {
    fn default() -> Self {
        Self::new(-12.0, 2.0, 0.0)
    }
}

impl GainComputer {
    /// Creates a curve; all inputs are clamped to their ranges.
    pub fn new(threshold_db: f64, ratio: f64, knee_db: f64) -> Self {
        let mut computer = Self {
            threshold_db: 0.0,
            ratio: 1.0,
            knee_db: 0.0,
            slope: 0.0,
        };
        computer.set_threshold_db(threshold_db);
        computer.set_ratio(ratio);
        computer.set_knee_db(knee_db);
        computer
    }

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    /// Sets the threshold, clamped to `-48..=18` dB.
    pub fn set_threshold_db(&mut self, threshold_db: f64) {
        self.threshold_db = clamp_or(threshold_db, THRESHOLD_MIN_DB, THRESHOLD_MAX_DB, self.threshold_db);
    }

    /// Ratio (`n` in `n:1`).
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Sets the ratio, clamped to `1..=20`.
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = clamp_or(ratio, RATIO_MIN, RATIO_MAX, self.ratio);
        self.slope = 1.0 - 1.0 / self.ratio;
    }

    /// Knee width in dB.
    pub fn knee_db(&self) -> f64 {
        self.knee_db
    }

    /// Sets the knee width, clamped to `0..=48` dB.
    pub fn set_knee_db(&mut self, knee_db: f64) {
        self.knee_db = clamp_or(knee_db, 0.0, KNEE_MAX_DB, self.knee_db);
    }

    /// Gain reduction (dB, non-negative) requested for `level_db`.
    #[inline]
    pub fn gain_reduction_db(&self, level_db: f64) -> f64 {
        let overshoot = level_db - self.threshold_db;
        let half_knee = self.knee_db / 2.0;

        if self.knee_db == 0.0 {
            if overshoot <= 0.0 {
                0.0
            } else {
                overshoot * self.slope
            }
        } else if overshoot < -half_knee {
            0.0
        } else if overshoot > half_knee {
            overshoot * self.slope
        } else {
            let factor = overshoot + half_knee;
            factor * factor / (2.0 * self.knee_db) * self.slope
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_is_zero() {
        let gc = GainComputer::new(-20.0, 4.0, 0.0);
        assert_eq!(gc.gain_reduction_db(-30.0), 0.0);
        assert_eq!(gc.gain_reduction_db(-20.0), 0.0);
    }

    #[test]
    fn test_hard_knee_slope() {
        let gc = GainComputer::new(-20.0, 4.0, 0.0);
        assert!((gc.gain_reduction_db(-10.0) - 7.5).abs() < 1e-12);
        assert!((gc.gain_reduction_db(0.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_one_never_compresses() {
        let gc = GainComputer::new(-40.0, 1.0, 12.0);
        assert_eq!(gc.gain_reduction_db(0.0), 0.0);
    }

    #[test]
    fn test_soft_knee_is_continuous() {
        let gc = GainComputer::new(-20.0, 4.0, 12.0);
        let eps = 1e-9;
        for edge in [-26.0, -14.0] {
            let below = gc.gain_reduction_db(edge - eps);
            let above = gc.gain_reduction_db(edge + eps);
            assert!((below - above).abs() < 1e-6, "jump at {edge} dB");
        }
        // Quadratic knee at the threshold: (W/2)² / 2W · slope = W/8 · slope
        assert!((gc.gain_reduction_db(-20.0) - 12.0 / 8.0 * 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_wider_knee_starts_earlier() {
        let hard = GainComputer::new(-20.0, 4.0, KneeKind::Hard.width_db());
        let medium = GainComputer::new(-20.0, 4.0, KneeKind::Medium.width_db());
        let soft = GainComputer::new(-20.0, 4.0, KneeKind::Soft.width_db());
        let level = -22.0;
        assert_eq!(hard.gain_reduction_db(level), 0.0);
        assert!(medium.gain_reduction_db(level) > 0.0);
        assert!(soft.gain_reduction_db(level) > medium.gain_reduction_db(level));
    }

    #[test]
    fn test_clamping() {
        let gc = GainComputer::new(-100.0, 0.5, 100.0);
        assert_eq!(gc.threshold_db(), THRESHOLD_MIN_DB);
        assert_eq!(gc.ratio(), RATIO_MIN);
        assert_eq!(gc.knee_db(), KNEE_MAX_DB);
    }

    #[test]
    fn test_knee_presets() {
        assert_eq!(KneeKind::from_width_db(12.0), Some(KneeKind::Medium));
        assert_eq!(KneeKind::from_width_db(5.0), None);
        assert_eq!(KneeKind::default().width_db(), 0.0);
    }
}
