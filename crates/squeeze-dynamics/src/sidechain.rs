//! Sidechain conditioning: filters and level detection.
//!
//! Every channel's detector signal passes an optional high-pass and an
//! optional low-pass (second-order Butterworth), then a peak or RMS level
//! detector. Channels never interact here; stereo linking happens in the
//! compressor after detection.
//!
//! ```text
//! tap ─→ [HPF > 20 Hz] ─→ [LPF < 15 kHz] ─┬─→ detector ─→ linear level
//!                                         └─→ listen output
//! ```
//!
//! Setting a cutoff to its "off" end (20 Hz / 15 kHz) bypasses the filter.
//! Turning a filter on or off clears its history so no stale state leaks in.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec;
use libm::sqrt;
use squeeze_core::{BiquadFilter, clamp_or, coefficients, flush_denormal, settle_coefficient};

/// HPF cutoff at or below which the filter is off.
pub const HPF_OFF_HZ: f64 = 20.0;
/// Highest HPF cutoff.
pub const HPF_MAX_HZ: f64 = 2000.0;
/// Lowest LPF cutoff.
pub const LPF_MIN_HZ: f64 = 500.0;
/// LPF cutoff at or above which the filter is off.
pub const LPF_OFF_HZ: f64 = 15000.0;
/// Shortest RMS window in ms.
pub const RMS_WINDOW_MIN_MS: f64 = 1.0;
/// Longest RMS window in ms.
pub const RMS_WINDOW_MAX_MS: f64 = 200.0;
/// Residual of a mean-square step left after the RMS window.
pub const RMS_RESIDUAL: f64 = 0.1;

/// Filter cutoffs are kept below this fraction of the sample rate.
const MAX_CUTOFF_RATIO: f64 = 0.45;

/// Level detector law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectorKind {
    /// Instantaneous magnitude `|x|`.
    #[default]
    Peak,
    /// Root of a one-pole mean of `x²`.
    Rms,
}

impl DetectorKind {
    /// All kinds, indexed like [`LABELS`](Self::LABELS).
    pub const ALL: [DetectorKind; 2] = [DetectorKind::Peak, DetectorKind::Rms];

    /// Display labels.
    pub const LABELS: &'static [&'static str] = &["Peak", "RMS"];
}

/// Per-channel sidechain filters and detector.
#[derive(Debug, Clone)]
pub struct SidechainProcessor {
    sample_rate: f64,
    hpf: BiquadFilter,
    lpf: BiquadFilter,
    hpf_cutoff: f64,
    lpf_cutoff: f64,
    hpf_enabled: bool,
    lpf_enabled: bool,
    detector: DetectorKind,
    rms_window_ms: f64,
    rms_coef: f64,
    mean_square: Box<[f64]>,
}

impl SidechainProcessor {
    /// Creates a processor for `channels` channels with both filters off
    /// and a peak detector.
    pub fn new(channels: usize, sample_rate: f64) -> Self {
        let mut processor = Self {
            sample_rate,
            hpf: BiquadFilter::new(channels),
            lpf: BiquadFilter::new(channels),
            hpf_cutoff: HPF_OFF_HZ,
            lpf_cutoff: LPF_OFF_HZ,
            hpf_enabled: false,
            lpf_enabled: false,
            detector: DetectorKind::Peak,
            rms_window_ms: 30.0,
            rms_coef: 0.0,
            mean_square: vec![0.0; channels].into_boxed_slice(),
        };
        processor.set_rms_window_ms(30.0);
        processor
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.mean_square.len()
    }

    /// HPF cutoff in Hz.
    pub fn hpf_cutoff(&self) -> f64 {
        self.hpf_cutoff
    }

    /// Whether the HPF is active.
    pub fn hpf_enabled(&self) -> bool {
        self.hpf_enabled
    }

    /// Sets the HPF cutoff, clamped to `20..=2000` Hz; 20 Hz turns it off.
    pub fn set_hpf_cutoff(&mut self, cutoff_hz: f64) {
        self.hpf_cutoff = clamp_or(cutoff_hz, HPF_OFF_HZ, HPF_MAX_HZ, self.hpf_cutoff);
        let enabled = self.hpf_cutoff > HPF_OFF_HZ;

        if enabled {
            let cutoff = self.limit_cutoff(self.hpf_cutoff);
            self.hpf.set(coefficients::high_pass_second_order(
                cutoff,
                self.sample_rate,
                coefficients::BUTTERWORTH_Q,
            ));
        }
        if enabled != self.hpf_enabled {
            self.hpf.reset_delays();
            self.hpf_enabled = enabled;
            #[cfg(feature = "tracing")]
            tracing::debug!("sidechain_hpf: enabled={enabled} cutoff={} Hz", self.hpf_cutoff);
        }
    }

    /// LPF cutoff in Hz.
    pub fn lpf_cutoff(&self) -> f64 {
        self.lpf_cutoff
    }

    /// Whether the LPF is active.
    pub fn lpf_enabled(&self) -> bool {
        self.lpf_enabled
    }

    /// Sets the LPF cutoff, clamped to `500..=15000` Hz; 15 kHz turns it off.
    pub fn set_lpf_cutoff(&mut self, cutoff_hz: f64) {
        self.lpf_cutoff = clamp_or(cutoff_hz, LPF_MIN_HZ, LPF_OFF_HZ, self.lpf_cutoff);
        let enabled = self.lpf_cutoff < LPF_OFF_HZ;

        if enabled {
            let cutoff = self.limit_cutoff(self.lpf_cutoff);
            self.lpf.set(coefficients::low_pass_second_order(
                cutoff,
                self.sample_rate,
                coefficients::BUTTERWORTH_Q,
            ));
        }
        if enabled != self.lpf_enabled {
            self.lpf.reset_delays();
            self.lpf_enabled = enabled;
            #[cfg(feature = "tracing")]
            tracing::debug!("sidechain_lpf: enabled={enabled} cutoff={} Hz", self.lpf_cutoff);
        }
    }

    /// Detector law.
    pub fn detector(&self) -> DetectorKind {
        self.detector
    }

    /// Switches the detector law. The RMS state restarts from silence.
    pub fn set_detector(&mut self, detector: DetectorKind) {
        if detector != self.detector {
            self.detector = detector;
            self.mean_square.fill(0.0);
        }
    }

    /// RMS window in ms.
    pub fn rms_window_ms(&self) -> f64 {
        self.rms_window_ms
    }

    /// Sets the RMS window, clamped to `1..=200` ms.
    pub fn set_rms_window_ms(&mut self, window_ms: f64) {
        self.rms_window_ms = clamp_or(window_ms, RMS_WINDOW_MIN_MS, RMS_WINDOW_MAX_MS, self.rms_window_ms);
        self.rms_coef = settle_coefficient(RMS_RESIDUAL, self.rms_window_ms / 1000.0, self.sample_rate);
    }

    /// Runs `sample` through the enabled filters of `channel`.
    #[inline]
    pub fn filter(&mut self, channel: usize, sample: f64) -> f64 {
        let mut x = sample;
        if self.hpf_enabled {
            x = self.hpf.process_sample(x, channel);
        }
        if self.lpf_enabled {
            x = self.lpf.process_sample(x, channel);
        }
        x
    }

    /// Linear detector level of an already filtered sample.
    #[inline]
    pub fn detect(&mut self, channel: usize, filtered: f64) -> f64 {
        match self.detector {
            DetectorKind::Peak => filtered.abs(),
            DetectorKind::Rms => {
                let state = &mut self.mean_square[channel];
                let square = filtered * filtered;
                *state = flush_denormal(self.rms_coef * (*state - square) + square);
                sqrt(*state)
            }
        }
    }

    /// Clears filter history and detector state.
    pub fn reset(&mut self) {
        self.hpf.reset_delays();
        self.lpf.reset_delays();
        self.mean_square.fill(0.0);
    }

    fn limit_cutoff(&self, cutoff_hz: f64) -> f64 {
        cutoff_hz.min(self.sample_rate * MAX_CUTOFF_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    const SR: f64 = 48000.0;

    fn sine_peak(sc: &mut SidechainProcessor, freq: f64) -> f64 {
        let mut peak: f64 = 0.0;
        for n in 0..9600 {
            let x = sc.filter(0, libm::sin(2.0 * PI * freq * n as f64 / SR));
            if n > 4800 {
                peak = peak.max(x.abs());
            }
        }
        peak
    }

    #[test]
    fn test_filters_off_by_default() {
        let mut sc = SidechainProcessor::new(2, SR);
        assert!(!sc.hpf_enabled());
        assert!(!sc.lpf_enabled());
        assert_eq!(sc.filter(1, 0.375), 0.375);
    }

    #[test]
    fn test_hpf_attenuates_lows() {
        let mut sc = SidechainProcessor::new(1, SR);
        sc.set_hpf_cutoff(1000.0);
        assert!(sc.hpf_enabled());
        assert!(sine_peak(&mut sc, 100.0) < 0.02);
        sc.reset();
        assert!(sine_peak(&mut sc, 8000.0) > 0.95);
    }

    #[test]
    fn test_lpf_attenuates_highs() {
        let mut sc = SidechainProcessor::new(1, SR);
        sc.set_lpf_cutoff(500.0);
        assert!(sc.lpf_enabled());
        assert!(sine_peak(&mut sc, 8000.0) < 0.01);
    }

    #[test]
    fn test_cutoff_clamping_and_off_positions() {
        let mut sc = SidechainProcessor::new(1, SR);
        sc.set_hpf_cutoff(5.0);
        assert_eq!(sc.hpf_cutoff(), HPF_OFF_HZ);
        assert!(!sc.hpf_enabled());
        sc.set_lpf_cutoff(40000.0);
        assert_eq!(sc.lpf_cutoff(), LPF_OFF_HZ);
        assert!(!sc.lpf_enabled());
        sc.set_lpf_cutoff(100.0);
        assert_eq!(sc.lpf_cutoff(), LPF_MIN_HZ);
    }

    #[test]
    fn test_toggle_clears_history() {
        let mut sc = SidechainProcessor::new(1, SR);
        sc.set_hpf_cutoff(200.0);
        let first = sc.filter(0, 1.0);
        for _ in 0..100 {
            sc.filter(0, 1.0);
        }
        sc.set_hpf_cutoff(HPF_OFF_HZ);
        sc.set_hpf_cutoff(200.0);
        assert_eq!(sc.filter(0, 1.0), first);
    }

    #[test]
    fn test_peak_detector() {
        let mut sc = SidechainProcessor::new(1, SR);
        assert_eq!(sc.detect(0, -0.7), 0.7);
    }

    #[test]
    fn test_rms_detector_converges_to_sine_rms() {
        let mut sc = SidechainProcessor::new(1, SR);
        sc.set_detector(DetectorKind::Rms);
        sc.set_rms_window_ms(30.0);
        let mut level = 0.0;
        for n in 0..48000 {
            let x = libm::sin(2.0 * PI * 1000.0 * n as f64 / SR);
            level = sc.detect(0, x);
        }
        assert!((level - core::f64::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn test_rms_window_reaches_90_percent() {
        let mut sc = SidechainProcessor::new(1, 1000.0);
        sc.set_detector(DetectorKind::Rms);
        sc.set_rms_window_ms(50.0);
        let mut level = 0.0;
        for _ in 0..50 {
            level = sc.detect(0, 1.0);
        }
        // mean square reaches 90% of the step within the window
        assert!((level * level - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut sc = SidechainProcessor::new(2, SR);
        sc.set_detector(DetectorKind::Rms);
        sc.detect(0, 1.0);
        assert_eq!(sc.detect(1, 0.0), 0.0);
    }
}
