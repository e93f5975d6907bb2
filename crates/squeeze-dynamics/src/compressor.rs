//! Multichannel compressor with sidechain, stereo link and metering.
//!
//! # Signal Flow
//!
//! ```text
//!            ┌──────────── feed-back tap (previous output) ─────────────┐
//!            │                                                          │
//! sidechain ─┴→ HPF → LPF → detector → link → dB + trim → envelope → stage
//!                  │                                                  │
//!                  └─ listen                                          ↓
//! input ──────────────────────────────────→ × 10^(-gr/20) × makeup → wet/dry → output
//! ```
//!
//! # Parameters
//!
//! | Index | Name | Range | Default |
//! |-------|------|-------|---------|
//! | 0 | Threshold | -48.0–18.0 dB | -12.0 |
//! | 1 | Ratio | 1.0–20.0 | 2.0 |
//! | 2 | Attack | 0.0–500.0 ms | 10.0 |
//! | 3 | Release | 0.0–8000.0 ms | 150.0 |
//! | 4 | Makeup Gain | -24.0–24.0 dB | 0.0 |
//! | 5 | Knee | 0.0–48.0 dB | 0.0 |
//! | 6 | Detector | Peak / RMS | Peak |
//! | 7 | RMS Window | 1.0–200.0 ms | 30.0 |
//! | 8 | Release Curve | Logarithmic / Smooth / Linear | Logarithmic |
//! | 9 | Gain Stage | FET / Optical | FET |
//! | 10 | Design | Feed-Forward / Feed-Back | Feed-Forward |
//! | 11 | Input Trim | -24.0–24.0 dB | 0.0 |
//! | 12 | Auto Makeup | Off / On | Off |
//! | 13 | Mix | 0–100 % | 100 |
//! | 14 | Stereo Link | 0–100 % | 100 |
//! | 15 | External Sidechain | Off / On | Off |
//! | 16 | SC High-Pass | 20–2000 Hz (20 = off) | 20 |
//! | 17 | SC Low-Pass | 500–15000 Hz (15000 = off) | 15000 |
//! | 18 | SC Listen | Off / On | Off |
//! | 19 | Bypass | Off / On | Off |
//!
//! # Tips
//!
//! - **Fast attack** (< 5 ms): catches transients, can sound "squashed"
//! - **Slow attack** (> 20 ms): lets transients through, more natural
//! - **Optical stage**: program-dependent release, gentle on sustained material
//! - **Feed-back design**: smoother, softer response at the cost of precision

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use squeeze_core::{
    ParamDescriptor, ParamId, ParamUnit, clamp_or, db_to_linear, linear_to_db, wet_dry_mix,
};

use crate::gain_computer::{KneeKind, KNEE_MAX_DB, RATIO_MAX, RATIO_MIN, THRESHOLD_MAX_DB, THRESHOLD_MIN_DB};
use crate::gain_reducer::{ATTACK_MAX_MS, GainReducer, RELEASE_MAX_MS, ReleaseCurve};
use crate::gain_stage::{GainStage, GainStageKind};
use crate::meter::{ChannelMeters, MeterBallistics, MeterSnapshot};
use crate::sidechain::{
    DetectorKind, HPF_MAX_HZ, HPF_OFF_HZ, LPF_MIN_HZ, LPF_OFF_HZ, RMS_WINDOW_MAX_MS,
    RMS_WINDOW_MIN_MS, SidechainProcessor,
};

/// Largest supported channel count.
pub const MAX_CHANNELS: usize = 8;

/// Range of input trim and makeup gain, in dB either way.
pub const GAIN_RANGE_DB: f64 = 24.0;

/// Where the sidechain is tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesignKind {
    /// Detector listens to the input (or the external sidechain).
    #[default]
    FeedForward,
    /// Detector listens to the compressor's own previous output.
    FeedBack,
}

impl DesignKind {
    /// All designs, indexed like [`LABELS`](Self::LABELS).
    pub const ALL: [DesignKind; 2] = [DesignKind::FeedForward, DesignKind::FeedBack];

    /// Display labels.
    pub const LABELS: &'static [&'static str] = &["Feed-Forward", "Feed-Back"];
}

/// Multichannel dynamics compressor.
///
/// Channel count and sample rate are fixed at construction; every buffer is
/// sized then, so [`process`](Self::process) never allocates.
///
/// # Example
///
/// ```rust
/// use squeeze_dynamics::Compressor;
///
/// let mut comp = Compressor::new(2, 44100.0);
/// comp.set_threshold_db(-20.0);
/// comp.set_ratio(4.0);
/// comp.set_attack_ms(5.0);
/// comp.set_release_ms(100.0);
///
/// let mut left = vec![0.5_f64; 512];
/// let mut right = vec![0.5_f64; 512];
/// comp.process(&mut [&mut left[..], &mut right[..]], None);
///
/// assert!(comp.gain_reduction_db(0) > 0.0);
/// assert!(left[511] < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    sample_rate: f64,
    reducers: Box<[GainReducer]>,
    stages: Box<[GainStage]>,
    sidechain: SidechainProcessor,
    meters: Box<[ChannelMeters]>,
    ballistics: MeterBallistics,

    // per-channel scratch and memory
    input: Box<[f64]>,
    filtered: Box<[f64]>,
    levels: Box<[f64]>,
    previous_output: Box<[f64]>,
    gain_reduction: Box<[f64]>,
    gain_reduction_with_makeup: Box<[f64]>,

    design: DesignKind,
    input_trim_db: f64,
    makeup_db: f64,
    makeup_gain: f64,
    auto_makeup: bool,
    wet_mix: f64,
    stereo_link: f64,
    sidechain_external: bool,
    listen: bool,
    bypass: bool,
}

impl Compressor {
    /// Creates a compressor with default settings.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= channels <= MAX_CHANNELS` and `sample_rate > 0`.
    pub fn new(channels: usize, sample_rate: f64) -> Self {
        assert!(
            (1..=MAX_CHANNELS).contains(&channels),
            "channel count must be within 1..={MAX_CHANNELS}, got {channels}"
        );
        assert!(sample_rate > 0.0, "sample rate must be positive, got {sample_rate}");

        #[cfg(feature = "tracing")]
        tracing::debug!("compressor_new: {channels} channels at {sample_rate} Hz");

        let ballistics = MeterBallistics::default();
        let reducers: Vec<GainReducer> = (0..channels).map(|_| GainReducer::new(sample_rate)).collect();
        let stages: Vec<GainStage> = (0..channels).map(|_| GainStage::new(sample_rate)).collect();
        let meters: Vec<ChannelMeters> = (0..channels)
            .map(|_| ChannelMeters::new(sample_rate, &ballistics))
            .collect();

        Self {
            sample_rate,
            reducers: reducers.into_boxed_slice(),
            stages: stages.into_boxed_slice(),
            sidechain: SidechainProcessor::new(channels, sample_rate),
            meters: meters.into_boxed_slice(),
            ballistics,
            input: vec![0.0; channels].into_boxed_slice(),
            filtered: vec![0.0; channels].into_boxed_slice(),
            levels: vec![0.0; channels].into_boxed_slice(),
            previous_output: vec![0.0; channels].into_boxed_slice(),
            gain_reduction: vec![0.0; channels].into_boxed_slice(),
            gain_reduction_with_makeup: vec![0.0; channels].into_boxed_slice(),
            design: DesignKind::FeedForward,
            input_trim_db: 0.0,
            makeup_db: 0.0,
            makeup_gain: 1.0,
            auto_makeup: false,
            wet_mix: 100.0,
            stereo_link: 100.0,
            sidechain_external: false,
            listen: false,
            bypass: false,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.input.len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    // --- gain curve ---

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f64 {
        self.reducers[0].threshold_db()
    }

    /// Sets the threshold, clamped to `-48..=18` dB.
    pub fn set_threshold_db(&mut self, threshold_db: f64) {
        let value = clamp_or(threshold_db, THRESHOLD_MIN_DB, THRESHOLD_MAX_DB, self.threshold_db());
        self.reducers.iter_mut().for_each(|r| r.set_threshold_db(value));
    }

    /// Ratio.
    pub fn ratio(&self) -> f64 {
        self.reducers[0].ratio()
    }

    /// Sets the ratio, clamped to `1..=20`.
    pub fn set_ratio(&mut self, ratio: f64) {
        let value = clamp_or(ratio, RATIO_MIN, RATIO_MAX, self.ratio());
        self.reducers.iter_mut().for_each(|r| r.set_ratio(value));
    }

    /// Knee width in dB.
    pub fn knee_db(&self) -> f64 {
        self.reducers[0].knee_db()
    }

    /// Sets the knee width, clamped to `0..=48` dB.
    pub fn set_knee_db(&mut self, knee_db: f64) {
        let value = clamp_or(knee_db, 0.0, KNEE_MAX_DB, self.knee_db());
        self.reducers.iter_mut().for_each(|r| r.set_knee_db(value));
    }

    /// Knee preset matching the current width, if any.
    pub fn knee(&self) -> Option<KneeKind> {
        KneeKind::from_width_db(self.knee_db())
    }

    /// Selects a knee preset.
    pub fn set_knee(&mut self, knee: KneeKind) {
        self.set_knee_db(knee.width_db());
    }

    // --- envelope ---

    /// Attack time in ms.
    pub fn attack_ms(&self) -> f64 {
        self.reducers[0].attack_ms()
    }

    /// Sets the attack time, clamped to `0..=500` ms.
    pub fn set_attack_ms(&mut self, attack_ms: f64) {
        let value = clamp_or(attack_ms, 0.0, ATTACK_MAX_MS, self.attack_ms());
        self.reducers.iter_mut().for_each(|r| r.set_attack_ms(value));
    }

    /// Release time in ms.
    pub fn release_ms(&self) -> f64 {
        self.reducers[0].release_ms()
    }

    /// Sets the release time, clamped to `0..=8000` ms.
    pub fn set_release_ms(&mut self, release_ms: f64) {
        let value = clamp_or(release_ms, 0.0, RELEASE_MAX_MS, self.release_ms());
        self.reducers.iter_mut().for_each(|r| r.set_release_ms(value));
    }

    /// Release curve.
    pub fn release_curve(&self) -> ReleaseCurve {
        self.reducers[0].release_curve()
    }

    /// Selects the release curve.
    pub fn set_release_curve(&mut self, curve: ReleaseCurve) {
        if curve != self.release_curve() {
            #[cfg(feature = "tracing")]
            tracing::debug!("compressor_release_curve: {curve:?}");
            self.reducers.iter_mut().for_each(|r| r.set_release_curve(curve));
        }
    }

    /// Gain-stage character.
    pub fn gain_stage(&self) -> GainStageKind {
        self.stages[0].kind()
    }

    /// Selects the gain stage; the current reduction carries over.
    pub fn set_gain_stage(&mut self, kind: GainStageKind) {
        if kind != self.gain_stage() {
            #[cfg(feature = "tracing")]
            tracing::debug!("compressor_gain_stage: {kind:?}");
            self.stages.iter_mut().for_each(|s| s.set_kind(kind));
        }
    }

    /// Sidechain tap design.
    pub fn design(&self) -> DesignKind {
        self.design
    }

    /// Selects the sidechain tap design.
    pub fn set_design(&mut self, design: DesignKind) {
        if design != self.design {
            #[cfg(feature = "tracing")]
            tracing::debug!("compressor_design: {design:?}");
            self.design = design;
        }
    }

    // --- sidechain ---

    /// Detector law.
    pub fn detector(&self) -> DetectorKind {
        self.sidechain.detector()
    }

    /// Selects the detector law.
    pub fn set_detector(&mut self, detector: DetectorKind) {
        self.sidechain.set_detector(detector);
    }

    /// RMS window in ms.
    pub fn rms_window_ms(&self) -> f64 {
        self.sidechain.rms_window_ms()
    }

    /// Sets the RMS window, clamped to `1..=200` ms.
    pub fn set_rms_window_ms(&mut self, window_ms: f64) {
        self.sidechain.set_rms_window_ms(window_ms);
    }

    /// Whether the external sidechain feeds the detector.
    pub fn sidechain_external(&self) -> bool {
        self.sidechain_external
    }

    /// Routes the detector to the external sidechain input.
    pub fn set_sidechain_external(&mut self, external: bool) {
        self.sidechain_external = external;
    }

    /// Sidechain high-pass cutoff in Hz.
    pub fn sidechain_hpf_hz(&self) -> f64 {
        self.sidechain.hpf_cutoff()
    }

    /// Sets the sidechain high-pass cutoff, clamped to `20..=2000` Hz.
    pub fn set_sidechain_hpf_hz(&mut self, cutoff_hz: f64) {
        self.sidechain.set_hpf_cutoff(cutoff_hz);
    }

    /// Sidechain low-pass cutoff in Hz.
    pub fn sidechain_lpf_hz(&self) -> f64 {
        self.sidechain.lpf_cutoff()
    }

    /// Sets the sidechain low-pass cutoff, clamped to `500..=15000` Hz.
    pub fn set_sidechain_lpf_hz(&mut self, cutoff_hz: f64) {
        self.sidechain.set_lpf_cutoff(cutoff_hz);
    }

    /// Whether the output is the filtered sidechain.
    pub fn sidechain_listen(&self) -> bool {
        self.listen
    }

    /// Replaces the output with the filtered sidechain signal.
    pub fn set_sidechain_listen(&mut self, listen: bool) {
        self.listen = listen;
    }

    // --- output ---

    /// Input trim in dB, applied to the detector level.
    pub fn input_trim_db(&self) -> f64 {
        self.input_trim_db
    }

    /// Sets the input trim, clamped to `-24..=24` dB.
    pub fn set_input_trim_db(&mut self, trim_db: f64) {
        self.input_trim_db = clamp_or(trim_db, -GAIN_RANGE_DB, GAIN_RANGE_DB, self.input_trim_db);
    }

    /// Makeup gain in dB.
    pub fn makeup_gain_db(&self) -> f64 {
        self.makeup_db
    }

    /// Sets the makeup gain, clamped to `-24..=24` dB.
    pub fn set_makeup_gain_db(&mut self, gain_db: f64) {
        self.makeup_db = clamp_or(gain_db, -GAIN_RANGE_DB, GAIN_RANGE_DB, self.makeup_db);
        self.makeup_gain = db_to_linear(self.makeup_db);
    }

    /// Whether auto makeup is applied.
    pub fn auto_makeup(&self) -> bool {
        self.auto_makeup
    }

    /// Compensates the reduction the curve applies at -20 dB.
    pub fn set_auto_makeup(&mut self, enabled: bool) {
        self.auto_makeup = enabled;
    }

    /// Gain the auto makeup adds, in dB.
    pub fn auto_makeup_db(&self) -> f64 {
        self.reducers[0].gain_compensation()
    }

    /// Wet mix in percent.
    pub fn wet_mix(&self) -> f64 {
        self.wet_mix
    }

    /// Sets the wet mix, clamped to `0..=100` %.
    pub fn set_wet_mix(&mut self, percent: f64) {
        self.wet_mix = clamp_or(percent, 0.0, 100.0, self.wet_mix);
    }

    /// Stereo link in percent.
    pub fn stereo_link(&self) -> f64 {
        self.stereo_link
    }

    /// Sets the stereo link, clamped to `0..=100` %.
    pub fn set_stereo_link(&mut self, percent: f64) {
        self.stereo_link = clamp_or(percent, 0.0, 100.0, self.stereo_link);
    }

    /// Whether the compressor is bypassed.
    pub fn bypass(&self) -> bool {
        self.bypass
    }

    /// Bypasses processing; meters keep running.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    // --- meters ---

    /// Meter ballistics in use.
    pub fn meter_ballistics(&self) -> MeterBallistics {
        self.ballistics
    }

    /// Applies new meter ballistics to every channel.
    pub fn set_meter_ballistics(&mut self, ballistics: MeterBallistics) {
        self.ballistics = ballistics;
        self.meters.iter_mut().for_each(|m| m.set_ballistics(&ballistics));
    }

    /// Meters of `channel`.
    pub fn meters(&self, channel: usize) -> &ChannelMeters {
        &self.meters[channel]
    }

    /// Every meter value of `channel`.
    pub fn meter_snapshot(&self, channel: usize) -> MeterSnapshot {
        self.meters[channel].snapshot()
    }

    /// Reduction applied to the last sample of `channel`, in dB.
    pub fn gain_reduction_db(&self, channel: usize) -> f64 {
        self.meters[channel].gain_reduction.gain_reduction_db()
    }

    /// Held peak reduction of `channel`, in dB.
    pub fn gain_reduction_peak_db(&self, channel: usize) -> f64 {
        self.meters[channel].gain_reduction.peak_db()
    }

    /// Input peak level of `channel`, in dB.
    pub fn input_peak_db(&self, channel: usize) -> f64 {
        self.meters[channel].input_peak.level_db()
    }

    /// Input peak-hold marker of `channel`, in dB.
    pub fn input_peak_hold_db(&self, channel: usize) -> f64 {
        self.meters[channel].input_peak.peak_hold_db()
    }

    /// Highest input level of `channel` since the meters were reset.
    pub fn input_max_db(&self, channel: usize) -> f64 {
        self.meters[channel].input_peak.max_db()
    }

    /// Input average level of `channel`, in dB.
    pub fn input_average_db(&self, channel: usize) -> f64 {
        self.meters[channel].input_average.level_db()
    }

    /// Output peak level of `channel`, in dB.
    pub fn output_peak_db(&self, channel: usize) -> f64 {
        self.meters[channel].output_peak.level_db()
    }

    /// Output peak-hold marker of `channel`, in dB.
    pub fn output_peak_hold_db(&self, channel: usize) -> f64 {
        self.meters[channel].output_peak.peak_hold_db()
    }

    /// Highest output level of `channel` since the meters were reset.
    pub fn output_max_db(&self, channel: usize) -> f64 {
        self.meters[channel].output_peak.max_db()
    }

    /// Output average level of `channel`, in dB.
    pub fn output_average_db(&self, channel: usize) -> f64 {
        self.meters[channel].output_average.level_db()
    }

    /// Clears every meter. Audio state is untouched.
    pub fn reset_meters(&mut self) {
        self.meters.iter_mut().for_each(ChannelMeters::reset);
    }

    /// Clears envelopes, filters, detector and feed-back memory, then the
    /// meters. Settings are kept.
    pub fn reset(&mut self) {
        self.reducers.iter_mut().for_each(GainReducer::reset);
        self.stages.iter_mut().for_each(|s| s.reset(0.0));
        self.sidechain.reset();
        self.previous_output.fill(0.0);
        self.gain_reduction.fill(0.0);
        self.gain_reduction_with_makeup.fill(0.0);
        self.reset_meters();
    }

    // --- processing ---

    /// Compresses `main` in place.
    ///
    /// `main` holds one slice per channel, all of the same length.
    /// `sidechain`, when given, holds one slice per channel at least as long;
    /// `None` makes the external sidechain alias the main input.
    ///
    /// # Panics
    ///
    /// Panics if the channel counts do not match or a sidechain slice is
    /// shorter than the main block.
    pub fn process(&mut self, main: &mut [&mut [f64]], sidechain: Option<&[&[f64]]>) {
        let channels = self.channels();
        assert_eq!(main.len(), channels, "main buffer channel count");
        let frames = main[0].len();
        debug_assert!(main.iter().all(|c| c.len() == frames));
        if let Some(sc) = sidechain {
            assert_eq!(sc.len(), channels, "sidechain buffer channel count");
            assert!(sc.iter().all(|c| c.len() >= frames), "sidechain shorter than main block");
        }

        let mix = self.wet_mix / 100.0;
        let bypassed = self.bypass || self.wet_mix == 0.0;
        // Full link drives every channel with the mean over all channels.
        let weight_other = if channels > 1 {
            self.stereo_link / 100.0 * (channels - 1) as f64 / channels as f64
        } else {
            0.0
        };
        let weight_own = 1.0 - weight_other;
        let link = channels > 1 && weight_other > 0.0;

        for frame in 0..frames {
            for (ch, buffer) in main.iter().enumerate() {
                self.input[ch] = buffer[frame];
            }

            if bypassed {
                for ch in 0..channels {
                    let x = self.input[ch];
                    self.gain_reduction[ch] = 0.0;
                    self.gain_reduction_with_makeup[ch] = 0.0;
                    self.meters[ch].update(x, x, 0.0);
                }
                continue;
            }

            for ch in 0..channels {
                let external = match sidechain {
                    Some(sc) => sc[ch][frame],
                    None => self.input[ch],
                };
                let tap = match (self.design, self.sidechain_external) {
                    (DesignKind::FeedForward, true) => external,
                    (DesignKind::FeedForward, false) => self.input[ch],
                    (DesignKind::FeedBack, true) => {
                        external * db_to_linear(-self.gain_reduction_with_makeup[ch])
                    }
                    (DesignKind::FeedBack, false) => self.previous_output[ch],
                };
                let filtered = self.sidechain.filter(ch, tap);
                self.filtered[ch] = filtered;
                self.levels[ch] = self.sidechain.detect(ch, filtered);
            }

            let level_sum: f64 = if link { self.levels.iter().sum() } else { 0.0 };

            for ch in 0..channels {
                let own = self.levels[ch];
                let level = if link {
                    let others = (level_sum - own) / (channels - 1) as f64;
                    own * weight_own + others * weight_other
                } else {
                    own
                };

                let level_db = linear_to_db(level) + self.input_trim_db;
                let reducer = &mut self.reducers[ch];
                let smoothed = reducer.process_level(level_db);
                let gr = self.stages[ch].process(smoothed, reducer.target());
                let gr_with_makeup = gr - reducer.gain_compensation();
                self.gain_reduction[ch] = gr;
                self.gain_reduction_with_makeup[ch] = gr_with_makeup;

                let applied = if self.auto_makeup { gr_with_makeup } else { gr };
                let x = self.input[ch];
                let compressed = x * db_to_linear(-applied) * self.makeup_gain;
                self.previous_output[ch] = compressed;

                let out = if self.listen {
                    self.filtered[ch]
                } else {
                    wet_dry_mix(x, compressed, mix)
                };
                main[ch][frame] = out;
                self.meters[ch].update(x, out, gr);
            }
        }
    }
}

/// Rounds a selector value to a valid index below `count`.
#[inline]
fn choice_index(value: f64, count: usize) -> usize {
    let max = (count - 1) as f64;
    libm::round(value).clamp(0.0, max) as usize
}

#[inline]
fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

squeeze_core::impl_params! {
    Compressor, this {
        [0] ParamDescriptor::gain_db("Threshold", "Thresh", THRESHOLD_MIN_DB, THRESHOLD_MAX_DB, -12.0)
                .with_id(ParamId(300), "comp_thresh"),
            get: this.threshold_db(),
            set: |v| this.set_threshold_db(v);

        [1] ParamDescriptor {
                unit: ParamUnit::Ratio,
                step: 0.1,
                ..ParamDescriptor::custom("Ratio", "Ratio", RATIO_MIN, RATIO_MAX, 2.0)
            }
            .with_id(ParamId(301), "comp_ratio"),
            get: this.ratio(),
            set: |v| this.set_ratio(v);

        [2] ParamDescriptor {
                step: 0.1,
                ..ParamDescriptor::time_ms("Attack", "Attack", 0.0, ATTACK_MAX_MS, 10.0)
            }
            .with_id(ParamId(302), "comp_attack"),
            get: this.attack_ms(),
            set: |v| this.set_attack_ms(v);

        [3] ParamDescriptor::time_ms("Release", "Release", 0.0, RELEASE_MAX_MS, 150.0)
                .with_id(ParamId(303), "comp_release"),
            get: this.release_ms(),
            set: |v| this.set_release_ms(v);

        [4] ParamDescriptor::gain_db("Makeup Gain", "Makeup", -GAIN_RANGE_DB, GAIN_RANGE_DB, 0.0)
                .with_id(ParamId(304), "comp_makeup"),
            get: this.makeup_gain_db(),
            set: |v| this.set_makeup_gain_db(v);

        [5] ParamDescriptor::gain_db("Knee", "Knee", 0.0, KNEE_MAX_DB, 0.0)
                .with_id(ParamId(305), "comp_knee"),
            get: this.knee_db(),
            set: |v| this.set_knee_db(v);

        [6] ParamDescriptor::choice("Detector", "Detect", DetectorKind::LABELS, 0)
                .with_id(ParamId(306), "comp_detector"),
            get: this.detector() as usize as f64,
            set: |v| this.set_detector(DetectorKind::ALL[choice_index(v, DetectorKind::ALL.len())]);

        [7] ParamDescriptor::time_ms("RMS Window", "RMS Win", RMS_WINDOW_MIN_MS, RMS_WINDOW_MAX_MS, 30.0)
                .with_id(ParamId(307), "comp_rms_window"),
            get: this.rms_window_ms(),
            set: |v| this.set_rms_window_ms(v);

        [8] ParamDescriptor::choice("Release Curve", "Curve", ReleaseCurve::LABELS, 0)
                .with_id(ParamId(308), "comp_curve"),
            get: this.release_curve() as usize as f64,
            set: |v| this.set_release_curve(ReleaseCurve::ALL[choice_index(v, ReleaseCurve::ALL.len())]);

        [9] ParamDescriptor::choice("Gain Stage", "Stage", GainStageKind::LABELS, 0)
                .with_id(ParamId(309), "comp_stage"),
            get: this.gain_stage() as usize as f64,
            set: |v| this.set_gain_stage(GainStageKind::ALL[choice_index(v, GainStageKind::ALL.len())]);

        [10] ParamDescriptor::choice("Design", "Design", DesignKind::LABELS, 0)
                .with_id(ParamId(310), "comp_design"),
            get: this.design() as usize as f64,
            set: |v| this.set_design(DesignKind::ALL[choice_index(v, DesignKind::ALL.len())]);

        [11] ParamDescriptor::gain_db("Input Trim", "Trim", -GAIN_RANGE_DB, GAIN_RANGE_DB, 0.0)
                .with_id(ParamId(311), "comp_trim"),
            get: this.input_trim_db(),
            set: |v| this.set_input_trim_db(v);

        [12] ParamDescriptor::toggle("Auto Makeup", "Auto", false)
                .with_id(ParamId(312), "comp_auto_makeup"),
            get: flag(this.auto_makeup()),
            set: |v| this.set_auto_makeup(v >= 0.5);

        [13] ParamDescriptor { default: 100.0, ..ParamDescriptor::mix() }
                .with_id(ParamId(313), "comp_mix"),
            get: this.wet_mix(),
            set: |v| this.set_wet_mix(v);

        [14] ParamDescriptor {
                unit: ParamUnit::Percent,
                step: 1.0,
                ..ParamDescriptor::custom("Stereo Link", "Link", 0.0, 100.0, 100.0)
            }
            .with_id(ParamId(314), "comp_link"),
            get: this.stereo_link(),
            set: |v| this.set_stereo_link(v);

        [15] ParamDescriptor::toggle("External Sidechain", "Ext SC", false)
                .with_id(ParamId(315), "comp_sc_external"),
            get: flag(this.sidechain_external()),
            set: |v| this.set_sidechain_external(v >= 0.5);

        [16] ParamDescriptor::frequency_hz("SC High-Pass", "SC HPF", HPF_OFF_HZ, HPF_MAX_HZ, HPF_OFF_HZ)
                .with_id(ParamId(316), "comp_sc_hpf"),
            get: this.sidechain_hpf_hz(),
            set: |v| this.set_sidechain_hpf_hz(v);

        [17] ParamDescriptor::frequency_hz("SC Low-Pass", "SC LPF", LPF_MIN_HZ, LPF_OFF_HZ, LPF_OFF_HZ)
                .with_id(ParamId(317), "comp_sc_lpf"),
            get: this.sidechain_lpf_hz(),
            set: |v| this.set_sidechain_lpf_hz(v);

        [18] ParamDescriptor::toggle("SC Listen", "Listen", false)
                .with_id(ParamId(318), "comp_sc_listen"),
            get: flag(this.sidechain_listen()),
            set: |v| this.set_sidechain_listen(v >= 0.5);

        [19] ParamDescriptor::toggle("Bypass", "Bypass", false)
                .with_id(ParamId(319), "comp_bypass"),
            get: flag(this.bypass()),
            set: |v| this.set_bypass(v >= 0.5);
    }
}
