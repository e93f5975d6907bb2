//! Meter ballistics for input/output level and gain-reduction display.
//!
//! Meters observe the audio path and never feed back into it. Each meter is
//! updated once per sample; getters return the last computed state.
//!
//! | Meter | Rise | Fall |
//! |-------|------|------|
//! | [`PeakMeter`] level | instant | linear, `decay_db_per_s` |
//! | [`PeakMeter`] hold marker | instant | held `hold_ms`, then linear |
//! | [`AverageMeter`] | one-pole on x², 99% in `inertia_ms` | same |
//! | [`GainReductionMeter`] peak | instant | held `hold_ms`, then linear |

use squeeze_core::{MIN_DECIBEL, flush_denormal, linear_to_db, power_to_db, settle_coefficient};

/// Residual of a step left after the average meter's inertia.
pub const AVERAGE_RESIDUAL: f64 = 0.01;

/// Ballistics shared by every meter of a compressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterBallistics {
    /// Time a peak marker holds before it falls, in ms.
    pub hold_ms: f64,
    /// Fall rate in dB per second.
    pub decay_db_per_s: f64,
    /// Time for the average meter to reach 99% of a step, in ms.
    pub inertia_ms: f64,
}

impl Default for MeterBallistics {
    fn default() -> Self {
        Self {
            hold_ms: 1000.0,
            decay_db_per_s: 26.0,
            inertia_ms: 300.0,
        }
    }
}

/// Snapshot of one meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    /// Current meter level in dB.
    pub level_db: f64,
    /// Held peak marker in dB.
    pub peak_db: f64,
    /// Time left before the marker starts to fall, in ms.
    pub hold_remaining_ms: f64,
}

/// Hold-then-fall marker over a dB value.
#[derive(Debug, Clone)]
struct HoldMarker {
    value: f64,
    floor: f64,
    hold_samples: u64,
    remaining: u64,
    decay_per_sample: f64,
}

impl HoldMarker {
    fn new(floor: f64) -> Self {
        Self {
            value: floor,
            floor,
            hold_samples: 0,
            remaining: 0,
            decay_per_sample: 0.0,
        }
    }

    fn configure(&mut self, ballistics: &MeterBallistics, sample_rate: f64) {
        self.hold_samples = (ballistics.hold_ms.max(0.0) / 1000.0 * sample_rate) as u64;
        self.remaining = self.remaining.min(self.hold_samples);
        self.decay_per_sample = ballistics.decay_db_per_s.max(0.0) / sample_rate;
    }

    #[inline]
    fn update(&mut self, value: f64) {
        if value >= self.value {
            self.value = value;
            self.remaining = self.hold_samples;
        } else if self.remaining > 0 {
            self.remaining -= 1;
        } else {
            self.value = (self.value - self.decay_per_sample).max(value);
        }
    }

    fn reset(&mut self) {
        self.value = self.floor;
        self.remaining = 0;
    }
}

/// Peak level meter with a hold marker and a running maximum.
#[derive(Debug, Clone)]
pub struct PeakMeter {
    sample_rate: f64,
    level_db: f64,
    decay_per_sample: f64,
    marker: HoldMarker,
    max_db: f64,
}

impl PeakMeter {
    /// Creates a silent meter.
    pub fn new(sample_rate: f64, ballistics: &MeterBallistics) -> Self {
        let mut meter = Self {
            sample_rate,
            level_db: MIN_DECIBEL,
            decay_per_sample: 0.0,
            marker: HoldMarker::new(MIN_DECIBEL),
            max_db: MIN_DECIBEL,
        };
        meter.set_ballistics(ballistics);
        meter
    }

    /// Applies new hold and decay settings without clearing the reading.
    pub fn set_ballistics(&mut self, ballistics: &MeterBallistics) {
        self.decay_per_sample = ballistics.decay_db_per_s.max(0.0) / self.sample_rate;
        self.marker.configure(ballistics, self.sample_rate);
    }

    /// Feeds one linear sample.
    #[inline]
    pub fn update(&mut self, sample: f64) {
        let db = linear_to_db(sample);
        self.level_db = if db >= self.level_db {
            db
        } else {
            (self.level_db - self.decay_per_sample).max(db)
        };
        self.marker.update(db);
        if db > self.max_db {
            self.max_db = db;
        }
    }

    /// Current level in dB.
    pub fn level_db(&self) -> f64 {
        self.level_db
    }

    /// Held peak in dB.
    pub fn peak_hold_db(&self) -> f64 {
        self.marker.value
    }

    /// Highest level since the last reset, in dB.
    pub fn max_db(&self) -> f64 {
        self.max_db
    }

    /// Snapshot of the meter.
    pub fn reading(&self) -> MeterReading {
        MeterReading {
            level_db: self.level_db,
            peak_db: self.marker.value,
            hold_remaining_ms: self.marker.remaining as f64 * 1000.0 / self.sample_rate,
        }
    }

    /// Returns the meter to silence and clears the maximum.
    pub fn reset(&mut self) {
        self.level_db = MIN_DECIBEL;
        self.marker.reset();
        self.max_db = MIN_DECIBEL;
    }
}

/// Average (RMS) level meter.
#[derive(Debug, Clone)]
pub struct AverageMeter {
    sample_rate: f64,
    coef: f64,
    mean_square: f64,
}

impl AverageMeter {
    /// Creates a silent meter.
    pub fn new(sample_rate: f64, ballistics: &MeterBallistics) -> Self {
        let mut meter = Self {
            sample_rate,
            coef: 0.0,
            mean_square: 0.0,
        };
        meter.set_ballistics(ballistics);
        meter
    }

    /// Applies a new inertia without clearing the reading.
    pub fn set_ballistics(&mut self, ballistics: &MeterBallistics) {
        self.coef = settle_coefficient(AVERAGE_RESIDUAL, ballistics.inertia_ms / 1000.0, self.sample_rate);
    }

    /// Feeds one linear sample.
    #[inline]
    pub fn update(&mut self, sample: f64) {
        let square = sample * sample;
        self.mean_square = flush_denormal(self.coef * (self.mean_square - square) + square);
    }

    /// Average level in dB.
    pub fn level_db(&self) -> f64 {
        power_to_db(self.mean_square)
    }

    /// Returns the meter to silence.
    pub fn reset(&mut self) {
        self.mean_square = 0.0;
    }
}

/// Gain-reduction meter with a hold marker.
///
/// Values are positive dB of reduction; the marker falls towards zero.
#[derive(Debug, Clone)]
pub struct GainReductionMeter {
    sample_rate: f64,
    current: f64,
    marker: HoldMarker,
}

impl GainReductionMeter {
    /// Creates a meter reading no reduction.
    pub fn new(sample_rate: f64, ballistics: &MeterBallistics) -> Self {
        let mut meter = Self {
            sample_rate,
            current: 0.0,
            marker: HoldMarker::new(0.0),
        };
        meter.set_ballistics(ballistics);
        meter
    }

    /// Applies new hold and decay settings without clearing the reading.
    pub fn set_ballistics(&mut self, ballistics: &MeterBallistics) {
        self.marker.configure(ballistics, self.sample_rate);
    }

    /// Feeds the reduction applied to one sample.
    #[inline]
    pub fn update(&mut self, gain_reduction_db: f64) {
        self.current = gain_reduction_db;
        self.marker.update(gain_reduction_db);
    }

    /// Reduction applied to the last sample.
    pub fn gain_reduction_db(&self) -> f64 {
        self.current
    }

    /// Held peak reduction.
    pub fn peak_db(&self) -> f64 {
        self.marker.value
    }

    /// Snapshot of the meter.
    pub fn reading(&self) -> MeterReading {
        MeterReading {
            level_db: self.current,
            peak_db: self.marker.value,
            hold_remaining_ms: self.marker.remaining as f64 * 1000.0 / self.sample_rate,
        }
    }

    /// Returns the meter to zero.
    pub fn reset(&mut self) {
        self.current = 0.0;
        self.marker.reset();
    }
}

/// Every value a display needs for one channel, in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSnapshot {
    /// Input peak level.
    pub input_peak_db: f64,
    /// Input peak-hold marker.
    pub input_peak_hold_db: f64,
    /// Highest input level since reset.
    pub input_max_db: f64,
    /// Input average level.
    pub input_average_db: f64,
    /// Output peak level.
    pub output_peak_db: f64,
    /// Output peak-hold marker.
    pub output_peak_hold_db: f64,
    /// Highest output level since reset.
    pub output_max_db: f64,
    /// Output average level.
    pub output_average_db: f64,
    /// Reduction applied to the last sample.
    pub gain_reduction_db: f64,
    /// Held peak reduction.
    pub gain_reduction_peak_db: f64,
}

impl Default for MeterSnapshot {
    fn default() -> Self {
        Self {
            input_peak_db: MIN_DECIBEL,
            input_peak_hold_db: MIN_DECIBEL,
            input_max_db: MIN_DECIBEL,
            input_average_db: MIN_DECIBEL,
            output_peak_db: MIN_DECIBEL,
            output_peak_hold_db: MIN_DECIBEL,
            output_max_db: MIN_DECIBEL,
            output_average_db: MIN_DECIBEL,
            gain_reduction_db: 0.0,
            gain_reduction_peak_db: 0.0,
        }
    }
}

/// Every meter of one channel.
#[derive(Debug, Clone)]
pub struct ChannelMeters {
    /// Input peak.
    pub input_peak: PeakMeter,
    /// Output peak.
    pub output_peak: PeakMeter,
    /// Input average.
    pub input_average: AverageMeter,
    /// Output average.
    pub output_average: AverageMeter,
    /// Applied gain reduction.
    pub gain_reduction: GainReductionMeter,
}

impl ChannelMeters {
    /// Creates silent meters.
    pub fn new(sample_rate: f64, ballistics: &MeterBallistics) -> Self {
        Self {
            input_peak: PeakMeter::new(sample_rate, ballistics),
            output_peak: PeakMeter::new(sample_rate, ballistics),
            input_average: AverageMeter::new(sample_rate, ballistics),
            output_average: AverageMeter::new(sample_rate, ballistics),
            gain_reduction: GainReductionMeter::new(sample_rate, ballistics),
        }
    }

    /// Feeds one sample frame of this channel.
    #[inline]
    pub fn update(&mut self, input: f64, output: f64, gain_reduction_db: f64) {
        self.input_peak.update(input);
        self.output_peak.update(output);
        self.input_average.update(input);
        self.output_average.update(output);
        self.gain_reduction.update(gain_reduction_db);
    }

    /// Applies new ballistics to every meter.
    pub fn set_ballistics(&mut self, ballistics: &MeterBallistics) {
        self.input_peak.set_ballistics(ballistics);
        self.output_peak.set_ballistics(ballistics);
        self.input_average.set_ballistics(ballistics);
        self.output_average.set_ballistics(ballistics);
        self.gain_reduction.set_ballistics(ballistics);
    }

    /// Current values of every meter.
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            input_peak_db: self.input_peak.level_db(),
            input_peak_hold_db: self.input_peak.peak_hold_db(),
            input_max_db: self.input_peak.max_db(),
            input_average_db: self.input_average.level_db(),
            output_peak_db: self.output_peak.level_db(),
            output_peak_hold_db: self.output_peak.peak_hold_db(),
            output_max_db: self.output_peak.max_db(),
            output_average_db: self.output_average.level_db(),
            gain_reduction_db: self.gain_reduction.gain_reduction_db(),
            gain_reduction_peak_db: self.gain_reduction.peak_db(),
        }
    }

    /// Clears every meter.
    pub fn reset(&mut self) {
        self.input_peak.reset();
        self.output_peak.reset();
        self.input_average.reset();
        self.output_average.reset();
        self.gain_reduction.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 1000.0;

    #[test]
    fn test_peak_meter_instant_attack() {
        let mut meter = PeakMeter::new(SR, &MeterBallistics::default());
        meter.update(0.5);
        assert!((meter.level_db() - linear_to_db(0.5)).abs() < 1e-12);
        assert_eq!(meter.peak_hold_db(), meter.level_db());
    }

    #[test]
    fn test_peak_hold_then_linear_decay() {
        let ballistics = MeterBallistics::default();
        let mut meter = PeakMeter::new(SR, &ballistics);
        meter.update(1.0);

        // 1000 ms hold at 1 kHz
        for _ in 0..1000 {
            meter.update(0.0);
        }
        assert_eq!(meter.peak_hold_db(), 0.0);
        assert_eq!(meter.reading().hold_remaining_ms, 0.0);

        // 26 dB/s
        for _ in 0..500 {
            meter.update(0.0);
        }
        assert!((meter.peak_hold_db() + 13.0).abs() < 1e-9);
        // the level bar falls straight away
        assert!((meter.level_db() + 26.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_peak_meter_never_falls_below_input() {
        let mut meter = PeakMeter::new(SR, &MeterBallistics::default());
        meter.update(1.0);
        for _ in 0..5000 {
            meter.update(0.1);
        }
        assert!((meter.level_db() + 20.0).abs() < 1e-9);
        assert!((meter.peak_hold_db() + 20.0).abs() < 1e-9);
        assert_eq!(meter.max_db(), 0.0);
    }

    #[test]
    fn test_average_meter_reaches_99_percent() {
        let mut meter = AverageMeter::new(SR, &MeterBallistics::default());
        for _ in 0..300 {
            meter.update(1.0);
        }
        assert!((meter.level_db() - power_to_db(0.99)).abs() < 1e-9);
    }

    #[test]
    fn test_average_meter_settles_to_exact_silence() {
        let mut meter = AverageMeter::new(SR, &MeterBallistics::default());
        meter.update(1.0);
        for _ in 0..10_000 {
            meter.update(0.0);
        }
        assert_eq!(meter.mean_square, 0.0);
        assert_eq!(meter.level_db(), MIN_DECIBEL);
    }

    #[test]
    fn test_gain_reduction_meter_hold() {
        let mut meter = GainReductionMeter::new(SR, &MeterBallistics::default());
        meter.update(6.0);
        meter.update(1.0);
        assert_eq!(meter.gain_reduction_db(), 1.0);
        assert_eq!(meter.peak_db(), 6.0);
        assert!((meter.reading().hold_remaining_ms - 999.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut meters = ChannelMeters::new(SR, &MeterBallistics::default());
        meters.update(0.8, 0.4, 3.0);
        meters.reset();
        let first = meters.snapshot();
        meters.reset();
        assert_eq!(meters.snapshot(), first);
        assert_eq!(first, MeterSnapshot::default());
    }
}
