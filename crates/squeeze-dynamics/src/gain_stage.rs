//! Gain stages: the character applied after the envelope.
//!
//! A FET stage passes the smoothed reduction through untouched. An optical
//! stage models a photo-resistor whose speed depends on how hard it is
//! driven, running a second envelope over the reduction the follower
//! produced.
//!
//! # Optical Model
//!
//! ```text
//! dB         = index / 2                       (74 entries over 37 dB)
//! R          = 480 / (3 + dB)
//! attack     = R / 10 ms      release = R ms
//! coef       = 0.27 ^ (Δt / time)              73% of a step within `time`
//! ```
//!
//! | Reduction | Attack | Release |
//! |-----------|--------|---------|
//! | 0 dB | 16 ms | 160 ms |
//! | 6 dB | 5.3 ms | 53 ms |
//! | 12 dB | 3.2 ms | 32 ms |
//! | 24 dB | 1.8 ms | 18 ms |
//!
//! When the cell lags behind the ideal (un-smoothed) reduction the shortfall
//! saturates: `ideal - (24 - 24 / (1 + lag / 24))`, so the lag never exceeds
//! 24 dB.

use squeeze_core::settle_coefficient_exp;

/// Number of dB covered by the optical tables.
pub const OPTICAL_DECIBELS: usize = 37;

/// Table entries per dB.
pub const OPTICAL_ENTRIES_PER_DB: usize = 2;

/// Total table size.
pub const OPTICAL_TABLE_SIZE: usize = OPTICAL_DECIBELS * OPTICAL_ENTRIES_PER_DB;

/// Residual of a step left after the cell's attack or release time.
pub const OPTICAL_RESIDUAL: f64 = 0.27;

/// Largest lag behind the ideal reduction, in dB.
pub const OPTICAL_LAG_LIMIT_DB: f64 = 24.0;

/// Gain-stage character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GainStageKind {
    /// Transparent: the envelope output is used as is.
    #[default]
    Fet,
    /// Program-dependent photo-resistor envelope.
    Optical,
}

impl GainStageKind {
    /// All kinds, indexed like [`LABELS`](Self::LABELS).
    pub const ALL: [GainStageKind; 2] = [GainStageKind::Fet, GainStageKind::Optical];

    /// Display labels.
    pub const LABELS: &'static [&'static str] = &["FET", "Optical"];
}

/// Photo-resistor envelope with level-dependent attack and release.
#[derive(Debug, Clone)]
pub struct OpticalCell {
    attack: [f64; OPTICAL_TABLE_SIZE],
    release: [f64; OPTICAL_TABLE_SIZE],
    gain_reduction: f64,
}

impl OpticalCell {
    /// Builds the coefficient tables for `sample_rate`.
    pub fn new(sample_rate: f64) -> Self {
        let mut attack = [0.0; OPTICAL_TABLE_SIZE];
        let mut release = [0.0; OPTICAL_TABLE_SIZE];

        for (index, (a, r)) in attack.iter_mut().zip(release.iter_mut()).enumerate() {
            let decibels = index as f64 / OPTICAL_ENTRIES_PER_DB as f64;
            let resistance = 480.0 / (3.0 + decibels);
            *a = settle_coefficient_exp(OPTICAL_RESIDUAL, resistance / 10.0 / 1000.0, sample_rate);
            *r = settle_coefficient_exp(OPTICAL_RESIDUAL, resistance / 1000.0, sample_rate);
        }

        Self {
            attack,
            release,
            gain_reduction: 0.0,
        }
    }

    /// Attack and release coefficients used at `gain_reduction` dB.
    pub fn coefficients(&self, gain_reduction: f64) -> (f64, f64) {
        let index = Self::table_index(gain_reduction);
        (self.attack[index], self.release[index])
    }

    /// Current reduction held by the cell.
    pub fn gain_reduction(&self) -> f64 {
        self.gain_reduction
    }

    /// Moves the cell towards `new` and returns the reduction to apply.
    ///
    /// `ideal` is the un-smoothed target the envelope is chasing.
    #[inline]
    pub fn process(&mut self, new: f64, ideal: f64) -> f64 {
        let (attack, release) = self.coefficients(new);
        let coef = if new > self.gain_reduction { attack } else { release };
        self.gain_reduction = coef * self.gain_reduction + (1.0 - coef) * new;

        if self.gain_reduction < ideal {
            let lag = ideal - self.gain_reduction;
            let limited = OPTICAL_LAG_LIMIT_DB - OPTICAL_LAG_LIMIT_DB / (1.0 + lag / OPTICAL_LAG_LIMIT_DB);
            ideal - limited
        } else {
            self.gain_reduction
        }
    }

    /// Starts the cell from `current` dB of reduction.
    pub fn reset(&mut self, current: f64) {
        self.gain_reduction = current;
    }

    fn table_index(gain_reduction: f64) -> usize {
        let scaled = gain_reduction * OPTICAL_ENTRIES_PER_DB as f64;
        if scaled <= 0.0 {
            0
        } else {
            // truncation toward zero, saturating at the last entry
            (scaled as usize).min(OPTICAL_TABLE_SIZE - 1)
        }
    }
}

/// The stage selected by [`GainStageKind`], with its state.
#[derive(Debug, Clone)]
pub struct GainStage {
    kind: GainStageKind,
    optical: OpticalCell,
    gain_reduction: f64,
}

impl GainStage {
    /// Creates a FET stage for `sample_rate`.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            kind: GainStageKind::Fet,
            optical: OpticalCell::new(sample_rate),
            gain_reduction: 0.0,
        }
    }

    /// Active kind.
    pub fn kind(&self) -> GainStageKind {
        self.kind
    }

    /// Switches kind, handing the current reduction to the new stage.
    pub fn set_kind(&mut self, kind: GainStageKind) {
        if kind != self.kind {
            self.kind = kind;
            self.optical.reset(self.gain_reduction);
        }
    }

    /// Last reduction returned by [`process`](Self::process).
    pub fn gain_reduction(&self) -> f64 {
        self.gain_reduction
    }

    /// Shapes the envelope output `new`; `ideal` is the un-smoothed target.
    #[inline]
    pub fn process(&mut self, new: f64, ideal: f64) -> f64 {
        self.gain_reduction = match self.kind {
            GainStageKind::Fet => new,
            GainStageKind::Optical => self.optical.process(new, ideal),
        };
        self.gain_reduction
    }

    /// Starts the stage from `current` dB of reduction.
    pub fn reset(&mut self, current: f64) {
        self.gain_reduction = current;
        self.optical.reset(current);
    }
}
