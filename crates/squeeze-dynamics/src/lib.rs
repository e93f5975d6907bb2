//! Squeeze Dynamics - Multichannel compressor built on squeeze-core
//!
//! The compressor is assembled from small, separately testable parts:
//!
//! - [`GainComputer`] - Threshold/ratio/knee static curve
//! - [`GainReducer`] - Attack/release envelope with three release curves
//! - [`GainStage`] - FET (transparent) or optical (program-dependent) character
//! - [`SidechainProcessor`] - Sidechain HPF/LPF and peak/RMS detection
//! - [`ChannelMeters`] - Peak, average and gain-reduction meter ballistics
//! - [`Compressor`] - Per-block orchestrator with stereo link, makeup and mix
//! - [`SharedParams`] / [`SharedMeters`] - Lock-free control thread bridge
//!
//! ## Example
//!
//! ```rust
//! use squeeze_core::ParameterInfo;
//! use squeeze_dynamics::{Compressor, DetectorKind, GainStageKind};
//!
//! let mut comp = Compressor::new(2, 48000.0);
//! comp.set_threshold_db(-24.0);
//! comp.set_ratio(3.0);
//! comp.set_detector(DetectorKind::Rms);
//! comp.set_gain_stage(GainStageKind::Optical);
//!
//! // Host-style access by index
//! let release = comp.find_param_by_name("release").unwrap();
//! comp.set_param(release, 300.0);
//!
//! let mut left = vec![0.0_f64; 256];
//! let mut right = vec![0.0_f64; 256];
//! comp.process(&mut [&mut left[..], &mut right[..]], None);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod gain_computer;
pub mod gain_reducer;
pub mod gain_stage;
pub mod meter;
pub mod shared;
pub mod sidechain;

// Re-export main types at crate root
pub use compressor::{Compressor, DesignKind, MAX_CHANNELS};
pub use gain_computer::{GainComputer, KneeKind};
pub use gain_reducer::{AUTO_GAIN_REFERENCE_DB, GainReducer, ReleaseCurve};
pub use gain_stage::{GainStage, GainStageKind, OpticalCell};
pub use meter::{
    AverageMeter, ChannelMeters, GainReductionMeter, MeterBallistics, MeterReading, MeterSnapshot,
    PeakMeter,
};
pub use shared::{SharedMeters, SharedParams};
pub use sidechain::{DetectorKind, SidechainProcessor};
