//! Squeeze Core - DSP primitives for the squeeze dynamics engine
//!
//! This crate provides the filter and level-math building blocks the
//! compressor is assembled from, designed for real-time processing with zero
//! allocation in the audio path.
//!
//! # Filters
//!
//! - [`BiquadFilter`] - Multichannel second-order IIR stage with optional post-mix
//! - [`coefficients`] - Pure coefficient designs: first/second-order pass,
//!   shelving, constant-Q and variable-Q peaking
//! - [`ChebyshevFilter`] - Even-order Chebyshev low/high-pass cascade
//!
//! # Level Math
//!
//! - [`linear_to_db`] / [`db_to_linear`] with the [`MIN_DECIBEL`] floor
//! - [`settle_coefficient`] for "reach X% in T seconds" one-pole ballistics
//! - [`wet_dry_mix`]
//!
//! # Parameters
//!
//! - [`ParameterInfo`] / [`ParamDescriptor`] - index-based parameter introspection
//! - [`impl_params!`] - table-driven `ParameterInfo` implementations
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for per-channel
//! filter state). Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! squeeze-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use squeeze_core::{BiquadFilter, coefficients};
//!
//! let mut lpf = BiquadFilter::new(2);
//! lpf.set(coefficients::low_pass_second_order(
//!     8000.0,
//!     48000.0,
//!     coefficients::BUTTERWORTH_Q,
//! ));
//!
//! let mut block = [0.5_f64; 64];
//! lpf.process_in_place(0, &mut block);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod chebyshev;
pub mod coefficients;
pub mod math;
pub mod param_info;

// Re-export main types at crate root
pub use biquad::{BiquadCoefficients, BiquadFilter};
pub use chebyshev::ChebyshevFilter;
pub use math::{
    MIN_DECIBEL, clamp_or, db_to_linear, flush_denormal, linear_to_db, power_to_db, settle_coefficient,
    settle_coefficient_exp, wet_dry_mix,
};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit, ParameterInfo};
