//! Settings and preset management for the squeeze compressor.
//!
//! # Features
//!
//! - **Settings**: Every compressor parameter in a TOML file, selectors by name
//! - **Validation**: Strict range checks against the compressor's own descriptors
//! - **Presets**: Named, described settings, loadable from and savable to disk
//! - **Factory Presets**: Built-in starting points for common jobs
//!
//! # Example
//!
//! ```rust,no_run
//! use squeeze_config::{CompressorSettings, Preset, get_factory_preset};
//! use squeeze_dynamics::Compressor;
//!
//! let mut comp = Compressor::new(2, 48000.0);
//!
//! // Start from a factory preset
//! let preset = get_factory_preset("vocal").unwrap();
//! preset.apply_to(&mut comp).unwrap();
//!
//! // Tweak and save as a user preset
//! comp.set_ratio(4.0);
//! let mine = Preset::new("My Vocal")
//!     .with_description("Vocal, a bit firmer")
//!     .with_settings(CompressorSettings::from_compressor(&comp));
//! mine.save("my_vocal.toml").unwrap();
//! ```

mod error;
mod preset;
mod settings;

/// Parameter value parsing and validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_toml, factory_presets, get_factory_preset,
    is_factory_preset, require_factory_preset,
};
pub use preset::Preset;
pub use settings::{CompressorSettings, SidechainSettings};
pub use validation::{
    ValidationError, ValidationResult, check_range, choice_name, parse_param_value,
    resolve_choice, resolve_param_value,
};
