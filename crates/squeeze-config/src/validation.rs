//! Parameter value parsing and validation.
//!
//! Ranges come from the compressor's own [`ParamDescriptor`]s, so the
//! settings file, the CLI and the DSP agree on what is legal. Unlike the DSP
//! setters, which clamp, validation reports every out-of-range value.
//!
//! # Value syntax
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `-18`, `-18dB` | plain number, unit suffix stripped |
//! | `4:1` | ratio |
//! | `25ms`, `1.5s` | milliseconds (seconds are scaled) |
//! | `120Hz`, `2.5kHz` | hertz (kilohertz are scaled) |
//! | `50%` | percent, kept as percent |
//! | `rms`, `optical`, `on` | label of a switch or selector |
//!
//! ```rust
//! use squeeze_config::resolve_param_value;
//! use squeeze_core::ParameterInfo;
//! use squeeze_dynamics::Compressor;
//!
//! let comp = Compressor::new(1, 48000.0);
//! let detector = comp.find_param_by_name("detector").unwrap();
//! let desc = comp.param_info(detector).unwrap();
//! assert_eq!(resolve_param_value(&desc, "rms").unwrap(), 1.0);
//! ```

use squeeze_core::ParamDescriptor;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// No parameter with this name.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Selector value that names no option.
    #[error("unknown value '{value}' for '{param}' (expected one of: {expected})")]
    UnknownChoice {
        /// Name of the parameter.
        param: String,
        /// The unrecognized value.
        value: String,
        /// Comma-separated list of accepted names.
        expected: String,
    },

    /// Invalid parameter format.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    /// Folds a list of errors: `Ok` when empty, the error itself when single.
    pub fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Parses a numeric value, stripping unit suffixes.
///
/// Returns `None` when the text is not a number. Seconds and kilohertz are
/// scaled to milliseconds and hertz; everything else keeps its number.
pub fn parse_param_value(value: &str) -> Option<f64> {
    let value = value.trim();

    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok();
    }

    // Ratio written as "4:1"
    if let Some(ratio) = value.strip_suffix(":1") {
        return ratio.trim().parse::<f64>().ok();
    }

    if let Some(db) = value
        .strip_suffix("dB")
        .or_else(|| value.strip_suffix("db"))
    {
        return db.trim().parse::<f64>().ok();
    }

    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse::<f64>().ok();
    }

    if let Some(khz) = value
        .strip_suffix("kHz")
        .or_else(|| value.strip_suffix("khz"))
    {
        return khz.trim().parse::<f64>().ok().map(|v| v * 1000.0);
    }

    if let Some(hz) = value
        .strip_suffix("Hz")
        .or_else(|| value.strip_suffix("hz"))
    {
        return hz.trim().parse::<f64>().ok();
    }

    if let Some(s) = value.strip_suffix('s') {
        return s.trim().parse::<f64>().ok().map(|v| v * 1000.0);
    }

    value.parse::<f64>().ok()
}

/// Canonical settings-file name of a selector label (`"Feed-Forward"` →
/// `"feed-forward"`).
pub fn choice_name(label: &str) -> String {
    label.to_ascii_lowercase().replace(' ', "-")
}

/// Checks `value` against the range of `desc`.
pub fn check_range(param: &str, desc: &ParamDescriptor, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value >= desc.min && value <= desc.max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min: desc.min,
            max: desc.max,
        })
    }
}

/// Resolves a selector name to its parameter value.
pub fn resolve_choice(param: &str, desc: &ParamDescriptor, name: &str) -> ValidationResult<f64> {
    let name = name.trim();
    desc.value_for_label(name)
        .or_else(|| {
            desc.step_labels
                .iter()
                .position(|label| choice_name(label) == name.to_ascii_lowercase())
                .map(|i| desc.min + i as f64)
        })
        .ok_or_else(|| ValidationError::UnknownChoice {
            param: param.to_string(),
            value: name.to_string(),
            expected: desc
                .step_labels
                .iter()
                .map(|label| choice_name(label))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Resolves user text (number with unit, or label) to a parameter value,
/// rejecting values outside the descriptor's range.
pub fn resolve_param_value(desc: &ParamDescriptor, text: &str) -> ValidationResult<f64> {
    let param = desc.name;
    if desc.is_stepped() {
        let lowered = text.trim().to_ascii_lowercase();
        let switch = match lowered.as_str() {
            "true" | "yes" | "1" if desc.step_labels.len() == 2 => Some(desc.max),
            "false" | "no" | "0" if desc.step_labels.len() == 2 => Some(desc.min),
            _ => None,
        };
        if let Some(value) = switch {
            return Ok(value);
        }
        if let Ok(value) = resolve_choice(param, desc, text) {
            return Ok(value);
        }
    }

    let value = parse_param_value(text).ok_or_else(|| {
        if desc.is_stepped() {
            ValidationError::UnknownChoice {
                param: param.to_string(),
                value: text.trim().to_string(),
                expected: desc
                    .step_labels
                    .iter()
                    .map(|label| choice_name(label))
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        } else {
            ValidationError::InvalidFormat {
                param: param.to_string(),
                reason: format!("'{}' is not a number", text.trim()),
            }
        }
    })?;
    check_range(param, desc, value)?;
    Ok(value)
}
