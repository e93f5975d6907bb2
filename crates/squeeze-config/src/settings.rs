//! Compressor settings file format.

use serde::{Deserialize, Serialize};
use squeeze_core::{ParamDescriptor, ParameterInfo};
use squeeze_dynamics::Compressor;
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{ValidationError, check_range, choice_name, resolve_choice};

/// Sidechain section of [`CompressorSettings`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SidechainSettings {
    /// Key the detector from the external sidechain input.
    pub external: bool,
    /// High-pass cutoff in Hz; 20 Hz turns the filter off.
    pub hpf_hz: f64,
    /// Low-pass cutoff in Hz; 15 kHz turns the filter off.
    pub lpf_hz: f64,
    /// Send the filtered sidechain to the output.
    pub listen: bool,
}

impl Default for SidechainSettings {
    fn default() -> Self {
        Self {
            external: false,
            hpf_hz: 20.0,
            lpf_hz: 15000.0,
            listen: false,
        }
    }
}

/// Every compressor parameter, as stored in a settings or preset file.
///
/// Missing fields take the compressor's defaults. Selectors are stored by
/// name.
///
/// # TOML Format
///
/// ```toml
/// threshold_db = -18.0
/// ratio = 3.0
/// knee_db = 6.0
/// attack_ms = 10.0
/// release_ms = 150.0
/// release_curve = "smooth"
/// detector = "rms"
/// rms_window_ms = 30.0
/// gain_stage = "optical"
/// design = "feed-forward"
/// input_trim_db = 0.0
/// makeup_db = 2.0
/// auto_makeup = false
/// wet_mix = 100.0
/// stereo_link = 100.0
/// bypass = false
///
/// [sidechain]
/// external = false
/// hpf_hz = 120.0
/// lpf_hz = 15000.0
/// listen = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold_db: f64,
    /// Compression ratio.
    pub ratio: f64,
    /// Knee width in dB.
    pub knee_db: f64,
    /// Attack time in ms.
    pub attack_ms: f64,
    /// Release time in ms.
    pub release_ms: f64,
    /// `"logarithmic"`, `"smooth"` or `"linear"`.
    pub release_curve: String,
    /// `"peak"` or `"rms"`.
    pub detector: String,
    /// RMS averaging window in ms.
    pub rms_window_ms: f64,
    /// `"fet"` or `"optical"`.
    pub gain_stage: String,
    /// `"feed-forward"` or `"feed-back"`.
    pub design: String,
    /// Detector input trim in dB.
    pub input_trim_db: f64,
    /// Makeup gain in dB.
    pub makeup_db: f64,
    /// Apply automatic makeup gain.
    pub auto_makeup: bool,
    /// Wet/dry mix in percent.
    pub wet_mix: f64,
    /// Stereo link in percent.
    pub stereo_link: f64,
    /// Pass the input through untouched.
    pub bypass: bool,
    /// Sidechain filtering and routing.
    pub sidechain: SidechainSettings,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 2.0,
            knee_db: 0.0,
            attack_ms: 10.0,
            release_ms: 150.0,
            release_curve: "logarithmic".to_string(),
            detector: "peak".to_string(),
            rms_window_ms: 30.0,
            gain_stage: "fet".to_string(),
            design: "feed-forward".to_string(),
            input_trim_db: 0.0,
            makeup_db: 0.0,
            auto_makeup: false,
            wet_mix: 100.0,
            stereo_link: 100.0,
            bypass: false,
            sidechain: SidechainSettings::default(),
        }
    }
}

/// A settings field bound to the compressor parameter that backs it.
#[derive(Clone, Copy)]
enum Field<'a> {
    Number(&'static str, &'static str, f64),
    Choice(&'static str, &'static str, &'a str),
    Flag(&'static str, &'static str, bool),
}

impl CompressorSettings {
    /// Fields paired with their parameter string IDs.
    fn fields(&self) -> [Field<'_>; 20] {
        use Field::{Choice, Flag, Number};
        [
            Number("threshold_db", "comp_thresh", self.threshold_db),
            Number("ratio", "comp_ratio", self.ratio),
            Number("knee_db", "comp_knee", self.knee_db),
            Number("attack_ms", "comp_attack", self.attack_ms),
            Number("release_ms", "comp_release", self.release_ms),
            Choice("release_curve", "comp_curve", &self.release_curve),
            Choice("detector", "comp_detector", &self.detector),
            Number("rms_window_ms", "comp_rms_window", self.rms_window_ms),
            Choice("gain_stage", "comp_stage", &self.gain_stage),
            Choice("design", "comp_design", &self.design),
            Number("input_trim_db", "comp_trim", self.input_trim_db),
            Number("makeup_db", "comp_makeup", self.makeup_db),
            Flag("auto_makeup", "comp_auto_makeup", self.auto_makeup),
            Number("wet_mix", "comp_mix", self.wet_mix),
            Number("stereo_link", "comp_link", self.stereo_link),
            Flag("bypass", "comp_bypass", self.bypass),
            Flag("sidechain.external", "comp_sc_external", self.sidechain.external),
            Number("sidechain.hpf_hz", "comp_sc_hpf", self.sidechain.hpf_hz),
            Number("sidechain.lpf_hz", "comp_sc_lpf", self.sidechain.lpf_hz),
            Flag("sidechain.listen", "comp_sc_listen", self.sidechain.listen),
        ]
    }

    /// Resolves every field to `(parameter index, value)`, collecting all
    /// problems rather than stopping at the first.
    fn resolve(&self, comp: &Compressor) -> Result<Vec<(usize, f64)>, ValidationError> {
        let mut values = Vec::with_capacity(comp.param_count());
        let mut errors = Vec::new();

        for field in self.fields() {
            let (name, id) = match field {
                Field::Number(name, id, _) | Field::Choice(name, id, _) | Field::Flag(name, id, _) => {
                    (name, id)
                }
            };
            let Some((index, desc)) = lookup(comp, id) else {
                errors.push(ValidationError::UnknownParameter(name.to_string()));
                continue;
            };
            let value = match field {
                Field::Number(_, _, value) => check_range(name, &desc, value).map(|()| value),
                Field::Choice(_, _, text) => resolve_choice(name, &desc, text),
                Field::Flag(_, _, on) => Ok(if on { desc.max } else { desc.min }),
            };
            match value {
                Ok(value) => values.push((index, value)),
                Err(e) => errors.push(e),
            }
        }

        ValidationError::collect(errors).map(|()| values)
    }

    /// Checks every field against the compressor's parameter ranges.
    ///
    /// Out-of-range numbers and unknown selector names are all reported; the
    /// error is [`ValidationError::Multiple`] when there is more than one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let reference = Compressor::new(1, 48000.0);
        self.resolve(&reference).map(|_| ())
    }

    /// Validates and applies the settings to `comp`.
    ///
    /// Nothing is changed if validation fails.
    pub fn apply_to(&self, comp: &mut Compressor) -> Result<(), ConfigError> {
        let values = self.resolve(comp)?;
        for (index, value) in values {
            comp.set_param(index, value);
        }
        Ok(())
    }

    /// Captures the current parameters of `comp`.
    pub fn from_compressor(comp: &Compressor) -> Self {
        let number = |id: &str| lookup(comp, id).map_or(0.0, |(i, _)| comp.get_param(i));
        let choice = |id: &str| {
            lookup(comp, id)
                .and_then(|(i, desc)| desc.step_label(comp.get_param(i)))
                .map(choice_name)
                .unwrap_or_default()
        };
        let flag = |id: &str| number(id) >= 0.5;

        Self {
            threshold_db: number("comp_thresh"),
            ratio: number("comp_ratio"),
            knee_db: number("comp_knee"),
            attack_ms: number("comp_attack"),
            release_ms: number("comp_release"),
            release_curve: choice("comp_curve"),
            detector: choice("comp_detector"),
            rms_window_ms: number("comp_rms_window"),
            gain_stage: choice("comp_stage"),
            design: choice("comp_design"),
            input_trim_db: number("comp_trim"),
            makeup_db: number("comp_makeup"),
            auto_makeup: flag("comp_auto_makeup"),
            wet_mix: number("comp_mix"),
            stereo_link: number("comp_link"),
            bypass: flag("comp_bypass"),
            sidechain: SidechainSettings {
                external: flag("comp_sc_external"),
                hpf_hz: number("comp_sc_hpf"),
                lpf_hz: number("comp_sc_lpf"),
                listen: flag("comp_sc_listen"),
            },
        }
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn lookup(comp: &Compressor, id: &str) -> Option<(usize, ParamDescriptor)> {
    let index = comp.find_param_by_name(id)?;
    comp.param_info(index).map(|desc| (index, desc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use squeeze_dynamics::{DesignKind, DetectorKind, GainStageKind, ReleaseCurve};

    #[test]
    fn test_defaults_match_compressor() {
        let comp = Compressor::new(2, 48000.0);
        assert_eq!(CompressorSettings::from_compressor(&comp), CompressorSettings::default());
    }

    #[test]
    fn test_default_settings_validate() {
        CompressorSettings::default().validate().unwrap();
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let settings = CompressorSettings::from_toml("ratio = 4.0\n").unwrap();
        assert_eq!(settings.ratio, 4.0);
        assert_eq!(settings.threshold_db, -12.0);
        assert_eq!(settings.sidechain, SidechainSettings::default());
    }

    #[test]
    fn test_apply_sets_every_axis() {
        let toml = r#"
threshold_db = -30.0
ratio = 6.0
release_curve = "linear"
detector = "rms"
gain_stage = "optical"
design = "feed-back"
auto_makeup = true

[sidechain]
hpf_hz = 150.0
"#;
        let settings = CompressorSettings::from_toml(toml).unwrap();
        let mut comp = Compressor::new(2, 48000.0);
        settings.apply_to(&mut comp).unwrap();

        assert_eq!(comp.threshold_db(), -30.0);
        assert_eq!(comp.ratio(), 6.0);
        assert_eq!(comp.release_curve(), ReleaseCurve::Linear);
        assert_eq!(comp.detector(), DetectorKind::Rms);
        assert_eq!(comp.gain_stage(), GainStageKind::Optical);
        assert_eq!(comp.design(), DesignKind::FeedBack);
        assert!(comp.auto_makeup());
        assert_eq!(comp.sidechain_hpf_hz(), 150.0);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let settings = CompressorSettings {
            ratio: 50.0,
            detector: "loudness".to_string(),
            ..CompressorSettings::default()
        };
        match settings.validate() {
            Err(ValidationError::Multiple(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(&errors[0], ValidationError::OutOfRange { param, .. } if param == "ratio"));
                assert!(matches!(&errors[1], ValidationError::UnknownChoice { param, .. } if param == "detector"));
            }
            other => panic!("expected two errors, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_apply_leaves_compressor_untouched() {
        let settings = CompressorSettings {
            threshold_db: -30.0,
            attack_ms: -1.0,
            ..CompressorSettings::default()
        };
        let mut comp = Compressor::new(1, 48000.0);
        let err = settings.apply_to(&mut comp).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(comp.threshold_db(), -12.0);
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let settings = CompressorSettings {
            wet_mix: f64::NAN,
            ..CompressorSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_selector_names_accept_any_case() {
        let settings = CompressorSettings {
            gain_stage: "FET".to_string(),
            design: "Feed-Forward".to_string(),
            ..CompressorSettings::default()
        };
        settings.validate().unwrap();
    }
}
