//! Factory presets bundled with the library.
//!
//! These presets are always available without external files and serve as
//! starting points.

use crate::Preset;
use crate::error::ConfigError;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "gentle",
    "vocal",
    "drum-bus",
    "mastering",
    "limiter",
    "sidechain-hpf",
];

/// TOML content for factory presets.
///
/// These are embedded at compile time and always available.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("gentle", GENTLE_PRESET),
    ("vocal", VOCAL_PRESET),
    ("drum-bus", DRUM_BUS_PRESET),
    ("mastering", MASTERING_PRESET),
    ("limiter", LIMITER_PRESET),
    ("sidechain-hpf", SIDECHAIN_HPF_PRESET),
];

/// Gentle preset - transparent leveling.
const GENTLE_PRESET: &str = r#"
name = "Gentle"
description = "Low ratio, soft knee leveling that stays out of the way"

[settings]
threshold_db = -18.0
ratio = 2.0
knee_db = 12.0
attack_ms = 20.0
release_ms = 250.0
release_curve = "smooth"
detector = "rms"
rms_window_ms = 50.0
auto_makeup = true
"#;

/// Vocal preset - optical-style leveling.
const VOCAL_PRESET: &str = r#"
name = "Vocal"
description = "Program-dependent optical leveling for lead vocals"

[settings]
threshold_db = -22.0
ratio = 3.0
knee_db = 6.0
attack_ms = 5.0
release_ms = 200.0
release_curve = "smooth"
detector = "rms"
rms_window_ms = 20.0
gain_stage = "optical"
makeup_db = 4.0

[settings.sidechain]
hpf_hz = 100.0
"#;

/// Drum bus preset - punchy glue.
const DRUM_BUS_PRESET: &str = r#"
name = "Drum Bus"
description = "Slow attack lets transients through, fast release adds punch"

[settings]
threshold_db = -16.0
ratio = 4.0
knee_db = 3.0
attack_ms = 30.0
release_ms = 80.0
detector = "peak"
makeup_db = 3.0
wet_mix = 70.0

[settings.sidechain]
hpf_hz = 60.0
"#;

/// Mastering preset - feed-back bus glue.
const MASTERING_PRESET: &str = r#"
name = "Mastering"
description = "Feed-back design at a low ratio for gentle stereo bus glue"

[settings]
threshold_db = -10.0
ratio = 1.5
knee_db = 12.0
attack_ms = 30.0
release_ms = 400.0
release_curve = "smooth"
detector = "rms"
rms_window_ms = 80.0
design = "feed-back"
auto_makeup = true
stereo_link = 100.0
"#;

/// Limiter preset - fast peak control.
const LIMITER_PRESET: &str = r#"
name = "Limiter"
description = "Instant attack and maximum ratio for peak control"

[settings]
threshold_db = -3.0
ratio = 20.0
knee_db = 0.0
attack_ms = 0.0
release_ms = 60.0
release_curve = "linear"
detector = "peak"
"#;

/// Sidechain HPF preset - de-esser-like keying.
const SIDECHAIN_HPF_PRESET: &str = r#"
name = "Sidechain HPF"
description = "Keys the detector on high frequencies only, taming sibilance"

[settings]
threshold_db = -30.0
ratio = 6.0
attack_ms = 1.0
release_ms = 50.0
detector = "peak"
stereo_link = 0.0

[settings.sidechain]
hpf_hz = 2000.0
"#;

/// Returns all factory presets.
///
/// Presets that fail to parse are skipped; the test suite keeps them valid.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name.
///
/// Matches the internal name (`"drum-bus"`) or the display name
/// (`"Drum Bus"`), case-insensitively.
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    for (internal, toml) in FACTORY_PRESETS_TOML {
        if *internal == name_lower {
            return Preset::from_toml(toml).ok();
        }
    }

    factory_presets()
        .into_iter()
        .find(|p| p.name.to_lowercase() == name_lower)
}

/// Like [`get_factory_preset`], but with an error naming the preset.
pub fn require_factory_preset(name: &str) -> Result<Preset, ConfigError> {
    get_factory_preset(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
}

/// Raw TOML of a factory preset, as embedded.
pub fn factory_preset_toml(name: &str) -> Option<&'static str> {
    FACTORY_PRESETS_TOML
        .iter()
        .find(|(internal, _)| internal.eq_ignore_ascii_case(name))
        .map(|(_, toml)| *toml)
}

/// Check if a name refers to a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use squeeze_dynamics::{Compressor, DesignKind, GainStageKind};

    #[test]
    fn test_all_factory_presets_valid() {
        for (name, toml) in FACTORY_PRESETS_TOML {
            let result = Preset::from_toml(toml);
            assert!(result.is_ok(), "factory preset '{}' should parse: {:?}", name, result);

            let preset = result.unwrap();
            assert!(!preset.name.is_empty(), "preset '{}' should have a name", name);
            assert!(preset.description.is_some(), "preset '{}' should have a description", name);
            preset
                .settings
                .validate()
                .unwrap_or_else(|e| panic!("preset '{name}' should validate: {e}"));
        }
        assert_eq!(factory_presets().len(), FACTORY_PRESET_NAMES.len());
    }

    #[test]
    fn test_get_factory_preset() {
        let preset = get_factory_preset("drum-bus").expect("drum-bus should exist");
        assert_eq!(preset.name, "Drum Bus");

        let preset = get_factory_preset("Sidechain HPF").expect("display name");
        assert_eq!(preset.settings.sidechain.hpf_hz, 2000.0);

        let preset = get_factory_preset("VOCAL").expect("case insensitive");
        assert_eq!(preset.name, "Vocal");

        assert!(get_factory_preset("nonexistent").is_none());
        assert!(matches!(
            require_factory_preset("nonexistent"),
            Err(ConfigError::UnknownPreset(name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn test_presets_configure_the_compressor() {
        let mut comp = Compressor::new(2, 48000.0);
        require_factory_preset("vocal").unwrap().apply_to(&mut comp).unwrap();
        assert_eq!(comp.gain_stage(), GainStageKind::Optical);

        require_factory_preset("mastering").unwrap().apply_to(&mut comp).unwrap();
        assert_eq!(comp.design(), DesignKind::FeedBack);
        // settings not named in the preset fall back to defaults
        assert_eq!(comp.gain_stage(), GainStageKind::Fet);
    }

    #[test]
    fn test_raw_toml_lookup() {
        assert!(factory_preset_toml("limiter").unwrap().contains("ratio = 20.0"));
        assert!(factory_preset_toml("brickwall").is_none());
        assert!(is_factory_preset("gentle"));
    }
}
