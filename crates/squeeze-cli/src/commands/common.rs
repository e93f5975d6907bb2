//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use squeeze_config::{Preset, require_factory_preset, resolve_param_value};
use squeeze_core::ParameterInfo;
use squeeze_dynamics::Compressor;
use std::path::Path;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}

/// Load a preset from a file or from the factory set.
pub fn load_preset(file: Option<&Path>, factory: Option<&str>) -> anyhow::Result<Option<Preset>> {
    if let Some(path) = file {
        let preset = Preset::load(path)
            .with_context(|| format!("loading preset {}", path.display()))?;
        return Ok(Some(preset));
    }
    if let Some(name) = factory {
        let preset = require_factory_preset(name)
            .context("use 'squeeze presets' to see available presets")?;
        return Ok(Some(preset));
    }
    Ok(None)
}

/// Finds a parameter by name, short name or string ID.
///
/// Underscores may stand in for spaces (`rms_window`) and the `comp_` prefix
/// of string IDs may be left off (`sc_hpf`).
pub fn find_param(comp: &Compressor, key: &str) -> Option<usize> {
    comp.find_param_by_name(key)
        .or_else(|| comp.find_param_by_name(&key.replace('_', " ")))
        .or_else(|| comp.find_param_by_name(&format!("comp_{key}")))
}

/// Applies one `key=value` override.
pub fn apply_param(comp: &mut Compressor, key: &str, value: &str) -> anyhow::Result<()> {
    let index = find_param(comp, key).with_context(|| {
        format!("unknown parameter '{key}' (use 'squeeze params' to list them)")
    })?;
    let desc = comp
        .param_info(index)
        .with_context(|| format!("parameter {index} has no descriptor"))?;
    let resolved = resolve_param_value(&desc, value)?;
    tracing::debug!("param_override: {} = {resolved}", desc.string_id);
    comp.set_param(index, resolved);
    Ok(())
}
