//! Factory preset listing command.

use anyhow::Context;
use clap::Args;
use squeeze_config::{FACTORY_PRESET_NAMES, factory_preset_toml, require_factory_preset};

#[derive(Args)]
pub struct PresetsArgs {
    /// Print the named factory preset as TOML
    #[arg(long, value_name = "NAME")]
    dump: Option<String>,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    if let Some(name) = args.dump {
        let preset = require_factory_preset(&name)
            .context("use 'squeeze presets' to see available presets")?;
        // display names have no embedded text
        let toml = match factory_preset_toml(&name) {
            Some(text) => text.trim_start().to_string(),
            None => preset.to_toml()?,
        };
        print!("{toml}");
        return Ok(());
    }

    println!("Factory Presets:");
    println!("================");
    for name in FACTORY_PRESET_NAMES {
        let preset = require_factory_preset(name)?;
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:15} - {}", name, desc);
    }
    println!();
    println!("Use with: squeeze process in.wav out.wav --factory <name>");

    Ok(())
}
