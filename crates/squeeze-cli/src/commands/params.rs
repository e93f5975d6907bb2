//! Parameter listing command.

use clap::Args;
use serde::Serialize;
use squeeze_core::ParameterInfo;
use squeeze_dynamics::Compressor;

#[derive(Args)]
pub struct ParamsArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// One row of the listing.
#[derive(Debug, Serialize)]
struct ParamRow {
    index: usize,
    id: u32,
    string_id: &'static str,
    name: &'static str,
    min: f64,
    max: f64,
    default: f64,
    unit: &'static str,
    #[serde(skip_serializing_if = "no_choices")]
    choices: &'static [&'static str],
}

fn no_choices(choices: &&[&str]) -> bool {
    choices.is_empty()
}

fn rows() -> Vec<ParamRow> {
    // ranges do not depend on channel count or sample rate
    let comp = Compressor::new(1, 48000.0);
    (0..comp.param_count())
        .filter_map(|index| {
            comp.param_info(index).map(|desc| ParamRow {
                index,
                id: desc.id.0,
                string_id: desc.string_id,
                name: desc.name,
                min: desc.min,
                max: desc.max,
                default: desc.default,
                unit: desc.unit.suffix().trim_start(),
                choices: desc.step_labels,
            })
        })
        .collect()
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let rows = rows();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Compressor Parameters");
    println!("=====================");
    println!();
    println!(
        "{:>3}  {:<18}  {:<20}  {:>16}  {:>9}",
        "#", "name", "id", "range", "default"
    );
    for row in &rows {
        let range = if row.choices.is_empty() {
            format!("{}..{}{}", row.min, row.max, row.unit)
        } else {
            row.choices.join("|").to_lowercase()
        };
        let default = row
            .choices
            .get(row.default as usize)
            .map_or_else(|| format!("{}{}", row.default, row.unit), |c| c.to_lowercase());
        println!(
            "{:>3}  {:<18}  {:<20}  {:>16}  {:>9}",
            row.index, row.name, row.string_id, range, default
        );
    }
    println!();
    println!("Set with: squeeze process in.wav out.wav --param threshold=-18dB --param detector=rms");

    Ok(())
}
