//! File-based compression command.

use crate::commands::common::{apply_param, load_preset, parse_key_val};
use crate::wav::{WavSpec, read_wav, write_wav};
use anyhow::{Context, bail};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use squeeze_core::linear_to_db;
use squeeze_dynamics::{Compressor, MAX_CHANNELS};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// External sidechain WAV file (keys the detector)
    #[arg(long, value_name = "FILE")]
    sidechain: Option<PathBuf>,

    /// Preset file (TOML)
    #[arg(short, long, value_name = "FILE", conflicts_with = "factory")]
    preset: Option<PathBuf>,

    /// Factory preset name
    #[arg(short, long, value_name = "NAME")]
    factory: Option<String>,

    /// Parameter override, applied after the preset (e.g. "ratio=4:1")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Processing block size
    #[arg(long, default_value = "512", value_parser = clap::value_parser!(u32).range(1..=65536))]
    block_size: u32,

    /// Output bit depth (16, 24, or 32); defaults to the input's
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Also write the meter report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

/// Per-channel summary logged after processing.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    /// Channel index.
    pub channel: usize,
    /// Absolute input maximum in dBFS.
    pub input_max_db: f64,
    /// Absolute output maximum in dBFS.
    pub output_max_db: f64,
    /// Input peak-hold meter at the end of the file, in dBFS.
    pub input_peak_hold_db: f64,
    /// Output peak-hold meter at the end of the file, in dBFS.
    pub output_peak_hold_db: f64,
    /// Input average meter at the end of the file, in dBFS.
    pub input_average_db: f64,
    /// Output average meter at the end of the file, in dBFS.
    pub output_average_db: f64,
    /// Whole-file input RMS in dBFS.
    pub input_rms_db: f64,
    /// Whole-file output RMS in dBFS.
    pub output_rms_db: f64,
    /// Largest gain reduction in dB.
    pub max_gain_reduction_db: f64,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    info!("reading {}", args.input.display());
    let (mut channels, spec) =
        read_wav(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let frames = channels.first().map_or(0, Vec::len);
    let channel_count = channels.len();
    let sample_rate = f64::from(spec.sample_rate);

    info!(
        "  {} channel(s), {} frames, {} Hz, {:.2}s",
        channel_count,
        frames,
        spec.sample_rate,
        frames as f64 / sample_rate
    );

    if channel_count == 0 || channel_count > MAX_CHANNELS {
        bail!("{channel_count} channels not supported (1 to {MAX_CHANNELS})");
    }

    let mut comp = Compressor::new(channel_count, sample_rate);

    if let Some(preset) = load_preset(args.preset.as_deref(), args.factory.as_deref())? {
        info!("preset: {}", preset.name);
        preset
            .apply_to(&mut comp)
            .with_context(|| format!("applying preset '{}'", preset.name))?;
    }

    let key = match &args.sidechain {
        Some(path) => {
            let key = load_sidechain(path, spec, channel_count, frames)?;
            comp.set_sidechain_external(true);
            Some(key)
        }
        None => None,
    };

    for (name, value) in &args.param {
        apply_param(&mut comp, name, value)?;
    }

    debug!(
        "settings: threshold {} dB, ratio {}:1, attack {} ms, release {} ms",
        comp.threshold_db(),
        comp.ratio(),
        comp.attack_ms(),
        comp.release_ms()
    );

    let input_rms: Vec<f64> = channels.iter().map(|c| rms(c)).collect();
    let mut max_gr = vec![0.0_f64; channel_count];

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let block_size = args.block_size as usize;
    let mut start = 0;
    while start < frames {
        let end = (start + block_size).min(frames);
        let mut main: Vec<&mut [f64]> = channels.iter_mut().map(|c| &mut c[start..end]).collect();
        match &key {
            Some(key) => {
                let sc: Vec<&[f64]> = key.iter().map(|c| &c[start..end]).collect();
                comp.process(&mut main, Some(sc.as_slice()));
            }
            None => comp.process(&mut main, None),
        }
        for (ch, gr) in max_gr.iter_mut().enumerate() {
            *gr = gr.max(comp.gain_reduction_peak_db(ch));
        }
        pb.set_position(end as u64);
        start = end;
    }

    pb.finish_with_message("done");

    let reports: Vec<ChannelReport> = (0..channel_count)
        .map(|ch| ChannelReport {
            channel: ch,
            input_max_db: comp.input_max_db(ch),
            output_max_db: comp.output_max_db(ch),
            input_peak_hold_db: comp.input_peak_hold_db(ch),
            output_peak_hold_db: comp.output_peak_hold_db(ch),
            input_average_db: comp.input_average_db(ch),
            output_average_db: comp.output_average_db(ch),
            input_rms_db: linear_to_db(input_rms[ch]),
            output_rms_db: linear_to_db(rms(&channels[ch])),
            max_gain_reduction_db: max_gr[ch],
        })
        .collect();

    print_report(&reports);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    let out_spec = WavSpec {
        bits_per_sample: args.bit_depth.unwrap_or(spec.bits_per_sample),
        ..spec
    };

    info!("writing {}", args.output.display());
    write_wav(&args.output, &channels, out_spec)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("done");

    Ok(())
}

/// Reads the sidechain file and fits it to the main input's shape.
///
/// A mono key feeds every channel. Short keys are padded with silence and
/// long ones truncated.
fn load_sidechain(
    path: &Path,
    main: WavSpec,
    channel_count: usize,
    frames: usize,
) -> anyhow::Result<Vec<Vec<f64>>> {
    info!("sidechain: {}", path.display());
    let (mut key, spec) = read_wav(path).with_context(|| format!("reading {}", path.display()))?;

    if spec.sample_rate != main.sample_rate {
        bail!(
            "sidechain sample rate {} Hz does not match input {} Hz",
            spec.sample_rate,
            main.sample_rate
        );
    }
    if key.len() == 1 && channel_count > 1 {
        key = vec![key[0].clone(); channel_count];
    }
    if key.len() != channel_count {
        bail!(
            "sidechain has {} channels, input has {}",
            key.len(),
            channel_count
        );
    }
    if key.first().map_or(0, Vec::len) != frames {
        warn!("sidechain length differs from input; fitting to {frames} frames");
    }
    for channel in &mut key {
        channel.resize(frames, 0.0);
    }
    Ok(key)
}

fn print_report(reports: &[ChannelReport]) {
    println!();
    println!(
        "{:>3}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>8}",
        "ch", "in max", "out max", "in avg", "out avg", "in rms", "out rms", "max gr"
    );
    for r in reports {
        println!(
            "{:>3}  {:>7.1} dB  {:>7.1} dB  {:>7.1} dB  {:>7.1} dB  {:>7.1} dB  {:>7.1} dB  {:>5.1} dB",
            r.channel,
            r.input_max_db,
            r.output_max_db,
            r.input_average_db,
            r.output_average_db,
            r.input_rms_db,
            r.output_rms_db,
            r.max_gain_reduction_db
        );
    }
}

fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f64).sqrt()
}
