//! Planar multichannel WAV reading and writing.

use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;
use thiserror::Error;

/// Errors from WAV file I/O.
#[derive(Debug, Error)]
pub enum WavError {
    /// Error from the hound WAV library.
    #[error("WAV error: {0}")]
    Hound(#[from] hound::Error),

    /// Bit depth the writer cannot produce.
    #[error("unsupported bit depth {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Buffers handed to the writer have different lengths.
    #[error("channel {channel} has {found} frames, expected {expected}")]
    RaggedChannels {
        /// Offending channel.
        channel: usize,
        /// Frames in channel 0.
        expected: usize,
        /// Frames in the offending channel.
        found: usize,
    },
}

/// Result type for WAV I/O.
pub type Result<T> = std::result::Result<T, WavError>;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample; 32 means IEEE float.
    pub bits_per_sample: u16,
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file into one buffer per channel, scaled to `[-1, 1]`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f64>>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f64> = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = f64::from(1i32 << (spec.bits_per_sample - 1));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (buffer, &sample) in planar.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }

    Ok((planar, spec))
}

/// Write one buffer per channel to a WAV file.
///
/// Integer formats are clipped to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, channels: &[Vec<f64>], spec: WavSpec) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(WavError::UnsupportedBitDepth(spec.bits_per_sample));
    }
    let frames = channels.first().map_or(0, Vec::len);
    if let Some((channel, found)) = channels
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != frames)
    {
        return Err(WavError::RaggedChannels {
            channel,
            expected: frames,
            found,
        });
    }

    let spec = WavSpec {
        channels: channels.len() as u16,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for frame in 0..frames {
            for buffer in channels {
                writer.write_sample(buffer[frame] as f32)?;
            }
        }
    } else {
        let max_val = f64::from(1i32 << (spec.bits_per_sample - 1));
        for frame in 0..frames {
            for buffer in channels {
                let int_sample = (buffer[frame] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
