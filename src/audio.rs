//! Single-channel WAV decoding and encoding around the convolution engine.

use std::{
    io::{Read, Seek, Write},
    path::Path,
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::{ConvolutionEngine, error::ConvolveError};

/// One channel of audio samples in `[-1.0, 1.0]` with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoSignal {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl MonoSignal {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Errors reading, writing or convolving WAV files.
pub enum AudioError {
    /// The WAV container could not be read or written.
    Wav(hound::Error),
    /// The file declares zero channels.
    NoChannels,
    /// Integer samples with a bit depth outside `1..=32`.
    UnsupportedBitDepth(u16),
    /// The decoded channels could not be convolved.
    Convolve(ConvolveError),
}

impl core::fmt::Display for AudioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Wav(error) => write!(f, "WAV error: {error}"),
            Self::NoChannels => "WAV file has no channels".fmt(f),
            Self::UnsupportedBitDepth(bits) => write!(f, "Unsupported bit depth: {bits}"),
            Self::Convolve(error) => write!(f, "Convolution failed: {error}"),
        }
    }
}

impl core::fmt::Debug for AudioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self, f)
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wav(error) => Some(error),
            Self::Convolve(error) => Some(error),
            Self::NoChannels | Self::UnsupportedBitDepth(_) => None,
        }
    }
}

impl From<hound::Error> for AudioError {
    fn from(error: hound::Error) -> Self {
        Self::Wav(error)
    }
}

impl From<ConvolveError> for AudioError {
    fn from(error: ConvolveError) -> Self {
        Self::Convolve(error)
    }
}

/// Reads the first channel of a WAV file.
pub fn read_first_channel<P: AsRef<Path>>(path: P) -> Result<MonoSignal, AudioError> {
    let reader = WavReader::open(path)?;
    decode_first_channel(reader)
}

/// Decodes the first channel from an open WAV reader.
///
/// Integer samples are scaled into `[-1.0, 1.0]` by `2^(bits - 1)`, float samples are taken
/// as they are. All other channels are skipped.
pub fn decode_first_channel<R: Read>(mut reader: WavReader<R>) -> Result<MonoSignal, AudioError> {
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 {
        return Err(AudioError::NoChannels);
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .map(|sample| sample.map(f64::from))
            .collect::<Result<Vec<f64>, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::UnsupportedBitDepth(spec.bits_per_sample));
            }
            let max_value = (1u64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|sample| sample.map(|value| f64::from(value) / max_value))
                .collect::<Result<Vec<f64>, _>>()?
        }
    };

    debug!(
        channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames = samples.len(),
        "decoded first channel"
    );

    Ok(MonoSignal {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes `signal` as a single-channel 32-bit float WAV file.
pub fn write_mono<P: AsRef<Path>>(path: P, signal: &MonoSignal) -> Result<(), AudioError> {
    let writer = WavWriter::create(path, mono_spec(signal.sample_rate))?;
    write_samples(writer, &signal.samples)
}

/// Encodes `signal` as a single-channel 32-bit float WAV stream.
pub fn encode_mono<W: Write + Seek>(writer: W, signal: &MonoSignal) -> Result<(), AudioError> {
    let writer = WavWriter::new(writer, mono_spec(signal.sample_rate))?;
    write_samples(writer, &signal.samples)
}

fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

fn write_samples<W: Write + Seek>(
    mut writer: WavWriter<W>,
    samples: &[f64],
) -> Result<(), AudioError> {
    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Convolves the first channels of two WAV files.
///
/// The result carries the sample rate of `signal_path`.
pub fn convolve_files<P: AsRef<Path>, Q: AsRef<Path>>(
    engine: &ConvolutionEngine,
    signal_path: P,
    kernel_path: Q,
) -> Result<MonoSignal, AudioError> {
    let signal = read_first_channel(signal_path)?;
    let kernel = read_first_channel(kernel_path)?;

    if signal.sample_rate != kernel.sample_rate {
        debug!(
            signal_rate = signal.sample_rate,
            kernel_rate = kernel.sample_rate,
            "sample rates differ, keeping the signal rate"
        );
    }

    let samples = engine.convolve(&signal.samples, &kernel.samples)?;
    Ok(MonoSignal {
        samples,
        sample_rate: signal.sample_rate,
    })
}
