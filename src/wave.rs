//! WAV file support for the offline tools.
//!
//! The engine's training pipeline standardises on mono 48 kHz 24-bit PCM;
//! anything else is rejected rather than resampled.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Error, Result};
use crate::SAMPLE_RATE;

const BITS_PER_SAMPLE: u16 = 24;
const SCALE_24BIT: f32 = 8_388_608.0; // 2^23
const MAX_24BIT: f32 = 8_388_607.0;

/// Reads a mono 48 kHz 24-bit PCM WAV file into samples in `[-1, 1]`.
pub fn read_wav(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(Error::Config(format!(
            "only 1 channel (mono) is supported, actual: {}",
            spec.channels
        )));
    }
    if spec.sample_rate != SAMPLE_RATE {
        return Err(Error::Config(format!(
            "only sample rate {SAMPLE_RATE} is supported, actual: {}",
            spec.sample_rate
        )));
    }
    if spec.bits_per_sample != BITS_PER_SAMPLE || spec.sample_format != SampleFormat::Int {
        return Err(Error::Config(format!(
            "only {BITS_PER_SAMPLE}-bit PCM samples are supported, actual: {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let mut samples = Vec::with_capacity(reader.len() as usize);
    for sample in reader.samples::<i32>() {
        samples.push(sample? as f32 / SCALE_24BIT);
    }
    Ok(samples)
}

/// Writes samples in `[-1, 1]` as a mono 48 kHz 24-bit PCM WAV file.
/// Out-of-range samples are clamped.
pub fn write_wav(samples: &[f32], path: impl AsRef<Path>) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * MAX_24BIT) as i32)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.wav");

        let samples = [0.0, 0.25, -0.25, 0.999, -0.999];
        write_wav(&samples, &path).unwrap();
        let read_back = read_wav(&path).unwrap();

        assert_eq!(read_back.len(), samples.len());
        for (a, b) in samples.iter().zip(&read_back) {
            assert!((a - b).abs() < 2.0 / SCALE_24BIT, "{a} vs {b}");
        }
    }

    #[test]
    fn clamps_out_of_range_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clamped.wav");

        write_wav(&[2.0, -2.0], &path).unwrap();
        let read_back = read_wav(&path).unwrap();
        assert!((read_back[0] - 1.0).abs() < 1e-6);
        assert!((read_back[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo16.wav");

        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..4 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let err = read_wav(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
