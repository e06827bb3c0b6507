// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! WAV import and export.
//!
//! Imported files are turned into the raw little-endian PCM the mixer decodes. 8 and 16-bit
//! integer files keep their width. 24 and 32-bit integer files have no mixer width of their own,
//! so they are normalized to 32-bit float here.

use std::path::Path;
use std::time::Duration;

use hound::{WavReader, WavWriter};
use tracing::info;

use crate::synth::{bytes_to_frames, SampleWidth, CHANNELS};
use crate::util::{filename_display, frames_to_duration};

use super::{AudioError, SampleFormat, TargetFormat};

/// Raw interleaved PCM ready to be loaded into a sound slot.
#[derive(Debug, Clone)]
pub struct Pcm {
    bytes: Vec<u8>,
    width: SampleWidth,
    channels: u8,
    sample_rate: u32,
}

impl Pcm {
    /// The raw little-endian sample bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> SampleWidth {
        self.width
    }

    /// The width in bytes, as the mixer's load operation expects it.
    pub fn bytes_per_sample(&self) -> u8 {
        match self.width {
            SampleWidth::I8 => 1,
            SampleWidth::I16 => 2,
            SampleWidth::F32 => 4,
        }
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// The native sample rate of the file.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of whole frames.
    pub fn frames(&self) -> usize {
        bytes_to_frames(self.bytes.len(), self.width, self.channels)
    }

    /// Playing time at the native sample rate.
    pub fn duration(&self) -> Duration {
        frames_to_duration(self.frames() as u64, self.sample_rate)
    }
}

/// Reads a WAV file into raw PCM.
pub fn read_pcm(path: &Path) -> Result<Pcm, AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = match u8::try_from(spec.channels) {
        Ok(channels) if channels > 0 => channels,
        _ => {
            return Err(AudioError::UnsupportedWav(format!(
                "{} channels",
                spec.channels
            )))
        }
    };

    let mut bytes = Vec::with_capacity(reader.len() as usize * 4);
    let width = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => {
            for sample in reader.samples::<i8>() {
                bytes.extend_from_slice(&sample?.to_le_bytes());
            }
            SampleWidth::I8
        }
        (hound::SampleFormat::Int, 16) => {
            for sample in reader.samples::<i16>() {
                bytes.extend_from_slice(&sample?.to_le_bytes());
            }
            SampleWidth::I16
        }
        (hound::SampleFormat::Int, bits @ (24 | 32)) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f64;
            for sample in reader.samples::<i32>() {
                let normalized = (f64::from(sample?) * scale) as f32;
                bytes.extend_from_slice(&normalized.to_le_bytes());
            }
            SampleWidth::F32
        }
        (hound::SampleFormat::Float, 32) => {
            for sample in reader.samples::<f32>() {
                bytes.extend_from_slice(&sample?.to_le_bytes());
            }
            SampleWidth::F32
        }
        (format, bits) => {
            return Err(AudioError::UnsupportedWav(format!(
                "{}-bit {:?} samples",
                bits, format
            )))
        }
    };

    let pcm = Pcm {
        bytes,
        width,
        channels,
        sample_rate: spec.sample_rate,
    };
    info!(
        file = filename_display(path),
        frames = pcm.frames(),
        channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "Read WAV file"
    );
    Ok(pcm)
}

/// Writes interleaved stereo float samples to a WAV file in the target format. Integer formats
/// clip samples outside [-1, 1].
pub fn write_stereo(
    path: &Path,
    samples: &[f32],
    target: &TargetFormat,
) -> Result<(), AudioError> {
    let mut writer = WavWriter::create(path, target.wav_spec(CHANNELS as u16))?;
    match target.sample_format {
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::Int => {
            let max = ((1u64 << (target.bits_per_sample - 1)) - 1) as f64;
            let min = -max - 1.0;
            for &sample in samples {
                let scaled = (f64::from(sample) * (max + 1.0)).round().clamp(min, max);
                writer.write_sample(scaled as i32)?;
            }
        }
    }
    writer.finalize()?;

    info!(
        file = filename_display(path),
        frames = samples.len() / CHANNELS,
        format = %target.sample_format,
        bits = target.bits_per_sample,
        "Wrote WAV file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use hound::WavReader;

    use super::*;
    use crate::synth::SoundBank;
    use crate::testutil::{assert_close, write_wav_f32, write_wav_i16, write_wav_int};

    #[test]
    fn test_read_i16_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav_i16(&path, 2, 22050, &[1000, 2000, -16384, 0, 7, 9]).unwrap();

        let pcm = read_pcm(&path).unwrap();
        assert_eq!(pcm.width(), SampleWidth::I16);
        assert_eq!(pcm.bytes_per_sample(), 2);
        assert_eq!(pcm.channels(), 2);
        assert_eq!(pcm.sample_rate(), 22050);
        assert_eq!(pcm.frames(), 3);
        assert_eq!(&pcm.bytes()[..4], &[0xe8, 0x03, 0xd0, 0x07]);

        // The channels of each frame are summed.
        let mut bank = SoundBank::new();
        bank.load(0, pcm.bytes(), pcm.bytes_per_sample(), pcm.channels())
            .unwrap();
        assert_close(bank.peek(0, 0).unwrap(), 3000.0 / 32768.0);
        assert_close(bank.peek(0, 1).unwrap(), -0.5);
    }

    #[test]
    fn test_read_i8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eight.wav");
        write_wav_int(&path, 1, 8000, 8, &[-128, 0, 64, 127]).unwrap();

        let pcm = read_pcm(&path).unwrap();
        assert_eq!(pcm.width(), SampleWidth::I8);
        assert_eq!(pcm.channels(), 1);
        assert_eq!(pcm.bytes(), &[0x80, 0x00, 0x40, 0x7f]);
        assert_eq!(pcm.duration(), Duration::from_micros(500));
    }

    #[test]
    fn test_read_i24_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.wav");
        write_wav_int(&path, 1, 48000, 24, &[1 << 22, -(1 << 23)]).unwrap();

        let pcm = read_pcm(&path).unwrap();
        assert_eq!(pcm.width(), SampleWidth::F32);
        assert_eq!(pcm.frames(), 2);

        let mut bank = SoundBank::new();
        bank.load(0, pcm.bytes(), pcm.bytes_per_sample(), pcm.channels())
            .unwrap();
        assert_close(bank.peek(0, 0).unwrap(), 0.5);
        assert_close(bank.peek(0, 1).unwrap(), -1.0);
    }

    #[test]
    fn test_read_f32() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        write_wav_f32(&path, 1, 44100, &[0.25, -0.75]).unwrap();

        let pcm = read_pcm(&path).unwrap();
        assert_eq!(pcm.width(), SampleWidth::F32);
        assert_eq!(pcm.bytes_per_sample(), 4);
        assert_eq!(pcm.bytes()[..4], 0.25f32.to_le_bytes());
        assert_eq!(pcm.bytes()[4..], (-0.75f32).to_le_bytes());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_pcm(&dir.path().join("missing.wav")),
            Err(AudioError::Wav(_))
        ));
    }

    #[test]
    fn test_write_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = [0.5, -0.5, 1.5, 0.0];
        write_stereo(&path, &samples, &TargetFormat::default()).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_write_int_clips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let target = TargetFormat::new(48000, SampleFormat::Int, 16).unwrap();
        write_stereo(&path, &[0.5, -0.5, 2.0, -2.0, -1.0, 0.0], &target).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 16);
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, vec![16384, -16384, 32767, -32768, -32768, 0]);
    }
}
