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
use std::{fmt, str::FromStr};

use crate::config::ConfigError;

use super::AudioError;

/// Sample format enumeration for WAV export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Integer samples (8, 16, 24 or 32 bit)
    Int,
    /// 32-bit floating point samples
    Float,
}

impl FromStr for SampleFormat {
    type Err = ConfigError;

    /// Convert from string representation
    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "float" | "Float" => Ok(SampleFormat::Float),
            "int" | "Int" => Ok(SampleFormat::Int),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl SampleFormat {
    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Float => "float",
            SampleFormat::Int => "int",
        }
    }

    /// The bit depth used when none is configured.
    pub fn default_bits(self) -> u16 {
        match self {
            SampleFormat::Float => 32,
            SampleFormat::Int => 16,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target format for rendered WAV files. The channel count is always stereo.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Sample format (integer or float)
    pub sample_format: SampleFormat,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl TargetFormat {
    /// Creates a new TargetFormat, rejecting bit depths hound can't write for the format.
    pub fn new(
        sample_rate: u32,
        sample_format: SampleFormat,
        bits_per_sample: u16,
    ) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidTargetFormat(
                "sample rate must be greater than 0".to_string(),
            ));
        }

        let supported = match sample_format {
            SampleFormat::Float => bits_per_sample == 32,
            SampleFormat::Int => matches!(bits_per_sample, 8 | 16 | 24 | 32),
        };
        if !supported {
            return Err(AudioError::InvalidTargetFormat(format!(
                "{} bits per sample is not supported for {} samples",
                bits_per_sample, sample_format
            )));
        }

        Ok(TargetFormat {
            sample_rate,
            sample_format,
            bits_per_sample,
        })
    }

    /// The hound spec for writing interleaved output with the given channel count.
    pub fn wav_spec(&self, channels: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: match self.sample_format {
                SampleFormat::Float => hound::SampleFormat::Float,
                SampleFormat::Int => hound::SampleFormat::Int,
            },
        }
    }
}

impl Default for TargetFormat {
    /// Creates a default target format (44.1kHz, 32-bit float)
    fn default() -> Self {
        TargetFormat {
            sample_rate: 44100,
            sample_format: SampleFormat::Float,
            bits_per_sample: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_format_from_str() {
        assert_eq!(
            SampleFormat::from_str("float").unwrap(),
            SampleFormat::Float
        );
        assert_eq!(
            SampleFormat::from_str("Float").unwrap(),
            SampleFormat::Float
        );
        assert_eq!(SampleFormat::from_str("int").unwrap(), SampleFormat::Int);
        assert_eq!(SampleFormat::from_str("Int").unwrap(), SampleFormat::Int);
    }

    #[test]
    fn test_sample_format_from_str_invalid() {
        assert!(SampleFormat::from_str("invalid").is_err());
        assert!(SampleFormat::from_str("").is_err());
        assert!(SampleFormat::from_str("double").is_err());
    }

    #[test]
    fn test_sample_format_display() {
        assert_eq!(format!("{}", SampleFormat::Float), "float");
        assert_eq!(format!("{}", SampleFormat::Int), "int");
        assert_eq!(SampleFormat::Float.default_bits(), 32);
        assert_eq!(SampleFormat::Int.default_bits(), 16);
    }

    #[test]
    fn test_target_format_new() {
        let format = TargetFormat::new(44100, SampleFormat::Float, 32).unwrap();
        assert_eq!(format.sample_rate, 44100);
        assert_eq!(format.sample_format, SampleFormat::Float);
        assert_eq!(format.bits_per_sample, 32);

        for bits in [8, 16, 24, 32] {
            let format = TargetFormat::new(48000, SampleFormat::Int, bits).unwrap();
            assert_eq!(format.bits_per_sample, bits);
        }
    }

    #[test]
    fn test_target_format_new_invalid() {
        assert!(TargetFormat::new(0, SampleFormat::Float, 32).is_err());
        assert!(TargetFormat::new(44100, SampleFormat::Float, 16).is_err());
        assert!(TargetFormat::new(44100, SampleFormat::Int, 12).is_err());
    }

    #[test]
    fn test_wav_spec() {
        let spec = TargetFormat::new(48000, SampleFormat::Int, 24)
            .unwrap()
            .wav_spec(2);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let spec = TargetFormat::default().wav_spec(2);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(spec.bits_per_sample, 32);
    }
}
