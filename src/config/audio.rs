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
use std::str::FromStr;

use serde::Deserialize;

use crate::audio::SampleFormat;

use super::ConfigError;

/// The output device used when none is configured.
pub const DEFAULT_DEVICE: &str = "default";

const DEFAULT_BLOCK_FRAMES: usize = 512;

/// A YAML representation of the audio output configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Audio {
    /// The output device for live playback (default: the host's default device).
    device: Option<String>,

    /// Frames mixed per block (default: 512)
    block_frames: Option<usize>,

    /// Sample format of rendered WAV files (default: "float")
    sample_format: Option<String>,

    /// Bits per sample of rendered WAV files (default: 32 for float, 16 for int)
    bits_per_sample: Option<u16>,
}

impl Audio {
    /// New will create a new Audio configuration for the given device.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: Some(device.to_string()),
            ..Default::default()
        }
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    /// Overrides the configured device.
    pub fn set_device(&mut self, device: &str) {
        self.device = Some(device.to_string());
    }

    /// Returns the number of frames mixed per block (default: 512, minimum 1).
    pub fn block_frames(&self) -> usize {
        self.block_frames.unwrap_or(DEFAULT_BLOCK_FRAMES).max(1)
    }

    /// Returns the export sample format (default: Float)
    pub fn sample_format(&self) -> Result<SampleFormat, ConfigError> {
        match self.sample_format.as_deref() {
            Some(format) => SampleFormat::from_str(format),
            None => Ok(SampleFormat::Float),
        }
    }

    /// Returns the export bits per sample, defaulting per sample format.
    pub fn bits_per_sample(&self) -> Result<u16, ConfigError> {
        match self.bits_per_sample {
            Some(bits) => Ok(bits),
            None => Ok(self.sample_format()?.default_bits()),
        }
    }
}
