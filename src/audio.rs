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
//! Getting audio in and out of the mixer: WAV import/export, offline rendering and live
//! playback.

pub mod cpal;
mod error;
pub mod format;
pub mod render;
pub mod wav;

pub use error::AudioError;
pub use format::{SampleFormat, TargetFormat};

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<cpal::Device>, AudioError> {
    cpal::Device::list()
}
