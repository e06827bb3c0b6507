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

//! Decoded sound storage.
//!
//! Sounds are decoded once from raw interleaved PCM into normalized mono `f32` buffers and kept
//! in memory, addressed by slot number.

use super::error::SynthError;

/// Scale between 32-bit float and 16-bit integer samples.
pub const MULTIPLIER_32_TO_16: f32 = 32768.0;

/// Scale between 32-bit float and 8-bit integer samples.
pub const MULTIPLIER_32_TO_8: f32 = 128.0;

const MULTIPLIER_16_TO_32: f32 = 1.0 / MULTIPLIER_32_TO_16;
const MULTIPLIER_8_TO_32: f32 = 1.0 / MULTIPLIER_32_TO_8;

/// The per-sample width of raw PCM accepted by [`SoundBank::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit little-endian integer.
    I16,
    /// 32-bit little-endian float.
    F32,
}

impl SampleWidth {
    /// Bytes used by one sample of this width.
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::I8 => 1,
            SampleWidth::I16 => 2,
            SampleWidth::F32 => 4,
        }
    }
}

impl TryFrom<u8> for SampleWidth {
    type Error = SynthError;

    fn try_from(bytes_per_sample: u8) -> Result<Self, Self::Error> {
        match bytes_per_sample {
            1 => Ok(SampleWidth::I8),
            2 => Ok(SampleWidth::I16),
            4 => Ok(SampleWidth::F32),
            other => Err(SynthError::UnsupportedSampleWidth(other)),
        }
    }
}

/// Returns the number of whole frames contained in `bytes` bytes of raw PCM.
pub fn bytes_to_frames(bytes: usize, width: SampleWidth, channels: u8) -> usize {
    bytes / (width.bytes() * channels as usize)
}

/// Owns every loaded sound.
#[derive(Debug, Default)]
pub struct SoundBank {
    sounds: Vec<Vec<f32>>,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sound slots, including empty ones.
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Returns the frames of the sound in `slot`, if the slot exists.
    pub fn frames(&self, slot: usize) -> Option<&[f32]> {
        self.sounds.get(slot).map(Vec::as_slice)
    }

    /// Decodes raw interleaved PCM into `slot`, replacing whatever the slot held.
    ///
    /// Every channel of a frame is scaled to float and the channels are summed (not averaged)
    /// into one mono frame, so multi-channel sources may exceed [-1, 1]. Trailing bytes that do
    /// not make up a whole frame are ignored. Returns the number of frames decoded; zero leaves
    /// the slot empty.
    pub fn load(
        &mut self,
        slot: usize,
        raw: &[u8],
        bytes_per_sample: u8,
        channels: u8,
    ) -> Result<usize, SynthError> {
        let width = SampleWidth::try_from(bytes_per_sample)?;
        if channels < 1 {
            return Err(SynthError::InvalidChannelCount);
        }

        if slot >= self.sounds.len() {
            self.sounds.resize_with(slot + 1, Vec::new);
        }

        let frames = bytes_to_frames(raw.len(), width, channels);
        let data = &mut self.sounds[slot];
        data.clear();
        if frames == 0 {
            return Ok(0);
        }

        let frame_bytes = width.bytes() * channels as usize;
        data.extend(
            raw.chunks_exact(frame_bytes)
                .take(frames)
                .map(|frame| flatten(frame, width)),
        );

        Ok(frames)
    }

    /// Reads one frame.
    pub fn peek(&self, slot: usize, frame: usize) -> Result<f32, SynthError> {
        let data = self.sound(slot)?;
        data.get(frame)
            .copied()
            .ok_or(SynthError::FrameOutOfRange {
                sound: slot,
                frame,
                frames: data.len(),
            })
    }

    /// Overwrites one frame.
    pub fn poke(&mut self, slot: usize, frame: usize, value: f32) -> Result<(), SynthError> {
        let sounds = self.sounds.len();
        let data = self
            .sounds
            .get_mut(slot)
            .ok_or(SynthError::SoundOutOfRange {
                sound: slot,
                sounds,
            })?;
        let frames = data.len();
        let sample = data.get_mut(frame).ok_or(SynthError::FrameOutOfRange {
            sound: slot,
            frame,
            frames,
        })?;
        *sample = value;
        Ok(())
    }

    fn sound(&self, slot: usize) -> Result<&[f32], SynthError> {
        self.frames(slot).ok_or(SynthError::SoundOutOfRange {
            sound: slot,
            sounds: self.sounds.len(),
        })
    }
}

/// Sums the scaled channels of one interleaved frame.
fn flatten(frame: &[u8], width: SampleWidth) -> f32 {
    match width {
        SampleWidth::I8 => frame.iter().fold(0.0, |acc, &byte| {
            f32::from(byte as i8).mul_add(MULTIPLIER_8_TO_32, acc)
        }),
        SampleWidth::I16 => frame.chunks_exact(2).fold(0.0, |acc, bytes| {
            f32::from(i16::from_le_bytes([bytes[0], bytes[1]])).mul_add(MULTIPLIER_16_TO_32, acc)
        }),
        SampleWidth::F32 => frame.chunks_exact(4).fold(0.0, |acc, bytes| {
            acc + f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        }),
    }
}
