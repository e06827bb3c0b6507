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

/// Errors reported by the mixer's control and mixing operations. None of these are fatal: the
/// failing call leaves the mixer untouched and the caller decides how to recover.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SynthError {
    #[error("Mixer is not initialized")]
    NotInitialized,

    #[error("Sample rate must be greater than 0")]
    InvalidSampleRate,

    #[error("Voice count must be at least 1, got {0}")]
    InvalidVoiceCount(usize),

    #[error("Voice {voice} out of range ({voices} voices)")]
    VoiceOutOfRange { voice: usize, voices: usize },

    #[error("Sound {sound} out of range ({sounds} sounds)")]
    SoundOutOfRange { sound: usize, sounds: usize },

    #[error("Frame {frame} out of range for sound {sound} ({frames} frames)")]
    FrameOutOfRange {
        sound: usize,
        frame: usize,
        frames: usize,
    },

    #[error("Unsupported sample width: {0} bytes per sample")]
    UnsupportedSampleWidth(u8),

    #[error("Channel count must be at least 1")]
    InvalidChannelCount,

    #[error("Voice frequency must be greater than 0")]
    InvalidFrequency,

    #[error("Update requested for zero frames")]
    EmptyUpdate,

    #[error("Output buffer too small: {needed} samples needed, {len} available")]
    BufferTooSmall { needed: usize, len: usize },
}
