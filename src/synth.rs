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

//! Floating-point stereo PCM mixer.
//!
//! This module provides:
//! - A sound bank of decoded, normalized mono sample buffers
//! - A pool of voices that play sounds with linear-interpolation pitch shifting
//! - An equal-power pan law
//! - The mixing pass that resamples, pans and sums every voice into a stereo block
//! - Frame-accurate command scheduling for driving the mixer from the audio thread

mod bank;
mod command;
mod engine;
mod error;
pub mod pan;
mod sequencer;
mod session;
mod voice;

pub use bank::{bytes_to_frames, SampleWidth, SoundBank};
pub use command::Command;
pub use engine::Mixer;
pub use error::SynthError;
pub use sequencer::{Cue, CueFailure, Sequencer};
pub use session::Session;
pub use voice::{PlayMode, Voice, VoicePool};

/// Minimum volume.
pub const VOLUME_MIN: f32 = 0.0;

/// Maximum volume.
pub const VOLUME_MAX: f32 = 1.0;

/// The mixer always produces interleaved stereo.
pub const CHANNELS: usize = 2;
