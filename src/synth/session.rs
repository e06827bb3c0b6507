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

//! The initialize/finalize bracket around a mixer.

use tracing::{debug, info};

use super::engine::Mixer;
use super::error::SynthError;

/// Holds at most one [`Mixer`] for a mixing session. Every access outside the
/// [`Session::initialize`] / [`Session::finalize`] bracket fails with
/// [`SynthError::NotInitialized`].
#[derive(Debug, Default)]
pub struct Session {
    mixer: Option<Mixer>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the mixer. Initializing an already initialized session succeeds and keeps the
    /// existing mixer, including its sample rate.
    pub fn initialize(&mut self, sample_rate: u32) -> Result<(), SynthError> {
        if let Some(mixer) = &self.mixer {
            debug!(
                sample_rate = mixer.sample_rate(),
                requested = sample_rate,
                "Session already initialized"
            );
            return Ok(());
        }

        self.mixer = Some(Mixer::new(sample_rate)?);
        Ok(())
    }

    /// Destroys the mixer along with every sound and voice.
    pub fn finalize(&mut self) {
        if self.mixer.take().is_some() {
            info!("Session finalized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.mixer.is_some()
    }

    pub fn mixer(&self) -> Result<&Mixer, SynthError> {
        self.mixer.as_ref().ok_or(SynthError::NotInitialized)
    }

    pub fn mixer_mut(&mut self) -> Result<&mut Mixer, SynthError> {
        self.mixer.as_mut().ok_or(SynthError::NotInitialized)
    }

    /// Mixes `frames` frames into `buffer`. See [`Mixer::update`].
    pub fn update(&mut self, buffer: &mut [f32], frames: usize) -> Result<(), SynthError> {
        self.mixer_mut()?.update(buffer, frames)
    }

    /// Hands the mixer over to the caller, leaving the session uninitialized.
    pub fn into_mixer(self) -> Result<Mixer, SynthError> {
        self.mixer.ok_or(SynthError::NotInitialized)
    }
}
