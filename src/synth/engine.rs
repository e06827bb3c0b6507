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

//! The mixer: sound bank, voice pool, and the real-time mixing pass.

use tracing::{debug, info};

use super::bank::{SoundBank, MULTIPLIER_32_TO_16, MULTIPLIER_32_TO_8};
use super::command::Command;
use super::error::SynthError;
use super::voice::{PlayMode, VoicePool};
use super::{CHANNELS, VOLUME_MAX, VOLUME_MIN};

/// A stereo software mixer.
///
/// Control operations (loading sounds, configuring and starting voices) may allocate and are
/// meant to run off the audio thread. [`Mixer::update`] is the real-time entry point: it never
/// allocates, locks, logs, or blocks.
///
/// The mixer has no internal synchronization. Control calls and `update` must be serialized by
/// the caller, for example by driving both from the audio callback through a
/// [`Sequencer`](super::Sequencer).
#[derive(Debug)]
pub struct Mixer {
    bank: SoundBank,
    voices: VoicePool,
    sample_rate: u32,
    active_voices: usize,
    volume: f32,
}

impl Mixer {
    /// Creates a mixer running at `sample_rate`, which is fixed for the mixer's lifetime.
    pub fn new(sample_rate: u32) -> Result<Self, SynthError> {
        if sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate);
        }

        info!(sample_rate, "Mixer created");
        Ok(Self {
            bank: SoundBank::new(),
            voices: VoicePool::new(),
            sample_rate,
            active_voices: 0,
            volume: VOLUME_MAX,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of sound slots.
    pub fn total_sounds(&self) -> usize {
        self.bank.len()
    }

    pub fn total_voices(&self) -> usize {
        self.voices.len()
    }

    /// Replaces the voice pool with `voices` idle voices.
    pub fn set_total_voices(&mut self, voices: usize) -> Result<(), SynthError> {
        self.voices.resize(voices)?;
        debug!(voices, "Voice pool resized");
        Ok(())
    }

    /// Returns the number of voices that were mixed by the last [`Mixer::update`].
    pub fn active_voices(&self) -> usize {
        self.active_voices
    }

    /// Returns true when no voice is bound to a sound.
    pub fn is_idle(&self) -> bool {
        self.voices.iter().all(|voice| voice.is_idle())
    }

    pub fn global_volume(&self) -> f32 {
        self.volume
    }

    /// Sets the global volume, clamped to [0, 1].
    pub fn set_global_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(VOLUME_MIN, VOLUME_MAX);
    }

    /// Decodes raw interleaved PCM into sound `slot`. See [`SoundBank::load`].
    pub fn load_sound(
        &mut self,
        slot: usize,
        raw: &[u8],
        bytes_per_sample: u8,
        channels: u8,
    ) -> Result<(), SynthError> {
        let frames = self.bank.load(slot, raw, bytes_per_sample, channels)?;
        info!(slot, frames, bytes_per_sample, channels, "Sound loaded");
        Ok(())
    }

    /// Returns the frames of sound `slot`.
    pub fn sound_frames(&self, slot: usize) -> Result<&[f32], SynthError> {
        self.bank.frames(slot).ok_or(SynthError::SoundOutOfRange {
            sound: slot,
            sounds: self.bank.len(),
        })
    }

    pub fn peek_frame(&self, slot: usize, frame: usize) -> Result<f32, SynthError> {
        self.bank.peek(slot, frame)
    }

    pub fn poke_frame(&mut self, slot: usize, frame: usize, value: f32) -> Result<(), SynthError> {
        self.bank.poke(slot, frame, value)
    }

    /// Reads a frame as a 16-bit integer. Out-of-range values saturate.
    pub fn peek_frame_i16(&self, slot: usize, frame: usize) -> Result<i16, SynthError> {
        Ok((self.bank.peek(slot, frame)? * MULTIPLIER_32_TO_16) as i16)
    }

    pub fn poke_frame_i16(&mut self, slot: usize, frame: usize, value: i16) -> Result<(), SynthError> {
        self.bank
            .poke(slot, frame, f32::from(value) / MULTIPLIER_32_TO_16)
    }

    /// Reads a frame as an 8-bit integer. Out-of-range values saturate.
    pub fn peek_frame_i8(&self, slot: usize, frame: usize) -> Result<i8, SynthError> {
        Ok((self.bank.peek(slot, frame)? * MULTIPLIER_32_TO_8) as i8)
    }

    pub fn poke_frame_i8(&mut self, slot: usize, frame: usize, value: i8) -> Result<(), SynthError> {
        self.bank
            .poke(slot, frame, f32::from(value) / MULTIPLIER_32_TO_8)
    }

    pub fn voice_volume(&self, voice: usize) -> Result<f32, SynthError> {
        Ok(self.voices.get(voice)?.volume())
    }

    /// Sets a voice's volume, clamped to [0, 1].
    pub fn set_voice_volume(&mut self, voice: usize, volume: f32) -> Result<(), SynthError> {
        self.voices.get_mut(voice)?.set_volume(volume);
        Ok(())
    }

    pub fn voice_balance(&self, voice: usize) -> Result<f32, SynthError> {
        Ok(self.voices.get(voice)?.balance())
    }

    /// Sets a voice's stereo balance, clamped to [-1, 1].
    pub fn set_voice_balance(&mut self, voice: usize, balance: f32) -> Result<(), SynthError> {
        self.voices.get_mut(voice)?.set_balance(balance);
        Ok(())
    }

    pub fn voice_frequency(&self, voice: usize) -> Result<u32, SynthError> {
        Ok(self.voices.get(voice)?.frequency())
    }

    /// Sets a voice's playback frequency in Hz. A frequency equal to the mixer's sample rate
    /// plays the sound at its stored rate.
    pub fn set_voice_frequency(&mut self, voice: usize, frequency: u32) -> Result<(), SynthError> {
        self.voices
            .set_frequency(voice, frequency, self.sample_rate)?;
        debug!(voice, frequency, "Voice frequency set");
        Ok(())
    }

    /// Returns the sound bound to `voice`, or `None` if the voice is idle.
    pub fn voice_sound(&self, voice: usize) -> Result<Option<usize>, SynthError> {
        Ok(self.voices.get(voice)?.sound())
    }

    /// Returns the fractional frame position of `voice`.
    pub fn voice_position(&self, voice: usize) -> Result<f32, SynthError> {
        Ok(self.voices.get(voice)?.position())
    }

    /// Stops `voice`, returning everything but its balance to the defaults.
    pub fn stop_voice(&mut self, voice: usize) -> Result<(), SynthError> {
        self.voices.stop(voice)?;
        debug!(voice, "Voice stopped");
        Ok(())
    }

    /// Starts `voice` playing `sound` from frame `position`. `start` and `end` bound the
    /// playback, or the loop for [`PlayMode::ForwardLoop`].
    pub fn play_voice(
        &mut self,
        voice: usize,
        sound: usize,
        position: usize,
        mode: PlayMode,
        start: usize,
        end: usize,
    ) -> Result<(), SynthError> {
        self.start_voice(voice, sound, position, mode, start, end)?;
        debug!(voice, sound, position, ?mode, start, end, "Voice playing");
        Ok(())
    }

    fn start_voice(
        &mut self,
        voice: usize,
        sound: usize,
        position: usize,
        mode: PlayMode,
        start: usize,
        end: usize,
    ) -> Result<(), SynthError> {
        let data = self.bank.frames(sound).ok_or(SynthError::SoundOutOfRange {
            sound,
            sounds: self.bank.len(),
        })?;
        self.voices
            .play(voice, sound, data, position, mode, start, end)
    }

    /// Executes a control command. Unlike the individual control methods this doesn't log, so
    /// it is safe to call from the audio thread.
    pub fn apply(&mut self, command: &Command) -> Result<(), SynthError> {
        match *command {
            Command::Play {
                voice,
                sound,
                position,
                mode,
                start,
                end,
            } => self.start_voice(voice, sound, position, mode, start, end),
            Command::Stop { voice } => self.voices.stop(voice),
            Command::SetVolume { voice, volume } => self.set_voice_volume(voice, volume),
            Command::SetBalance { voice, balance } => self.set_voice_balance(voice, balance),
            Command::SetFrequency { voice, frequency } => {
                self.voices
                    .set_frequency(voice, frequency, self.sample_rate)
            }
            Command::SetGlobalVolume { volume } => {
                self.set_global_volume(volume);
                Ok(())
            }
        }
    }

    /// Mixes `frames` frames of every active voice into the interleaved stereo `buffer`.
    ///
    /// The buffer is not cleared first: voices are added onto whatever it already holds, so
    /// several calls can be composited into one block. The global volume is applied to the
    /// whole `frames * 2` region afterwards.
    pub fn update(&mut self, buffer: &mut [f32], frames: usize) -> Result<(), SynthError> {
        if frames == 0 {
            return Err(SynthError::EmptyUpdate);
        }
        let needed = frames.checked_mul(CHANNELS).unwrap_or(usize::MAX);
        if buffer.len() < needed {
            return Err(SynthError::BufferTooSmall {
                needed,
                len: buffer.len(),
            });
        }
        let output = &mut buffer[..needed];

        self.active_voices = 0;
        for voice in self.voices.iter_mut() {
            let Some(data) = voice.sound().and_then(|sound| self.bank.frames(sound)) else {
                continue;
            };
            if data.is_empty() {
                continue;
            }

            self.active_voices += 1;
            voice.render(data, output);
        }

        for sample in output.iter_mut() {
            *sample *= self.volume;
        }

        Ok(())
    }
}
