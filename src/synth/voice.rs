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

//! Playback voices.
//!
//! A voice is a cursor over one sound in the bank. It refers to the sound by slot number only,
//! so replacing a slot's contents never leaves a dangling reference: the mixer simply sees the
//! new length on its next pass.

use super::error::SynthError;
use super::pan::{self, PAN_CENTER};
use super::{VOLUME_MAX, VOLUME_MIN};

/// How a voice moves through its sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// Play from the start position to the end position once, then go idle.
    #[default]
    Forward,
    /// Loop between the start and end positions until stopped.
    ForwardLoop,
}

impl From<i32> for PlayMode {
    /// Only the exact loop value selects looping; anything else plays once.
    fn from(mode: i32) -> Self {
        match mode {
            1 => PlayMode::ForwardLoop,
            _ => PlayMode::Forward,
        }
    }
}

/// One playback cursor.
#[derive(Debug, Clone)]
pub struct Voice {
    /// The bound sound slot. `None` means the voice is idle.
    sound: Option<usize>,
    /// Playback frequency in Hz.
    frequency: u32,
    /// Frames advanced per output frame.
    pitch: f32,
    volume: f32,
    /// Stereo balance in [-1, 1].
    balance: f32,
    /// (left, right) gains derived from `balance`.
    gain: (f32, f32),
    /// Fractional frame position in the sound.
    position: f32,
    /// Integer part of `position` as of the last cache refresh.
    index: usize,
    /// Loop start, or playback start for one-shot voices.
    start: usize,
    /// Loop end, or playback end for one-shot voices.
    end: usize,
    mode: PlayMode,
    /// Sample at `index`.
    frame: f32,
    /// Sample at `index + 1`, or a repeat of `frame` past the end of the sound.
    next_frame: f32,
}

impl Default for Voice {
    fn default() -> Self {
        let mut voice = Self {
            sound: None,
            frequency: 0,
            pitch: 0.0,
            volume: VOLUME_MAX,
            balance: PAN_CENTER,
            gain: (0.0, 0.0),
            position: 0.0,
            index: 0,
            start: 0,
            end: 0,
            mode: PlayMode::Forward,
            frame: 0.0,
            next_frame: 0.0,
        };
        voice.set_balance(PAN_CENTER);
        voice
    }
}

impl Voice {
    /// Returns the bound sound slot, or `None` when idle.
    pub fn sound(&self) -> Option<usize> {
        self.sound
    }

    pub fn is_idle(&self) -> bool {
        self.sound.is_none()
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn balance(&self) -> f32 {
        self.balance
    }

    pub fn gain(&self) -> (f32, f32) {
        self.gain
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(VOLUME_MIN, VOLUME_MAX);
    }

    pub fn set_balance(&mut self, balance: f32) {
        self.balance = balance.clamp(pan::PAN_LEFT, pan::PAN_RIGHT);
        self.gain = pan::gain(self.balance);
    }

    fn set_frequency(&mut self, frequency: u32, sample_rate: u32) {
        self.frequency = frequency;
        self.pitch = frequency as f32 / sample_rate as f32;
    }

    /// Returns the voice to its defaults. The balance is left alone so that a stereo placement
    /// chosen by the user survives stop/replay cycles.
    pub fn reset(&mut self) {
        let balance = self.balance;
        *self = Self::default();
        self.set_balance(balance);
    }

    /// Binds the voice to `sound` and primes the interpolation cache from `data`, so that the
    /// first mixed sample is the sample at `position` with no ramp from stale state.
    fn start(
        &mut self,
        sound: usize,
        data: &[f32],
        position: usize,
        mode: PlayMode,
        start: usize,
        end: usize,
    ) {
        self.sound = Some(sound);
        self.mode = mode;
        self.position = position as f32;
        self.index = position;
        self.start = start;
        self.end = end;
        self.frame = data.get(position).copied().unwrap_or(0.0);
        self.next_frame = data
            .get(position.saturating_add(1))
            .copied()
            .unwrap_or(self.frame);
    }

    /// Handles a crossing of the end position. Looping voices wrap back towards the start while
    /// keeping their fractional phase; one-shot voices unbind. Returns false once the voice has
    /// gone idle.
    #[inline]
    fn check_end(&mut self) -> bool {
        if self.position > self.end as f32 {
            match self.mode {
                PlayMode::ForwardLoop => {
                    self.position = self.start as f32 + (self.position - self.end as f32);
                }
                PlayMode::Forward => {
                    self.sound = None;
                    return false;
                }
            }
        }
        true
    }

    /// Refreshes the interpolation cache when the integer position has moved. A single step
    /// forward reuses the cached look-ahead sample, so steady playback reads each source frame
    /// once. Positions outside the sound keep the stale samples.
    #[inline]
    fn fetch(&mut self, data: &[f32]) {
        let index = self.position as usize;
        if index == self.index {
            return;
        }

        if index == self.index.wrapping_add(1) {
            self.frame = self.next_frame;
        } else if let Some(&sample) = data.get(index) {
            self.frame = sample;
        }
        self.index = index;
        self.next_frame = data
            .get(index.saturating_add(1))
            .copied()
            .unwrap_or(self.frame);
    }

    /// Mixes this voice into interleaved stereo `output` (additively) and advances it.
    #[inline]
    pub(super) fn render(&mut self, data: &[f32], output: &mut [f32]) {
        if !self.check_end() {
            return;
        }

        for out in output.chunks_exact_mut(2) {
            self.fetch(data);

            let sample = (self.next_frame - self.frame)
                .mul_add(self.position - self.index as f32, self.frame)
                * self.volume;
            out[0] = sample.mul_add(self.gain.0, out[0]);
            out[1] = sample.mul_add(self.gain.1, out[1]);

            self.position += self.pitch;
            if !self.check_end() {
                break;
            }
        }
    }
}

/// The fixed-size pool of voices.
#[derive(Debug, Default)]
pub struct VoicePool {
    voices: Vec<Voice>,
}

impl VoicePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Replaces every voice with `count` fresh ones, discarding all playback state.
    pub fn resize(&mut self, count: usize) -> Result<(), SynthError> {
        if count < 1 {
            return Err(SynthError::InvalidVoiceCount(count));
        }

        self.voices.clear();
        self.voices.resize_with(count, Voice::default);
        Ok(())
    }

    pub fn get(&self, voice: usize) -> Result<&Voice, SynthError> {
        let voices = self.voices.len();
        self.voices
            .get(voice)
            .ok_or(SynthError::VoiceOutOfRange { voice, voices })
    }

    pub fn get_mut(&mut self, voice: usize) -> Result<&mut Voice, SynthError> {
        let voices = self.voices.len();
        self.voices
            .get_mut(voice)
            .ok_or(SynthError::VoiceOutOfRange { voice, voices })
    }

    /// Sets the playback frequency. The pitch step is derived against `sample_rate`.
    pub fn set_frequency(
        &mut self,
        voice: usize,
        frequency: u32,
        sample_rate: u32,
    ) -> Result<(), SynthError> {
        let voice = self.get_mut(voice)?;
        if frequency == 0 {
            return Err(SynthError::InvalidFrequency);
        }
        voice.set_frequency(frequency, sample_rate);
        Ok(())
    }

    /// Starts `voice` on `sound`, whose frames are `data`.
    #[allow(clippy::too_many_arguments)]
    pub fn play(
        &mut self,
        voice: usize,
        sound: usize,
        data: &[f32],
        position: usize,
        mode: PlayMode,
        start: usize,
        end: usize,
    ) -> Result<(), SynthError> {
        self.get_mut(voice)?
            .start(sound, data, position, mode, start, end);
        Ok(())
    }

    pub fn stop(&mut self, voice: usize) -> Result<(), SynthError> {
        self.get_mut(voice)?.reset();
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.iter_mut()
    }
}
