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

//! Frame-accurate scheduling of control commands.
//!
//! The sequencer owns a list of commands keyed by output frame and applies them between mixing
//! sub-blocks. Because the commands are applied by whoever drives the mixer, control and mixing
//! never run concurrently, which is the only way the mixer may be used.

use super::command::Command;
use super::engine::Mixer;
use super::error::SynthError;
use super::CHANNELS;

/// A command scheduled at an output frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub frame: u64,
    pub command: Command,
}

/// A cue the mixer rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueFailure {
    pub frame: u64,
    pub command: Command,
    pub error: SynthError,
}

/// Applies cues at their exact frame while mixing.
#[derive(Debug, Default)]
pub struct Sequencer {
    /// Cues sorted by frame. At the same frame stops come first, then the rest in insertion
    /// order.
    cues: Vec<Cue>,
    /// Index of the next cue to fire.
    next: usize,
    /// Frames mixed so far.
    frame: u64,
    /// Optional frame at which the sequence is over.
    end_frame: Option<u64>,
    /// Cues rejected since the last [`Sequencer::take_failures`].
    failed: usize,
    /// The most recent rejected cue.
    last_failure: Option<CueFailure>,
}

impl Sequencer {
    pub fn new(mut cues: Vec<Cue>, end_frame: Option<u64>) -> Self {
        cues.sort_by_key(|cue| (cue.frame, !matches!(cue.command, Command::Stop { .. })));
        Self {
            cues,
            next: 0,
            frame: 0,
            end_frame,
            failed: 0,
            last_failure: None,
        }
    }

    /// Returns the number of frames mixed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn end_frame(&self) -> Option<u64> {
        self.end_frame
    }

    /// Returns the number of cues that have not fired yet.
    pub fn pending(&self) -> usize {
        self.cues.len() - self.next
    }

    /// Returns true once the end frame is reached or, without one, once every cue has fired and
    /// every voice has gone idle.
    pub fn is_finished(&self, mixer: &Mixer) -> bool {
        match self.end_frame {
            Some(end_frame) => self.frame >= end_frame,
            None => self.pending() == 0 && mixer.is_idle(),
        }
    }

    /// Returns how many frames may still be mixed before the end frame, capped at `frames`.
    pub fn remaining(&self, frames: usize) -> usize {
        match self.end_frame {
            Some(end_frame) => {
                let left = end_frame.saturating_sub(self.frame);
                usize::try_from(left).map_or(frames, |left| left.min(frames))
            }
            None => frames,
        }
    }

    /// Mixes the interleaved stereo `buffer` (additively, see [`Mixer::update`]), firing each
    /// due cue right before the frame it is scheduled for. A failed cue is skipped and recorded
    /// for [`Sequencer::take_failures`]. Nothing here allocates or logs.
    pub fn process(&mut self, mixer: &mut Mixer, buffer: &mut [f32]) -> Result<(), SynthError> {
        let frames = buffer.len() / CHANNELS;
        let mut done = 0;

        while done < frames {
            self.fire_due(mixer);

            let until_next = self
                .cues
                .get(self.next)
                .map_or(usize::MAX, |cue| {
                    usize::try_from(cue.frame - self.frame).unwrap_or(usize::MAX)
                });
            let chunk = (frames - done).min(until_next);

            mixer.update(&mut buffer[done * CHANNELS..(done + chunk) * CHANNELS], chunk)?;
            done += chunk;
            self.frame += chunk as u64;
        }

        // Cues landing exactly on the block boundary take effect now, so the state seen between
        // blocks is current.
        self.fire_due(mixer);
        Ok(())
    }

    fn fire_due(&mut self, mixer: &mut Mixer) {
        while let Some(cue) = self.cues.get(self.next) {
            if cue.frame > self.frame {
                break;
            }
            if let Err(error) = mixer.apply(&cue.command) {
                self.failed += 1;
                self.last_failure = Some(CueFailure {
                    frame: cue.frame,
                    command: cue.command,
                    error,
                });
            }
            self.next += 1;
        }
    }

    /// Returns how many cues failed since the last call, with the most recent failure, and
    /// clears the record. Lets the caller report failures outside the audio thread.
    pub fn take_failures(&mut self) -> Option<(usize, CueFailure)> {
        let failure = self.last_failure.take()?;
        let failed = std::mem::take(&mut self.failed);
        Some((failed, failure))
    }
}
