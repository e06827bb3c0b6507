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

//! Control operations as values, so they can be scheduled and applied on the mixing thread.

use super::voice::PlayMode;

/// A single control operation on a [`Mixer`](super::Mixer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start a voice on a sound.
    Play {
        voice: usize,
        sound: usize,
        position: usize,
        mode: PlayMode,
        start: usize,
        end: usize,
    },
    /// Stop a voice.
    Stop { voice: usize },
    SetVolume { voice: usize, volume: f32 },
    SetBalance { voice: usize, balance: f32 },
    SetFrequency { voice: usize, frequency: u32 },
    SetGlobalVolume { volume: f32 },
}

impl Command {
    /// Returns the voice this command targets, if any.
    pub fn voice(&self) -> Option<usize> {
        match *self {
            Command::Play { voice, .. }
            | Command::Stop { voice }
            | Command::SetVolume { voice, .. }
            | Command::SetBalance { voice, .. }
            | Command::SetFrequency { voice, .. } => Some(voice),
            Command::SetGlobalVolume { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_voice() {
        assert_eq!(Command::Stop { voice: 3 }.voice(), Some(3));
        assert_eq!(
            Command::SetFrequency {
                voice: 1,
                frequency: 44100
            }
            .voice(),
            Some(1)
        );
        assert_eq!(Command::SetGlobalVolume { volume: 0.5 }.voice(), None);
    }
}
