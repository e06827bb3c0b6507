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
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

use crate::synth::PlayMode;

use super::{parse_duration, Audio, ConfigError};

/// The sample rate used when a scene doesn't name one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// The voice count used when a scene doesn't name one.
pub const DEFAULT_VOICES: usize = 16;

/// A YAML representation of a scene: a set of sounds and the cues that play them.
#[derive(Deserialize, Clone, Debug)]
pub struct Scene {
    /// Output sample rate in Hz (default: 44100).
    sample_rate: Option<u32>,

    /// Number of voices (default: 16).
    voices: Option<usize>,

    /// Master volume (default: 1.0).
    global_volume: Option<f32>,

    /// How long to render. When unset, the scene runs until every voice is idle.
    duration: Option<String>,

    /// Output settings.
    #[serde(default)]
    output: Audio,

    /// Sounds to load into the bank.
    #[serde(default)]
    sounds: Vec<Sound>,

    /// Voice cues.
    #[serde(default)]
    cues: Vec<VoiceCue>,

    /// The directory sound files are resolved against.
    #[serde(skip)]
    base_path: PathBuf,
}

/// A sound file loaded into a bank slot.
#[derive(Deserialize, Clone, Debug)]
pub struct Sound {
    /// The bank slot.
    slot: usize,

    /// The WAV file, relative to the scene file.
    file: String,
}

impl Sound {
    /// Gets the bank slot.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Gets the file as written in the scene.
    pub fn file(&self) -> &str {
        &self.file
    }
}

/// The play mode of a cue.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CueMode {
    /// Play once and stop.
    #[default]
    Forward,
    /// Wrap to the start of the region when the end is passed.
    Loop,
}

impl From<CueMode> for PlayMode {
    fn from(mode: CueMode) -> Self {
        match mode {
            CueMode::Forward => PlayMode::Forward,
            CueMode::Loop => PlayMode::ForwardLoop,
        }
    }
}

/// Plays a sound on a voice at a point in time.
#[derive(Deserialize, Clone, Debug)]
pub struct VoiceCue {
    voice: usize,
    sound: usize,
    at: Option<String>,
    stop_at: Option<String>,
    frequency: Option<u32>,
    volume: Option<f32>,
    balance: Option<f32>,
    #[serde(default)]
    mode: CueMode,
    position: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
}

impl VoiceCue {
    /// Gets the voice this cue plays on.
    pub fn voice(&self) -> usize {
        self.voice
    }

    /// Gets the sound slot this cue plays.
    pub fn sound(&self) -> usize {
        self.sound
    }

    /// When the sound starts (default: the beginning of the scene).
    pub fn at(&self) -> Result<Duration, ConfigError> {
        match &self.at {
            Some(at) => parse_duration(at),
            None => Ok(Duration::ZERO),
        }
    }

    /// When the voice is stopped, if ever.
    pub fn stop_at(&self) -> Result<Option<Duration>, ConfigError> {
        self.stop_at.as_deref().map(parse_duration).transpose()
    }

    /// The playback frequency. When unset, the sound's native rate is used.
    pub fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    /// Gets the voice volume, if set.
    pub fn volume(&self) -> Option<f32> {
        self.volume
    }

    /// Gets the voice balance, if set.
    pub fn balance(&self) -> Option<f32> {
        self.balance
    }

    /// Gets the play mode.
    pub fn mode(&self) -> PlayMode {
        self.mode.into()
    }

    /// The initial frame, if set. Defaults to the region start.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// The first frame of the region, if set.
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    /// The last frame of the region, if set.
    pub fn end(&self) -> Option<usize> {
        self.end
    }
}

impl Scene {
    /// Parses a scene from a YAML file and validates it. Sound files are resolved
    /// relative to the scene file's directory.
    pub fn deserialize(path: &Path) -> Result<Scene, ConfigError> {
        let mut scene = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Scene>()?;
        scene.base_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
        scene.validate()?;
        Ok(scene)
    }

    /// Checks the scene for values the mixer would reject or silently ignore.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate() == 0 {
            return Err(ConfigError::Invalid(
                "sample_rate must be greater than 0".to_string(),
            ));
        }
        if self.voices() == 0 {
            return Err(ConfigError::Invalid(
                "voices must be at least 1".to_string(),
            ));
        }
        self.duration()?;

        let mut slots = HashSet::new();
        for sound in &self.sounds {
            if !slots.insert(sound.slot) {
                return Err(ConfigError::Invalid(format!(
                    "sound slot {} is defined more than once",
                    sound.slot
                )));
            }
        }

        for (i, cue) in self.cues.iter().enumerate() {
            if cue.voice >= self.voices() {
                return Err(ConfigError::Invalid(format!(
                    "cue {} uses voice {}, but the scene only has {} voices",
                    i,
                    cue.voice,
                    self.voices()
                )));
            }
            if !slots.contains(&cue.sound) {
                return Err(ConfigError::Invalid(format!(
                    "cue {} plays undefined sound slot {}",
                    i, cue.sound
                )));
            }
            if cue.frequency == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "cue {} has a frequency of 0",
                    i
                )));
            }
            if let (Some(start), Some(end)) = (cue.start, cue.end) {
                if start > end {
                    return Err(ConfigError::Invalid(format!(
                        "cue {} starts at frame {} after its end frame {}",
                        i, start, end
                    )));
                }
            }
            let at = cue.at()?;
            if let Some(stop_at) = cue.stop_at()? {
                if stop_at < at {
                    return Err(ConfigError::Invalid(format!(
                        "cue {} stops before it starts",
                        i
                    )));
                }
            }
        }

        Ok(())
    }

    /// Gets the output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Gets the number of voices.
    pub fn voices(&self) -> usize {
        self.voices.unwrap_or(DEFAULT_VOICES)
    }

    /// Gets the master volume.
    pub fn global_volume(&self) -> f32 {
        self.global_volume.unwrap_or(1.0)
    }

    /// Gets the render duration, if the scene has a fixed one.
    pub fn duration(&self) -> Result<Option<Duration>, ConfigError> {
        self.duration.as_deref().map(parse_duration).transpose()
    }

    /// Gets the output settings.
    pub fn output(&self) -> &Audio {
        &self.output
    }

    /// Overrides the output device.
    pub fn set_device(&mut self, device: &str) {
        self.output.set_device(device);
    }

    /// Gets the sounds.
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// Gets the cues.
    pub fn cues(&self) -> &[VoiceCue] {
        &self.cues
    }

    /// Resolves the path of a sound file against the scene's directory.
    pub fn sound_path(&self, sound: &Sound) -> PathBuf {
        self.base_path.join(&sound.file)
    }
}
