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
//! Turns a scene into a mixer and its cue schedule, and renders it offline.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::{info, span, warn, Level};

use crate::config::Scene;
use crate::synth::{Command, Cue, CueFailure, Mixer, Sequencer, Session, SynthError, CHANNELS};
use crate::util::{duration_minutes_seconds, duration_to_frames, frames_to_duration};

use super::{wav, AudioError, TargetFormat};

/// The longest a scene without a fixed duration is allowed to run.
pub const MAX_RENDER_DURATION: Duration = Duration::from_secs(600);

/// Loads every sound of the scene into a new mixer and turns its cues into a schedule.
///
/// Each cue becomes a frequency, volume and balance change followed by a play command at the
/// cue's frame, plus a stop command if the cue has one. Cues on sounds with no frames are
/// dropped since they would never play.
pub fn prepare(scene: &Scene) -> Result<(Mixer, Sequencer), AudioError> {
    let span = span!(Level::INFO, "prepare scene");
    let _enter = span.enter();

    let mut session = Session::new();
    session.initialize(scene.sample_rate())?;
    let mixer = session.mixer_mut()?;
    mixer.set_total_voices(scene.voices())?;
    mixer.set_global_volume(scene.global_volume());

    let mut native_rates = HashMap::new();
    for sound in scene.sounds() {
        let pcm = wav::read_pcm(&scene.sound_path(sound))?;
        mixer.load_sound(
            sound.slot(),
            pcm.bytes(),
            pcm.bytes_per_sample(),
            pcm.channels(),
        )?;
        native_rates.insert(sound.slot(), pcm.sample_rate());
    }

    let sample_rate = mixer.sample_rate();
    let mut cues = Vec::with_capacity(scene.cues().len() * 5);
    for cue in scene.cues() {
        let voice = cue.voice();
        let sound = cue.sound();
        if voice >= mixer.total_voices() {
            return Err(SynthError::VoiceOutOfRange {
                voice,
                voices: mixer.total_voices(),
            }
            .into());
        }
        let frames = mixer.sound_frames(sound)?.len();
        if frames == 0 {
            warn!(voice, sound, "Sound has no frames, skipping cue");
            continue;
        }

        let frame = duration_to_frames(cue.at()?, sample_rate);
        let frequency = cue
            .frequency()
            .or_else(|| native_rates.get(&sound).copied())
            .unwrap_or(sample_rate);
        cues.push(Cue {
            frame,
            command: Command::SetFrequency { voice, frequency },
        });
        if let Some(volume) = cue.volume() {
            cues.push(Cue {
                frame,
                command: Command::SetVolume { voice, volume },
            });
        }
        if let Some(balance) = cue.balance() {
            cues.push(Cue {
                frame,
                command: Command::SetBalance { voice, balance },
            });
        }

        let start = cue.start().unwrap_or(0);
        let end = cue.end().unwrap_or(frames - 1);
        cues.push(Cue {
            frame,
            command: Command::Play {
                voice,
                sound,
                position: cue.position().unwrap_or(start),
                mode: cue.mode(),
                start,
                end,
            },
        });

        if let Some(stop_at) = cue.stop_at()? {
            cues.push(Cue {
                frame: duration_to_frames(stop_at, sample_rate),
                command: Command::Stop { voice },
            });
        }
    }

    let end_frame = scene
        .duration()?
        .map(|duration| duration_to_frames(duration, sample_rate));
    info!(
        sounds = scene.sounds().len(),
        cues = cues.len(),
        sample_rate,
        end_frame,
        "Scene prepared"
    );

    let mixer = session.into_mixer()?;
    Ok((mixer, Sequencer::new(cues, end_frame)))
}

/// Renders the scene into interleaved stereo samples.
///
/// A scene with a duration renders exactly that many frames. Otherwise rendering stops once
/// every cue has fired and every voice is idle, or at [`MAX_RENDER_DURATION`].
pub fn render(scene: &Scene) -> Result<Vec<f32>, AudioError> {
    let (mut mixer, mut sequencer) = prepare(scene)?;
    let sample_rate = mixer.sample_rate();
    let block_frames = scene.output().block_frames();
    let max_frames = sequencer
        .end_frame()
        .unwrap_or_else(|| duration_to_frames(MAX_RENDER_DURATION, sample_rate));

    let mut output = Vec::new();
    let mut block = vec![0.0f32; block_frames * CHANNELS];
    while !sequencer.is_finished(&mixer) && sequencer.frame() < max_frames {
        let left = max_frames - sequencer.frame();
        let frames = usize::try_from(left).map_or(block_frames, |left| left.min(block_frames));
        let frames = sequencer.remaining(frames);

        let block = &mut block[..frames * CHANNELS];
        block.fill(0.0);
        sequencer.process(&mut mixer, block)?;
        output.extend_from_slice(block);
        if let Some((failed, failure)) = sequencer.take_failures() {
            log_cue_failures(failed, &failure);
        }
    }

    if sequencer.end_frame().is_none() && !sequencer.is_finished(&mixer) {
        warn!(
            limit = duration_minutes_seconds(MAX_RENDER_DURATION),
            "Scene never went idle, render was cut off"
        );
    }

    let frames = output.len() / CHANNELS;
    info!(
        frames,
        duration = duration_minutes_seconds(frames_to_duration(frames as u64, sample_rate)),
        "Scene rendered"
    );
    Ok(output)
}

/// Reports cues the mixer rejected.
pub(super) fn log_cue_failures(failed: usize, failure: &CueFailure) {
    warn!(
        failed,
        frame = failure.frame,
        voice = ?failure.command.voice(),
        command = ?failure.command,
        err = %failure.error,
        "Cue failed"
    );
}

/// Renders the scene into a WAV file in the scene's output format. Returns the frames written.
pub fn render_to_file(scene: &Scene, path: &Path) -> Result<usize, AudioError> {
    let output = scene.output();
    let target = TargetFormat::new(
        scene.sample_rate(),
        output.sample_format()?,
        output.bits_per_sample()?,
    )?;

    let samples = render(scene)?;
    wav::write_stereo(path, &samples, &target)?;
    Ok(samples.len() / CHANNELS)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use hound::WavReader;

    use super::*;
    use crate::synth::pan;
    use crate::testutil::{assert_close, write_wav_i16};

    /// Writes a scene file plus a 10-sample 16-bit ramp sound at 48kHz next to it.
    fn scene_with_ramp(dir: &Path, yaml: &str) -> Scene {
        let ramp: Vec<i16> = (1..=10).map(|i| i * 1000).collect();
        write_wav_i16(&dir.join("ramp.wav"), 1, 48000, &ramp).unwrap();

        let path: PathBuf = dir.join("scene.yaml");
        fs::write(&path, yaml).unwrap();
        Scene::deserialize(&path).unwrap()
    }

    #[test]
    fn test_render_ramp_until_idle() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sample_rate: 48000
voices: 4
output:
  block_frames: 5
sounds:
  - slot: 0
    file: ramp.wav
cues:
  - voice: 0
    sound: 0
"#,
        );

        // Rendering stops at the first block boundary once the voice is idle.
        let samples = render(&scene).unwrap();
        assert_eq!(samples.len(), 10 * CHANNELS);

        let (left, right) = pan::gain(0.0);
        for i in 0..10 {
            let expected = ((i + 1) * 1000) as f32 / 32768.0;
            assert_close(samples[i * 2], expected * left);
            assert_close(samples[i * 2 + 1], expected * right);
        }
    }

    #[test]
    fn test_render_fixed_duration_with_delayed_cue() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sample_rate: 1000
duration: 20ms
sounds:
  - slot: 0
    file: ramp.wav
cues:
  - voice: 0
    sound: 0
    at: 5ms
    frequency: 1000
    balance: -1.0
    volume: 0.5
"#,
        );

        let samples = render(&scene).unwrap();
        assert_eq!(samples.len(), 20 * CHANNELS);

        assert!(samples[..5 * CHANNELS].iter().all(|&s| s == 0.0));
        for i in 0..10 {
            let expected = ((i + 1) * 1000) as f32 / 32768.0 * 0.5;
            assert_close(samples[(5 + i) * 2], expected);
            assert_close(samples[(5 + i) * 2 + 1], 0.0);
        }
        assert!(samples[15 * CHANNELS..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_render_stop_and_play_on_same_frame() {
        let dir = tempfile::tempdir().unwrap();
        // The replay is listed before the cue whose stop lands on the same frame.
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sample_rate: 1000
duration: 10ms
sounds:
  - slot: 0
    file: ramp.wav
cues:
  - voice: 0
    sound: 0
    at: 5ms
    frequency: 1000
    balance: -1.0
  - voice: 0
    sound: 0
    stop_at: 5ms
    frequency: 1000
    balance: -1.0
"#,
        );

        let samples = render(&scene).unwrap();
        assert_eq!(samples.len(), 10 * CHANNELS);
        for i in 0..10 {
            let expected = ((i % 5) + 1) as f32 * 1000.0 / 32768.0;
            assert_close(samples[i * 2], expected);
        }
    }

    #[test]
    fn test_render_loop_stopped_by_cue() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sample_rate: 48000
sounds:
  - slot: 0
    file: ramp.wav
cues:
  - voice: 1
    sound: 0
    mode: loop
    start: 2
    end: 5
    stop_at: 1ms
"#,
        );

        let samples = render(&scene).unwrap();
        assert_eq!(samples.len(), 512 * CHANNELS);

        // The first pass covers frames 2 to 5, after which the loop wraps to 3.
        let (left, _) = pan::gain(0.0);
        for i in 0..48 {
            let index = if i < 4 { 2 + i } else { 3 + (i - 4) % 3 };
            let expected = (index + 1) as f32 * 1000.0 / 32768.0;
            assert_close(samples[i * 2], expected * left);
        }
        // Stopped after 1ms.
        assert!(samples[48 * CHANNELS..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_prepare_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sample_rate: 44100
voices: 2
global_volume: 0.25
sounds:
  - slot: 0
    file: ramp.wav
cues:
  - voice: 1
    sound: 0
    mode: loop
"#,
        );

        let (mut mixer, mut sequencer) = prepare(&scene).unwrap();
        assert_eq!(mixer.sample_rate(), 44100);
        assert_eq!(mixer.total_voices(), 2);
        assert_eq!(mixer.global_volume(), 0.25);
        assert_eq!(mixer.sound_frames(0).unwrap().len(), 10);
        assert_eq!(sequencer.pending(), 2);
        assert_eq!(sequencer.end_frame(), None);

        let mut block = vec![0.0; 2];
        sequencer.process(&mut mixer, &mut block).unwrap();
        // The voice plays at the file's native 48kHz rather than the mixer rate.
        assert_eq!(mixer.voice_frequency(1).unwrap(), 48000);
        assert_eq!(mixer.voice_sound(1).unwrap(), Some(0));
        assert_eq!(mixer.active_voices(), 1);
        assert_eq!(sequencer.pending(), 0);
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sample_rate: 48000
output:
  block_frames: 10
  sample_format: int
sounds:
  - slot: 0
    file: ramp.wav
cues:
  - voice: 0
    sound: 0
    balance: 1.0
"#,
        );

        let out = dir.path().join("out.wav");
        assert_eq!(render_to_file(&scene, &out).unwrap(), 10);

        let mut reader = WavReader::open(&out).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], 0);
        // Full right is a gain of sin(pi/2), which is 1 to within a rounding step.
        assert!((samples[1] - 1000).abs() <= 1);
        assert!((samples[19] - 10000).abs() <= 1);
    }

    #[test]
    fn test_render_empty_scene() {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene_with_ramp(
            dir.path(),
            r#"
sounds:
  - slot: 0
    file: ramp.wav
"#,
        );
        assert!(render(&scene).unwrap().is_empty());
    }

    #[test]
    fn test_prepare_missing_sound_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        fs::write(
            &path,
            r#"
sounds:
  - slot: 0
    file: missing.wav
"#,
        )
        .unwrap();
        let scene = Scene::deserialize(&path).unwrap();
        assert!(matches!(prepare(&scene), Err(AudioError::Wav(_))));
    }
}
