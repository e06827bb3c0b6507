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
//! Live playback through cpal.
//!
//! The mixer and its sequencer are moved into the output callback, so every control command is
//! applied on the audio thread between mixing sub-blocks. The callback neither allocates nor
//! logs: completion and failures leave it as non-blocking [`PlaybackEvent`]s, which the playing
//! thread logs.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver, Sender};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use tracing::{error, info, span, warn, Level};

use crate::config::{Scene, DEFAULT_DEVICE};
use crate::synth::{CueFailure, Mixer, Sequencer, SynthError, CHANNELS};
use crate::util::frames_to_duration;

use super::render::{self, MAX_RENDER_DURATION};
use super::AudioError;

/// How long to keep the stream open after the scene finishes so the last block is heard.
const DRAIN_TIME: Duration = Duration::from_millis(200);

/// Size of the callback's mixing buffer. Larger device buffers are mixed in several passes.
const SCRATCH_SAMPLES: usize = 8192;

/// Room for events between two polls of the playing thread.
const EVENT_CAPACITY: usize = 64;

/// Something the output callback reports to the playing thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Every cue has fired and the mixer is idle, or the scene's duration has passed.
    Finished,
    /// `failed` cues were rejected since the last report, the latest being `failure`.
    CueFailed { failed: usize, failure: CueFailure },
    /// Mixing a block failed.
    MixFailed(SynthError),
}

/// An output device known to cpal.
pub struct Device {
    /// The name of the device.
    name: String,
    /// The maximum number of channels the device supports.
    max_channels: u16,
    /// The host ID of the device.
    host_id: cpal::HostId,
}

impl Device {
    /// Gets the name of the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lists every output device on every available host, sorted by name.
    pub fn list() -> Result<Vec<Device>, AudioError> {
        let mut devices: Vec<Device> = Vec::new();
        for host_id in cpal::available_hosts() {
            let host_devices = match cpal::host_from_id(host_id)?.output_devices() {
                Ok(host_devices) => host_devices,
                Err(e) => {
                    error!(
                        err = e.to_string(),
                        host = host_id.name(),
                        "Unable to list devices for host"
                    );
                    continue;
                }
            };

            for device in host_devices {
                let Ok(output_configs) = device.supported_output_configs() else {
                    continue;
                };
                let max_channels = output_configs
                    .map(|config| config.channels())
                    .max()
                    .unwrap_or(0);

                if max_channels > 0 {
                    devices.push(Device {
                        name: device.name()?,
                        max_channels,
                        host_id,
                    })
                }
            }
        }

        devices.sort_by_key(|device| device.name.to_string());
        Ok(devices)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}) ({})",
            self.name,
            self.max_channels,
            self.host_id.name()
        )
    }
}

/// Finds the named output device on the default host. "default" picks the host's default
/// output device.
fn find_device(name: &str) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    if name == DEFAULT_DEVICE {
        return host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()));
    }

    for device in host.output_devices()? {
        if device.name()?.trim() == name {
            return Ok(device);
        }
    }
    Err(AudioError::DeviceNotFound(name.to_string()))
}

/// Plays the scene on its configured output device and blocks until it has finished.
pub fn play(scene: &Scene) -> Result<(), AudioError> {
    let span = span!(Level::INFO, "play scene");
    let _enter = span.enter();

    let (mixer, sequencer) = render::prepare(scene)?;
    let sample_rate = mixer.sample_rate();
    let limit = match sequencer.end_frame() {
        Some(end_frame) => frames_to_duration(end_frame, sample_rate),
        None => MAX_RENDER_DURATION,
    };

    let device = find_device(scene.output().device())?;
    let sample_format = device.default_output_config()?.sample_format();
    let config = cpal::StreamConfig {
        channels: CHANNELS as u16,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_CAPACITY);
    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &config, mixer, sequencer, events_tx)?
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &config, mixer, sequencer, events_tx)?
        }
        cpal::SampleFormat::I32 => {
            build_stream::<i32>(&device, &config, mixer, sequencer, events_tx)?
        }
        other => return Err(AudioError::UnsupportedDeviceFormat(format!("{:?}", other))),
    };
    stream.play()?;
    info!(
        device = scene.output().device(),
        sample_rate,
        format = ?sample_format,
        "Playback started"
    );

    // The stream has no end of its own, so give up a little after the scene's length.
    if wait_for_playback(&events_rx, Instant::now() + limit + DRAIN_TIME) {
        info!("Playback finished");
    } else {
        warn!("Timed out waiting for playback to finish");
    }
    thread::sleep(DRAIN_TIME);
    Ok(())
}

/// Logs events from the output callback until it reports completion or the deadline passes.
/// Returns true if playback finished.
fn wait_for_playback(events: &Receiver<PlaybackEvent>, deadline: Instant) -> bool {
    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        select! {
            recv(events) -> event => match event {
                Ok(PlaybackEvent::Finished) => return true,
                Ok(PlaybackEvent::CueFailed { failed, failure }) => {
                    render::log_cue_failures(failed, &failure)
                }
                Ok(PlaybackEvent::MixFailed(e)) => error!(err = %e, "Mixing failed"),
                Err(_) => return false,
            },
            default(timeout) => return false,
        }
    }
}

/// Mixes the next stretch of the scene into `block`, which is cleared first, and reports what
/// happened through `events`. Returns true once the scene has finished and that has been
/// reported.
fn mix_block(
    mixer: &mut Mixer,
    sequencer: &mut Sequencer,
    block: &mut [f32],
    events: &Sender<PlaybackEvent>,
    notified: bool,
) -> bool {
    block.fill(0.0);

    if !sequencer.is_finished(mixer) {
        let frames = sequencer.remaining(block.len() / CHANNELS);
        if frames > 0 {
            if let Err(e) = sequencer.process(mixer, &mut block[..frames * CHANNELS]) {
                let _ = events.try_send(PlaybackEvent::MixFailed(e));
            }
        }
    }
    if let Some((failed, failure)) = sequencer.take_failures() {
        let _ = events.try_send(PlaybackEvent::CueFailed { failed, failure });
    }

    if !notified && sequencer.is_finished(mixer) {
        return events.try_send(PlaybackEvent::Finished).is_ok();
    }
    notified
}

/// Builds an output stream whose callback owns the mixer and sequencer.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
    mut sequencer: Sequencer,
    events: Sender<PlaybackEvent>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
{
    let mut scratch = vec![0.0f32; SCRATCH_SAMPLES];
    let mut notified = false;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for chunk in data.chunks_mut(SCRATCH_SAMPLES) {
                let block = &mut scratch[..chunk.len()];
                notified = mix_block(&mut mixer, &mut sequencer, block, &events, notified);

                for (dst, &src) in chunk.iter_mut().zip(block.iter()) {
                    *dst = T::from_sample(src);
                }
            }
        },
        |err| error!("Output stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{pan, Command, Cue, PlayMode};
    use crate::testutil::{assert_close, pcm_f32};

    fn scene() -> (Mixer, Sequencer) {
        let mut mixer = Mixer::new(8000).unwrap();
        mixer.set_total_voices(2).unwrap();
        mixer.load_sound(0, &pcm_f32(&[0.5; 4]), 4, 1).unwrap();
        let cues = vec![
            Cue {
                frame: 0,
                command: Command::SetFrequency {
                    voice: 0,
                    frequency: 8000,
                },
            },
            Cue {
                frame: 0,
                command: Command::Play {
                    voice: 0,
                    sound: 0,
                    position: 0,
                    mode: PlayMode::Forward,
                    start: 0,
                    end: 3,
                },
            },
            Cue {
                frame: 0,
                command: Command::Stop { voice: 9 },
            },
        ];
        (mixer, Sequencer::new(cues, None))
    }

    #[test]
    fn test_mix_block_reports_failures_and_completion() {
        let (mut mixer, mut sequencer) = scene();
        let (tx, rx) = crossbeam_channel::bounded(EVENT_CAPACITY);
        let mut block = vec![1.0f32; 8];

        assert!(mix_block(&mut mixer, &mut sequencer, &mut block, &tx, false));
        let (left, right) = pan::gain(0.0);
        for frame in block.chunks_exact(2) {
            assert_close(frame[0], 0.5 * left);
            assert_close(frame[1], 0.5 * right);
        }

        match rx.try_recv().unwrap() {
            PlaybackEvent::CueFailed { failed, failure } => {
                assert_eq!(failed, 1);
                assert_eq!(failure.command, Command::Stop { voice: 9 });
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(rx.try_recv().unwrap(), PlaybackEvent::Finished);

        // Once finished the block is silence and nothing more is reported.
        assert!(mix_block(&mut mixer, &mut sequencer, &mut block, &tx, true));
        assert!(block.iter().all(|&s| s == 0.0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_wait_for_playback() {
        let (tx, rx) = crossbeam_channel::bounded(EVENT_CAPACITY);
        tx.send(PlaybackEvent::MixFailed(SynthError::EmptyUpdate))
            .unwrap();
        tx.send(PlaybackEvent::Finished).unwrap();
        assert!(wait_for_playback(&rx, Instant::now() + Duration::from_secs(5)));

        assert!(!wait_for_playback(&rx, Instant::now()));

        drop(tx);
        assert!(!wait_for_playback(&rx, Instant::now() + Duration::from_secs(5)));
    }
}
