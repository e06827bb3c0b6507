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
use clap::{crate_version, Parser, Subcommand};
use softmix::audio::{self, cpal, render, wav};
use softmix::config::Scene;
use softmix::util::{duration_minutes_seconds, filename_display, frames_to_duration};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A stereo sample mixer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a scene to a WAV file.
    Render {
        /// The path to the scene file.
        scene_path: String,
        /// The WAV file to write.
        output_path: String,
    },
    /// Plays a scene through an audio output device.
    Play {
        /// The path to the scene file.
        scene_path: String,
        /// The device name to play through. Overrides the scene's output device.
        #[arg[short, long]]
        device_name: Option<String>,
    },
    /// Lists the available audio output devices.
    Devices {},
    /// Shows how a WAV file decodes into a mixer sound.
    Info {
        /// The path to the WAV file.
        path: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            scene_path,
            output_path,
        } => {
            let scene = Scene::deserialize(&PathBuf::from(&scene_path))?;
            let output_path = PathBuf::from(&output_path);
            let frames = render::render_to_file(&scene, &output_path)?;
            println!(
                "Rendered {} frames ({}) to {}.",
                frames,
                duration_minutes_seconds(frames_to_duration(
                    frames as u64,
                    scene.sample_rate()
                )),
                filename_display(&output_path)
            );
        }
        Commands::Play {
            scene_path,
            device_name,
        } => {
            let mut scene = Scene::deserialize(&PathBuf::from(&scene_path))?;
            if let Some(device_name) = device_name {
                scene.set_device(&device_name);
            }
            cpal::play(&scene)?;
        }
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Info { path } => {
            let path = PathBuf::from(&path);
            let pcm = wav::read_pcm(&path)?;
            println!("{}:", filename_display(&path));
            println!("  Frames: {}", pcm.frames());
            println!("  Channels: {} (summed to mono)", pcm.channels());
            println!("  Sample width: {} bytes", pcm.bytes_per_sample());
            println!("  Native sample rate: {} Hz", pcm.sample_rate());
            println!("  Duration: {}", duration_minutes_seconds(pcm.duration()));
        }
    }

    Ok(())
}
