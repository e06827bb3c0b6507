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
use std::path::Path;
use std::time::Duration;

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Outputs the given duration in a minutes:seconds format.
pub fn duration_minutes_seconds(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    let secs = duration.as_secs() - minutes * 60;
    format!("{}:{:02}", minutes, secs)
}

/// Converts a duration into a frame count at the given sample rate, rounding to the nearest frame.
pub fn duration_to_frames(duration: Duration, sample_rate: u32) -> u64 {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as u64
}

/// Converts a frame count at the given sample rate into a duration.
pub fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / f64::from(sample_rate))
}

#[cfg(test)]
mod test {
    use std::path::Path;
    use std::time::Duration;

    use crate::util::{
        duration_minutes_seconds, duration_to_frames, filename_display, frames_to_duration,
    };

    #[test]
    fn test_duration_minutes_strings() {
        assert_eq!("0:00", duration_minutes_seconds(Duration::new(0, 0)));
        assert_eq!("0:05", duration_minutes_seconds(Duration::new(5, 0)));
        assert_eq!("1:00", duration_minutes_seconds(Duration::new(60, 0)));
        assert_eq!("2:05", duration_minutes_seconds(Duration::new(125, 0)));
        assert_eq!("60:06", duration_minutes_seconds(Duration::new(3606, 0)));
    }

    #[test]
    fn test_duration_to_frames() {
        assert_eq!(0, duration_to_frames(Duration::ZERO, 48000));
        assert_eq!(48000, duration_to_frames(Duration::from_secs(1), 48000));
        assert_eq!(22050, duration_to_frames(Duration::from_millis(500), 44100));
        // 1ms at 44.1kHz is 44.1 frames.
        assert_eq!(44, duration_to_frames(Duration::from_millis(1), 44100));
    }

    #[test]
    fn test_frames_to_duration() {
        assert_eq!(Duration::from_secs(2), frames_to_duration(96000, 48000));
        assert_eq!(Duration::from_millis(500), frames_to_duration(22050, 44100));
        assert_eq!(Duration::ZERO, frames_to_duration(100, 0));
    }

    #[test]
    fn test_filename_display() {
        assert_eq!("kick.wav", filename_display(Path::new("/sounds/kick.wav")));
        assert_eq!("unreadable file name", filename_display(Path::new("/")));
    }
}
