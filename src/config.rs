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
use std::time::Duration;

use duration_string::DurationString;

mod audio;
mod error;
mod scene;

pub use audio::{Audio, DEFAULT_DEVICE};
pub use error::ConfigError;
pub use scene::{CueMode, Scene, Sound, VoiceCue, DEFAULT_SAMPLE_RATE, DEFAULT_VOICES};

/// Parses a duration string such as `500ms` or `2s`.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    match DurationString::from_string(value.to_string()) {
        Ok(duration) => Ok(duration.into()),
        Err(e) => Err(ConfigError::InvalidDuration {
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert!(parse_duration("ten seconds").is_err());
    }
}
