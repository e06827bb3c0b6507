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

//! Equal-power pan law.

use std::f32::consts::FRAC_PI_4;

/// Left-most pan position.
pub const PAN_LEFT: f32 = -1.0;

/// Right-most pan position.
pub const PAN_RIGHT: f32 = 1.0;

/// Centre pan position.
pub const PAN_CENTER: f32 = 0.0;

/// Maps a pan position to a (left, right) gain pair.
///
/// The pan is clamped to [-1, 1] and mapped onto a quarter circle, so that
/// `left² + right² == 1` everywhere and perceived loudness stays constant across the stereo
/// field (-3 dB at the centre).
pub fn gain(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(PAN_LEFT, PAN_RIGHT) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}
