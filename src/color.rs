// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps escape values to 32-bit ARGB pixels.

/// Fully opaque alpha, top byte of an ARGB pixel.
pub const ALPHA: u32 = 0xFF << 24;

/// The colouring rule.  Anything that escaped gets `128 - 2v` shifted
/// into the green byte; the set itself is opaque black.  For v > 64
/// the value goes negative and its sign bits spill into the red and
/// alpha bytes, which is the palette's characteristic red-orange rim.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorMapper;

impl ColorMapper {
    /// Colour of a single escape value.
    #[inline]
    pub fn color(self, value: i32) -> u32 {
        if value > 0 {
            (((128 - 2 * value) << 8) as u32) | ALPHA
        } else {
            ALPHA
        }
    }

    /// Turn a buffer of escape values into ARGB pixels.
    pub fn colorize(self, values: &[i32], pixels: &mut Vec<u32>) {
        pixels.clear();
        pixels.extend(values.iter().map(|v| self.color(*v)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_is_opaque_black() {
        assert_eq!(ColorMapper.color(0), 0xFF00_0000);
    }

    #[test]
    fn green_ramp() {
        assert_eq!(ColorMapper.color(1), 0xFF00_7E00);
        assert_eq!(ColorMapper.color(10), 0xFF00_6C00);
        assert_eq!(ColorMapper.color(64), 0xFF00_0000);
    }

    #[test]
    fn deep_values_wrap_into_red() {
        assert_eq!(ColorMapper.color(65), 0xFFFF_FE00);
        assert_eq!(ColorMapper.color(100), 0xFFFF_B800);
        assert_eq!(ColorMapper.color(255), 0xFFFE_8200);
    }

    #[test]
    fn colorize_replaces_contents() {
        let mut pixels = vec![7; 10];
        ColorMapper.colorize(&[0, 1], &mut pixels);
        assert_eq!(pixels, vec![0xFF00_0000, 0xFF00_7E00]);
    }
}
