//! Entity tints
//!
//! Purely cosmetic; nothing in the simulation branches on a color.

use super::pool::Color;

/// One color per brick row, top to bottom
pub const BRICK_ROWS: [Color; 6] = [
    [0.659, 0.333, 0.969, 1.0], // purple
    [0.925, 0.282, 0.600, 1.0], // pink
    [0.024, 0.714, 0.831, 1.0], // cyan
    [0.961, 0.620, 0.043, 1.0], // amber
    [0.063, 0.725, 0.506, 1.0], // emerald
    [0.937, 0.267, 0.267, 1.0], // red
];

pub const BACKGROUND: Color = [0.059, 0.090, 0.165, 1.0];
pub const FIELD: Color = [0.118, 0.161, 0.231, 1.0];
pub const BALL: Color = [1.0, 1.0, 1.0, 1.0];
pub const PADDLE: Color = [0.753, 0.518, 0.988, 1.0];
pub const BULLET: Color = [0.400, 0.910, 0.976, 1.0];
pub const ENEMY: Color = [0.937, 0.267, 0.267, 1.0];
pub const ENEMY_ARMORED: Color = [0.961, 0.620, 0.043, 1.0];
pub const TRAIL_LINK: Color = [0.545, 0.361, 0.965, 1.0];

/// HSL (hue in degrees, saturation/lightness in 0..=1) to opaque RGBA
pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [r + m, g + m, b + m, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(hsl(0.0, 1.0, 0.5), [1.0, 0.0, 0.0, 1.0]));
        assert!(close(hsl(120.0, 1.0, 0.5), [0.0, 1.0, 0.0, 1.0]));
        assert!(close(hsl(240.0, 1.0, 0.5), [0.0, 0.0, 1.0, 1.0]));
        assert!(close(hsl(-120.0, 1.0, 0.5), hsl(240.0, 1.0, 0.5)));
    }

    #[test]
    fn test_hsl_grey_when_unsaturated() {
        assert!(close(hsl(270.0, 0.0, 0.6), [0.6, 0.6, 0.6, 1.0]));
    }
}
