//! BT.601 RGB -> YCbCr conversion
//!
//! The single integer conversion used everywhere in the engine: the color
//! bars, the moving highlight bar and the overlay rectangle all go through
//! [`rgb_to_yuv`]. Inputs are `i32` on purpose: the moving-bar ramp produces
//! components outside `0..=255` and only the converted samples are clipped,
//! matching the legacy integer pipeline.

/// One YCbCr sample triple (full-range luma clip, studio-swing offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yuv {
    /// Luma sample
    pub y: u8,
    /// Blue-difference chroma sample
    pub u: u8,
    /// Red-difference chroma sample
    pub v: u8,
}

/// The 7 vertical bar colors, left to right: white, yellow, cyan, green,
/// magenta, red, blue.
pub const BAR_COLORS: [(i32, i32, i32); 7] = [
    (255, 255, 255), // white
    (255, 255, 0),   // yellow
    (0, 255, 255),   // cyan
    (0, 255, 0),     // green
    (255, 0, 255),   // magenta
    (255, 0, 0),     // red
    (0, 0, 255),     // blue
];

#[inline]
fn clip(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

/// Convert an RGB triple to YCbCr using the BT.601 integer coefficients.
///
/// `Y = clip(((66R + 129G + 25B + 128) >> 8) + 16)` and the matching
/// standard forms for U and V. The shift is arithmetic, so negative
/// intermediate sums round toward negative infinity as in the reference
/// integer implementation.
#[inline]
pub fn rgb_to_yuv(r: i32, g: i32, b: i32) -> Yuv {
    Yuv {
        y: clip(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16),
        u: clip(((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128),
        v: clip(((112 * r - 94 * g - 18 * b + 128) >> 8) + 128),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_and_black() {
        assert_eq!(rgb_to_yuv(255, 255, 255), Yuv { y: 235, u: 128, v: 128 });
        assert_eq!(rgb_to_yuv(0, 0, 0), Yuv { y: 16, u: 128, v: 128 });
    }

    #[test]
    fn test_primaries() {
        // Classic BT.601 studio-swing values for saturated primaries
        assert_eq!(rgb_to_yuv(255, 0, 0), Yuv { y: 82, u: 90, v: 240 });
        assert_eq!(rgb_to_yuv(0, 255, 0), Yuv { y: 144, u: 54, v: 34 });
        assert_eq!(rgb_to_yuv(0, 0, 255), Yuv { y: 41, u: 240, v: 110 });
    }

    #[test]
    fn test_out_of_range_components_clip_after_conversion() {
        // The moving bar feeds components beyond 255; the clip happens on
        // the converted samples, not on the inputs.
        assert_eq!(rgb_to_yuv(0, 265, 355), Yuv { y: 184, u: 207, v: 6 });
        assert_eq!(rgb_to_yuv(-10, 0, 0), Yuv { y: 13, u: 129, v: 124 });
    }

    #[test]
    fn test_bar_palette_order() {
        assert_eq!(BAR_COLORS[0], (255, 255, 255));
        assert_eq!(BAR_COLORS[6], (0, 0, 255));
        assert_eq!(BAR_COLORS.len(), 7);
    }
}
