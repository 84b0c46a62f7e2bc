//! Bitmap font rendering for the timecode overlay
//!
//! A fixed glyph atlas (digits `0`-`9` and `:`) shared by every generator
//! instance, and a blit routine that copies glyph pixels verbatim into the
//! luma plane. Rendering is best effort: a character without a glyph is
//! reported and skipped, the rest of the string still renders.

mod atlas;

pub use atlas::{ATLAS_HEIGHT, ATLAS_WIDTH};

use crate::frame::PlaneBuffer;
use std::sync::OnceLock;

/// One glyph's atlas region and layout metrics.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    /// Character code this glyph renders
    pub id: u8,
    /// Atlas column of the glyph's top-left pixel
    pub x: u16,
    /// Atlas row of the glyph's top-left pixel
    pub y: u16,
    /// Glyph width in pixels
    pub width: u16,
    /// Glyph height in pixels
    pub height: u16,
    /// Vertical offset applied at blit time (baseline alignment)
    pub y_offset: i16,
    /// Horizontal pen advance after this glyph
    pub x_advance: u16,
}

/// Glyph table for the 11 renderable characters. Immutable, process-wide.
pub const GLYPHS: [Glyph; 11] = [
    Glyph { id: b'0', x: 109, y: 0, width: 25, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'1', x: 239, y: 0, width: 15, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'2', x: 28, y: 0, width: 26, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'3', x: 135, y: 0, width: 25, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'4', x: 0, y: 0, width: 27, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'5', x: 161, y: 0, width: 25, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'6', x: 55, y: 0, width: 26, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'7', x: 82, y: 0, width: 26, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'8', x: 187, y: 0, width: 25, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b'9', x: 213, y: 0, width: 25, height: 39, y_offset: 12, x_advance: 31 },
    Glyph { id: b':', x: 255, y: 0, width: 5, height: 29, y_offset: 22, x_advance: 15 },
];

/// Unpacked atlas pixels, one byte per pixel, row-major `ATLAS_WIDTH` stride.
pub fn atlas_pixels() -> &'static [u8] {
    static PIXELS: OnceLock<Vec<u8>> = OnceLock::new();
    PIXELS.get_or_init(|| {
        atlas::ATLAS_WORDS
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect()
    })
}

/// Look up the glyph for `c`, if it is renderable.
pub fn glyph_for(c: u8) -> Option<&'static Glyph> {
    GLYPHS.iter().find(|g| g.id == c)
}

/// Render `text` into the luma plane with the pen starting at `(x, y)`.
///
/// Characters without a glyph are reported on stderr and skipped; the
/// return value is the number of skipped characters. Glyphs that extend
/// past the frame edge are clipped.
pub fn draw_string(planes: &mut PlaneBuffer, text: &str, x: i32, y: i32) -> usize {
    let mut pen_x = x;
    let mut skipped = 0;

    for &c in text.as_bytes() {
        match glyph_for(c) {
            Some(glyph) => {
                draw_glyph(planes, glyph, pen_x, y);
                pen_x += glyph.x_advance as i32;
            }
            None => {
                eprintln!("No glyph for character {:?}, skipping", c as char);
                skipped += 1;
            }
        }
    }

    skipped
}

/// Blit one glyph into the luma plane at `(x, y + y_offset)`, clipped.
/// Pixels are copied verbatim from the atlas, not blended.
fn draw_glyph(planes: &mut PlaneBuffer, glyph: &Glyph, x: i32, y: i32) {
    let pixels = atlas_pixels();
    let (width, height) = (planes.width() as i32, planes.height() as i32);
    let luma = planes.y_mut();

    for row in 0..glyph.height as i32 {
        let dest_y = y + glyph.y_offset as i32 + row;
        if dest_y < 0 || dest_y >= height {
            continue;
        }
        let src_row = (glyph.y as i32 + row) as usize * ATLAS_WIDTH;
        for col in 0..glyph.width as i32 {
            let dest_x = x + col;
            if dest_x < 0 || dest_x >= width {
                continue;
            }
            let src = src_row + (glyph.x as i32 + col) as usize;
            luma[dest_y as usize * width as usize + dest_x as usize] = pixels[src];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_dimensions() {
        assert_eq!(atlas_pixels().len(), ATLAS_WIDTH * ATLAS_HEIGHT);
    }

    #[test]
    fn test_glyph_lookup() {
        for c in b'0'..=b'9' {
            assert!(glyph_for(c).is_some());
        }
        assert!(glyph_for(b':').is_some());
        assert!(glyph_for(b'x').is_none());
        assert!(glyph_for(b' ').is_none());
    }

    #[test]
    fn test_glyph_regions_inside_atlas() {
        for g in &GLYPHS {
            assert!((g.x + g.width) as usize <= ATLAS_WIDTH, "glyph {}", g.id as char);
            assert!((g.y + g.height) as usize <= ATLAS_HEIGHT, "glyph {}", g.id as char);
        }
    }

    #[test]
    fn test_draw_string_blits_glyph_pixels() {
        let mut planes = PlaneBuffer::new(64, 64);
        let skipped = draw_string(&mut planes, "1", 4, 2);
        assert_eq!(skipped, 0);

        // the blit copies the atlas region verbatim
        let glyph = glyph_for(b'1').unwrap();
        let pixels = atlas_pixels();
        let mut diffs = 0;
        for row in 0..glyph.height as usize {
            for col in 0..glyph.width as usize {
                let src = pixels[(glyph.y as usize + row) * ATLAS_WIDTH + glyph.x as usize + col];
                let dest_y = 2 + glyph.y_offset as usize + row;
                let dest = planes.y()[dest_y * 64 + 4 + col];
                if src != dest {
                    diffs += 1;
                }
            }
        }
        assert_eq!(diffs, 0);
        // glyphs carry ink
        assert!(planes.y().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_draw_string_skips_unknown_characters() {
        let mut planes = PlaneBuffer::new(64, 64);
        assert_eq!(draw_string(&mut planes, "1a2b", 0, 0), 2);
    }

    #[test]
    fn test_draw_string_clips_offscreen() {
        let mut planes = PlaneBuffer::new(16, 16);
        // pen far off every edge; must not panic
        assert_eq!(draw_string(&mut planes, "00:00", -100, -100), 0);
        assert_eq!(draw_string(&mut planes, "00:00", 100, 100), 0);
    }
}
