//! Planar YUV 4:2:0 frame buffer
//!
//! One contiguous owned allocation holding the full-resolution luma plane
//! followed by the two quarter-resolution chroma planes. Plane access goes
//! through bounds-checked slice views computed from fixed offsets, replacing
//! the raw aliased sub-pointers of the legacy layout. All fills clip against
//! the frame bounds, so callers may pass rectangles that hang off any edge.

use crate::color::Yuv;

/// Planar YUV 4:2:0 pixel storage for one frame.
///
/// Layout is row-major with no row padding: `width*height` luma bytes, then
/// `(width/2)*(height/2)` bytes each for U and V. The three planes can be
/// streamed back to back as a raw `yuv420p` frame.
#[derive(Debug, Clone)]
pub struct PlaneBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    y_len: usize,
    chroma_len: usize,
}

impl PlaneBuffer {
    /// Allocate a zeroed buffer for even `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        let y_len = width * height;
        let chroma_len = (width / 2) * (height / 2);
        PlaneBuffer {
            data: vec![0u8; y_len + 2 * chroma_len],
            width,
            height,
            y_len,
            chroma_len,
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Luma plane, `width*height` bytes
    pub fn y(&self) -> &[u8] {
        &self.data[..self.y_len]
    }

    /// U chroma plane, `(width/2)*(height/2)` bytes
    pub fn u(&self) -> &[u8] {
        &self.data[self.y_len..self.y_len + self.chroma_len]
    }

    /// V chroma plane, `(width/2)*(height/2)` bytes
    pub fn v(&self) -> &[u8] {
        &self.data[self.y_len + self.chroma_len..]
    }

    /// Mutable luma plane
    pub fn y_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.y_len]
    }

    /// All three planes, mutably and disjointly: `(y, u, v)`
    pub fn planes_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        let (y, uv) = self.data.split_at_mut(self.y_len);
        let (u, v) = uv.split_at_mut(self.chroma_len);
        (y, u, v)
    }

    /// Row strides for the three planes: `(luma, u, v)`
    pub fn strides(&self) -> (usize, usize, usize) {
        (self.width, self.width / 2, self.width / 2)
    }

    /// Zero all three planes (YCbCr "zero" is super-black; the bar painter
    /// overwrites every visible pixel afterwards)
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Paint an axis-aligned rectangle in all three planes with one color.
    ///
    /// Coordinates are signed and the rectangle is clipped to the frame;
    /// painting nothing is fine. Chroma is painted at half resolution over
    /// the clipped region.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Yuv) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x.saturating_add(w as i32)).clamp(0, self.width as i32) as usize;
        let y1 = (y.saturating_add(h as i32)).clamp(0, self.height as i32) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let width = self.width;
        let half_w = width / 2;
        let (yp, up, vp) = self.planes_mut();

        for row in y0..y1 {
            yp[row * width + x0..row * width + x1].fill(color.y);
        }

        // chroma at half resolution
        let (cx0, cx1) = (x0 / 2, x1 / 2);
        let (cy0, cy1) = (y0 / 2, y1 / 2);
        for row in cy0..cy1 {
            up[row * half_w + cx0..row * half_w + cx1].fill(color.u);
            vp[row * half_w + cx0..row * half_w + cx1].fill(color.v);
        }
    }

    /// Paint `nlines` full-stride luma rows starting at `start_y`, plus the
    /// corresponding half-resolution chroma rows. Used for the moving bar,
    /// whose clipped geometry is computed by the caller.
    pub fn fill_rows(&mut self, start_y: usize, nlines: usize, color: Yuv) {
        debug_assert!(start_y + nlines <= self.height);
        let width = self.width;
        let half_w = width / 2;
        let (yp, up, vp) = self.planes_mut();

        for row in start_y..start_y + nlines {
            yp[row * width..(row + 1) * width].fill(color.y);
        }

        let c_start = start_y / 2;
        for row in c_start..c_start + nlines / 2 {
            up[row * half_w..(row + 1) * half_w].fill(color.u);
            vp[row * half_w..(row + 1) * half_w].fill(color.v);
        }
    }
}
