//! Per-frame video synthesis engine
//!
//! [`VideoGenerator`] owns the plane buffers and the animation state and, when
//! constructed with an audio callback, the tone buffer and delivery worker.
//! Each call to [`VideoGenerator::update`] rewrites the planes in place:
//! seven BT.601 color bars, a highlight bar sweeping top to bottom every
//! 5 seconds (clipped while entering and leaving the frame), and an elapsed
//! `DDD:HH:MM:SS` readout over a black rectangle centered on the frame.
//!
//! The caller paces `update` itself; the engine never sleeps. The audio
//! worker, if any, runs free until shutdown.

use crate::audio::{AudioCallback, AudioConfig, AudioWorker, ToneBuffer};
use crate::color::{rgb_to_yuv, BAR_COLORS};
use crate::font::draw_string;
use crate::frame::PlaneBuffer;
use crate::{Result, TestcardError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Width of the black rectangle behind the timecode, in pixels (measured
/// against the glyph advances of `DDD:HH:MM:SS`)
const TEXT_RECT_W: u32 = 360;
/// Height of the black rectangle behind the timecode
const TEXT_RECT_H: u32 = 100;
/// Pen inset from the rectangle's top-left corner
const TEXT_INSET: i32 = 20;
/// Seconds for one full top-to-bottom sweep of the highlight bar
const SWEEP_SECONDS: u32 = 5;

/// Video geometry and frame rate for a [`VideoGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Frame width in pixels, positive and even
    pub width: u32,
    /// Frame height in pixels, positive and even
    pub height: u32,
    /// Frames per second, positive
    pub fps: u32,
}

impl GeneratorConfig {
    /// Convenience constructor
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        GeneratorConfig { width, height, fps }
    }

    /// Check the invariants the generator relies on.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width % 2 != 0 {
            return Err(TestcardError::InvalidWidth(self.width));
        }
        if self.height == 0 || self.height % 2 != 0 {
            return Err(TestcardError::InvalidHeight(self.height));
        }
        if self.fps == 0 {
            return Err(TestcardError::InvalidFrameRate(self.fps));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::new(640, 480, 25)
    }
}

/// Test-signal generator: color bars, moving highlight bar, timecode overlay
/// and an optional live audio feed.
///
/// Construct with [`VideoGenerator::new`] or [`VideoGenerator::with_audio`],
/// call [`VideoGenerator::update`] once per frame, read the planes through
/// [`VideoGenerator::y`]/[`u`](VideoGenerator::u)/[`v`](VideoGenerator::v).
/// Teardown happens on drop, or earlier via [`VideoGenerator::shutdown`];
/// both are idempotent.
pub struct VideoGenerator {
    config: GeneratorConfig,
    planes: PlaneBuffer,
    /// Frames generated so far; incremented once per successful update
    frame: u64,
    /// Normalized vertical position of the moving bar, in `[0, 1)`
    perc: f64,
    /// Per-update increment of `perc`: one full sweep per 5 seconds
    step: f64,
    fps_num: u32,
    fps_den: u32,
    tone: Option<Arc<ToneBuffer>>,
    worker: Option<AudioWorker>,
}

impl VideoGenerator {
    /// Create a video-only generator.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a generator that also synthesizes the tone track and starts
    /// the delivery worker feeding `callback`.
    ///
    /// The callback runs on the worker thread and must not block; see
    /// [`AudioCallback`].
    pub fn with_audio(config: GeneratorConfig, callback: AudioCallback) -> Result<Self> {
        Self::build(config, Some(callback))
    }

    fn build(config: GeneratorConfig, callback: Option<AudioCallback>) -> Result<Self> {
        config.validate()?;

        let (tone, worker) = match callback {
            Some(callback) => {
                let tone = Arc::new(ToneBuffer::new(AudioConfig::default()));
                let worker = AudioWorker::start(Arc::clone(&tone), callback)?;
                (Some(tone), Some(worker))
            }
            None => (None, None),
        };

        Ok(VideoGenerator {
            planes: PlaneBuffer::new(config.width, config.height),
            frame: 0,
            perc: 0.0,
            step: 1.0 / (SWEEP_SECONDS * config.fps) as f64,
            fps_num: 1,
            fps_den: config.fps,
            config,
            tone,
            worker,
        })
    }

    /// Synthesize the next frame into the plane buffers.
    ///
    /// Advances the moving bar and the frame counter. The only error is an
    /// internal geometry invariant violation, which indicates an engine bug.
    pub fn update(&mut self) -> Result<()> {
        let width = self.config.width;
        let height = self.config.height;

        // Moving-bar geometry from the current position. The ideal top row
        // starts one bar height above the frame so the bar sweeps fully off
        // screen before re-entering at the top.
        let h = height as i64 - 1;
        let bar_h = (height / 5) as i64;
        let mut start_y = (-(bar_h as f64) + self.perc * (h + bar_h) as f64) as i64;
        let nlines = if start_y < 0 {
            let visible = bar_h + start_y;
            start_y = 0;
            visible
        } else if start_y + bar_h > h {
            h - start_y
        } else {
            bar_h
        };

        self.perc += self.step;
        if self.perc >= 1.0 {
            self.perc = 0.0;
        }

        if nlines < 0 || start_y < 0 || start_y + nlines > height as i64 {
            debug_assert!(false, "bar geometry escaped the frame: {start_y}, {nlines}");
            return Err(TestcardError::GeometryOutOfBounds {
                start_y,
                nlines,
                height,
            });
        }

        self.planes.clear();

        // 7 equal-width vertical bars; any remainder columns stay black
        let bar_w = width / 7;
        for (i, &(r, g, b)) in BAR_COLORS.iter().enumerate() {
            self.planes
                .fill_rect(i as i32 * bar_w as i32, 0, bar_w, height, rgb_to_yuv(r, g, b));
        }

        // Moving-bar color ramps with the advanced position: red fades out,
        // green and blue ramp past full scale and clip in the conversion.
        let r = (255.0 - self.perc * 255.0) as i32;
        let g = (30.0 + self.perc * 235.0) as i32;
        let b = (150.0 + self.perc * 205.0) as i32;
        self.planes
            .fill_rows(start_y as usize, nlines as usize, rgb_to_yuv(r, g, b));

        // Timecode overlay, luma-only text over a black rectangle
        let text = self.timecode();
        let text_x = width as i32 / 2 - TEXT_RECT_W as i32 / 2;
        let text_y = height as i32 / 2 - (TEXT_RECT_H as i32 / 2);
        self.planes
            .fill_rect(text_x, text_y, TEXT_RECT_W, TEXT_RECT_H, rgb_to_yuv(0, 0, 0));
        draw_string(
            &mut self.planes,
            &text,
            text_x + TEXT_INSET,
            text_y + TEXT_INSET,
        );

        self.frame += 1;
        Ok(())
    }

    /// Elapsed time at the current frame counter, as `DDD:HH:MM:SS`.
    pub fn timecode(&self) -> String {
        format_timecode(self.frame / self.fps_den as u64)
    }

    /// Stop and join the audio worker, if one is running. Idempotent; also
    /// called on drop. The plane and tone buffers stay readable afterwards.
    pub fn shutdown(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }

    /// Frames generated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Frame rate as a rational: `(numerator, denominator)` frames per second
    pub fn fps(&self) -> (u32, u32) {
        (self.fps_num, self.fps_den)
    }

    /// Duration of one frame at the configured rate; useful for pacing a
    /// caller's generation loop
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.fps_num as f64 / self.fps_den as f64)
    }

    /// Luma plane of the last generated frame
    pub fn y(&self) -> &[u8] {
        self.planes.y()
    }

    /// U chroma plane of the last generated frame
    pub fn u(&self) -> &[u8] {
        self.planes.u()
    }

    /// V chroma plane of the last generated frame
    pub fn v(&self) -> &[u8] {
        self.planes.v()
    }

    /// Row strides of the three planes
    pub fn strides(&self) -> (usize, usize, usize) {
        self.planes.strides()
    }

    /// The synthesized tone track, if audio was enabled; a 4-second snapshot
    /// suitable for writing out as-is
    pub fn tone_buffer(&self) -> Option<&[i16]> {
        self.tone.as_deref().map(ToneBuffer::samples)
    }
}

impl Drop for VideoGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decompose elapsed seconds into `DDD:HH:MM:SS` (days are not wrapped).
fn format_timecode(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = total_secs / 3_600 % 24;
    let minutes = total_secs / 60 % 60;
    let seconds = total_secs % 60;
    format!("{days:03}:{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_timecode_formatting() {
        assert_eq!(format_timecode(0), "000:00:00:00");
        assert_eq!(format_timecode(59), "000:00:00:59");
        assert_eq!(format_timecode(60), "000:00:01:00");
        assert_eq!(format_timecode(3_661), "000:01:01:01");
        assert_eq!(format_timecode(90_061), "001:01:01:01");
        // days keep counting past 999 rather than wrapping
        assert_eq!(format_timecode(1_000 * 86_400), "1000:00:00:00");
    }

    #[test]
    fn test_construction_validates_parameters() {
        assert!(matches!(
            VideoGenerator::new(GeneratorConfig::new(0, 64, 25)),
            Err(TestcardError::InvalidWidth(0))
        ));
        assert!(matches!(
            VideoGenerator::new(GeneratorConfig::new(63, 64, 25)),
            Err(TestcardError::InvalidWidth(63))
        ));
        assert!(matches!(
            VideoGenerator::new(GeneratorConfig::new(64, 0, 25)),
            Err(TestcardError::InvalidHeight(0))
        ));
        assert!(matches!(
            VideoGenerator::new(GeneratorConfig::new(64, 64, 0)),
            Err(TestcardError::InvalidFrameRate(0))
        ));
    }

    #[test]
    fn test_small_frame_end_to_end() {
        let mut gen = VideoGenerator::new(GeneratorConfig::new(64, 64, 25)).unwrap();
        for _ in 0..5 {
            gen.update().unwrap();
        }
        assert_eq!(gen.frame(), 5);
        assert_eq!(gen.y().len(), 64 * 64);
        assert_eq!(gen.u().len(), 32 * 32);
        assert_eq!(gen.v().len(), 32 * 32);
        assert!(gen.tone_buffer().is_none());
    }

    #[test]
    fn test_bar_columns_have_bt601_luma() {
        let mut gen = VideoGenerator::new(GeneratorConfig::new(640, 480, 25)).unwrap();
        gen.update().unwrap();

        // First update paints no moving-bar rows (the bar is still fully
        // above the frame) and the text rectangle spans y 190..290; row 10
        // is pure bars.
        let bar_w = 640 / 7; // 91
        let row = 10;
        for (i, &(r, g, b)) in BAR_COLORS.iter().enumerate() {
            let x = i * bar_w + bar_w / 2;
            let expected = rgb_to_yuv(r, g, b).y;
            assert_eq!(gen.y()[row * 640 + x], expected, "bar {i}");
        }
        // white bar has the canonical luma
        assert_eq!(gen.y()[row * 640 + bar_w / 2], 235);
        // remainder columns right of the 7th bar stay black
        assert_eq!(gen.y()[row * 640 + 639], 0);
    }

    #[test]
    fn test_moving_bar_rows_match_clipped_geometry() {
        let (width, height, fps) = (640u32, 480u32, 25u32);
        let mut gen = VideoGenerator::new(GeneratorConfig::new(width, height, fps)).unwrap();

        let updates = 30u32;
        for _ in 0..updates {
            gen.update().unwrap();
        }

        // Replicate the geometry of the final update: position before the
        // increment, color after it.
        let step = 1.0 / (5 * fps) as f64;
        let perc_before = (updates - 1) as f64 * step;
        let perc_after = updates as f64 * step;
        let h = height as i64 - 1;
        let bar_h = (height / 5) as i64;
        let mut start_y = (-(bar_h as f64) + perc_before * (h + bar_h) as f64) as i64;
        let nlines = if start_y < 0 {
            let visible = bar_h + start_y;
            start_y = 0;
            visible
        } else if start_y + bar_h > h {
            h - start_y
        } else {
            bar_h
        };
        let expected = rgb_to_yuv(
            (255.0 - perc_after * 255.0) as i32,
            (30.0 + perc_after * 235.0) as i32,
            (150.0 + perc_after * 205.0) as i32,
        );

        assert!(nlines > 0, "bar should be visible after {updates} updates");
        for row in start_y..start_y + nlines {
            let row = row as usize;
            assert!(
                gen.y()[row * 640..(row + 1) * 640].iter().all(|&p| p == expected.y),
                "row {row}"
            );
        }
        // the row above the bar is bar-pattern, not bar color
        let above = (start_y - 1) as usize;
        assert_ne!(gen.y()[above * 640], expected.y);

        // chroma rows at half resolution
        let c_start = (start_y / 2) as usize;
        for row in c_start..c_start + (nlines / 2) as usize {
            assert!(
                gen.u()[row * 320..(row + 1) * 320].iter().all(|&p| p == expected.u),
                "chroma row {row}"
            );
        }
    }

    #[test]
    fn test_perc_is_periodic_over_one_sweep() {
        let fps = 25u32;
        let mut gen = VideoGenerator::new(GeneratorConfig::new(64, 64, fps)).unwrap();
        let period = (5 * fps) as usize;

        // run one full sweep; perc must stay in [0, 1) and wrap back to 0
        for _ in 0..period {
            assert!(gen.perc >= 0.0 && gen.perc < 1.0);
            gen.update().unwrap();
        }
        assert_eq!(gen.perc, 0.0);
    }

    #[test]
    fn test_timecode_rolls_with_frame_counter() {
        let mut gen = VideoGenerator::new(GeneratorConfig::new(64, 64, 25)).unwrap();
        assert_eq!(gen.timecode(), "000:00:00:00");
        for _ in 0..25 {
            gen.update().unwrap();
        }
        assert_eq!(gen.timecode(), "000:00:00:01");
    }

    #[test]
    fn test_overlay_rectangle_is_black_luma() {
        let mut gen = VideoGenerator::new(GeneratorConfig::new(640, 480, 25)).unwrap();
        gen.update().unwrap();

        // corner of the text rectangle, away from glyph ink
        assert_eq!(gen.y()[191 * 640 + 142], 16);
        // some glyph ink exists inside the rectangle
        let mut ink = false;
        for row in 190..290 {
            for col in 140..500 {
                if gen.y()[row * 640 + col] == 255 {
                    ink = true;
                }
            }
        }
        assert!(ink, "timecode glyphs not rendered");
    }

    #[test]
    fn test_audio_generator_shutdown_is_idempotent() {
        let count = std::sync::Arc::new(Mutex::new(0usize));
        let sink = std::sync::Arc::clone(&count);
        let mut gen = VideoGenerator::with_audio(
            GeneratorConfig::new(64, 64, 25),
            Box::new(move |_| *sink.lock() += 1),
        )
        .unwrap();

        let tone = gen.tone_buffer().expect("tone buffer present");
        assert_eq!(tone.len(), 44_100 * 2 * 4);

        // first window is delivered immediately
        std::thread::sleep(std::time::Duration::from_millis(50));
        gen.shutdown();
        let delivered = *count.lock();
        assert!(delivered >= 1, "no audio delivered before shutdown");

        // further shutdowns and drop are no-ops
        gen.shutdown();
        std::thread::sleep(std::time::Duration::from_millis(30));
        assert_eq!(*count.lock(), delivered);
        drop(gen);
    }

    #[test]
    fn test_frame_interval() {
        let gen = VideoGenerator::new(GeneratorConfig::new(64, 64, 25)).unwrap();
        assert_eq!(gen.frame_interval(), Duration::from_millis(40));
        assert_eq!(gen.fps(), (1, 25));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = GeneratorConfig::new(1280, 720, 30);
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
