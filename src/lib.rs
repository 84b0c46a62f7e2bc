//! Deterministic audio/video test-signal generator
//!
//! Synthesizes a classic test-card video signal together with a synthetic
//! audio track, for exercising downstream pipelines (encoders, transports,
//! players) without real capture hardware.
//!
//! # Features
//! - Planar YUV 4:2:0 frames: 7 vertical color bars (BT.601), a moving
//!   highlight bar sweeping top to bottom in 5 seconds, and an elapsed-time
//!   `DDD:HH:MM:SS` overlay rendered from a bitmap font
//! - Interleaved stereo 16-bit PCM audio: 4 seconds of silence punctuated by
//!   a 600 Hz "bip" and a 300 Hz "bop" tone burst
//! - Optional background worker that delivers 1024-frame audio windows to a
//!   user callback on a fixed cadence, with cooperative shutdown
//!
//! # Quick start
//! ## Video only
//! ```no_run
//! use testcard::{GeneratorConfig, VideoGenerator};
//! let mut gen = VideoGenerator::new(GeneratorConfig::new(640, 480, 25)).unwrap();
//! for _ in 0..250 {
//!     gen.update().unwrap();
//!     // hand gen.y(), gen.u(), gen.v() to an encoder or raw yuv420p sink
//! }
//! ```
//!
//! ## Video with live audio delivery
//! ```no_run
//! use testcard::{GeneratorConfig, VideoGenerator};
//! let mut gen = VideoGenerator::with_audio(
//!     GeneratorConfig::new(640, 480, 25),
//!     Box::new(|samples: &[i16]| {
//!         // called on the worker thread; must not block
//!         let _ = samples.len();
//!     }),
//! )
//! .unwrap();
//! gen.update().unwrap();
//! gen.shutdown();
//! ```

#![warn(missing_docs)]

// Domain modules
pub mod audio; // Tone synthesis & paced delivery worker
pub mod color; // BT.601 RGB -> YCbCr conversion
pub mod font; // Bitmap glyph atlas & luma blitting
pub mod frame; // Planar YUV 4:2:0 buffer
pub mod generator; // Per-frame synthesis engine

/// Error types for generator operations
#[derive(thiserror::Error, Debug)]
pub enum TestcardError {
    /// Frame width was zero or odd
    #[error("Invalid width {0}: must be a positive even number")]
    InvalidWidth(u32),

    /// Frame height was zero or odd
    #[error("Invalid height {0}: must be a positive even number")]
    InvalidHeight(u32),

    /// Frame rate was zero
    #[error("Invalid frame rate {0}: must be positive")]
    InvalidFrameRate(u32),

    /// The audio worker thread could not be spawned
    #[error("Audio worker thread error: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// Moving-bar geometry escaped the frame; indicates an engine bug,
    /// not caller misuse
    #[error("Frame geometry out of bounds: start_y={start_y}, nlines={nlines}, height={height}")]
    GeometryOutOfBounds {
        /// Clipped top row of the moving bar
        start_y: i64,
        /// Clipped visible row count of the moving bar
        nlines: i64,
        /// Frame height the rows were checked against
        height: u32,
    },
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, TestcardError>;

// Public API exports
pub use audio::{AudioCallback, AudioConfig, AudioWorker, ToneBuffer};
pub use color::{rgb_to_yuv, Yuv};
pub use frame::PlaneBuffer;
pub use generator::{GeneratorConfig, VideoGenerator};
