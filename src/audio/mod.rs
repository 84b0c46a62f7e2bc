//! Synthetic audio track: tone-burst buffer and paced delivery worker
//!
//! The audio side of the generator is two pieces:
//! - [`ToneBuffer`]: a fixed 4-second interleaved stereo PCM buffer built
//!   once at construction time, silent except for two 1-second sine bursts
//! - [`AudioWorker`]: a background thread that feeds successive 1024-frame
//!   windows of that buffer to a user callback at the real-time sample
//!   cadence, wrapping circularly, until asked to stop

mod tone;
mod worker;

pub use tone::ToneBuffer;
pub use worker::AudioWorker;

use serde::{Deserialize, Serialize};

/// Samples are delivered to the callback on the worker thread as
/// `BLOCK_FRAMES` interleaved stereo frames per invocation.
///
/// The callback must not block or perform unbounded work: a callback stuck
/// mid-delivery stalls the cadence and, worse, makes shutdown hang, since
/// the join has no timeout.
pub type AudioCallback = Box<dyn FnMut(&[i16]) + Send + 'static>;

/// Frames per callback window
pub const BLOCK_FRAMES: usize = 1024;

/// Audio format and tone parameters.
///
/// The defaults reproduce the canonical test track: 44.1 kHz stereo, a
/// 600 Hz "bip" in second two and a 300 Hz "bop" in second four.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
    /// Total buffer length in seconds
    pub duration_secs: u32,
    /// Frequency of the first tone burst, Hz
    pub bip_frequency: f64,
    /// Frequency of the second tone burst, Hz
    pub bop_frequency: f64,
    /// Peak amplitude of the bursts on the i16 scale
    pub amplitude: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sample_rate: 44_100,
            channels: 2,
            duration_secs: 4,
            bip_frequency: 600.0,
            bop_frequency: 300.0,
            amplitude: 10_000.0,
        }
    }
}

impl AudioConfig {
    /// Total interleaved sample count of the tone buffer
    pub fn total_samples(&self) -> usize {
        self.sample_rate as usize * self.channels as usize * self.duration_secs as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AudioConfig::default();
        assert_eq!(cfg.sample_rate, 44_100);
        assert_eq!(cfg.channels, 2);
        assert_eq!(cfg.total_samples(), 44_100 * 2 * 4);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let cfg = AudioConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AudioConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
