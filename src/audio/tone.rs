//! Tone-burst buffer synthesis
//!
//! Builds the immutable 4-second PCM track at generator construction time:
//! silence, one second of "bip", silence, one second of "bop". The buffer
//! is the sole data source for the delivery worker and is also exposed to
//! callers as a snapshot.

use super::AudioConfig;
use std::f64::consts::TAU;

/// Immutable interleaved stereo 16-bit PCM buffer with two embedded
/// single-tone bursts.
///
/// Second `[1, 2)` carries the bip tone, second `[3, 4)` the bop tone,
/// both channels identical; seconds `[0, 1)` and `[2, 3)` are silent.
#[derive(Debug, Clone)]
pub struct ToneBuffer {
    samples: Vec<i16>,
    config: AudioConfig,
}

impl ToneBuffer {
    /// Synthesize the tone buffer for `config`.
    pub fn new(config: AudioConfig) -> Self {
        let mut samples = vec![0i16; config.total_samples()];
        let sr = config.sample_rate as usize;

        // bip: sample indices [sr, 2*sr)
        write_burst(&mut samples, &config, sr, 2 * sr, config.bip_frequency);
        // bop: sample indices [3*sr, 4*sr)
        write_burst(&mut samples, &config, 3 * sr, 4 * sr, config.bop_frequency);

        ToneBuffer { samples, config }
    }

    /// The interleaved samples, `sample_rate * channels * duration_secs` long
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// The configuration the buffer was synthesized with
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Total interleaved sample count
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a synthesized buffer
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The burst sample formula: `amplitude * sin(TAU * frequency * i / rate)`,
/// truncated toward zero, written to every channel of frame `i`.
fn write_burst(samples: &mut [i16], config: &AudioConfig, from: usize, to: usize, frequency: f64) {
    let channels = config.channels as usize;
    let rate = config.sample_rate as f64;
    for i in from..to {
        let value = (config.amplitude * (TAU / rate * frequency * i as f64).sin()) as i16;
        for ch in 0..channels {
            samples[i * channels + ch] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_sample(config: &AudioConfig, frequency: f64, i: usize) -> i16 {
        (config.amplitude * (TAU / config.sample_rate as f64 * frequency * i as f64).sin()) as i16
    }

    #[test]
    fn test_buffer_length() {
        let tone = ToneBuffer::new(AudioConfig::default());
        assert_eq!(tone.len(), 44_100 * 2 * 4);
        assert!(!tone.is_empty());
    }

    #[test]
    fn test_silent_windows_are_exactly_zero() {
        let tone = ToneBuffer::new(AudioConfig::default());
        let sr = 44_100usize;
        let s = tone.samples();
        assert!(s[..sr * 2].iter().all(|&v| v == 0));
        assert!(s[2 * sr * 2..3 * sr * 2].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_bip_window_matches_formula_exactly() {
        let config = AudioConfig::default();
        let tone = ToneBuffer::new(config);
        let sr = 44_100usize;
        let s = tone.samples();
        for i in sr..2 * sr {
            let expected = expected_sample(&config, config.bip_frequency, i);
            assert_eq!(s[i * 2], expected, "frame {i}");
            assert_eq!(s[i * 2 + 1], expected, "frame {i} right channel");
        }
    }

    #[test]
    fn test_bop_window_matches_formula_exactly() {
        let config = AudioConfig::default();
        let tone = ToneBuffer::new(config);
        let sr = 44_100usize;
        let s = tone.samples();
        for i in 3 * sr..4 * sr {
            let expected = expected_sample(&config, config.bop_frequency, i);
            assert_eq!(s[i * 2], expected, "frame {i}");
        }
    }

    #[test]
    fn test_burst_rms_matches_pure_sine() {
        use approx::assert_relative_eq;

        let config = AudioConfig::default();
        let tone = ToneBuffer::new(config);
        let sr = 44_100usize;
        let burst = &tone.samples()[sr * 2..2 * sr * 2];
        let rms = (burst.iter().map(|&v| (v as f64).powi(2)).sum::<f64>() / burst.len() as f64)
            .sqrt();
        // a pure sine has RMS amplitude/sqrt(2)
        assert_relative_eq!(rms, config.amplitude / 2f64.sqrt(), max_relative = 1e-3);
    }

    #[test]
    fn test_burst_reaches_audible_amplitude() {
        let tone = ToneBuffer::new(AudioConfig::default());
        let sr = 44_100usize;
        let peak = tone.samples()[sr * 2..2 * sr * 2]
            .iter()
            .map(|&v| v.unsigned_abs())
            .max()
            .unwrap();
        assert!(peak > 9_900, "peak {peak}");
        assert!(peak <= 10_000);
    }
}
