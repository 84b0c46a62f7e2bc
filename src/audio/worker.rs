//! Paced audio delivery worker
//!
//! A background thread that hands successive windows of the tone buffer to
//! the user callback at the real-time sample cadence. The read is circular:
//! when a window straddles the end of the buffer it is assembled from the
//! tail and the head, so consecutive windows are always contiguous modulo
//! the buffer length.
//!
//! Cancellation is cooperative: the owner sets a mutex-guarded stop flag and
//! joins. Between deadlines the thread sleeps in short slices so a stop
//! request is observed within about a millisecond instead of spinning.

use super::{AudioCallback, ToneBuffer, BLOCK_FRAMES};
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Upper bound on one pre-deadline sleep; also bounds stop latency.
const POLL_SLICE: Duration = Duration::from_millis(1);

/// Handle to the background delivery thread.
///
/// Stopping is idempotent: the first call to [`AudioWorker::stop`] (or drop)
/// signals the flag and joins, later calls are no-ops. There is no join
/// timeout; a callback that never returns hangs the shutdown.
pub struct AudioWorker {
    handle: Option<JoinHandle<()>>,
    stop: Arc<Mutex<bool>>,
}

impl AudioWorker {
    /// Spawn the worker thread over `tone`, delivering to `callback`.
    pub fn start(tone: Arc<ToneBuffer>, callback: AudioCallback) -> Result<Self> {
        let stop = Arc::new(Mutex::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("audio-worker".into())
            .spawn(move || run_delivery_loop(tone, callback, stop_flag))?;

        Ok(AudioWorker {
            handle: Some(handle),
            stop,
        })
    }

    /// Whether the worker has not been stopped yet.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Signal the stop flag and wait for the thread to finish.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            *self.stop.lock() = true;
            handle
                .join()
                .expect("audio worker panicked during shutdown");
        }
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Delivery loop: check stop flag, wait for the next deadline, assemble the
/// next circular window, invoke the callback, advance the cursor.
fn run_delivery_loop(tone: Arc<ToneBuffer>, mut callback: AudioCallback, stop: Arc<Mutex<bool>>) {
    let samples = tone.samples();
    let total = samples.len();
    let channels = tone.config().channels as usize;
    let block_len = BLOCK_FRAMES * channels;
    let period = Duration::from_nanos(
        BLOCK_FRAMES as u64 * 1_000_000_000 / tone.config().sample_rate as u64,
    );

    let mut window = vec![0i16; block_len];
    let mut cursor = 0usize;
    // first window goes out immediately
    let mut deadline = Instant::now();

    loop {
        if *stop.lock() {
            break;
        }

        let now = Instant::now();
        if now < deadline {
            std::thread::sleep((deadline - now).min(POLL_SLICE));
            continue;
        }

        // circular copy, at most two segments
        let first = (total - cursor).min(block_len);
        window[..first].copy_from_slice(&samples[cursor..cursor + first]);
        window[first..].copy_from_slice(&samples[..block_len - first]);

        callback(&window);

        cursor = (cursor + block_len) % total;
        deadline = now + period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioConfig;

    fn short_tone() -> Arc<ToneBuffer> {
        Arc::new(ToneBuffer::new(AudioConfig::default()))
    }

    #[test]
    fn test_start_and_stop_joins_promptly() {
        let tone = short_tone();
        let mut worker = AudioWorker::start(tone, Box::new(|_| {})).unwrap();
        assert!(worker.is_running());

        let begin = Instant::now();
        worker.stop();
        assert!(!worker.is_running());
        assert!(begin.elapsed() < Duration::from_secs(1));

        // second stop is a no-op
        worker.stop();
    }

    #[test]
    fn test_windows_are_contiguous_modulo_buffer() {
        let tone = short_tone();
        let delivered: Arc<Mutex<Vec<Vec<i16>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);

        let mut worker = AudioWorker::start(
            Arc::clone(&tone),
            Box::new(move |samples| sink.lock().push(samples.to_vec())),
        )
        .unwrap();

        // ~23ms per window at 44.1kHz; give it time for a few
        std::thread::sleep(Duration::from_millis(150));
        worker.stop();

        let blocks = delivered.lock();
        assert!(blocks.len() >= 2, "got {} blocks", blocks.len());

        let samples = tone.samples();
        let total = samples.len();
        let block_len = BLOCK_FRAMES * 2;
        for (k, block) in blocks.iter().enumerate() {
            assert_eq!(block.len(), block_len);
            let start = (k * block_len) % total;
            for (i, &v) in block.iter().enumerate() {
                assert_eq!(v, samples[(start + i) % total], "block {k} sample {i}");
            }
        }
    }

    #[test]
    fn test_window_cadence_is_roughly_real_time() {
        let tone = short_tone();
        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);

        let mut worker = AudioWorker::start(
            tone,
            Box::new(move |_| *sink.lock() += 1),
        )
        .unwrap();

        std::thread::sleep(Duration::from_millis(250));
        worker.stop();

        // 1024/44100 = 23.2ms per window; 250ms fits about 10-11 windows
        // (plus the immediate first one). Generous bounds for CI jitter.
        let n = *count.lock();
        assert!(n >= 4, "only {n} windows delivered");
        assert!(n <= 30, "{n} windows delivered, pacing broken");
    }
}
