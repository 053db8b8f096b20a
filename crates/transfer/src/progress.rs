use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Progress value at the end of session setup and status query.
pub const SETUP_END: u64 = 5;

/// Progress value once every chunk is on the server.
pub const CHUNKS_END: u64 = 95;

/// Progress value of a finished upload.
pub const TOTAL: u64 = 100;

/// Maps `done` of `total_chunks` onto the `SETUP_END..=CHUNKS_END` band.
///
/// With no chunks at all the band is considered complete.
pub fn chunk_progress(done: u32, total_chunks: u32) -> u64 {
    if total_chunks == 0 {
        return CHUNKS_END;
    }
    let done = u64::from(done.min(total_chunks));
    SETUP_END + done * (CHUNKS_END - SETUP_END) / u64::from(total_chunks)
}

// ---------------------------------------------------------------------------
// SpeedCalculator
// ---------------------------------------------------------------------------

/// Sliding-window transfer rate over recently sent chunks.
#[derive(Debug)]
pub struct SpeedCalculator {
    samples: VecDeque<(Instant, u64)>,
    max_samples: usize,
    window: Duration,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 100)
    }
}

impl SpeedCalculator {
    pub fn new(window: Duration, max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples.min(128)),
            max_samples: max_samples.max(1),
            window,
        }
    }

    /// Records that `bytes` were sent just now.
    pub fn add_sample(&mut self, bytes: u64) {
        self.record(Instant::now(), bytes);
    }

    fn record(&mut self, at: Instant, bytes: u64) {
        self.samples.push_back((at, bytes));
        if let Some(cutoff) = at.checked_sub(self.window) {
            while self.samples.front().is_some_and(|(t, _)| *t < cutoff) {
                self.samples.pop_front();
            }
        }
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Average bytes/second within the window; 0.0 with fewer than 2 samples.
    pub fn bytes_per_second(&self) -> f64 {
        let (Some((first, _)), Some((last, _))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let elapsed = last.duration_since(*first);
        if self.samples.len() < 2 || elapsed.is_zero() {
            return 0.0;
        }
        let total: u64 = self.samples.iter().map(|(_, bytes)| bytes).sum();
        total as f64 / elapsed.as_secs_f64()
    }

    /// Estimated time to send `remaining_bytes`; `None` while speed is unknown.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        let speed = self.bytes_per_second();
        (speed > 0.0).then(|| Duration::from_secs_f64(remaining_bytes as f64 / speed))
    }
}
