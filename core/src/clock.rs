//! Frame clock
//!
//! Elapsed time since startup, sampled once at the beginning of each frame
//! and handed to the kernel as its `time` parameter.

use std::time::{Duration, Instant};

/// Monotonic elapsed-time source.
///
/// Every sample is at least as large as the previous one, even if the
/// instants handed to [`sample_at`](Self::sample_at) go backwards.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: f32,
    frames: u64,
}

impl FrameClock {
    /// Start the clock now.
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    /// Start the clock at a given instant.
    pub fn start_at(start: Instant) -> Self {
        Self {
            start,
            last: 0.0,
            frames: 0,
        }
    }

    /// Sample elapsed seconds for the frame about to run.
    pub fn sample(&mut self) -> f32 {
        self.sample_at(Instant::now())
    }

    /// Sample elapsed seconds as of `now`.
    pub fn sample_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        self.last = self.last.max(elapsed);
        self.frames += 1;
        self.last
    }

    /// Most recent sample (0 before the first frame)
    pub fn time(&self) -> f32 {
        self.last
    }

    /// Number of samples taken so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Wall time since the clock started
    pub fn uptime(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let clock = FrameClock::start();
        assert_eq!(clock.time(), 0.0);
        assert_eq!(clock.frame_count(), 0);
    }

    #[test]
    fn test_sample_reports_elapsed_seconds() {
        let start = Instant::now();
        let mut clock = FrameClock::start_at(start);

        let t = clock.sample_at(start + Duration::from_millis(1500));
        assert!((t - 1.5).abs() < 1e-6);
        assert_eq!(clock.frame_count(), 1);
        assert_eq!(clock.time(), t);
    }

    #[test]
    fn test_samples_never_decrease() {
        let start = Instant::now();
        let mut clock = FrameClock::start_at(start);

        let later = clock.sample_at(start + Duration::from_secs(2));
        let earlier = clock.sample_at(start + Duration::from_secs(1));
        assert_eq!(earlier, later);

        // Instants before the start clamp to zero rather than going negative
        let mut clock = FrameClock::start_at(start + Duration::from_secs(10));
        assert_eq!(clock.sample_at(start), 0.0);
    }

    #[test]
    fn test_real_time_samples_are_monotonic() {
        let mut clock = FrameClock::start();
        let samples: Vec<f32> = (0..1000).map(|_| clock.sample()).collect();
        assert!(samples.windows(2).all(|pair| pair[1] >= pair[0]));
        assert_eq!(clock.frame_count(), 1000);
    }
}
