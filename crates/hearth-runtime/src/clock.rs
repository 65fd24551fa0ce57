//! Frame clock driven by a monotonic time source

use std::time::{Duration, Instant};

/// Longest frame delta reported to systems, in seconds
const MAX_DELTA: f64 = 0.25;

/// A monotonic source of elapsed time since some fixed origin
pub trait TimeSource {
    fn elapsed(&mut self) -> Duration;
}

/// Wall-clock time source backed by `Instant`
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn elapsed(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic time source that advances by a fixed step every time it is read.
/// The first read returns zero.
pub struct ManualTimeSource {
    now: Duration,
    step: Duration,
    started: bool,
}

impl ManualTimeSource {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
            started: false,
        }
    }

    /// A source advancing one 60Hz frame per read
    pub fn per_frame_60hz() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / 60.0))
    }
}

impl TimeSource for ManualTimeSource {
    fn elapsed(&mut self) -> Duration {
        if self.started {
            self.now += self.step;
        } else {
            self.started = true;
        }
        self.now
    }
}

/// Timing information for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Zero-based index of this frame
    pub frame: u64,
    /// Absolute elapsed time in seconds, read directly from the time source
    pub total_seconds: f64,
    /// Time since the previous frame in seconds (clamped, zero on the first frame)
    pub delta_seconds: f64,
}

/// Tracks frame count and time for the frame driver
pub struct FrameClock<T: TimeSource> {
    source: T,
    frame: u64,
    last_total: Option<f64>,
}

impl<T: TimeSource> FrameClock<T> {
    pub fn new(source: T) -> Self {
        Self {
            source,
            frame: 0,
            last_total: None,
        }
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) -> FrameTime {
        let total_seconds = self.source.elapsed().as_secs_f64();

        let delta_seconds = match self.last_total {
            // Clamp to avoid huge jumps after a stall (max 250ms frame time)
            Some(last) => (total_seconds - last).clamp(0.0, MAX_DELTA),
            None => 0.0,
        };
        self.last_total = Some(total_seconds);

        let time = FrameTime {
            frame: self.frame,
            total_seconds,
            delta_seconds,
        };
        self.frame += 1;
        time
    }

    /// Number of frames ticked so far
    pub fn frames(&self) -> u64 {
        self.frame
    }
}
