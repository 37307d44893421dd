//! Elapsed-time samples for driving playback.

use std::time::{Duration, Instant};

/// Elapsed time assumed when nothing better is known (one 60 Hz frame).
pub const DEFAULT_TICK: f64 = 1.0 / 60.0;

/// One periodic clock callback as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSample {
    /// Nominal callback rate. Zero means the host did not pin a rate.
    pub preferred_fps: u32,
    /// Measured time since the previous callback, in seconds, if known.
    pub actual_interval: Option<f64>,
}

impl ClockSample {
    pub fn at_rate(preferred_fps: u32) -> Self {
        Self {
            preferred_fps,
            actual_interval: None,
        }
    }

    /// Seconds this callback stands for.
    ///
    /// A pinned rate wins. Otherwise the measured interval of this callback is
    /// used, then `previous_interval`, then `fallback`.
    pub fn elapsed(&self, previous_interval: Option<f64>, fallback: f64) -> f64 {
        if self.preferred_fps > 0 {
            return 1.0 / f64::from(self.preferred_fps);
        }
        self.actual_interval
            .or(previous_interval)
            .unwrap_or(fallback)
    }
}

/// Produces [`ClockSample`]s from wall-clock instants for hosts without a
/// display-refresh callback of their own.
#[derive(Clone, Debug)]
pub struct DisplayClock {
    preferred_fps: u32,
    last: Option<Instant>,
}

impl DisplayClock {
    pub fn new(preferred_fps: u32) -> Self {
        Self {
            preferred_fps,
            last: None,
        }
    }

    /// Time between callbacks the host should aim for.
    pub fn frame_interval(&self) -> Duration {
        if self.preferred_fps == 0 {
            Duration::from_secs_f64(DEFAULT_TICK)
        } else {
            Duration::from_secs_f64(1.0 / f64::from(self.preferred_fps))
        }
    }

    pub fn sample(&mut self, now: Instant) -> ClockSample {
        let actual_interval = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f64());
        self.last = Some(now);
        ClockSample {
            preferred_fps: self.preferred_fps,
            actual_interval,
        }
    }
}
