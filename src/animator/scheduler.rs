use super::cache::FrameCache;
use crate::error::{LoadError, LoadResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest elapsed time a single tick may contribute, in seconds.
pub const MAX_TIME_STEP: f64 = 1.0;

/// Outcome of one [`PlaybackScheduler::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    NoChange,
    Changed,
    /// The final permitted pass just completed. Also a change.
    Finished,
}

impl Advance {
    pub fn is_change(self) -> bool {
        !matches!(self, Advance::NoChange)
    }
}

/// How many passes over the sequence are allowed. `0` loops forever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepeatLimit(pub u32);

impl RepeatLimit {
    pub const INFINITE: RepeatLimit = RepeatLimit(0);

    /// Map a NETSCAPE2.0 loop count to a pass limit: `0` loops forever, `n`
    /// repeats `n` times after the first pass, no extension plays once.
    pub fn from_loop_count(loop_count: Option<u16>) -> Self {
        match loop_count {
            Some(0) => Self::INFINITE,
            Some(n) => RepeatLimit(u32::from(n) + 1),
            None => RepeatLimit(1),
        }
    }

    pub fn is_infinite(self) -> bool {
        self.0 == 0
    }

    /// `true` if a pass that started after `repeats_completed` full passes is
    /// the last one allowed.
    pub fn is_reached(self, repeats_completed: u32) -> bool {
        self.0 != 0 && repeats_completed >= self.0 - 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub time_since_last_advance: f64,
    pub repeats_completed: u32,
    pub finished: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_index: 0,
            time_since_last_advance: 0.0,
            repeats_completed: 0,
            finished: false,
        }
    }
}

/// Tick-driven frame stepper over a [`FrameCache`].
///
/// Entries the preloader has not reached yet count as infinitely long, so
/// playback simply holds until their duration is known.
pub struct PlaybackScheduler {
    cache: Arc<FrameCache>,
    state: PlaybackState,
    repeat_limit: RepeatLimit,
    max_time_step: f64,
}

impl PlaybackScheduler {
    pub fn new(cache: Arc<FrameCache>, repeat_limit: RepeatLimit) -> LoadResult<Self> {
        Self::with_max_time_step(cache, repeat_limit, MAX_TIME_STEP)
    }

    pub fn with_max_time_step(
        cache: Arc<FrameCache>,
        repeat_limit: RepeatLimit,
        max_time_step: f64,
    ) -> LoadResult<Self> {
        if cache.is_empty() {
            return Err(LoadError::EmptySequence);
        }
        let max_time_step = if max_time_step > 0.0 {
            max_time_step
        } else {
            log::warn!(
                "Ignoring max time step {}; using {}",
                max_time_step,
                MAX_TIME_STEP
            );
            MAX_TIME_STEP
        };
        Ok(Self {
            cache,
            state: PlaybackState::default(),
            repeat_limit,
            max_time_step,
        })
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn cache(&self) -> &Arc<FrameCache> {
        &self.cache
    }

    pub fn repeat_limit(&self) -> RepeatLimit {
        self.repeat_limit
    }

    pub fn frame_count(&self) -> usize {
        self.cache.len()
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Duration of the current frame; unknown entries hold forever.
    pub fn current_duration(&self) -> f64 {
        self.cache
            .duration(self.state.current_index)
            .unwrap_or(f64::INFINITY)
    }

    /// Seconds of tick time still needed before the next advance.
    pub fn time_until_next_frame(&self) -> f64 {
        if self.state.finished {
            return f64::INFINITY;
        }
        (self.current_duration() - self.state.time_since_last_advance).max(0.0)
    }

    /// Feed `elapsed` seconds of clock time and step at most one frame.
    pub fn advance(&mut self, elapsed: f64) -> Advance {
        if self.state.finished {
            return Advance::NoChange;
        }

        // Also rejects NaN, which `min` would otherwise swap for the clamp.
        if !(elapsed > 0.0) {
            return Advance::NoChange;
        }
        let step = elapsed.min(self.max_time_step);

        self.state.time_since_last_advance += step;

        let duration = self.current_duration();
        if self.state.time_since_last_advance < duration {
            return Advance::NoChange;
        }

        self.state.time_since_last_advance -= duration;
        let left = self.state.current_index;
        let count = self.frame_count();
        self.state.current_index = (left + 1) % count;

        if left == count - 1 && self.repeat_limit.is_reached(self.state.repeats_completed) {
            self.state.finished = true;
            log::info!(
                "Playback finished after {} passes",
                self.state.repeats_completed + 1
            );
            return Advance::Finished;
        }
        if self.state.current_index == 0 {
            self.state.repeats_completed += 1;
        }

        log::trace!("Frame {} -> {}", left, self.state.current_index);
        Advance::Changed
    }
}
