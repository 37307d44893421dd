pub mod cache;
pub mod scheduler;

pub use cache::{Frame, FrameCache};
pub use scheduler::{Advance, PlaybackScheduler, PlaybackState, RepeatLimit, MAX_TIME_STEP};
