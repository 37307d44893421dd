//! Incremental playback of animated GIFs.
//!
//! Bytes go in through [`AnimatedImageController::load`]; a background pass
//! fills a frame cache while the host drives playback with
//! [`AnimatedImageController::tick`] and repaints from
//! [`AnimatedImageController::current_frame`].

pub mod animator;
pub mod clock;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;

pub use animator::{Advance, Frame, FrameCache, PlaybackScheduler, PlaybackState, RepeatLimit};
pub use clock::{ClockSample, DisplayClock};
pub use config::{MissingRaster, PlayerConfig};
pub use controller::{AnimatedImageController, LoadState};
pub use decoder::{FrameDecoder, FramePreloader, FrameProperties, FrameSource, GifSource, Raster};
pub use error::{ConfigError, LoadError, LoadResult};
