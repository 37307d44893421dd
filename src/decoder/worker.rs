use super::FrameDecoder;
use crate::animator::FrameCache;
use crate::error::LoadResult;
use smol::channel::Sender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statistics of a finished preload pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PreloadSummary {
    pub frame_count: usize,
    pub rasters_decoded: usize,
    /// Sum of all frame durations in seconds.
    pub loop_duration: f64,
    pub elapsed: Duration,
}

/// Completion notice sent from the worker to the controller.
#[derive(Debug)]
pub struct PreloadEvent {
    pub generation: u64,
    pub result: LoadResult<PreloadSummary>,
}

/// Populates a [`FrameCache`] from a [`FrameDecoder`].
///
/// Runs two passes: durations for every frame, then rasters for the leading
/// `window` frames. Frames past the window keep their duration only.
pub struct FramePreloader {
    decoder: Arc<FrameDecoder>,
    cache: Arc<FrameCache>,
    window: usize,
}

impl FramePreloader {
    pub fn new(decoder: Arc<FrameDecoder>, cache: Arc<FrameCache>, window: usize) -> Self {
        Self {
            decoder,
            cache,
            window,
        }
    }

    /// Run both passes on the calling thread.
    pub fn run(&self) -> LoadResult<PreloadSummary> {
        let start = Instant::now();
        let frame_count = self.decoder.frame_count();

        log::info!(
            "Preloading {} frames (raster window: {})",
            frame_count,
            self.window
        );

        // Duration pass
        let mut loop_duration = 0.0;
        for index in 0..frame_count {
            let duration = self.decoder.frame_duration(index);
            loop_duration += duration;
            if self.cache.append(duration).is_none() {
                log::warn!("Frame cache already full at index {}", index);
            }
        }
        self.cache.set_loop_duration(loop_duration);

        // Raster pass
        let mut rasters_decoded = 0;
        self.decoder.decode_leading(self.window, |index, raster| {
            if self.cache.fill_raster(index, raster) {
                rasters_decoded += 1;
            }
        })?;

        let summary = PreloadSummary {
            frame_count,
            rasters_decoded,
            loop_duration,
            elapsed: start.elapsed(),
        };
        log::info!(
            "Preloaded {} rasters of {} frames in {:?} (loop duration: {:.3}s)",
            summary.rasters_decoded,
            summary.frame_count,
            summary.elapsed,
            summary.loop_duration
        );
        Ok(summary)
    }

    /// Run the passes on the blocking thread pool.
    pub async fn run_async(self) -> LoadResult<PreloadSummary> {
        smol::unblock(move || self.run()).await
    }

    /// Run in the background and report the result for `generation`.
    ///
    /// The pass always runs to completion. If `live` has moved past
    /// `generation` by then, nothing is sent.
    pub fn spawn(self, generation: u64, live: Arc<AtomicU64>, events: Sender<PreloadEvent>) {
        smol::unblock(move || {
            let result = self.run();
            if let Err(e) = &result {
                log::error!("Preload for generation {} failed: {}", generation, e);
            }

            if live.load(Ordering::Acquire) != generation {
                log::debug!("Dropping preload result of superseded generation {}", generation);
                return;
            }
            // The controller may already be gone.
            let _ = events.send_blocking(PreloadEvent { generation, result });
        })
        .detach();
    }
}
