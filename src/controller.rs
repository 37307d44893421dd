use crate::animator::{Advance, FrameCache, PlaybackScheduler};
use crate::clock::ClockSample;
use crate::config::{MissingRaster, PlayerConfig};
use crate::decoder::{FrameDecoder, FramePreloader, PreloadEvent, Raster};
use crate::error::LoadResult;
use smol::channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Where the most recent load stands.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Idle,
    /// Accepted; the preload pass is still running.
    Loading,
    Ready,
    Failed(String),
}

/// Everything that belongs to one accepted load.
struct ActiveLoad {
    generation: u64,
    decoder: Arc<FrameDecoder>,
    scheduler: PlaybackScheduler,
}

impl ActiveLoad {
    fn cache(&self) -> &Arc<FrameCache> {
        self.scheduler.cache()
    }

    fn current_raster(&self) -> Option<Raster> {
        self.cache().raster(self.scheduler.current_index())
    }
}

/// Plays one animated image at a time, driven by external ticks.
///
/// The host owns the controller, feeds it bytes with [`load`](Self::load),
/// calls [`tick`](Self::tick) from its periodic clock and repaints whenever a
/// tick reports a change.
pub struct AnimatedImageController {
    config: PlayerConfig,
    generation: Arc<AtomicU64>,
    events_tx: Sender<PreloadEvent>,
    events_rx: Receiver<PreloadEvent>,
    active: Option<ActiveLoad>,
    load_state: LoadState,
    playing: bool,
    /// Last raster handed out for display.
    displayed: Option<Raster>,
    last_interval: Option<f64>,
    on_repaint: Option<Box<dyn FnMut(usize) + Send>>,
}

impl Default for AnimatedImageController {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl AnimatedImageController {
    pub fn new(config: PlayerConfig) -> Self {
        let (events_tx, events_rx) = smol::channel::unbounded();
        Self {
            config,
            generation: Arc::new(AtomicU64::new(0)),
            events_tx,
            events_rx,
            active: None,
            load_state: LoadState::Idle,
            playing: false,
            displayed: None,
            last_interval: None,
            on_repaint: None,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Register a callback invoked with the new frame index whenever a tick
    /// changes the displayed frame.
    pub fn set_repaint_handler(&mut self, handler: impl FnMut(usize) + Send + 'static) {
        self.on_repaint = Some(Box::new(handler));
    }

    /// Start playing `bytes`, replacing whatever was loaded before.
    ///
    /// Input is validated before anything changes: on error the previous load
    /// keeps playing untouched. On success the preload pass starts in the
    /// background and any pass still running for an older load is ignored.
    pub fn load(&mut self, bytes: impl Into<Arc<[u8]>>) -> LoadResult<()> {
        let decoder = Arc::new(FrameDecoder::from_gif_bytes(bytes)?);
        let cache = Arc::new(FrameCache::new(decoder.frame_count()));
        let repeat_limit = self.config.resolve_repeat_limit(decoder.loop_count());
        let scheduler =
            PlaybackScheduler::with_max_time_step(cache.clone(), repeat_limit, self.config.max_time_step)?;

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::info!(
            "Load generation {}: {} frames, repeat limit {:?}",
            generation,
            decoder.frame_count(),
            repeat_limit
        );

        FramePreloader::new(decoder.clone(), cache, self.config.preload_window).spawn(
            generation,
            self.generation.clone(),
            self.events_tx.clone(),
        );

        self.active = Some(ActiveLoad {
            generation,
            decoder,
            scheduler,
        });
        self.load_state = LoadState::Loading;
        self.playing = self.config.autoplay;
        Ok(())
    }

    /// Drain preload completion events. Returns `true` if the live load
    /// changed state.
    pub fn poll_preload(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            let live = self.active.as_ref().map(|a| a.generation);
            if live != Some(event.generation) {
                log::debug!("Ignoring preload result of generation {}", event.generation);
                continue;
            }

            match event.result {
                Ok(summary) => {
                    log::info!(
                        "Generation {} ready: {} frames, {} rasters",
                        event.generation,
                        summary.frame_count,
                        summary.rasters_decoded
                    );
                    self.load_state = LoadState::Ready;
                }
                Err(e) => {
                    let msg = format!("Failed to preload image: {}", e);
                    log::error!("{}", msg);
                    // The partial cache is unusable; keep showing what was there.
                    self.active = None;
                    self.playing = false;
                    self.load_state = LoadState::Failed(msg);
                }
            }
            changed = true;
        }

        if changed {
            self.refresh_displayed();
        }
        changed
    }

    /// Feed `elapsed` seconds of clock time. Ignored while paused.
    ///
    /// Fires the repaint handler before returning if the frame changed.
    pub fn tick(&mut self, elapsed: f64) -> Advance {
        self.poll_preload();
        if !self.playing {
            return Advance::NoChange;
        }
        let Some(active) = self.active.as_mut() else {
            return Advance::NoChange;
        };

        let advance = active.scheduler.advance(elapsed);
        if advance.is_change() {
            let index = active.scheduler.current_index();
            self.refresh_displayed();
            if let Some(handler) = self.on_repaint.as_mut() {
                handler(index);
            }
        }
        if advance == Advance::Finished {
            self.playing = false;
        }
        advance
    }

    /// Tick from a host clock callback; see [`ClockSample::elapsed`].
    pub fn tick_clock(&mut self, sample: ClockSample) -> Advance {
        let elapsed = sample.elapsed(self.last_interval, self.config.fallback_tick);
        if let Some(interval) = sample.actual_interval {
            self.last_interval = Some(interval);
        }
        self.tick(elapsed)
    }

    /// Raster to show right now.
    ///
    /// `None` is the placeholder: nothing has been displayed yet, or the
    /// current frame has no raster and the config asks for a placeholder.
    pub fn current_frame(&self) -> Option<Raster> {
        let Some(active) = self.active.as_ref() else {
            return self.displayed.clone();
        };
        match active.current_raster() {
            Some(raster) => Some(raster),
            None => match self.config.missing_raster {
                MissingRaster::HoldPrevious => self.displayed.clone(),
                MissingRaster::Placeholder => None,
            },
        }
    }

    pub fn play(&mut self) {
        if self.is_finished() {
            log::debug!("Not restarting a finished animation");
            return;
        }
        if !self.playing {
            self.playing = true;
            log::info!("Animation playback: PLAYING");
        }
    }

    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            log::info!("Animation playback: PAUSED");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.scheduler.is_finished())
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.scheduler.current_index())
    }

    pub fn frame_count(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |a| a.decoder.frame_count())
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.active.as_ref().map(|a| a.decoder.dimensions())
    }

    pub fn repeats_completed(&self) -> u32 {
        self.active
            .as_ref()
            .map_or(0, |a| a.scheduler.state().repeats_completed)
    }

    /// Length of one pass in seconds, once the duration pass has run.
    pub fn loop_duration(&self) -> Option<f64> {
        self.active.as_ref().and_then(|a| a.cache().loop_duration())
    }

    /// Tick time still needed before the next frame change.
    pub fn time_until_next_frame(&self) -> Option<f64> {
        self.active
            .as_ref()
            .map(|a| a.scheduler.time_until_next_frame())
    }

    fn refresh_displayed(&mut self) {
        if let Some(raster) = self.active.as_ref().and_then(ActiveLoad::current_raster) {
            self.displayed = Some(raster);
        }
    }
}
