use crate::decoder::Raster;
use parking_lot::RwLock;

/// One entry of the frame cache.
#[derive(Clone, Debug)]
pub struct Frame {
    pub raster: Option<Raster>,
    /// Seconds, or `f64::INFINITY` for a static image.
    pub duration: f64,
}

/// Ordered, fill-once frame table for one load generation.
///
/// The preloader appends entries in index order and fills each raster at most
/// once; readers only ever see entries that are already written. Slots that
/// have not been appended yet read as unavailable.
#[derive(Debug)]
pub struct FrameCache {
    expected: usize,
    frames: RwLock<Vec<Frame>>,
    loop_duration: RwLock<Option<f64>>,
}

impl FrameCache {
    /// Empty cache for a sequence of `expected` frames.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            frames: RwLock::new(Vec::with_capacity(expected)),
            loop_duration: RwLock::new(None),
        }
    }

    /// Fully populated cache without rasters, for driving a scheduler directly.
    pub fn from_durations(durations: &[f64]) -> Self {
        let cache = Self::new(durations.len());
        for &duration in durations {
            cache.append(duration);
        }
        cache.set_loop_duration(durations.iter().sum());
        cache
    }

    /// Number of frames in the sequence, populated or not.
    pub fn len(&self) -> usize {
        self.expected
    }

    pub fn is_empty(&self) -> bool {
        self.expected == 0
    }

    /// Number of entries written so far.
    pub fn populated(&self) -> usize {
        self.frames.read().len()
    }

    pub fn is_complete(&self) -> bool {
        self.loop_duration.read().is_some()
    }

    pub fn frame(&self, index: usize) -> Option<Frame> {
        self.frames.read().get(index).cloned()
    }

    pub fn duration(&self, index: usize) -> Option<f64> {
        self.frames.read().get(index).map(|f| f.duration)
    }

    pub fn raster(&self, index: usize) -> Option<Raster> {
        self.frames.read().get(index).and_then(|f| f.raster.clone())
    }

    /// Sum of all frame durations, known once the duration pass has finished.
    pub fn loop_duration(&self) -> Option<f64> {
        *self.loop_duration.read()
    }

    /// Append the next entry with no raster. Returns its index, or `None` if
    /// the sequence is already full.
    pub fn append(&self, duration: f64) -> Option<usize> {
        let mut frames = self.frames.write();
        if frames.len() >= self.expected {
            return None;
        }
        frames.push(Frame {
            raster: None,
            duration,
        });
        Some(frames.len() - 1)
    }

    /// Store the raster for an already appended entry. A slot is written at
    /// most once; returns `false` if it was missing or already filled.
    pub fn fill_raster(&self, index: usize, raster: Raster) -> bool {
        let mut frames = self.frames.write();
        match frames.get_mut(index) {
            Some(frame) if frame.raster.is_none() => {
                frame.raster = Some(raster);
                true
            }
            _ => false,
        }
    }

    pub fn set_loop_duration(&self, total: f64) {
        *self.loop_duration.write() = Some(total);
    }
}
