use super::container::{self, ContainerInfo};
use super::{DecodeError, FrameProperties, Raster};
use crate::error::{LoadError, LoadResult};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// Duration used when a frame declares no usable delay (10 fps).
pub const DEFAULT_FRAME_DURATION: f64 = 0.1;

/// Delays at or below this are treated as encoder artifacts.
pub const MIN_FRAME_DELAY: f64 = 0.011;

/// An opaque multi-frame image source.
///
/// Implementations must be able to report metadata for any index without
/// decoding pixels, and decode the raster for any index on request.
pub trait FrameSource: Send + Sync {
    fn frame_count(&self) -> usize;

    /// Canvas size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Raw container loop count, if the container declares one.
    fn loop_count(&self) -> Option<u16> {
        None
    }

    fn frame_properties(&self, index: usize) -> Result<FrameProperties, DecodeError>;

    fn decode_raster(&self, index: usize) -> Result<RgbaImage, DecodeError>;

    /// Decode the first `count` rasters in order, handing each to `sink`.
    ///
    /// The default decodes index by index; sources whose frames depend on
    /// their predecessors should override this with a single sequential walk.
    fn decode_leading(
        &self,
        count: usize,
        sink: &mut dyn FnMut(usize, RgbaImage),
    ) -> Result<(), DecodeError> {
        for index in 0..count.min(self.frame_count()) {
            sink(index, self.decode_raster(index)?);
        }
        Ok(())
    }
}

/// GIF source backed by an in-memory byte buffer.
///
/// Frame metadata comes from the container metadata pass; rasters are composited by the
/// `image` crate's GIF decoder.
pub struct GifSource {
    bytes: Arc<[u8]>,
    info: ContainerInfo,
}

impl GifSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Result<Self, DecodeError> {
        let bytes = bytes.into();
        let info = container::scan(&bytes)?;
        Ok(Self { bytes, info })
    }

    fn decoder(&self) -> Result<GifDecoder<Cursor<&[u8]>>, DecodeError> {
        GifDecoder::new(Cursor::new(&self.bytes[..]))
            .map_err(|source| DecodeError::Image { index: 0, source })
    }
}

impl FrameSource for GifSource {
    fn frame_count(&self) -> usize {
        self.info.frame_count()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn loop_count(&self) -> Option<u16> {
        self.info.loop_count
    }

    fn frame_properties(&self, index: usize) -> Result<FrameProperties, DecodeError> {
        self.info
            .frames
            .get(index)
            .copied()
            .ok_or(DecodeError::MetadataMissing { index })
    }

    fn decode_raster(&self, index: usize) -> Result<RgbaImage, DecodeError> {
        let total = self.frame_count();
        if index >= total {
            return Err(DecodeError::FrameOutOfBounds { index, total });
        }

        // Frames are composited over their predecessors, so reaching `index`
        // means walking every earlier frame.
        match self.decoder()?.into_frames().nth(index) {
            Some(Ok(frame)) => Ok(frame.into_buffer()),
            Some(Err(source)) => Err(DecodeError::Image { index, source }),
            None => Err(DecodeError::FrameOutOfBounds { index, total }),
        }
    }

    fn decode_leading(
        &self,
        count: usize,
        sink: &mut dyn FnMut(usize, RgbaImage),
    ) -> Result<(), DecodeError> {
        let total = self.frame_count();
        let wanted = count.min(total);
        if wanted == 0 {
            return Ok(());
        }

        let mut decoded = 0;
        for (index, frame) in self.decoder()?.into_frames().take(wanted).enumerate() {
            let frame = frame.map_err(|source| DecodeError::Image { index, source })?;
            sink(index, frame.into_buffer());
            decoded += 1;
        }

        if decoded < wanted {
            return Err(DecodeError::FrameOutOfBounds {
                index: decoded,
                total,
            });
        }
        Ok(())
    }
}

/// Resolve a frame's display duration from its metadata dictionary.
///
/// Prefers the unclamped delay, falls back to the clamped one, and replaces
/// anything at or below [`MIN_FRAME_DELAY`] with [`DEFAULT_FRAME_DURATION`].
pub fn resolve_duration(properties: Option<&FrameProperties>) -> f64 {
    let declared = properties.and_then(|p| p.unclamped_delay.or(p.delay));
    match declared {
        Some(delay) if delay > MIN_FRAME_DELAY => delay,
        _ => DEFAULT_FRAME_DURATION,
    }
}

/// Wraps a [`FrameSource`] and applies the frame duration rules.
pub struct FrameDecoder {
    source: Box<dyn FrameSource>,
}

impl FrameDecoder {
    pub fn new(source: impl FrameSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Build a decoder over GIF bytes.
    ///
    /// Fails with `InvalidInput` for empty or unrecognized buffers and with
    /// `EmptySequence` when the stream holds no frames.
    pub fn from_gif_bytes(bytes: impl Into<Arc<[u8]>>) -> LoadResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LoadError::invalid_input("empty byte buffer"));
        }

        let source = GifSource::new(bytes).map_err(|e| LoadError::invalid_input(e.to_string()))?;
        if source.frame_count() == 0 {
            return Err(LoadError::EmptySequence);
        }

        let (width, height) = source.dimensions();
        log::info!(
            "GIF accepted: {}x{}, {} frames, loop count: {:?}",
            width,
            height,
            source.frame_count(),
            source.loop_count()
        );

        Ok(Self::new(source))
    }

    pub fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn loop_count(&self) -> Option<u16> {
        self.source.loop_count()
    }

    /// Display duration of `index` in seconds.
    ///
    /// A single-frame image never advances, so its only frame lasts forever.
    pub fn frame_duration(&self, index: usize) -> f64 {
        if self.frame_count() == 1 {
            return f64::INFINITY;
        }

        match self.source.frame_properties(index) {
            Ok(properties) => resolve_duration(Some(&properties)),
            Err(e) => {
                log::debug!("Using default duration for frame {}: {}", index, e);
                resolve_duration(None)
            }
        }
    }

    pub fn decode_raster(&self, index: usize) -> LoadResult<Raster> {
        self.source
            .decode_raster(index)
            .map(Arc::new)
            .map_err(|e| LoadError::decode_failed(index, e))
    }

    /// Decode the leading `count` rasters, in index order.
    ///
    /// On failure the reported index is the first frame that was not delivered.
    pub fn decode_leading(&self, count: usize, mut sink: impl FnMut(usize, Raster)) -> LoadResult<()> {
        let mut delivered = 0;
        let result = self.source.decode_leading(count, &mut |index, raster| {
            delivered = index + 1;
            sink(index, Arc::new(raster));
        });
        result.map_err(|e| LoadError::decode_failed(delivered, e))
    }
}
