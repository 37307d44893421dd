pub mod container;
pub mod frame_decoder;
pub mod worker;

use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;

pub use frame_decoder::{FrameDecoder, FrameSource, GifSource};
pub use worker::{FramePreloader, PreloadEvent, PreloadSummary};

/// A decoded, fully composited frame shared between the cache and the host.
pub type Raster = Arc<RgbaImage>;

/// Per-frame metadata dictionary as exposed by the container.
///
/// Both fields are in seconds. `unclamped_delay` is the value as written by
/// the encoder; `delay` is the value after the container's own clamping rules.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameProperties {
    pub unclamped_delay: Option<f64>,
    pub delay: Option<f64>,
}

/// Errors raised while scanning or decoding an encoded image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not a GIF stream")]
    UnrecognizedFormat,

    #[error("invalid GIF stream: {0}")]
    Container(#[from] gif::DecodingError),

    #[error("frame {index} out of bounds (total: {total})")]
    FrameOutOfBounds { index: usize, total: usize },

    #[error("no metadata for frame {index}")]
    MetadataMissing { index: usize },

    #[error("failed to decode frame {index}: {source}")]
    Image {
        index: usize,
        #[source]
        source: image::ImageError,
    },
}
