//! GIF container metadata.
//!
//! Reads the logical screen, the per-frame graphic control delays and the
//! NETSCAPE2.0 loop count with the `gif` crate's metadata pass, skipping LZW
//! decoding entirely.

use super::{DecodeError, FrameProperties};
use gif::{DecodeOptions, DecodingError, Repeat};

/// Delays below this are rewritten to [`CLAMPED_DELAY`] by browsers.
const CLAMP_THRESHOLD: f64 = 0.02;
const CLAMPED_DELAY: f64 = 0.1;

/// Everything the metadata pass learned about a GIF stream.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerInfo {
    pub width: u32,
    pub height: u32,
    /// Raw NETSCAPE2.0 loop count. `Some(0)` loops forever, `None` means the
    /// extension was absent.
    pub loop_count: Option<u16>,
    pub frames: Vec<FrameProperties>,
}

impl ContainerInfo {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Returns `true` if `bytes` starts with a GIF signature.
pub fn looks_like_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

/// Scan a GIF stream for its frame metadata.
///
/// A stream that stops between blocks, including one missing its trailer,
/// ends the scan: the frames read so far are kept.
pub fn scan(bytes: &[u8]) -> Result<ContainerInfo, DecodeError> {
    if !looks_like_gif(bytes) {
        return Err(DecodeError::UnrecognizedFormat);
    }

    let mut options = DecodeOptions::new();
    options.skip_frame_decoding(true);
    let mut decoder = options.read_info(bytes)?;

    let width = u32::from(decoder.width());
    let height = u32::from(decoder.height());

    let mut frames = Vec::new();
    loop {
        match decoder.next_frame_info() {
            Ok(Some(frame)) => frames.push(FrameProperties::from_gif_delay(frame.delay)),
            Ok(None) => break,
            Err(DecodingError::UnexpectedEof) => {
                log::debug!("GIF stream ends without a trailer after {} frames", frames.len());
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    // The reader reports a missing extension as `Finite(0)`; an extension
    // with a count of zero comes back as `Infinite`.
    let loop_count = match decoder.repeat() {
        Repeat::Infinite => Some(0),
        Repeat::Finite(0) => None,
        Repeat::Finite(n) => Some(n),
    };

    Ok(ContainerInfo {
        width,
        height,
        loop_count,
        frames,
    })
}

impl FrameProperties {
    /// Build the metadata dictionary for a frame with the given graphic
    /// control delay in centiseconds.
    fn from_gif_delay(centiseconds: u16) -> Self {
        let raw = f64::from(centiseconds) / 100.0;
        let clamped = if raw < CLAMP_THRESHOLD { CLAMPED_DELAY } else { raw };
        Self {
            unclamped_delay: Some(raw),
            delay: Some(clamped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal hand-built stream: 1x1 canvas, global palette of two colors,
    /// optional NETSCAPE loop, and one image block per delay.
    fn build_stream(delays: &[Option<u16>], loop_count: Option<u16>) -> Vec<u8> {
        let mut out = b"GIF89a".to_vec();
        out.extend_from_slice(&[1, 0, 1, 0, 0x80, 0, 0]);
        out.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        if let Some(count) = loop_count {
            out.extend_from_slice(&[0x21, 0xFF, 11]);
            out.extend_from_slice(b"NETSCAPE2.0");
            let [lo, hi] = count.to_le_bytes();
            out.extend_from_slice(&[3, 1, lo, hi, 0]);
        }
        for delay in delays {
            if let Some(cs) = delay {
                let [lo, hi] = cs.to_le_bytes();
                out.extend_from_slice(&[0x21, 0xF9, 4, 0, lo, hi, 0, 0]);
            }
            out.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0]);
            out.extend_from_slice(&[2, 2, 0x4C, 0x01, 0]);
        }
        out.push(0x3B);
        out
    }

    #[test]
    fn scans_frames_delays_and_loop_count() {
        let bytes = build_stream(&[Some(10), Some(1), None], Some(0));
        let info = scan(&bytes).unwrap();

        assert_eq!((info.width, info.height), (1, 1));
        assert_eq!(info.loop_count, Some(0));
        assert_eq!(info.frame_count(), 3);

        assert_eq!(info.frames[0].unclamped_delay, Some(0.1));
        assert_eq!(info.frames[0].delay, Some(0.1));
        assert_eq!(info.frames[1].unclamped_delay, Some(0.01));
        assert_eq!(info.frames[1].delay, Some(0.1));
        // No graphic control extension reads as a zero delay.
        assert_eq!(info.frames[2].unclamped_delay, Some(0.0));
    }

    #[test]
    fn finite_loop_count_is_kept() {
        let info = scan(&build_stream(&[Some(5), Some(5)], Some(2))).unwrap();
        assert_eq!(info.loop_count, Some(2));
    }

    #[test]
    fn missing_loop_extension_is_none() {
        let info = scan(&build_stream(&[Some(5)], None)).unwrap();
        assert_eq!(info.loop_count, None);
        assert_eq!(info.frame_count(), 1);
    }

    #[test]
    fn header_only_stream_has_no_frames() {
        let info = scan(&build_stream(&[], None)).unwrap();
        assert_eq!(info.frame_count(), 0);
    }

    #[test]
    fn rejects_empty_and_foreign_input() {
        assert!(matches!(scan(&[]), Err(DecodeError::UnrecognizedFormat)));
        assert!(matches!(
            scan(b"\x89PNG\r\n\x1a\n"),
            Err(DecodeError::UnrecognizedFormat)
        ));
        assert!(matches!(scan(b"GIF89a"), Err(DecodeError::Container(_))));
    }

    #[test]
    fn missing_trailer_keeps_frames() {
        let mut bytes = build_stream(&[Some(10), Some(20)], None);
        bytes.pop();
        let info = scan(&bytes).unwrap();
        assert_eq!(info.frame_count(), 2);
        assert_eq!(info.frames[1].unclamped_delay, Some(0.2));
    }

    #[test]
    fn stream_cut_inside_a_frame_header_drops_that_frame() {
        let mut bytes = build_stream(&[Some(10), Some(10)], None);
        // Trailer, LZW data and the last two descriptor bytes.
        bytes.truncate(bytes.len() - 8);
        let info = scan(&bytes).unwrap();
        assert_eq!(info.frame_count(), 1);
    }
}
