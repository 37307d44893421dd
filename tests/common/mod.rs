#![allow(dead_code)]

use gif_animator::{AnimatedImageController, LoadState};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use std::time::{Duration, Instant};

/// Encode a GIF whose frame `i` is filled with red = `i * 80 % 256`.
pub fn build_gif(width: u32, height: u32, delays_ms: &[u32], repeat: Option<Repeat>) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        if let Some(repeat) = repeat {
            encoder
                .set_repeat(repeat)
                .expect("repeat metadata should be writable");
        }

        let frames = delays_ms.iter().enumerate().map(|(idx, delay_ms)| {
            let mut rgba = RgbaImage::new(width, height);
            for pixel in rgba.pixels_mut() {
                *pixel = Rgba([frame_red(idx), 0, 0, 255]);
            }
            Frame::from_parts(rgba, 0, 0, Delay::from_numer_denom_ms(*delay_ms, 1))
        });
        encoder
            .encode_frames(frames)
            .expect("test gif encoding should succeed");
    }
    out
}

pub fn frame_red(index: usize) -> u8 {
    ((index as u16 * 80) % 256) as u8
}

/// 1x1 GIF with one image block per entry of `valid`. A `false` entry gets
/// LZW data whose first code is out of range, so decoding that frame fails
/// while its metadata still reads cleanly.
pub fn hand_built_gif(valid: &[bool]) -> Vec<u8> {
    let mut out = b"GIF89a".to_vec();
    out.extend_from_slice(&[1, 0, 1, 0, 0x80, 0, 0]);
    out.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
    for &ok in valid {
        out.extend_from_slice(&[0x21, 0xF9, 4, 0, 10, 0, 0, 0]);
        out.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0]);
        if ok {
            // clear, pixel 0, end
            out.extend_from_slice(&[2, 2, 0x44, 0x01, 0]);
        } else {
            // code 7 before any table entry exists
            out.extend_from_slice(&[2, 1, 0x07, 0]);
        }
    }
    out.push(0x3B);
    out
}

/// Poll until the live preload pass has reported back.
pub fn wait_for_preload(controller: &mut AnimatedImageController) -> LoadState {
    let deadline = Instant::now() + Duration::from_secs(10);
    while *controller.load_state() == LoadState::Loading {
        assert!(Instant::now() < deadline, "preload did not finish in time");
        controller.poll_preload();
        std::thread::sleep(Duration::from_millis(2));
    }
    controller.load_state().clone()
}

pub fn red_of(raster: &RgbaImage) -> u8 {
    raster.get_pixel(0, 0)[0]
}
