//! Decoded frame to image conversion.
//!
//! FFmpeg frames arrive in the decoder's native pixel format (usually a YUV
//! variant) with per-row padding. Stills are written through the `image`
//! crate, so frames are scaled to packed RGB24 first.

use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use image::{DynamicImage, RgbImage};

use crate::error::ClipError;

/// Convert a decoded frame of any pixel format into an RGB image of the
/// same dimensions.
pub fn frame_to_image(frame: &VideoFrame) -> Result<DynamicImage, ClipError> {
    let width = frame.width();
    let height = frame.height();

    let mut scaler = ScalingContext::get(
        frame.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;
    let mut rgb_frame = VideoFrame::empty();
    scaler.run(frame, &mut rgb_frame)?;

    let buffer = packed_rgb_buffer(&rgb_frame, width, height);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ClipError::Ffmpeg("decoded frame data does not match its dimensions".to_string())
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}

/// Copy an RGB24 frame into a tightly packed buffer, dropping row padding.
fn packed_rgb_buffer(rgb_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    strip_row_padding(
        rgb_frame.data(0),
        rgb_frame.stride(0),
        width as usize * 3,
        height as usize,
    )
}

fn strip_row_padding(data: &[u8], stride: usize, row_len: usize, rows: usize) -> Vec<u8> {
    if stride == row_len {
        return data[..row_len * rows].to_vec();
    }
    let mut buffer = Vec::with_capacity(row_len * rows);
    for row in 0..rows {
        let start = row * stride;
        buffer.extend_from_slice(&data[start..start + row_len]);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::strip_row_padding;

    #[test]
    fn unpadded_rows_are_copied_whole() {
        let data = [1, 2, 3, 4, 5, 6];
        assert_eq!(strip_row_padding(&data, 3, 3, 2), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn padding_is_dropped() {
        let data = [1, 2, 3, 0, 4, 5, 6, 0];
        assert_eq!(strip_row_padding(&data, 4, 3, 2), vec![1, 2, 3, 4, 5, 6]);
    }
}
