//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoReader`](crate::VideoReader)
//! opens a file and cached for the reader's lifetime.

use ffmpeg_next::Rational;

/// Metadata for the selected video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second. `0.0` when the container reports no usable rate.
    pub frames_per_second: f64,
    /// The exact rate as reported, used to configure the output encoder.
    pub frame_rate: Rational,
    /// Estimated total number of frames, from container duration and rate.
    pub frame_count: u64,
    /// Decoder name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
}

/// Convert a rational rate to frames per second, `0.0` for a zero denominator.
pub(crate) fn rational_to_fps(rate: Rational) -> f64 {
    if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    }
}
