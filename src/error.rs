//! Error types for the `stillclip` crate.
//!
//! [`ClipError`] is returned by every fallible operation. The batch loop in
//! [`VideoClipper::process_directory`](crate::VideoClipper::process_directory)
//! catches per-video errors and only reports their message, so the variants
//! mostly exist to produce readable, path-carrying diagnostics.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `stillclip` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClipError {
    /// A decoder or encoder could not be initialized for a path.
    #[error("Could not open video file {path}: {reason}")]
    Open {
        /// Input video or output clip path.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The video opened but no frame could be decoded from it.
    #[error("Could not read the first frame from video: {path}")]
    Read {
        /// Path of the video that yielded no frame.
        path: PathBuf,
    },

    /// The container reports a zero, negative, or non-finite frame rate.
    #[error("Invalid FPS: {frames_per_second}. Could not clip video {path}")]
    InvalidFrameRate {
        /// Path of the offending video.
        path: PathBuf,
        /// The rate the container reported.
        frames_per_second: f64,
    },

    /// The input directory could not be listed, or an output directory
    /// could not be created.
    #[error("Could not access directory {path}: {source}")]
    Directory {
        /// The directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: IoError,
    },

    /// Encoding a frame or finalizing the output container failed.
    #[error("Video encoding error: {0}")]
    Encode(String),

    /// A four-character codec code was malformed or names no known codec.
    #[error("Invalid fourcc: {0}")]
    InvalidFourCc(String),

    /// A parameter checkpoint could not be serialized.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Image batches passed to the grid builder were empty or mismatched.
    #[error("Invalid image grid: {0}")]
    InvalidGrid(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while writing a still.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for ClipError {
    fn from(error: FfmpegError) -> Self {
        ClipError::Ffmpeg(error.to_string())
    }
}
