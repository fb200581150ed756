//! # stillclip
//!
//! Pull a still frame and a short opening clip out of every video in a
//! directory.
//!
//! For each file with a recognized video extension (`mp4`, `avi`, `mov`,
//! `wmv` by default), `stillclip` decodes the first frame to
//! `<image_dir>/<name>.jpg` and re-encodes the first four seconds to
//! `<video_dir>/<name>.mp4`, keeping the source dimensions and frame rate.
//! Decoding and encoding go through FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! ## Quick Start
//!
//! ```no_run
//! use stillclip::{ClipOptions, VideoClipper};
//!
//! let clipper = VideoClipper::new(ClipOptions::default());
//! clipper.process_directory("videos", "output_images", "output_videos")?;
//! # Ok::<(), stillclip::ClipError>(())
//! ```
//!
//! ### One file, with the outcome
//!
//! ```no_run
//! use stillclip::VideoClipper;
//!
//! let report = VideoClipper::default()
//!     .process_video("videos/a.mp4", "output_images", "output_videos")?;
//! println!("{} frames -> {}", report.frames_written, report.clip.display());
//! # Ok::<(), stillclip::ClipError>(())
//! ```
//!
//! ## Behavior
//!
//! - Files are processed one at a time, in file-name order.
//! - A file that fails (cannot be opened, has no decodable frame, reports
//!   a non-positive frame rate) is reported and skipped.
//! - A source shorter than the clip length produces a shorter clip.
//! - Outputs are named after the source, so reruns overwrite.
//!
//! The [`training`] module carries two unrelated helpers for training
//! loops: JSON parameter checkpoints and sample-grid logging.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system.

pub mod batch;
pub mod clip;
pub mod configuration;
mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod fourcc;
pub mod metadata;
pub mod reader;
pub mod report;
pub mod training;
pub mod writer;

pub use batch::VideoClipper;
pub use clip::{base_name, clip_frame_budget};
pub use configuration::{
    ClipOptions, DEFAULT_IMAGE_OUTPUT_DIR, DEFAULT_VIDEO_EXTENSIONS, DEFAULT_VIDEO_OUTPUT_DIR,
};
pub use conversion::frame_to_image;
pub use error::ClipError;
pub use ffmpeg::{FfmpegLogLevel, initialize, set_ffmpeg_log_level};
pub use fourcc::FourCc;
pub use metadata::VideoMetadata;
pub use reader::VideoReader;
pub use report::{ClipEvent, ClipObserver, ClipReport, LogObserver};
pub use writer::VideoWriter;
