//! Batch configuration.
//!
//! [`ClipOptions`] is a builder carrying every knob of a run: output codec,
//! clip length, artifact extensions, which input extensions count as video,
//! and whether directory entries are sorted before processing.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use stillclip::{ClipOptions, FourCc};
//!
//! let options = ClipOptions::new()
//!     .with_codec("avc1".parse::<FourCc>()?)
//!     .with_clip_length(Duration::from_secs(2));
//! assert_eq!(options.clip_length, Duration::from_secs(2));
//! # Ok::<(), stillclip::ClipError>(())
//! ```

use std::path::Path;
use std::time::Duration;

use crate::fourcc::FourCc;

/// Directory the binary writes stills into, relative to the working directory.
pub const DEFAULT_IMAGE_OUTPUT_DIR: &str = "output_images";

/// Directory the binary writes clips into, relative to the working directory.
pub const DEFAULT_VIDEO_OUTPUT_DIR: &str = "output_videos";

/// Extensions treated as video when no override is configured.
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "wmv"];

/// Options for a clipping run.
#[derive(Debug, Clone)]
pub struct ClipOptions {
    /// Output video codec (default `mp4v`).
    pub codec: FourCc,
    /// How much of the source to keep (default 4 seconds).
    pub clip_length: Duration,
    /// Extension of the still image; also selects the image encoder.
    pub image_extension: String,
    /// Extension of the clip; also selects the output container.
    pub video_extension: String,
    /// Lower-case input extensions that are processed.
    pub video_extensions: Vec<String>,
    /// Process entries in file-name order instead of enumeration order.
    pub sort_entries: bool,
    /// Encoder bit rate in bits per second. `None` keeps the encoder default.
    pub bit_rate: Option<usize>,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self {
            codec: FourCc::default(),
            clip_length: Duration::from_secs(4),
            image_extension: "jpg".to_string(),
            video_extension: "mp4".to_string(),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            sort_entries: true,
            bit_rate: None,
        }
    }
}

impl ClipOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output codec.
    pub fn with_codec(mut self, codec: FourCc) -> Self {
        self.codec = codec;
        self
    }

    /// Set how much of each source to keep.
    pub fn with_clip_length(mut self, clip_length: Duration) -> Self {
        self.clip_length = clip_length;
        self
    }

    /// Set the still image extension (`jpg`, `png`, ...).
    pub fn with_image_extension(mut self, extension: impl Into<String>) -> Self {
        self.image_extension = extension.into();
        self
    }

    /// Set the clip container extension (`mp4`, `mkv`, `avi`, ...).
    pub fn with_video_extension(mut self, extension: impl Into<String>) -> Self {
        self.video_extension = extension.into();
        self
    }

    /// Replace the set of recognized input extensions. Leading dots are
    /// stripped and matching is case-insensitive.
    pub fn with_video_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.video_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Toggle sorting of directory entries.
    pub fn with_sorted_entries(mut self, sort_entries: bool) -> Self {
        self.sort_entries = sort_entries;
        self
    }

    /// Set the encoder bit rate.
    pub fn with_bit_rate(mut self, bit_rate: usize) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    /// Whether `path` carries one of the recognized video extensions.
    pub fn is_recognized_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.video_extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}
