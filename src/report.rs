//! Batch events and per-video results.
//!
//! The batch loop never returns per-file failures; it narrates them through
//! a [`ClipObserver`]. The default observer forwards events to the [`log`]
//! facade. The binary installs one that prints plain lines to stdout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use stillclip::{ClipEvent, ClipObserver, ClipOptions, VideoClipper};
//!
//! #[derive(Default)]
//! struct CountFailures(AtomicUsize);
//!
//! impl ClipObserver for CountFailures {
//!     fn on_event(&self, event: &ClipEvent<'_>) {
//!         if let ClipEvent::Failed { .. } = event {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! let failures = Arc::new(CountFailures::default());
//! VideoClipper::new(ClipOptions::default())
//!     .with_observer(failures.clone())
//!     .process_directory("videos", "output_images", "output_videos")?;
//! println!("{} file(s) failed", failures.0.load(Ordering::Relaxed));
//! # Ok::<(), stillclip::ClipError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use crate::error::ClipError;

/// Something that happened during a batch run.
#[derive(Debug)]
#[non_exhaustive]
pub enum ClipEvent<'a> {
    /// A recognized video is about to be processed.
    Processing { path: &'a Path },
    /// A regular file without a recognized video extension was skipped.
    SkippedNonVideo { path: &'a Path },
    /// A directory (or other non-regular entry) was skipped.
    SkippedDirectory { path: &'a Path },
    /// The first frame of a video was written.
    StillSaved { path: &'a Path },
    /// A clip was finalized.
    ClipSaved { path: &'a Path, frames: u64 },
    /// Processing a video failed; the batch continues with the next entry.
    Failed {
        path: &'a Path,
        error: &'a ClipError,
    },
    /// Every entry has been visited.
    Complete,
}

impl Display for ClipEvent<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ClipEvent::Processing { path } => write!(f, "Processing video: {}", path.display()),
            ClipEvent::SkippedNonVideo { path } => {
                write!(f, "Skipping non-video file: {}", path.display())
            }
            ClipEvent::SkippedDirectory { path } => {
                write!(f, "Skipping directory: {}", path.display())
            }
            ClipEvent::StillSaved { path } => {
                write!(f, "First frame saved as: {}", path.display())
            }
            ClipEvent::ClipSaved { path, frames } => write!(
                f,
                "Clipped video saved as: {} ({frames} frames)",
                path.display()
            ),
            ClipEvent::Failed { error, .. } => write!(f, "Error processing video: {error}"),
            ClipEvent::Complete => write!(f, "Processing complete."),
        }
    }
}

/// Receives [`ClipEvent`]s as a batch progresses.
///
/// Observers are infallible: they watch the batch but cannot stop it.
pub trait ClipObserver: Send + Sync {
    /// Called once per event, on the thread running the batch.
    fn on_event(&self, event: &ClipEvent<'_>);
}

/// Forwards events to the `log` facade. Failures log at `warn`, the rest at
/// `info`. This is the default observer.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ClipObserver for LogObserver {
    fn on_event(&self, event: &ClipEvent<'_>) {
        match event {
            ClipEvent::Failed { path, .. } => log::warn!("{event} [{}]", path.display()),
            _ => log::info!("{event}"),
        }
    }
}

/// The artifacts produced for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipReport {
    /// The input video.
    pub source: PathBuf,
    /// The still image written from the first frame.
    pub still: PathBuf,
    /// The clipped video.
    pub clip: PathBuf,
    /// Frames encoded into the clip.
    pub frames_written: u64,
}
