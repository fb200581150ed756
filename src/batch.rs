//! Directory-level batch processing.
//!
//! [`VideoClipper`] walks one directory, skips everything that is not a
//! recognized video, and runs the per-video step on the rest. Per-video
//! failures are reported to the observer and never stop the batch.
//!
//! # Example
//!
//! ```no_run
//! use stillclip::{ClipOptions, VideoClipper};
//!
//! VideoClipper::new(ClipOptions::default())
//!     .process_directory("videos", "output_images", "output_videos")?;
//! # Ok::<(), stillclip::ClipError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::clip;
use crate::configuration::ClipOptions;
use crate::error::ClipError;
use crate::report::{ClipEvent, ClipObserver, ClipReport, LogObserver};

/// Runs the still-and-clip step over single files or whole directories.
#[derive(Clone)]
pub struct VideoClipper {
    options: ClipOptions,
    observer: Arc<dyn ClipObserver>,
}

impl Debug for VideoClipper {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoClipper")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for VideoClipper {
    fn default() -> Self {
        Self::new(ClipOptions::default())
    }
}

impl VideoClipper {
    /// Create a clipper that reports through [`LogObserver`].
    pub fn new(options: ClipOptions) -> Self {
        Self {
            options,
            observer: Arc::new(LogObserver),
        }
    }

    /// Replace the event observer.
    pub fn with_observer(mut self, observer: Arc<dyn ClipObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The options this clipper runs with.
    pub fn options(&self) -> &ClipOptions {
        &self.options
    }

    /// Produce the still and the clip for one video.
    ///
    /// Both output directories must already exist. Errors are returned to
    /// the caller; use this directly to collect per-file outcomes.
    ///
    /// # Errors
    ///
    /// - [`ClipError::Open`] if the video or the clip output cannot be opened,
    ///   or if the clip would be written over the video itself.
    /// - [`ClipError::Read`] if no frame can be decoded.
    /// - [`ClipError::InvalidFrameRate`] if the source rate is not positive;
    ///   the still has already been written at that point.
    pub fn process_video<V, I, O>(
        &self,
        video_path: V,
        image_dir: I,
        video_dir: O,
    ) -> Result<ClipReport, ClipError>
    where
        V: AsRef<Path>,
        I: AsRef<Path>,
        O: AsRef<Path>,
    {
        clip::process_video(
            video_path.as_ref(),
            image_dir.as_ref(),
            video_dir.as_ref(),
            &self.options,
            self.observer.as_ref(),
        )
    }

    /// Process every recognized video in `video_dir`.
    ///
    /// Creates both output directories when missing, leaving existing ones
    /// (and anything inside them) untouched. Per-video failures are
    /// reported as [`ClipEvent::Failed`] and the batch moves on.
    ///
    /// # Errors
    ///
    /// [`ClipError::Directory`] if an output directory cannot be created or
    /// the input directory cannot be listed.
    pub fn process_directory<V, I, O>(
        &self,
        video_dir: V,
        image_dir: I,
        clip_dir: O,
    ) -> Result<(), ClipError>
    where
        V: AsRef<Path>,
        I: AsRef<Path>,
        O: AsRef<Path>,
    {
        let video_dir = video_dir.as_ref();
        let image_dir = image_dir.as_ref();
        let clip_dir = clip_dir.as_ref();

        create_output_dir(image_dir)?;
        create_output_dir(clip_dir)?;

        let entries = self.list_entries(video_dir)?;
        log::debug!("{} entries in {}", entries.len(), video_dir.display());

        for path in &entries {
            if !path.is_file() {
                self.observer
                    .on_event(&ClipEvent::SkippedDirectory { path });
                continue;
            }
            if !self.options.is_recognized_video(path) {
                self.observer.on_event(&ClipEvent::SkippedNonVideo { path });
                continue;
            }

            self.observer.on_event(&ClipEvent::Processing { path });
            if let Err(error) = self.process_video(path, image_dir, clip_dir) {
                self.observer.on_event(&ClipEvent::Failed {
                    path,
                    error: &error,
                });
            }
        }

        self.observer.on_event(&ClipEvent::Complete);
        Ok(())
    }

    fn list_entries(&self, video_dir: &Path) -> Result<Vec<PathBuf>, ClipError> {
        let directory_error = |source| ClipError::Directory {
            path: video_dir.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(video_dir)
            .map_err(directory_error)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(directory_error)?;

        if self.options.sort_entries {
            entries.sort();
        }
        Ok(entries)
    }
}

fn create_output_dir(path: &Path) -> Result<(), ClipError> {
    fs::create_dir_all(path).map_err(|source| ClipError::Directory {
        path: path.to_path_buf(),
        source,
    })
}
