//! The per-video step: one still, one short clip.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::configuration::ClipOptions;
use crate::conversion::frame_to_image;
use crate::error::ClipError;
use crate::reader::VideoReader;
use crate::report::{ClipEvent, ClipObserver, ClipReport};
use crate::writer::VideoWriter;

/// Number of source frames that fit in `clip_length` at the given rate,
/// rounded down.
pub fn clip_frame_budget(frames_per_second: f64, clip_length: Duration) -> u64 {
    if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
        return 0;
    }
    (clip_length.as_secs_f64() * frames_per_second).floor() as u64
}

/// File name without directory or extension. Falls back to `"video"` for
/// paths with no usable stem.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

fn checked_frame_rate(path: &Path, frames_per_second: f64) -> Result<f64, ClipError> {
    if frames_per_second.is_finite() && frames_per_second > 0.0 {
        Ok(frames_per_second)
    } else {
        Err(ClipError::InvalidFrameRate {
            path: path.to_path_buf(),
            frames_per_second,
        })
    }
}

pub(crate) fn output_path(directory: &Path, base: &str, extension: &str) -> PathBuf {
    directory.join(format!("{base}.{extension}"))
}

// A path that does not exist yet cannot be the source.
fn is_same_file(first: &Path, second: &Path) -> bool {
    match (fs::canonicalize(first), fs::canonicalize(second)) {
        (Ok(first), Ok(second)) => first == second,
        _ => false,
    }
}

/// Write the first frame of `video_path` as a still into `image_dir` and
/// the opening `options.clip_length` as a clip into `video_dir`.
///
/// The still is written before the frame rate is checked, so a video with
/// an unusable rate keeps its still and gets no clip. A clip path that
/// resolves to the source itself is refused before anything is written.
pub(crate) fn process_video(
    video_path: &Path,
    image_dir: &Path,
    video_dir: &Path,
    options: &ClipOptions,
    observer: &dyn ClipObserver,
) -> Result<ClipReport, ClipError> {
    let base = base_name(video_path);
    let clip = output_path(video_dir, &base, &options.video_extension);
    if is_same_file(&clip, video_path) {
        return Err(ClipError::Open {
            path: clip,
            reason: "the clip would overwrite its source".to_string(),
        });
    }

    let mut reader = VideoReader::open(video_path)?;
    let still = save_still(&mut reader, image_dir, &base, options, observer)?;

    let frames_per_second = reader.metadata().frames_per_second;
    let (clip, frames_written) =
        write_clip(&mut reader, frames_per_second, clip, options, observer)?;

    Ok(ClipReport {
        source: video_path.to_path_buf(),
        still,
        clip,
        frames_written,
    })
}

fn save_still(
    reader: &mut VideoReader,
    image_dir: &Path,
    base: &str,
    options: &ClipOptions,
    observer: &dyn ClipObserver,
) -> Result<PathBuf, ClipError> {
    let first_frame = reader.next_frame()?.ok_or_else(|| ClipError::Read {
        path: reader.path().to_path_buf(),
    })?;

    let still = output_path(image_dir, base, &options.image_extension);
    frame_to_image(&first_frame)?.save(&still)?;
    observer.on_event(&ClipEvent::StillSaved { path: &still });
    Ok(still)
}

// Expects `reader` past its first frame; rewinds before encoding.
fn write_clip(
    reader: &mut VideoReader,
    frames_per_second: f64,
    clip: PathBuf,
    options: &ClipOptions,
    observer: &dyn ClipObserver,
) -> Result<(PathBuf, u64), ClipError> {
    let frames_per_second = checked_frame_rate(reader.path(), frames_per_second)?;
    let keep_count = clip_frame_budget(frames_per_second, options.clip_length);
    log::debug!(
        "Keeping up to {keep_count} frame(s) of {} ({frames_per_second:.3} fps)",
        reader.path().display(),
    );

    // The first read advanced the stream; the clip starts from frame 0 again.
    reader.rewind()?;

    let metadata = reader.metadata().clone();
    let mut writer = VideoWriter::create(
        &clip,
        metadata.width,
        metadata.height,
        metadata.frame_rate,
        options,
    )?;

    while writer.frames_written() < keep_count {
        match reader.next_frame()? {
            Some(frame) => writer.write(&frame)?,
            None => break,
        }
    }

    let frames_written = writer.finish()?;
    observer.on_event(&ClipEvent::ClipSaved {
        path: &clip,
        frames: frames_written,
    });
    Ok((clip, frames_written))
}
