//! Shared fixture helpers.
//!
//! Fixture videos are synthesized with [`VideoWriter`] instead of being
//! checked in. Tests that need one skip themselves when the platform's
//! FFmpeg build has no encoder for the default codec.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ffmpeg_next::Rational;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use stillclip::{ClipEvent, ClipObserver, ClipOptions, VideoReader, VideoWriter};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 48;

/// An RGB frame whose color depends on `index`.
pub fn solid_frame(width: u32, height: u32, index: u32) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let shade = ((index * 16) % 256) as u8;
    let stride = frame.stride(0);
    let data = frame.data_mut(0);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = y * stride + x * 3;
            data[offset] = shade;
            data[offset + 1] = 255 - shade;
            data[offset + 2] = 128;
        }
    }
    frame
}

/// Encode `frame_count` frames at `fps` into `path`.
///
/// Returns `false` (after printing why) when no encoder is available.
pub fn write_test_video(path: &Path, frame_count: u32, fps: i32) -> bool {
    write_test_video_at(path, frame_count, Rational::new(fps, 1))
}

/// Like [`write_test_video`], at an arbitrary rational frame rate.
pub fn write_test_video_at(path: &Path, frame_count: u32, frame_rate: Rational) -> bool {
    let options = ClipOptions::default();
    let mut writer = match VideoWriter::create(path, WIDTH, HEIGHT, frame_rate, &options) {
        Ok(writer) => writer,
        Err(error) => {
            eprintln!("Skipping: encoder not available ({error})");
            return false;
        }
    };
    for index in 0..frame_count {
        writer
            .write(&solid_frame(WIDTH, HEIGHT, index))
            .expect("Failed to encode fixture frame");
    }
    writer.finish().expect("Failed to finalize fixture video");
    true
}

/// Decode every frame of `path` and return the count.
pub fn count_frames(path: &Path) -> u64 {
    let mut reader = VideoReader::open(path).expect("Failed to open video");
    let mut count = 0;
    while reader.next_frame().expect("Failed to decode").is_some() {
        count += 1;
    }
    count
}

/// Sorted file names in `directory`.
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .expect("Failed to list directory")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// A scratch layout: `videos/`, `output_images/`, `output_videos/`.
pub struct Workspace {
    pub root: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(root.path().join("videos")).expect("Failed to create videos dir");
        Self { root }
    }

    pub fn videos(&self) -> PathBuf {
        self.root.path().join("videos")
    }

    pub fn images(&self) -> PathBuf {
        self.root.path().join("output_images")
    }

    pub fn clips(&self) -> PathBuf {
        self.root.path().join("output_videos")
    }
}

/// Records every event as its display line.
#[derive(Default)]
pub struct RecordingObserver {
    lines: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("observer lock poisoned").clone()
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

impl ClipObserver for RecordingObserver {
    fn on_event(&self, event: &ClipEvent<'_>) {
        self.lines
            .lock()
            .expect("observer lock poisoned")
            .push(event.to_string());
    }
}
