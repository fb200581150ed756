//! Sequential video decoding.
//!
//! [`VideoReader`] owns an FFmpeg demuxer and a decoder for the file's best
//! video stream. Frames come out in presentation order through
//! [`next_frame`](VideoReader::next_frame); the only random access is
//! [`rewind`](VideoReader::rewind), which returns to the first frame.
//!
//! # Example
//!
//! ```no_run
//! use stillclip::VideoReader;
//!
//! let mut reader = VideoReader::open("input.mp4")?;
//! let mut count = 0;
//! while reader.next_frame()?.is_some() {
//!     count += 1;
//! }
//! println!("{count} frames at {} fps", reader.metadata().frames_per_second);
//! # Ok::<(), stillclip::ClipError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
};

use crate::error::ClipError;
use crate::metadata::{VideoMetadata, rational_to_fps};

/// Demux errors in a row after which the stream is treated as ended.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// A sequential decoder over one video file.
///
/// Dropping the reader closes the file and frees the decoder.
pub struct VideoReader {
    path: PathBuf,
    input_context: Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    metadata: VideoMetadata,
    eof_sent: bool,
    read_errors: u32,
}

impl Debug for VideoReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoReader")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .field("eof_sent", &self.eof_sent)
            .finish_non_exhaustive()
    }
}

impl VideoReader {
    /// Open a video file for sequential decoding.
    ///
    /// # Errors
    ///
    /// [`ClipError::Open`] if FFmpeg cannot open the file, the file has no
    /// video stream, or no decoder exists for it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClipError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video: {}", path.display());

        crate::ffmpeg::initialize().map_err(|error| ClipError::Open {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        let opened = open_stream(&path)?;
        log::debug!(
            "{}: {}x{} @ {:.3} fps, ~{} frames [{}]",
            path.display(),
            opened.metadata.width,
            opened.metadata.height,
            opened.metadata.frames_per_second,
            opened.metadata.frame_count,
            opened.metadata.codec,
        );

        Ok(Self {
            path,
            input_context: opened.input_context,
            decoder: opened.decoder,
            video_stream_index: opened.video_stream_index,
            metadata: opened.metadata,
            eof_sent: false,
            read_errors: 0,
        })
    }

    /// Metadata of the selected video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// The path this reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the next frame in presentation order.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. Packets the decoder
    /// rejects are skipped, so a partly corrupt file yields the frames that
    /// can still be decoded.
    pub fn next_frame(&mut self) -> Result<Option<VideoFrame>, ClipError> {
        let mut frame = VideoFrame::empty();

        loop {
            if self.decoder.receive_frame(&mut frame).is_ok() {
                return Ok(Some(frame));
            }

            if self.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    self.read_errors = 0;
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        log::debug!(
                            "Skipping undecodable packet in {}: {error}",
                            self.path.display(),
                        );
                    }
                }
                Err(FfmpegError::Eof) => self.drain()?,
                Err(error) => {
                    self.read_errors += 1;
                    if self.read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        log::warn!(
                            "Giving up on {} after {} read errors (last: {error})",
                            self.path.display(),
                            self.read_errors,
                        );
                        self.drain()?;
                    }
                }
            }
        }
    }

    /// Reposition the reader on the first frame.
    ///
    /// Seeks to timestamp zero and flushes the decoder. Containers that
    /// refuse the seek are reopened instead.
    pub fn rewind(&mut self) -> Result<(), ClipError> {
        match self.input_context.seek(0, ..0) {
            Ok(()) => self.decoder.flush(),
            Err(error) => {
                log::debug!(
                    "Seek to start failed for {} ({error}); reopening",
                    self.path.display(),
                );
                let reopened = open_stream(&self.path)?;
                self.input_context = reopened.input_context;
                self.decoder = reopened.decoder;
                self.video_stream_index = reopened.video_stream_index;
            }
        }
        self.eof_sent = false;
        self.read_errors = 0;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), ClipError> {
        self.decoder.send_eof()?;
        self.eof_sent = true;
        Ok(())
    }
}

struct OpenedStream {
    input_context: Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    metadata: VideoMetadata,
}

fn open_stream(path: &Path) -> Result<OpenedStream, ClipError> {
    let open_error = |reason: String| ClipError::Open {
        path: path.to_path_buf(),
        reason,
    };

    let input_context =
        ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

    let duration_microseconds = input_context.duration();
    let duration = if duration_microseconds > 0 {
        Duration::from_micros(duration_microseconds as u64)
    } else {
        Duration::ZERO
    };

    let (video_stream_index, decoder, frame_rate, stream_frames) = {
        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| open_error("no video stream found".to_string()))?;

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("cannot read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("cannot create video decoder: {error}")))?;

        // Prefer the average rate; some containers only fill in the base rate.
        let average = stream.avg_frame_rate();
        let frame_rate = if rational_to_fps(average) > 0.0 {
            average
        } else {
            stream.rate()
        };

        (stream.index(), decoder, frame_rate, stream.frames())
    };

    let frames_per_second = rational_to_fps(frame_rate);
    let frame_count = if stream_frames > 0 {
        stream_frames as u64
    } else if frames_per_second > 0.0 {
        (duration.as_secs_f64() * frames_per_second) as u64
    } else {
        0
    };

    let codec = decoder
        .codec()
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let metadata = VideoMetadata {
        width: decoder.width(),
        height: decoder.height(),
        frames_per_second,
        frame_rate,
        frame_count,
        codec,
    };

    Ok(OpenedStream {
        input_context,
        decoder,
        video_stream_index,
        metadata,
    })
}
