//! Sequential video encoding.
//!
//! [`VideoWriter`] appends decoded frames of any pixel format to a new
//! video file. The container is chosen from the output extension and the
//! codec from [`ClipOptions::codec`].
//!
//! # Example
//!
//! ```no_run
//! use stillclip::{ClipOptions, VideoReader, VideoWriter};
//!
//! let mut reader = VideoReader::open("input.mp4")?;
//! let metadata = reader.metadata().clone();
//! let mut writer = VideoWriter::create(
//!     "copy.mp4",
//!     metadata.width,
//!     metadata.height,
//!     metadata.frame_rate,
//!     &ClipOptions::default(),
//! )?;
//! while let Some(frame) = reader.next_frame()? {
//!     writer.write(&frame)?;
//! }
//! let written = writer.finish()?;
//! # Ok::<(), stillclip::ClipError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use ffmpeg_next::codec::Flags as CodecFlags;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};

use crate::configuration::ClipOptions;
use crate::error::ClipError;

// Every codec reachable through the fourcc table accepts planar 4:2:0.
const ENCODER_PIXEL_FORMAT: Pixel = Pixel::YUV420P;

// MPEG-4 Part 2 rejects time bases with a term above 2^16 - 1.
const MAX_TIME_BASE_TERM: i64 = 65_535;

/// Closest rational to `frame_rate` whose terms both fit in
/// [`MAX_TIME_BASE_TERM`].
///
/// Variable-rate sources often report averages such as `2700000/90061`,
/// which some encoders refuse as a time base.
pub(crate) fn encoder_frame_rate(frame_rate: Rational) -> Rational {
    let mut numerator: i32 = 0;
    let mut denominator: i32 = 1;
    // SAFETY: av_reduce only writes the two output integers.
    unsafe {
        ffmpeg_sys_next::av_reduce(
            &mut numerator,
            &mut denominator,
            i64::from(frame_rate.numerator()),
            i64::from(frame_rate.denominator()),
            MAX_TIME_BASE_TERM,
        );
    }
    Rational::new(numerator, denominator)
}

struct FrameScaler {
    source_format: Pixel,
    source_width: u32,
    source_height: u32,
    context: ScalingContext,
}

/// A sequential encoder writing one video file.
///
/// Call [`finish`](VideoWriter::finish) to flush the encoder and write the
/// container trailer. A writer dropped without `finish` (for instance on an
/// early `?` return) does the same on a best-effort basis, so the file it
/// leaves behind is still a closed, playable container.
pub struct VideoWriter {
    path: PathBuf,
    output: Output,
    encoder: OpenedVideoEncoder,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    scaler: Option<FrameScaler>,
    frames_written: u64,
    finished: bool,
}

impl Debug for VideoWriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoWriter")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frames_written", &self.frames_written)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl VideoWriter {
    /// Create the output file and open an encoder for it.
    ///
    /// # Errors
    ///
    /// [`ClipError::Open`] if the container or codec is unavailable, the
    /// dimensions or frame rate are unusable, or the header cannot be
    /// written.
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        frame_rate: Rational,
        options: &ClipOptions,
    ) -> Result<Self, ClipError> {
        let path = path.as_ref();
        let open_error = |reason: String| ClipError::Open {
            path: path.to_path_buf(),
            reason,
        };

        crate::ffmpeg::initialize().map_err(|error| open_error(error.to_string()))?;

        if width == 0 || height == 0 {
            return Err(open_error(format!("invalid dimensions {width}x{height}")));
        }
        let invalid_rate = || {
            open_error(format!(
                "invalid frame rate {}/{}",
                frame_rate.numerator(),
                frame_rate.denominator()
            ))
        };
        if frame_rate.numerator() <= 0 || frame_rate.denominator() <= 0 {
            return Err(invalid_rate());
        }
        let frame_rate = encoder_frame_rate(frame_rate);
        if frame_rate.numerator() <= 0 || frame_rate.denominator() <= 0 {
            return Err(invalid_rate());
        }

        log::debug!(
            "Creating {} ({}x{} @ {}/{} fps, codec={})",
            path.display(),
            width,
            height,
            frame_rate.numerator(),
            frame_rate.denominator(),
            options.codec,
        );

        let codec_id = options
            .codec
            .codec_id()
            .map_err(|error| open_error(error.to_string()))?;
        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            open_error(format!(
                "no encoder available for '{}' ({codec_id:?})",
                options.codec
            ))
        })?;

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|error| open_error(format!("cannot open output: {error}")))?;

        // Read before add_stream takes a mutable borrow of the context.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let encoder_time_base = frame_rate.invert();

        let mut encoder = CodecContext::new_with_codec(encoder_codec)
            .encoder()
            .video()
            .map_err(|error| open_error(format!("cannot create video encoder: {error}")))?;
        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(ENCODER_PIXEL_FORMAT);
        encoder.set_time_base(encoder_time_base);
        encoder.set_frame_rate(Some(frame_rate));
        if let Some(bit_rate) = options.bit_rate {
            encoder.set_bit_rate(bit_rate);
        }
        if needs_global_header {
            encoder.set_flags(CodecFlags::GLOBAL_HEADER);
        }

        let encoder = encoder
            .open_as(encoder_codec)
            .map_err(|error| open_error(format!("cannot open encoder: {error}")))?;

        let stream_index = {
            let mut stream = output
                .add_stream(encoder_codec)
                .map_err(|error| open_error(format!("cannot add stream: {error}")))?;
            stream.set_parameters(&encoder);
            stream.set_time_base(encoder_time_base);
            stream.index()
        };

        output
            .write_header()
            .map_err(|error| open_error(format!("cannot write header: {error}")))?;

        // The muxer may have picked its own time base while writing the header.
        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| open_error("output stream disappeared".to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            output,
            encoder,
            stream_index,
            encoder_time_base,
            stream_time_base,
            width,
            height,
            scaler: None,
            frames_written: 0,
            finished: false,
        })
    }

    /// The output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames accepted so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Encode one frame.
    ///
    /// The frame is converted to the encoder's pixel format and scaled to
    /// the output dimensions when they differ.
    pub fn write(&mut self, frame: &VideoFrame) -> Result<(), ClipError> {
        let pts = self.frames_written as i64;

        let mut converted = VideoFrame::empty();
        self.scaler_for(frame)?
            .run(frame, &mut converted)
            .map_err(|error| ClipError::Encode(format!("scaling failed: {error}")))?;
        converted.set_pts(Some(pts));

        self.encoder
            .send_frame(&converted)
            .map_err(|error| ClipError::Encode(format!("send_frame failed: {error}")))?;
        self.write_pending_packets()?;

        self.frames_written += 1;
        Ok(())
    }

    /// Flush the encoder, write the trailer, and return the frame count.
    pub fn finish(mut self) -> Result<u64, ClipError> {
        self.finalize()?;
        log::info!(
            "Wrote {} frame(s) to {}",
            self.frames_written,
            self.path.display()
        );
        Ok(self.frames_written)
    }

    fn scaler_for(&mut self, frame: &VideoFrame) -> Result<&mut ScalingContext, ClipError> {
        let matches = self.scaler.as_ref().is_some_and(|scaler| {
            scaler.source_format == frame.format()
                && scaler.source_width == frame.width()
                && scaler.source_height == frame.height()
        });

        if !matches {
            let context = ScalingContext::get(
                frame.format(),
                frame.width(),
                frame.height(),
                ENCODER_PIXEL_FORMAT,
                self.width,
                self.height,
                ScalingFlags::BILINEAR,
            )
            .map_err(|error| ClipError::Encode(format!("cannot create scaler: {error}")))?;
            self.scaler = Some(FrameScaler {
                source_format: frame.format(),
                source_width: frame.width(),
                source_height: frame.height(),
                context,
            });
        }

        self.scaler
            .as_mut()
            .map(|scaler| &mut scaler.context)
            .ok_or_else(|| ClipError::Encode("scaler unavailable".to_string()))
    }

    fn write_pending_packets(&mut self) -> Result<(), ClipError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            // One frame per tick of the encoder time base.
            if packet.duration() == 0 {
                packet.set_duration(1);
            }
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|error| ClipError::Encode(format!("write packet failed: {error}")))?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ClipError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        self.encoder
            .send_eof()
            .map_err(|error| ClipError::Encode(format!("send_eof failed: {error}")))?;
        self.write_pending_packets()?;
        self.output
            .write_trailer()
            .map_err(|error| ClipError::Encode(format!("cannot write trailer: {error}")))?;
        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if let Err(error) = self.finalize() {
            log::warn!("Could not finalize {}: {error}", self.path.display());
        }
    }
}
