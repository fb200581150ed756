//! Four-character codec codes.
//!
//! The output codec is chosen by a fourcc such as `mp4v` or `avc1`, the way
//! most capture and editing tools name codecs. [`FourCc::codec_id`] resolves
//! the code to an FFmpeg encoder id, first through a table of common codes
//! and then through FFmpeg's own RIFF and QuickTime tag tables.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ptr;
use std::str::FromStr;

use ffmpeg_next::codec::Id;

use crate::error::ClipError;

/// A validated four-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// MPEG-4 Part 2, playable from an `.mp4` container almost everywhere.
    pub const MP4V: FourCc = FourCc(*b"mp4v");

    /// Build a code from raw bytes. Every byte must be printable ASCII.
    pub fn new(bytes: [u8; 4]) -> Result<Self, ClipError> {
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            Ok(FourCc(bytes))
        } else {
            Err(ClipError::InvalidFourCc(format!("{bytes:?}")))
        }
    }

    /// The code packed little-endian, as FFmpeg's `MKTAG` does.
    pub fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Resolve to an FFmpeg codec id.
    ///
    /// # Errors
    ///
    /// [`ClipError::InvalidFourCc`] if no codec is registered under the code.
    pub fn codec_id(self) -> Result<Id, ClipError> {
        let lower = self.0.map(|b| b.to_ascii_lowercase());
        let known = match &lower {
            b"mp4v" | b"fmp4" | b"xvid" | b"divx" | b"dx50" | b"mp4s" => Some(Id::MPEG4),
            b"avc1" | b"avc3" | b"h264" | b"x264" => Some(Id::H264),
            b"hvc1" | b"hev1" | b"h265" | b"x265" | b"hevc" => Some(Id::HEVC),
            b"mjpg" | b"jpeg" => Some(Id::MJPEG),
            b"vp80" => Some(Id::VP8),
            b"vp90" | b"vp09" => Some(Id::VP9),
            b"av01" => Some(Id::AV1),
            b"mpg1" => Some(Id::MPEG1VIDEO),
            b"mpg2" => Some(Id::MPEG2VIDEO),
            b"wmv1" => Some(Id::WMV1),
            b"wmv2" => Some(Id::WMV2),
            _ => None,
        };
        if let Some(id) = known {
            return Ok(id);
        }

        let id = lookup_in_tag_tables(self.as_u32());
        if id == Id::None {
            return Err(ClipError::InvalidFourCc(format!(
                "no codec registered for '{self}'"
            )));
        }
        Ok(id)
    }
}

fn lookup_in_tag_tables(tag: u32) -> Id {
    // SAFETY: both tables are static, NUL-terminated arrays owned by
    // libavformat; the outer array is terminated by a null pointer.
    let raw = unsafe {
        let tables = [
            ffmpeg_sys_next::avformat_get_riff_video_tags(),
            ffmpeg_sys_next::avformat_get_mov_video_tags(),
            ptr::null(),
        ];
        ffmpeg_sys_next::av_codec_get_id(tables.as_ptr(), tag)
    };
    Id::from(raw)
}

impl Default for FourCc {
    fn default() -> Self {
        FourCc::MP4V
    }
}

impl FromStr for FourCc {
    type Err = ClipError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| ClipError::InvalidFourCc(format!("'{value}' is not four characters")))?;
        FourCc::new(bytes)
    }
}

impl Display for FourCc {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for byte in self.0 {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}
