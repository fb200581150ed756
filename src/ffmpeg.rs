//! FFmpeg initialization and log level control.
//!
//! FFmpeg prints its own diagnostics to stderr, independent of the Rust
//! [`log`] facade. A batch over a folder of odd containers can be very noisy,
//! so the binary lowers FFmpeg's level to `error` unless told otherwise.

use std::str::FromStr;
use std::sync::OnceLock;

use ffmpeg_next::util::log::Level;

use crate::error::ClipError;

/// FFmpeg internal log verbosity level.
///
/// Maps directly to FFmpeg's `AV_LOG_*` constants, from `Quiet` (nothing)
/// up to `Trace` (everything).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(format!("unsupported FFmpeg log level: {other}")),
        }
    }
}

/// Set FFmpeg's own log verbosity. Does not affect the `log` facade.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

static INITIALIZED: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize FFmpeg once per process.
///
/// Called by [`VideoReader::open`](crate::VideoReader::open) and
/// [`VideoWriter::create`](crate::VideoWriter::create); safe to call
/// repeatedly.
pub fn initialize() -> Result<(), ClipError> {
    INITIALIZED
        .get_or_init(|| {
            log::debug!("Initializing FFmpeg");
            ffmpeg_next::init().map_err(|error| error.to_string())
        })
        .clone()
        .map_err(ClipError::Ffmpeg)
}
