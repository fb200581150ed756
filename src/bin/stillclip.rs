use std::{
    env,
    error::Error,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Parser;
use colored::Colorize;
use stillclip::{
    ClipEvent, ClipObserver, ClipOptions, DEFAULT_IMAGE_OUTPUT_DIR, DEFAULT_VIDEO_OUTPUT_DIR,
    FfmpegLogLevel, FourCc, VideoClipper,
};

const CODEC_ENV: &str = "STILLCLIP_CODEC";
const FFMPEG_LOG_ENV: &str = "STILLCLIP_FFMPEG_LOG";

const CLI_AFTER_HELP: &str = "Writes <name>.jpg into ./output_images and <name>.mp4 into ./output_videos.\n\nEnvironment:\n  STILLCLIP_CODEC       output fourcc (default mp4v)\n  STILLCLIP_FFMPEG_LOG  FFmpeg log level (default error)\n  RUST_LOG              diagnostic log filter (default warn)\n\nExamples:\n  stillclip videos/\n  STILLCLIP_CODEC=avc1 stillclip videos/";

#[derive(Debug, Parser)]
#[command(
    name = "stillclip",
    version,
    about = "Save the first frame and first four seconds of every video in a directory",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Directory containing the videos. Prompted for when omitted.
    input: Option<PathBuf>,
}

/// Prints batch events as plain lines on stdout.
struct TerminalObserver;

impl ClipObserver for TerminalObserver {
    fn on_event(&self, event: &ClipEvent<'_>) {
        let line = event.to_string();
        match event {
            ClipEvent::Failed { .. } => println!("{}", line.red()),
            ClipEvent::SkippedNonVideo { .. } | ClipEvent::SkippedDirectory { .. } => {
                println!("{}", line.dimmed())
            }
            ClipEvent::StillSaved { .. } | ClipEvent::ClipSaved { .. } => {
                println!("{}", line.green())
            }
            ClipEvent::Complete => println!("{}", line.bold()),
            _ => println!("{line}"),
        }
    }
}

fn parse_prompt_answer(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

fn prompt_for_directory() -> Result<PathBuf, Box<dyn Error>> {
    print!("Enter the path to the directory containing video files: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_prompt_answer(&line).ok_or_else(|| "no video directory given".into())
}

fn clip_options(codec: Option<&str>) -> Result<ClipOptions, Box<dyn Error>> {
    let mut options = ClipOptions::new();
    if let Some(codec) = codec {
        let fourcc = codec
            .parse::<FourCc>()
            .map_err(|error| format!("{CODEC_ENV}: {error}"))?;
        options = options.with_codec(fourcc);
    }
    Ok(options)
}

fn ffmpeg_log_level(value: Option<&str>) -> Result<FfmpegLogLevel, Box<dyn Error>> {
    match value {
        Some(value) => Ok(value
            .parse::<FfmpegLogLevel>()
            .map_err(|error| format!("{FFMPEG_LOG_ENV}: {error}"))?),
        None => Ok(FfmpegLogLevel::Error),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    stillclip::initialize()?;
    stillclip::set_ffmpeg_log_level(ffmpeg_log_level(env::var(FFMPEG_LOG_ENV).ok().as_deref())?);
    let options = clip_options(env::var(CODEC_ENV).ok().as_deref())?;

    let video_directory = match cli.input {
        Some(directory) => {
            println!(
                "Video directory provided as command-line argument: {}",
                directory.display()
            );
            directory
        }
        None => prompt_for_directory()?,
    };

    VideoClipper::new(options)
        .with_observer(Arc::new(TerminalObserver))
        .process_directory(
            &video_directory,
            Path::new(DEFAULT_IMAGE_OUTPUT_DIR),
            Path::new(DEFAULT_VIDEO_OUTPUT_DIR),
        )?;

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
