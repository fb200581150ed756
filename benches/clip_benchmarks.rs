//! Benchmarks for the per-video step.
//!
//! Run with: cargo bench
//!
//! The source video is synthesized into a temporary directory first, so no
//! fixtures are needed.

use std::fs;
use std::path::Path;

use criterion::Criterion;
use ffmpeg_next::Rational;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use stillclip::{ClipOptions, FfmpegLogLevel, VideoClipper, VideoReader, VideoWriter};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn gradient_frame(index: u32) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::RGB24, WIDTH, HEIGHT);
    let stride = frame.stride(0);
    let data = frame.data_mut(0);
    for y in 0..HEIGHT as usize {
        for x in 0..WIDTH as usize {
            let offset = y * stride + x * 3;
            data[offset] = (x as u32 + index) as u8;
            data[offset + 1] = y as u8;
            data[offset + 2] = index as u8;
        }
    }
    frame
}

fn write_source(path: &Path) -> bool {
    let Ok(mut writer) =
        VideoWriter::create(path, WIDTH, HEIGHT, Rational::new(30, 1), &ClipOptions::default())
    else {
        eprintln!("Skipping benchmarks: encoder not available");
        return false;
    };
    for index in 0..180 {
        if writer.write(&gradient_frame(index)).is_err() {
            return false;
        }
    }
    writer.finish().is_ok()
}

fn benchmark_process_video(criterion: &mut Criterion, output: &Path, source: &Path) {
    let clipper = VideoClipper::default();
    criterion.bench_function("process_video (6s @ 30fps source)", |bencher| {
        bencher.iter(|| {
            clipper
                .process_video(source, output, output)
                .expect("process_video");
        });
    });
}

fn benchmark_sequential_decode(criterion: &mut Criterion, source: &Path) {
    criterion.bench_function("decode all frames", |bencher| {
        bencher.iter(|| {
            let mut reader = VideoReader::open(source).expect("open");
            let mut count = 0_u32;
            while reader.next_frame().expect("decode").is_some() {
                count += 1;
            }
            count
        });
    });
}

fn main() {
    stillclip::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let Ok(workspace) = tempfile::tempdir() else {
        return;
    };
    let source = workspace.path().join("source.mp4");
    if !write_source(&source) {
        return;
    }
    // Outputs are named after the source and must not land on top of it.
    let output = workspace.path().join("output");
    if fs::create_dir(&output).is_err() {
        return;
    }

    let mut criterion = Criterion::default().sample_size(10).configure_from_args();
    benchmark_process_video(&mut criterion, &output, &source);
    benchmark_sequential_decode(&mut criterion, &source);
    criterion.final_summary();
}
