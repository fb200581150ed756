//! Video writer integration tests.

mod common;

use std::path::Path;

use common::{
    HEIGHT, WIDTH, count_frames, solid_frame, write_test_video, write_test_video_at,
};
use ffmpeg_next::Rational;
use stillclip::{ClipError, ClipOptions, FourCc, VideoReader, VideoWriter};

#[test]
fn write_frames_to_mp4() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("out.mp4");
    if !write_test_video(&output, 8, 8) {
        return;
    }

    assert!(std::fs::metadata(&output).unwrap().len() > 0);
    assert_eq!(count_frames(&output), 8);

    let reader = VideoReader::open(&output).unwrap();
    assert_eq!(reader.metadata().width, WIDTH);
    assert_eq!(reader.metadata().height, HEIGHT);
}

#[test]
fn ntsc_frame_rate() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("ntsc.mp4");
    if !write_test_video_at(&output, 10, Rational::new(30000, 1001)) {
        return;
    }

    assert_eq!(count_frames(&output), 10);
    let fps = VideoReader::open(&output).unwrap().metadata().frames_per_second;
    assert!((fps - 29.97).abs() < 0.1, "fps={fps}");
}

#[test]
fn variable_rate_average_is_approximated() {
    let directory = tempfile::tempdir().unwrap();
    if !write_test_video(&directory.path().join("plain.mp4"), 1, 30) {
        return;
    }

    let output = directory.path().join("phone.mp4");
    let mut writer = VideoWriter::create(
        &output,
        WIDTH,
        HEIGHT,
        Rational::new(2_700_000, 90_061),
        &ClipOptions::default(),
    )
    .expect("a large-denominator rate should still open the default encoder");

    for index in 0..10 {
        writer.write(&solid_frame(WIDTH, HEIGHT, index)).unwrap();
    }
    assert_eq!(writer.finish().unwrap(), 10);

    assert_eq!(count_frames(&output), 10);
    let fps = VideoReader::open(&output).unwrap().metadata().frames_per_second;
    assert!((fps - 29.98).abs() < 0.1, "fps={fps}");
}

#[test]
fn frames_of_another_size_are_scaled() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("scaled.mp4");
    let mut writer = match VideoWriter::create(
        &output,
        WIDTH,
        HEIGHT,
        Rational::new(5, 1),
        &ClipOptions::default(),
    ) {
        Ok(writer) => writer,
        Err(error) => {
            eprintln!("Skipping: encoder not available ({error})");
            return;
        }
    };

    writer.write(&solid_frame(128, 96, 0)).expect("write larger frame");
    writer.write(&solid_frame(32, 24, 1)).expect("write smaller frame");
    assert_eq!(writer.finish().unwrap(), 2);

    let reader = VideoReader::open(&output).unwrap();
    assert_eq!((reader.metadata().width, reader.metadata().height), (WIDTH, HEIGHT));
}

#[test]
fn dropped_writer_still_closes_the_container() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("dropped.mp4");
    {
        let mut writer = match VideoWriter::create(
            &output,
            WIDTH,
            HEIGHT,
            Rational::new(10, 1),
            &ClipOptions::default(),
        ) {
            Ok(writer) => writer,
            Err(error) => {
                eprintln!("Skipping: encoder not available ({error})");
                return;
            }
        };
        for index in 0..5 {
            writer.write(&solid_frame(WIDTH, HEIGHT, index)).unwrap();
        }
        assert_eq!(writer.frames_written(), 5);
    }

    assert_eq!(count_frames(&output), 5);
}

#[test]
fn unknown_fourcc_is_an_open_error() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("bad.mp4");
    let options = ClipOptions::new().with_codec("zz!z".parse::<FourCc>().unwrap());

    let result = VideoWriter::create(&output, WIDTH, HEIGHT, Rational::new(10, 1), &options);
    match result {
        Err(ClipError::Open { path, reason }) => {
            assert_eq!(path, output);
            assert!(reason.contains("fourcc"), "{reason}");
        }
        other => panic!("expected an open error, got {other:?}"),
    }
    assert!(!Path::new(&output).exists());
}

#[test]
fn zero_frame_rate_is_rejected() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("zero.mp4");

    let result = VideoWriter::create(
        &output,
        WIDTH,
        HEIGHT,
        Rational::new(0, 1),
        &ClipOptions::default(),
    );
    assert!(matches!(result, Err(ClipError::Open { .. })));
}

#[test]
fn unwritable_path_is_an_open_error() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("missing").join("clip.mp4");

    let result = VideoWriter::create(
        &output,
        WIDTH,
        HEIGHT,
        Rational::new(10, 1),
        &ClipOptions::default(),
    );
    assert!(matches!(result, Err(ClipError::Open { .. })));
}
