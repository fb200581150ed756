//! Checkpoint and sample-grid tests.

use std::collections::BTreeMap;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use stillclip::ClipError;
use stillclip::training::{
    DirectorySink, ImageSink, SAMPLES_TAG, StateDict, load_checkpoint, log_images, make_grid,
    save_checkpoint,
};

fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
}

#[derive(Default)]
struct MemorySink {
    images: Vec<(String, u64, u32, u32)>,
}

impl ImageSink for MemorySink {
    fn add_image(&mut self, tag: &str, image: &DynamicImage, step: u64) -> Result<(), ClipError> {
        self.images
            .push((tag.to_string(), step, image.width(), image.height()));
        Ok(())
    }
}

#[test]
fn checkpoint_round_trip_creates_parents() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("runs").join("epoch_3").join("model.json");

    let mut state: StateDict = BTreeMap::new();
    state.insert("encoder.weight".to_string(), vec![0.5, -1.25, 3.0]);
    state.insert("encoder.bias".to_string(), vec![0.0]);

    save_checkpoint(&state, &path).expect("save checkpoint");
    assert!(path.exists());
    assert_eq!(load_checkpoint(&path).expect("load checkpoint"), state);
}

#[test]
fn checkpoint_in_working_directory_needs_no_parent() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("flat.json");
    save_checkpoint(&StateDict::new(), &path).unwrap();
    assert!(load_checkpoint(&path).unwrap().is_empty());
}

#[test]
fn grid_has_one_row_per_batch() {
    let noise = vec![solid(4, 4, 10), solid(4, 4, 20)];
    let output = vec![solid(4, 4, 30), solid(4, 4, 40)];
    let target = vec![solid(4, 4, 50), solid(4, 4, 60)];

    let mut sink = MemorySink::default();
    let grid = log_images(&noise, &output, &target, &mut sink, 7).unwrap();

    // 2 columns, 3 rows, 4px cells, 2px padding.
    assert_eq!((grid.width(), grid.height()), (14, 20));
    assert_eq!(sink.images, vec![(SAMPLES_TAG.to_string(), 7, 14, 20)]);

    assert_eq!(grid.get_pixel(0, 0).0[..3], [0, 0, 0]);
    assert_eq!(grid.get_pixel(2, 2).0[..3], [10, 10, 10]);
    assert_eq!(grid.get_pixel(8, 2).0[..3], [20, 20, 20]);
    assert_eq!(grid.get_pixel(8, 14).0[..3], [60, 60, 60]);
}

#[test]
fn mismatched_batches_are_rejected() {
    let mut sink = MemorySink::default();
    let result = log_images(
        &[solid(4, 4, 0), solid(4, 4, 0)],
        &[solid(4, 4, 0)],
        &[solid(4, 4, 0), solid(4, 4, 0)],
        &mut sink,
        0,
    );
    assert!(matches!(result, Err(ClipError::InvalidGrid(_))));
    assert!(sink.images.is_empty());

    assert!(log_images(&[], &[], &[], &mut sink, 0).is_err());
}

#[test]
fn cells_are_resized_to_the_first_image() {
    let grid = make_grid(&[solid(4, 4, 1), solid(8, 2, 2)], 2, 0).unwrap();
    assert_eq!((grid.width(), grid.height()), (8, 4));
}

#[test]
fn directory_sink_writes_png_per_step() {
    let directory = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(directory.path().join("samples")).unwrap();

    sink.add_image(SAMPLES_TAG, &solid(3, 3, 9), 42).unwrap();

    let written = sink.image_path(SAMPLES_TAG, 42);
    assert!(written.ends_with("Samples_000042.png"));
    let image = image::open(&written).unwrap();
    assert_eq!((image.width(), image.height()), (3, 3));
}
