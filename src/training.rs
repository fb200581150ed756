//! Training-loop helpers: parameter checkpoints and sample grids.
//!
//! These are independent of the clipping pipeline. A checkpoint is a named
//! map of flat parameter tensors stored as JSON. [`log_images`] tiles three
//! equally sized batches (input noise, model output, target) into one grid,
//! one batch per row, and hands it to an [`ImageSink`].

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, GenericImage};

use crate::error::ClipError;

/// Learnable parameters by name, each flattened to a vector.
pub type StateDict = BTreeMap<String, Vec<f32>>;

/// Tag under which [`log_images`] publishes its grid.
pub const SAMPLES_TAG: &str = "Samples";

/// Pixels between grid cells and around the border.
pub const GRID_PADDING: u32 = 2;

/// Write `state` to `path`, creating parent directories as needed.
pub fn save_checkpoint<P: AsRef<Path>>(state: &StateDict, path: P) -> Result<(), ClipError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, state)
        .map_err(|error| ClipError::Checkpoint(error.to_string()))?;
    writer.flush()?;

    log::debug!("Saved {} parameter(s) to {}", state.len(), path.display());
    Ok(())
}

/// Read a checkpoint written by [`save_checkpoint`].
pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<StateDict, ClipError> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|error| ClipError::Checkpoint(error.to_string()))
}

/// A destination for tagged, step-indexed images (a metrics dashboard, a
/// directory, ...).
pub trait ImageSink {
    /// Publish `image` under `tag` for training step `step`.
    fn add_image(&mut self, tag: &str, image: &DynamicImage, step: u64) -> Result<(), ClipError>;
}

/// Writes each image as `<directory>/<tag>_<step>.png`, step zero-padded to
/// six digits.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating `directory` if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self, ClipError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    /// Path an image with this tag and step is written to.
    pub fn image_path(&self, tag: &str, step: u64) -> PathBuf {
        self.directory.join(format!("{tag}_{step:06}.png"))
    }
}

impl ImageSink for DirectorySink {
    fn add_image(&mut self, tag: &str, image: &DynamicImage, step: u64) -> Result<(), ClipError> {
        image.save(self.image_path(tag, step))?;
        Ok(())
    }
}

/// Tile `images` row-major, `images_per_row` per row, with `padding` black
/// pixels between cells and around the border. Cells take the size of the
/// first image; others are resized to fit.
pub fn make_grid(
    images: &[DynamicImage],
    images_per_row: usize,
    padding: u32,
) -> Result<DynamicImage, ClipError> {
    let first = images
        .first()
        .ok_or_else(|| ClipError::InvalidGrid("no images to tile".to_string()))?;
    if images_per_row == 0 {
        return Err(ClipError::InvalidGrid(
            "images per row must be greater than zero".to_string(),
        ));
    }

    let (cell_width, cell_height) = (first.width(), first.height());
    let columns = images_per_row.min(images.len()) as u32;
    let rows = images.len().div_ceil(images_per_row) as u32;

    let grid_width = columns * (cell_width + padding) + padding;
    let grid_height = rows * (cell_height + padding) + padding;
    let mut grid = DynamicImage::new_rgb8(grid_width, grid_height);

    for (index, image) in images.iter().enumerate() {
        let column = (index % images_per_row) as u32;
        let row = (index / images_per_row) as u32;
        let x = padding + column * (cell_width + padding);
        let y = padding + row * (cell_height + padding);

        let cell = if image.width() != cell_width || image.height() != cell_height {
            image.resize_exact(cell_width, cell_height, FilterType::Triangle)
        } else {
            image.clone()
        };
        grid.copy_from(&cell, x, y)
            .map_err(|error| ClipError::InvalidGrid(error.to_string()))?;
    }

    Ok(grid)
}

/// Compose noise, output, and target batches into one grid and publish it
/// to `sink` as [`SAMPLES_TAG`] at `step`.
///
/// # Errors
///
/// [`ClipError::InvalidGrid`] if the batches are empty or differ in length.
pub fn log_images(
    noise: &[DynamicImage],
    output: &[DynamicImage],
    target: &[DynamicImage],
    sink: &mut dyn ImageSink,
    step: u64,
) -> Result<DynamicImage, ClipError> {
    if noise.is_empty() {
        return Err(ClipError::InvalidGrid("empty batch".to_string()));
    }
    if output.len() != noise.len() || target.len() != noise.len() {
        return Err(ClipError::InvalidGrid(format!(
            "batch sizes differ: noise={}, output={}, target={}",
            noise.len(),
            output.len(),
            target.len()
        )));
    }

    let batch: Vec<DynamicImage> = noise
        .iter()
        .chain(output)
        .chain(target)
        .cloned()
        .collect();
    let grid = make_grid(&batch, noise.len(), GRID_PADDING)?;
    sink.add_image(SAMPLES_TAG, &grid, step)?;
    Ok(grid)
}
