use crate::volume::{Volume, VolumeError, VoxelSize};

use image::GrayImage;
use image::imageops::{self, FilterType};
use ndarray::{Array3, s};
use std::{fs, path::Path};
use thiserror::Error;

/// Default in-plane slice dimensions (width, height). Mismatched inputs
/// are resized to this target at ingestion.
pub const DEFAULT_SLICE_SIZE: (u32, u32) = (256, 256);

const DEFAULT_SPACING: VoxelSize = (1.0, 1.0, 1.0);

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("no valid images found")]
    NoValidImages,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Volume(#[from] VolumeError),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from image file paths, in the given order.
    ///
    /// Each file is decoded as 8-bit grayscale and resized to `target`
    /// (width, height) if its dimensions differ. Files that fail to decode
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeLoaderError::NoValidImages`] if no file decodes
    /// successfully.
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        target: (u32, u32),
    ) -> Result<Volume, VolumeLoaderError> {
        let mut slices = Vec::with_capacity(paths.len());
        for path in paths {
            match image::open(path.as_ref()) {
                Ok(decoded) => slices.push(decoded.to_luma8()),
                Err(err) => log::warn!("skipping {}: {err}", path.as_ref().display()),
            }
        }
        Self::from_slices(slices, target)
    }

    /// Load a volume from a directory of image files.
    ///
    /// Only png/jpg/jpeg/bmp files are considered. Paths are sorted
    /// lexicographically so the stack order is deterministic.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        target: (u32, u32),
    ) -> Result<Volume, VolumeLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| {
                        matches!(
                            ext.to_ascii_lowercase().as_str(),
                            "png" | "jpg" | "jpeg" | "bmp"
                        )
                    })
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::load_from_file_paths(&paths, target)
    }

    /// Build a volume from already-decoded grayscale slices, resizing any
    /// slice whose dimensions differ from `target` (width, height).
    pub fn from_slices(
        slices: Vec<GrayImage>,
        target: (u32, u32),
    ) -> Result<Volume, VolumeLoaderError> {
        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        let (width, height) = target;
        let depth = slices.len();
        let mut data = Array3::<u8>::zeros((depth, height as usize, width as usize));

        for (z, slice) in slices.into_iter().enumerate() {
            let slice = if slice.dimensions() == target {
                slice
            } else {
                imageops::resize(&slice, width, height, FilterType::Triangle)
            };
            data.slice_mut(s![z, .., ..])
                .assign(&Volume::image_to_slice(&slice));
        }

        log::info!("loaded volume of {depth} slices at {width}x{height}");
        Ok(Volume::new(data, DEFAULT_SPACING)?)
    }
}
