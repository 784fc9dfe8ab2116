use crate::enums::Orientation;

use image::GrayImage;
use image::Luma;
use ndarray::{Array2, Array3, ArrayView2, s};
use thiserror::Error;

/// Physical spacing per axis (sx, sy, sz). Used only for 3D placement,
/// never in reslicing math.
pub type VoxelSize = (f32, f32, f32);

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("volume contains no slices")]
    EmptyVolume,

    #[error("index {index} outside volume extents (depth {depth}, height {height}, width {width})")]
    OutOfRange {
        index: usize,
        depth: usize,
        height: usize,
        width: usize,
    },

    #[error("voxel spacing must be positive on every axis, got {spacing:?}")]
    InvalidSpacing { spacing: VoxelSize },
}

/// An ordered stack of equal-sized grayscale slices, stored in
/// (depth, height, width) order. Insertion order is spatial order
/// along the depth axis.
#[derive(Debug, Clone)]
pub struct Volume {
    pub data: Array3<u8>,
    pub spacing: VoxelSize,
}

/// The three canonical orthogonal planes through a single voxel index.
/// Derived data, recomputed on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSections {
    /// The native slice at the selected index, copied bit-for-bit (H×W).
    pub axial: Array2<u8>,
    /// Fixed X = index, rows vary over Y, columns over Z (H×D).
    pub coronal: Array2<u8>,
    /// Fixed Y = index, rows vary over Z, columns over X (D×W).
    pub sagittal: Array2<u8>,
}

impl Volume {
    pub fn new(data: Array3<u8>, spacing: VoxelSize) -> Result<Self, VolumeError> {
        let (depth, height, width) = data.dim();
        if depth == 0 || height == 0 || width == 0 {
            return Err(VolumeError::EmptyVolume);
        }
        let (sx, sy, sz) = spacing;
        if !(sx > 0.0 && sy > 0.0 && sz > 0.0) {
            return Err(VolumeError::InvalidSpacing { spacing });
        }
        Ok(Self { data, spacing })
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn depth(&self) -> usize {
        self.data.dim().0
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    /// Compute all three orthogonal cross-sections through `index`.
    ///
    /// A single index drives all three planes, so it must be valid for
    /// every extent it indexes into: the depth (axial plane choice), the
    /// width (coronal fixed column) and the height (sagittal fixed row).
    ///
    /// Pure: the volume is not touched and repeated calls with the same
    /// index yield identical results.
    pub fn cross_sections(&self, index: usize) -> Result<CrossSections, VolumeError> {
        Ok(CrossSections {
            axial: self.cross_section(index, Orientation::Axial)?,
            coronal: self.cross_section(index, Orientation::Coronal)?,
            sagittal: self.cross_section(index, Orientation::Sagittal)?,
        })
    }

    /// Compute a single cross-section plane through `index`.
    pub fn cross_section(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Result<Array2<u8>, VolumeError> {
        let (depth, height, width) = self.data.dim();
        if depth == 0 || height == 0 || width == 0 {
            return Err(VolumeError::EmptyVolume);
        }
        let extent = match orientation {
            Orientation::Axial => depth,
            Orientation::Coronal => width,
            Orientation::Sagittal => height,
        };
        if index >= extent {
            return Err(VolumeError::OutOfRange {
                index,
                depth,
                height,
                width,
            });
        }
        let plane = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]).to_owned(),
            // (depth, height) view of the fixed column, transposed so that
            // rows vary over Y and columns over Z.
            Orientation::Coronal => self.data.slice(s![.., .., index]).reversed_axes().to_owned(),
            Orientation::Sagittal => self.data.slice(s![.., index, ..]).to_owned(),
        };
        Ok(plane)
    }

    /// View of the native slice at stack position `z`.
    pub fn slice_view(&self, z: usize) -> Option<ArrayView2<'_, u8>> {
        if z >= self.depth() {
            return None;
        }
        Some(self.data.slice(s![z, .., ..]))
    }

    /// The native slice at stack position `z` as a grayscale image.
    pub fn slice_image(&self, z: usize) -> Option<GrayImage> {
        self.slice_view(z).map(|view| Self::slice_to_image(&view))
    }

    /// Convert a (height, width) sample grid into a grayscale image.
    pub fn slice_to_image(slice: &ArrayView2<'_, u8>) -> GrayImage {
        let (height, width) = slice.dim();
        GrayImage::from_fn(width as u32, height as u32, |x, y| {
            Luma([slice[[y as usize, x as usize]]])
        })
    }

    /// Convert a grayscale image into a (height, width) sample grid.
    pub fn image_to_slice(image: &GrayImage) -> Array2<u8> {
        let (width, height) = image.dimensions();
        Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            image.get_pixel(x as u32, y as u32).0[0]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_volume(depth: usize, height: usize, width: usize) -> Volume {
        let data = Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
            (z * height * width + y * width + x) as u8
        });
        Volume::new(data, (1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn axial_is_selected_slice_bit_for_bit() {
        let volume = ramp_volume(4, 4, 4);
        let sections = volume.cross_sections(2).unwrap();
        assert_eq!(sections.axial, volume.data.slice(s![2, .., ..]).to_owned());
    }

    #[test]
    fn cross_section_shapes() {
        let volume = ramp_volume(3, 4, 5);
        let sections = volume.cross_sections(1).unwrap();
        assert_eq!(sections.axial.dim(), (4, 5));
        assert_eq!(sections.coronal.dim(), (4, 3));
        assert_eq!(sections.sagittal.dim(), (3, 5));
    }

    #[test]
    fn coronal_samples_fixed_column() {
        let volume = ramp_volume(3, 4, 5);
        let sections = volume.cross_sections(1).unwrap();
        for z in 0..3 {
            for y in 0..4 {
                assert_eq!(sections.coronal[[y, z]], volume.data[[z, y, 1]]);
            }
        }
    }

    #[test]
    fn sagittal_samples_fixed_row() {
        let volume = ramp_volume(3, 4, 5);
        let sections = volume.cross_sections(1).unwrap();
        for z in 0..3 {
            for x in 0..5 {
                assert_eq!(sections.sagittal[[z, x]], volume.data[[z, 1, x]]);
            }
        }
    }

    #[test]
    fn four_cube_scenario_at_index_one() {
        // Four slices of 4x4 known values, index 1: coronal is exactly 4x4
        // and coronal[y, z] = volume[z][y, 1].
        let volume = ramp_volume(4, 4, 4);
        let sections = volume.cross_sections(1).unwrap();
        assert_eq!(sections.coronal.dim(), (4, 4));
        for y in 0..4 {
            for z in 0..4 {
                assert_eq!(sections.coronal[[y, z]], (z * 16 + y * 4 + 1) as u8);
            }
        }
    }

    #[test]
    fn reslicing_is_idempotent() {
        let volume = ramp_volume(4, 4, 4);
        let first = volume.cross_sections(2).unwrap();
        let second = volume.cross_sections(2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn index_out_of_depth_fails() {
        let volume = ramp_volume(2, 4, 4);
        assert!(matches!(
            volume.cross_sections(2),
            Err(VolumeError::OutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn index_out_of_width_fails_even_when_within_depth() {
        // 5 slices of 4x4: index 4 picks a valid slice but no valid column.
        let volume = ramp_volume(5, 4, 4);
        assert!(volume.cross_sections(3).is_ok());
        assert!(matches!(
            volume.cross_sections(4),
            Err(VolumeError::OutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn empty_volume_rejected_at_construction() {
        let result = Volume::new(Array3::zeros((0, 4, 4)), (1.0, 1.0, 1.0));
        assert_eq!(result.unwrap_err(), VolumeError::EmptyVolume);
    }

    #[test]
    fn non_positive_spacing_rejected_at_construction() {
        for spacing in [(0.0, 1.0, 1.0), (1.0, -0.5, 1.0), (1.0, 1.0, f32::NAN)] {
            let result = Volume::new(Array3::zeros((2, 4, 4)), spacing);
            assert!(matches!(
                result,
                Err(VolumeError::InvalidSpacing { .. })
            ));
        }
    }

    #[test]
    fn slice_image_round_trips() {
        let volume = ramp_volume(2, 3, 4);
        let image = volume.slice_image(1).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(
            Volume::image_to_slice(&image),
            volume.slice_view(1).unwrap().to_owned()
        );
    }

    #[test]
    fn slice_image_out_of_range_is_none() {
        let volume = ramp_volume(2, 3, 4);
        assert!(volume.slice_image(2).is_none());
    }
}
