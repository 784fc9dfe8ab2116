use crate::enums::{FilterKind, ThresholdKind};

use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, adaptive_threshold, otsu_level, threshold};
use imageproc::edges::canny;
use imageproc::filter::{filter3x3, gaussian_blur_f32};

const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
const BRIGHTNESS_STEP: u8 = 30;
const CONTRAST_UP: f32 = 1.2;
const CONTRAST_DOWN: f32 = 0.8;

impl FilterKind {
    /// Apply the filter to a single slice. Deterministic, no cross-slice
    /// state, output dimensions match the input.
    pub fn apply(&self, slice: &GrayImage) -> GrayImage {
        match self {
            FilterKind::GaussianBlur => gaussian_blur_f32(slice, 1.5),
            FilterKind::Sharpen => filter3x3::<_, _, u8>(slice, &SHARPEN_KERNEL),
            FilterKind::EdgeDetect => canny(slice, 50.0, 150.0),
            FilterKind::Invert => map_intensities(slice, |v| 255 - v),
            FilterKind::BrightnessUp => map_intensities(slice, |v| v.saturating_add(BRIGHTNESS_STEP)),
            FilterKind::BrightnessDown => {
                map_intensities(slice, |v| v.saturating_sub(BRIGHTNESS_STEP))
            }
            FilterKind::ContrastUp => scale_contrast(slice, CONTRAST_UP),
            FilterKind::ContrastDown => scale_contrast(slice, CONTRAST_DOWN),
        }
    }
}

impl ThresholdKind {
    /// Apply the segmentation threshold to a single slice.
    pub fn apply(&self, slice: &GrayImage) -> GrayImage {
        match self {
            ThresholdKind::Otsu => threshold(slice, otsu_level(slice), ThresholdType::Binary),
            ThresholdKind::Binary => threshold(slice, 128, ThresholdType::Binary),
            // 11x11 local-mean neighborhood.
            ThresholdKind::Adaptive => adaptive_threshold(slice, 5),
            ThresholdKind::CannyEdges => canny(slice, 100.0, 200.0),
        }
    }
}

fn map_intensities(slice: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    GrayImage::from_fn(slice.width(), slice.height(), |x, y| {
        Luma([f(slice.get_pixel(x, y).0[0])])
    })
}

fn scale_contrast(slice: &GrayImage, alpha: f32) -> GrayImage {
    map_intensities(slice, |v| (v as f32 * alpha).round().clamp(0.0, 255.0) as u8)
}
