use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb, RgbImage};
use ndarray::Array4;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("slice has no pixels")]
    EmptySlice,

    #[error("model input size must be positive")]
    InvalidTargetSize,

    #[error("percentile window collapsed at {value}")]
    DegenerateRange { value: f32 },
}

/// Normalize a slice and reshape it into the tensor layout a detection
/// network expects.
///
/// The intensity window is the 2nd..98th percentile of the pixel
/// population, taken from a full ascending sort with truncating indices.
/// The window is rescaled to `[0, 255]`, the single channel replicated to
/// three, the result resized to `target`×`target` and divided by 255.
///
/// The lower clip goes to zero rather than to the percentile value, so
/// anything at or below it lands under the window and saturates to black
/// after the shift. Intentional asymmetry with the upper clip.
///
/// Returns an NCHW tensor of shape `(1, 3, target, target)` with values
/// in `[0, 1]`.
pub fn preprocess(slice: &GrayImage, target: u32) -> Result<Array4<f32>, PreprocessError> {
    let len = (slice.width() * slice.height()) as usize;
    if len == 0 {
        return Err(PreprocessError::EmptySlice);
    }
    if target == 0 {
        return Err(PreprocessError::InvalidTargetSize);
    }

    let mut sorted: Vec<f32> = slice.pixels().map(|p| p.0[0] as f32).collect();
    sorted.sort_by(f32::total_cmp);
    let p2 = sorted[(0.02 * len as f64) as usize];
    let p98 = sorted[((0.98 * len as f64) as usize).min(len - 1)];

    if p98 == p2 {
        return Err(PreprocessError::DegenerateRange { value: p2 });
    }
    let scale = 255.0 / (p98 - p2);

    let windowed = GrayImage::from_fn(slice.width(), slice.height(), |x, y| {
        let value = slice.get_pixel(x, y).0[0] as f32;
        let value = if value <= p2 { 0.0 } else { value };
        let value = if value > p98 { p98 } else { value };
        image::Luma([((value - p2) * scale).round().clamp(0.0, 255.0) as u8])
    });

    let replicated = RgbImage::from_fn(windowed.width(), windowed.height(), |x, y| {
        let v = windowed.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    let resized = imageops::resize(&replicated, target, target, FilterType::Triangle);

    let mut tensor = Array4::<f32>::zeros((1, 3, target as usize, target as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] = pixel.0[channel] as f32 / 255.0;
        }
    }
    Ok(tensor)
}
