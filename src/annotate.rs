use crate::postprocess::Detection;

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Replicate a grayscale plane into an RGB canvas for overlays.
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

/// Overlay two full-length single-pixel guide lines on a plane: a vertical
/// line at column `vertical` and a horizontal line at row `horizontal`.
///
/// A coordinate outside the plane skips that line silently; the other is
/// still drawn.
pub fn annotate_crosshair(
    gray: &GrayImage,
    vertical: usize,
    horizontal: usize,
    vertical_color: Rgb<u8>,
    horizontal_color: Rgb<u8>,
) -> RgbImage {
    let mut canvas = gray_to_rgb(gray);
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return canvas;
    }

    if vertical < width as usize {
        draw_line_segment_mut(
            &mut canvas,
            (vertical as f32, 0.0),
            (vertical as f32, (height - 1) as f32),
            vertical_color,
        );
    }
    if horizontal < height as usize {
        draw_line_segment_mut(
            &mut canvas,
            (0.0, horizontal as f32),
            ((width - 1) as f32, horizontal as f32),
            horizontal_color,
        );
    }
    canvas
}

/// Outline final detections on a canvas. Degenerate boxes are skipped.
pub fn draw_detections(canvas: &mut RgbImage, detections: &[Detection], color: Rgb<u8>) {
    for detection in detections {
        let rect = detection.rect;
        if rect.width <= 0 || rect.height <= 0 {
            continue;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(rect.left, rect.top).of_size(rect.width as u32, rect.height as u32),
            color,
        );
    }
}
