use ndarray::ArrayView2;
use thiserror::Error;

/// Default IoU threshold for non-max suppression.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.4;

/// Raw rows narrower than this cannot hold geometry, objectness and at
/// least one class score.
const MIN_ROW_WIDTH: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum PostprocessError {
    #[error("malformed model output: row width {width}, expected at least {MIN_ROW_WIDTH}")]
    MalformedOutput { width: usize },
}

/// An axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoxRect {
    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Intersection area over union area with another box.
    pub fn iou(&self, other: &BoxRect) -> f32 {
        let ix = self.left.max(other.left);
        let iy = self.top.max(other.top);
        let ix2 = (self.left + self.width).min(other.left + other.width);
        let iy2 = (self.top + self.height).min(other.top + other.height);

        let intersection = (ix2 - ix).max(0) as i64 * (iy2 - iy).max(0) as i64;
        let union = self.area() + other.area() - intersection;
        if union <= 0 {
            return 0.0;
        }
        intersection as f32 / union as f32
    }
}

/// One final detection: box, combined confidence and the winning class.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub rect: BoxRect,
    pub confidence: f32,
    pub class_id: Option<usize>,
}

/// Decode raw per-box network output into a deduplicated detection set.
///
/// Each row is `[cx, cy, w, h, objectness, class_0 .. class_{K-1}]` with
/// geometry normalized to `[0, 1]` relative to the image dimensions. Rows
/// fail the objectness gate, then the combined-score gate, before their
/// center boxes are converted to pixel rectangles with integer truncation.
/// Survivors go through greedy non-max suppression.
///
/// Empty input yields an empty result. A row width below 6 yields
/// [`PostprocessError::MalformedOutput`].
pub fn postprocess(
    image_width: u32,
    image_height: u32,
    raw: ArrayView2<'_, f32>,
    conf_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<Detection>, PostprocessError> {
    if raw.nrows() == 0 {
        return Ok(Vec::new());
    }
    if raw.ncols() < MIN_ROW_WIDTH {
        return Err(PostprocessError::MalformedOutput { width: raw.ncols() });
    }

    let mut candidates = Vec::new();
    for row in raw.rows() {
        let objectness = row[4];
        if objectness < conf_threshold {
            continue;
        }

        let mut class_id = 0;
        let mut class_score = row[5];
        for (offset, &score) in row.iter().enumerate().skip(MIN_ROW_WIDTH) {
            if score > class_score {
                class_score = score;
                class_id = offset - 5;
            }
        }

        let confidence = objectness * class_score;
        if confidence < conf_threshold {
            continue;
        }

        // Truncate each scaled value independently, then center the box
        // with integer halving.
        let cx = (row[0] * image_width as f32) as i32;
        let cy = (row[1] * image_height as f32) as i32;
        let width = (row[2] * image_width as f32) as i32;
        let height = (row[3] * image_height as f32) as i32;
        candidates.push(Detection {
            rect: BoxRect {
                left: cx - width / 2,
                top: cy - height / 2,
                width,
                height,
            },
            confidence,
            class_id: Some(class_id),
        });
    }

    Ok(non_max_suppression(candidates, iou_threshold))
}

/// Greedy class-agnostic non-max suppression.
///
/// Candidates are taken in descending score order; each survivor discards
/// every remaining candidate overlapping it more than `iou_threshold`.
/// Exact score ties keep their original candidate order (stable sort).
pub fn non_max_suppression(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        if kept
            .iter()
            .all(|winner| winner.rect.iou(&candidate.rect) <= iou_threshold)
        {
            kept.push(candidate);
        }
    }
    kept
}
