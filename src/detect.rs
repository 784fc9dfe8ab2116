use crate::postprocess::{self, Detection, PostprocessError};
use crate::preprocess::{self, PreprocessError};
use crate::volume::Volume;

use ndarray::{Array2, ArrayView4};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

/// Errors from the model collaborator.
///
/// Loading stays outside this crate; engines report a failed load once,
/// with the path they attempted, and the host keeps running without the
/// detection feature.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),

    /// For engines that support deadlines on a forward pass.
    #[error("inference deadline exceeded")]
    Timeout,
}

/// A loaded model that turns a preprocessed NCHW tensor into raw per-box
/// output rows.
pub trait InferenceEngine {
    fn infer(&self, input: ArrayView4<'_, f32>) -> Result<Array2<f32>, ModelError>;
}

/// Failure of one slice's detection pipeline. Recorded per slice; sibling
/// slices keep their own results.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Postprocess(#[from] PostprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Human labels for class ids, one per line. Absence is non-fatal; labels
/// fall back to the numeric id.
///
/// The file maps row index to label, so every line counts — a blank row
/// keeps its slot and simply has no label.
#[derive(Debug, Clone, Default)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_lines(text.lines().map(str::to_string)))
    }

    pub fn from_lines(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: lines
                .into_iter()
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
        }
    }

    /// Label for a class id. A row holding only whitespace has no label.
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names
            .get(class_id)
            .map(String::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Side length of the square model input.
    pub input_size: u32,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.5,
            iou_threshold: postprocess::DEFAULT_IOU_THRESHOLD,
        }
    }
}

/// Runs the per-slice detection pipeline: preprocess, forward pass,
/// decode and suppress.
pub struct Detector<E> {
    engine: E,
    config: DetectorConfig,
    class_names: Option<ClassNames>,
}

impl<E: InferenceEngine + Sync> Detector<E> {
    pub fn new(engine: E, config: DetectorConfig) -> Self {
        Self {
            engine,
            config,
            class_names: None,
        }
    }

    pub fn with_class_names(mut self, class_names: ClassNames) -> Self {
        self.class_names = Some(class_names);
        self
    }

    /// Label for a detection: the class-name entry when present, the
    /// numeric id otherwise.
    pub fn label(&self, detection: &Detection) -> String {
        match detection.class_id {
            Some(id) => self
                .class_names
                .as_ref()
                .and_then(|names| names.get(id))
                .map(str::to_string)
                .unwrap_or_else(|| id.to_string()),
            None => String::from("object"),
        }
    }

    /// Detect objects on one slice. Boxes come back in the slice's own
    /// pixel coordinates.
    pub fn detect_slice(&self, slice: &image::GrayImage) -> Result<Vec<Detection>, DetectError> {
        let tensor = preprocess::preprocess(slice, self.config.input_size)?;
        let raw = self.engine.infer(tensor.view())?;
        let detections = postprocess::postprocess(
            slice.width(),
            slice.height(),
            raw.view(),
            self.config.conf_threshold,
            self.config.iou_threshold,
        )?;
        Ok(detections)
    }

    /// Detect objects on every slice of a volume, in parallel.
    ///
    /// The result list matches the slice order, one status per slice. A
    /// failing slice is recorded in its own slot and never aborts the
    /// rest of the batch.
    pub fn run(&self, volume: &Volume) -> Vec<Result<Vec<Detection>, DetectError>> {
        let slices: Vec<_> = (0..volume.depth())
            .filter_map(|z| volume.slice_image(z))
            .collect();

        slices
            .par_iter()
            .enumerate()
            .map(|(z, slice)| {
                let result = self.detect_slice(slice);
                if let Err(err) = &result {
                    log::warn!("detection failed on slice {z}: {err}");
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use ndarray::Array3;

    /// Returns one fixed detection row regardless of input.
    struct OneBoxEngine;

    impl InferenceEngine for OneBoxEngine {
        fn infer(&self, _input: ArrayView4<'_, f32>) -> Result<Array2<f32>, ModelError> {
            Ok(Array2::from_shape_vec(
                (1, 6),
                vec![0.5, 0.5, 0.25, 0.25, 0.9, 1.0],
            )
            .unwrap())
        }
    }

    struct FailingEngine;

    impl InferenceEngine for FailingEngine {
        fn infer(&self, _input: ArrayView4<'_, f32>) -> Result<Array2<f32>, ModelError> {
            Err(ModelError::Inference(String::from("backend unavailable")))
        }
    }

    fn ramp_slice() -> GrayImage {
        GrayImage::from_fn(16, 16, |x, y| Luma([((x + y * 16) % 256) as u8]))
    }

    fn config() -> DetectorConfig {
        DetectorConfig {
            input_size: 16,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn detect_slice_maps_boxes_to_slice_coordinates() {
        let detector = Detector::new(OneBoxEngine, config());
        let detections = detector.detect_slice(&ramp_slice()).unwrap();
        assert_eq!(detections.len(), 1);
        // cx = 0.5 * 16 = 8, w = 0.25 * 16 = 4.
        assert_eq!(detections[0].rect.left, 6);
        assert_eq!(detections[0].rect.width, 4);
    }

    #[test]
    fn run_preserves_slice_order_and_isolates_failures() {
        // Slice 0 is a ramp, slice 1 is constant: the constant slice fails
        // preprocessing but must not take slice 0 down with it.
        let mut data = Array3::<u8>::zeros((2, 16, 16));
        for y in 0..16usize {
            for x in 0..16usize {
                data[[0, y, x]] = (x + y * 16) as u8;
                data[[1, y, x]] = 42;
            }
        }
        let volume = Volume::new(data, (1.0, 1.0, 1.0)).unwrap();

        let detector = Detector::new(OneBoxEngine, config());
        let results = detector.run(&volume);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().len(), 1);
        assert!(matches!(
            results[1],
            Err(DetectError::Preprocess(PreprocessError::DegenerateRange { .. }))
        ));
    }

    #[test]
    fn engine_failure_is_reported_per_slice() {
        let data = Array3::from_shape_fn((1, 16, 16), |(_, y, x)| (x + y * 16) as u8);
        let volume = Volume::new(data, (1.0, 1.0, 1.0)).unwrap();

        let detector = Detector::new(FailingEngine, config());
        let results = detector.run(&volume);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(DetectError::Model(ModelError::Inference(_)))
        ));
    }

    #[test]
    fn label_falls_back_to_numeric_id() {
        let detector = Detector::new(OneBoxEngine, config());
        let detection = detector.detect_slice(&ramp_slice()).unwrap().remove(0);
        assert_eq!(detector.label(&detection), "0");

        let named = Detector::new(OneBoxEngine, config())
            .with_class_names(ClassNames::from_lines(vec![String::from("lesion")]));
        assert_eq!(named.label(&detection), "lesion");
    }

    #[test]
    fn class_names_preserve_row_index_mapping() {
        // A blank interior row keeps its slot; labels after it must not
        // shift onto the wrong class id.
        let names = ClassNames::from_lines(vec![
            String::from("liver"),
            String::new(),
            String::from("tumor"),
        ]);
        assert_eq!(names.len(), 3);
        assert_eq!(names.get(0), Some("liver"));
        assert_eq!(names.get(1), None);
        assert_eq!(names.get(2), Some("tumor"));
    }

    #[test]
    fn blank_label_falls_back_to_numeric_id() {
        let detector = Detector::new(OneBoxEngine, config()).with_class_names(
            ClassNames::from_lines(vec![String::from("  "), String::from("tumor")]),
        );
        let detection = detector.detect_slice(&ramp_slice()).unwrap().remove(0);
        // Class 0 sits on a whitespace-only row.
        assert_eq!(detector.label(&detection), "0");
    }

    #[test]
    fn class_names_trim_carriage_returns() {
        let names = ClassNames::from_lines(vec![String::from("liver\r")]);
        assert_eq!(names.get(0), Some("liver"));
    }
}
