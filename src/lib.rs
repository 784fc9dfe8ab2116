//! # slicestack library
//!
//! This crate serves a high-level API for viewing and processing stacks of
//! 2D grayscale image slices as volumes.
//!
//! A volume is an ordered stack of equal-sized 8-bit slices; mismatched
//! inputs are resized at ingestion. The volume can be resliced in the three
//! medical axes through a single selected voxel index:
//!  - Axial
//!  - Coronal
//!  - Sagittal
//!
//! On top of the reslicing core the crate provides:
//!  - crosshair and bounding-box overlays for viewer planes
//!  - per-slice edit filters and segmentation thresholds with a full-copy
//!    undo stack, owned by an [`EditSession`]
//!  - percentile-window preprocessing into model input tensors
//!  - decoding of raw detector output with greedy non-max suppression,
//!    driven across a whole volume by a [`Detector`] behind the
//!    [`InferenceEngine`] trait
//!
//! Per-slice detection runs in parallel using rayon; results keep the
//! slice order and one failing slice never aborts its siblings.
//!
//! # Examples
//!
//! ## Reslicing a stack of image files
//!
//! Read all image files from the slices/ directory in lexicographic order,
//! then compute the three cross-sections at the center of the stack.
//!
//! ```no_run
//! # use slicestack::{VolumeLoader, DEFAULT_SLICE_SIZE};
//! let volume = VolumeLoader::load_from_directory("slices", DEFAULT_SLICE_SIZE)
//!     .expect("should have loaded slices from directory");
//! let sections = volume
//!     .cross_sections(volume.dim().0 / 2)
//!     .expect("should have resliced at the center of the stack");
//! assert_eq!(sections.coronal.dim().1, volume.dim().0);
//! ```

pub mod annotate;
pub mod detect;
pub mod enums;
pub mod filters;
pub mod postprocess;
pub mod preprocess;
pub mod session;
pub mod volume;
pub mod volume_loader;

pub use annotate::{annotate_crosshair, draw_detections, gray_to_rgb};
pub use detect::{
    ClassNames, DetectError, Detector, DetectorConfig, InferenceEngine, ModelError,
};
pub use enums::{FilterKind, Orientation, ThresholdKind};
pub use postprocess::{
    BoxRect, DEFAULT_IOU_THRESHOLD, Detection, PostprocessError, non_max_suppression, postprocess,
};
pub use preprocess::{PreprocessError, preprocess};
pub use session::{EditOp, EditSession, ViewState};
pub use volume::{CrossSections, Volume, VolumeError, VoxelSize};
pub use volume_loader::{DEFAULT_SLICE_SIZE, VolumeLoader, VolumeLoaderError};
