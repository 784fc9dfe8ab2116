#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

/// Elementwise / neighborhood edit filters applied uniformly to every slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    GaussianBlur,
    Sharpen,
    EdgeDetect,
    Invert,
    BrightnessUp,
    BrightnessDown,
    ContrastUp,
    ContrastDown,
}

/// Segmentation thresholds applied uniformly to every slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdKind {
    Otsu,
    Binary,
    Adaptive,
    CannyEdges,
}
