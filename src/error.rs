//! Error type shared by every operation of the crate.

use thiserror::Error;

/// Everything that can go wrong while filtering, transforming or measuring an array.
#[derive(Debug, Error)]
pub enum NdImageError {
    #[error("weights array must not be empty")]
    EmptyWeights,

    #[error("footprint selects no element")]
    EmptyFootprint,

    #[error("either a window (size or footprint) or a structure must be given")]
    MissingWindow,

    #[error("rank mismatch: expected {expected} dimensions, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("output buffer has shape {found:?}, expected {expected:?}")]
    OutputShape {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("axis {axis} is out of range for an array of {ndim} dimensions")]
    AxisOutOfRange { axis: isize, ndim: usize },

    #[error("origin {origin} is invalid for a window of size {size} along axis {axis}")]
    InvalidOrigin {
        axis: usize,
        origin: isize,
        size: usize,
    },

    #[error("unknown boundary mode `{0}`")]
    UnknownMode(String),

    #[error("unknown distance metric `{0}`")]
    UnknownMetric(String),

    #[error("metric `{0}` is not supported by this transform")]
    UnsupportedMetric(&'static str),

    #[error("unsupported order {0}")]
    UnsupportedOrder(usize),

    #[error("axes must be distinct, axis {0} was given twice")]
    DuplicateAxis(usize),

    #[error("operation is not supported for arrays of rank {0}")]
    UnsupportedRank(usize),

    #[error("rank {rank} is out of range for a footprint of {count} elements")]
    RankOutOfRange { rank: isize, count: usize },

    #[error("percentile {0} is outside [-100, 100]")]
    InvalidPercentile(f64),

    #[error("sigma must be non-negative, found {0}")]
    InvalidSigma(f64),

    #[error("sampling must be positive, found {0}")]
    InvalidSampling(f64),

    #[error("histogram needs min < max and at least one bin, found [{min}, {max}] with {bins} bins")]
    InvalidHistogram { min: f64, max: f64, bins: usize },

    #[error("invalid structuring element: {0}")]
    InvalidStructure(&'static str),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Fft(#[from] realfft::FftError),
}

pub type Result<T> = std::result::Result<T, NdImageError>;
