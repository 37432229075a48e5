//! N-dimensional image processing for `ndarray`.
//!
//! Filters, morphology, spline interpolation and region measurements over
//! arrays of any rank, exposed as extension traits on `ArrayBase`:
//!
//! * [`CorrelateExt`]: correlation and convolution with arbitrary weights.
//! * [`FilterExt`]: gaussian, uniform and derivative filters.
//! * [`RankFilterExt`]: rank, percentile, median, min/max and callback filters.
//! * [`BinaryMorphologyExt`] and [`GreyMorphologyExt`]: mathematical morphology.
//! * [`InterpolationExt`]: spline prefiltering and geometric transforms.
//! * [`MeasurementExt`], [`LabelExt`], [`WatershedExt`] and [`DistanceTransformExt`]:
//!   connected components, region statistics, watershed and distance transforms.
//! * [`fourier`]: multiplicative filters applied to precomputed spectra.
//!
//! ```rust
//! use ndarray::array;
//! use ndarray_ndimage::{BoundaryMode, CorrelateExt};
//!
//! let res = array![1.0, 2.0, 3.0]
//!     .correlate(&array![1.0, 1.0, 1.0], BoundaryMode::Constant(0.0), 0)
//!     .unwrap();
//! assert_eq!(res, array![3.0, 6.0, 5.0]);
//! ```

use std::str::FromStr;

mod correlate;
mod distance;
mod element;
mod error;
mod filters;
mod footprint;
pub mod fourier;
mod interpolation;
mod measurements;
mod morphology;
mod padding;
mod rank;

pub use correlate::CorrelateExt;
pub use distance::{DistanceTransform, DistanceTransformExt, Metric};
pub use element::Element;
pub use error::{NdImageError, Result};
pub use filters::FilterExt;
pub use footprint::{IntoOrigin, IntoWindow, PerAxis, Window};
pub use interpolation::{AffineMatrix, InterpolationExt, Resample};
pub use measurements::{
    Extrema, LabelExt, MeasurementExt, WatershedExt, WatershedInput,
};
pub use morphology::{
    generate_binary_structure, iterate_structure, iterated_origin, BinaryMorphology,
    BinaryMorphologyExt, GreyMorphology, GreyMorphologyExt, Iterations,
};
pub use padding::{ExplicitPadding, PaddingExt};
pub use rank::RankFilterExt;

/// How reads outside the input are synthesized.
///
/// `Reflect` mirrors about the edge including the edge cell (`c b a | a b c | c b a`),
/// `Wrap` repeats the array periodically, `Nearest` repeats the edge cell and
/// `Constant` reads the given value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryMode {
    Nearest,
    Wrap,
    #[default]
    Reflect,
    Constant(f64),
}

impl FromStr for BoundaryMode {
    type Err = NdImageError;

    /// Parses `"nearest"`, `"wrap"`, `"reflect"` or `"constant"` (filled with 0).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nearest" => Ok(BoundaryMode::Nearest),
            "wrap" => Ok(BoundaryMode::Wrap),
            "reflect" => Ok(BoundaryMode::Reflect),
            "constant" => Ok(BoundaryMode::Constant(0.0)),
            other => Err(NdImageError::UnknownMode(other.to_string())),
        }
    }
}
