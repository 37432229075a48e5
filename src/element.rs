//! Element types accepted by the image-processing engines.

use std::cmp::Ordering;
use std::fmt::Debug;

use ndarray::{Array, ArrayD, ArrayViewMut, Dimension, Zip};
use num::{traits::AsPrimitive, Zero};

use crate::{NdImageError, Result};

/// A scalar that can be stored in an input or output array.
///
/// Arithmetic inside the engines is carried out in `f64`; conversions back to
/// integer types truncate toward zero and saturate at the type's bounds.
pub trait Element: Copy + PartialOrd + Debug + Default + Send + Sync + 'static {
    fn to_f64(self) -> f64;

    fn from_f64(v: f64) -> Self;

    /// Same as [`Element::from_f64`], but rounds to the nearest integer first.
    fn round_from_f64(v: f64) -> Self {
        Self::from_f64(v)
    }

    #[inline]
    fn is_nonzero(self) -> bool {
        self.to_f64() != 0.0
    }
}

macro_rules! impl_element {
    ($($t:ty),* => |$v:ident| $round:expr) => {
        $(impl Element for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self.as_()
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v.as_()
            }

            #[inline]
            fn round_from_f64($v: f64) -> Self {
                $round.as_()
            }

            #[inline]
            fn is_nonzero(self) -> bool {
                !self.is_zero()
            }
        })*
    };
}

impl_element!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize => |v| v.round());
impl_element!(f32, f64 => |v| v);

impl Element for bool {
    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v != 0.0
    }

    #[inline]
    fn is_nonzero(self) -> bool {
        self
    }
}

/// Total order used by the selection filters; NaN compares equal to everything.
#[inline]
pub(crate) fn total_cmp<T: Element>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Converts an `f64` engine result back to the caller's element type and rank.
pub(crate) fn cast_dyn<T: Element, D: Dimension>(values: ArrayD<f64>) -> Result<Array<T, D>> {
    Ok(values.mapv(T::from_f64).into_dimensionality::<D>()?)
}

/// Copies a dynamic-rank result into the caller's typed array of rank `D`.
pub(crate) fn into_rank<T: Clone, D: Dimension>(values: ArrayD<T>) -> Result<Array<T, D>> {
    Ok(values.into_dimensionality::<D>()?)
}

/// Casts `values` into a caller-supplied output buffer.
///
/// The buffer is left untouched when its shape differs from the result.
pub(crate) fn write_output<S: Element, O: Element, D: Dimension>(
    values: &ArrayD<S>,
    output: &mut ArrayViewMut<O, D>,
) -> Result<()> {
    if values.shape() != output.shape() {
        return Err(NdImageError::OutputShape {
            expected: values.shape().to_vec(),
            found: output.shape().to_vec(),
        });
    }
    Zip::from(output.view_mut().into_dyn())
        .and(values)
        .for_each(|o, &v| *o = O::from_f64(v.to_f64()));
    Ok(())
}
