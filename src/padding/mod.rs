//! Boundary extension of N-dimensional arrays.
//!
//! Every windowed engine reads its neighborhoods from an extended copy of the
//! input built here, so the boundary policy is applied exactly once per call.

use ndarray::{Array, ArrayBase, Data, Dimension, Slice};

use crate::{BoundaryMode, Element, NdImageError, Result};

mod dim;
mod half_dim;

/// Amount of padding `[front, back]` for each axis.
pub type ExplicitPadding<const N: usize> = [[usize; 2]; N];

impl BoundaryMode {
    /// Maps an index along an axis of length `len` into `0..len`.
    ///
    /// Returns `None` when the read has to be synthesized from the constant
    /// fill value instead (constant mode, or an empty axis).
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if (0..len as isize).contains(&i) {
            return Some(i as usize);
        }

        let n = len as isize;
        match self {
            BoundaryMode::Constant(_) => None,
            BoundaryMode::Nearest => Some(i.clamp(0, n - 1) as usize),
            BoundaryMode::Wrap => Some(i.rem_euclid(n) as usize),
            BoundaryMode::Reflect => {
                let k = i.rem_euclid(2 * n);
                Some(if k >= n { 2 * n - 1 - k } else { k } as usize)
            }
        }
    }

    /// The value synthesized for reads outside the array in constant mode.
    #[inline]
    pub fn cval(&self) -> f64 {
        match self {
            BoundaryMode::Constant(c) => *c,
            _ => 0.0,
        }
    }
}

pub trait PaddingExt<T: Element, D: Dimension> {
    /// Returns a copy of `self` extended by `explicit_padding[axis] = [front, back]`
    /// cells along every axis, with the new cells synthesized by `mode`.
    fn padding(&self, mode: BoundaryMode, explicit_padding: &[[usize; 2]]) -> Result<Array<T, D>>;
}

impl<T, S, D> PaddingExt<T, D> for ArrayBase<S, D>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
{
    fn padding(&self, mode: BoundaryMode, explicit_padding: &[[usize; 2]]) -> Result<Array<T, D>> {
        if explicit_padding.len() != self.ndim() {
            return Err(NdImageError::RankMismatch {
                expected: self.ndim(),
                found: explicit_padding.len(),
            });
        }

        let fill = T::from_f64(mode.cval());
        let mut output = padding_const(self, explicit_padding, fill);
        if self.is_empty() {
            return Ok(output);
        }

        explicit_padding
            .iter()
            .enumerate()
            .for_each(|(axis, &padding)| {
                let len = self.len_of(ndarray::Axis(axis));
                match mode {
                    BoundaryMode::Constant(_) => dim::constant(len, &mut output, axis, padding, fill),
                    BoundaryMode::Nearest => dim::nearest(len, &mut output, axis, padding),
                    BoundaryMode::Reflect => dim::reflect(len, &mut output, axis, padding),
                    BoundaryMode::Wrap => dim::wrap(len, &mut output, axis, padding),
                }
            });

        Ok(output)
    }
}

/// Allocates the extended buffer filled with `const_value` and copies `input`
/// into its interior.
fn padding_const<T, S, D>(
    input: &ArrayBase<S, D>,
    explicit_padding: &[[usize; 2]],
    const_value: T,
) -> Array<T, D>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut output_dim = input.raw_dim();
    output_dim
        .slice_mut()
        .iter_mut()
        .zip(explicit_padding)
        .for_each(|(d, p)| *d += p[0] + p[1]);

    let mut output = Array::from_elem(output_dim, const_value);

    output
        .slice_each_axis_mut(|ax| {
            let front = explicit_padding[ax.axis.index()][0];
            Slice::from(front..front + input.len_of(ax.axis))
        })
        .assign(input);

    output
}
