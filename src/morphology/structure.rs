//! Structuring element generators.

use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension, IxDyn, Slice};

use super::{binary, Iterations};
use crate::{footprint::Kernel, IntoOrigin, NdImageError, Result};

/// Returns a `3^rank` boolean structure whose cells lie within `connectivity`
/// axis steps of the center.
///
/// A connectivity of 1 gives the face neighbors only, a connectivity of `rank`
/// (or more) gives the full box. Values below 1 are treated as 1.
///
/// ```rust
/// use ndarray::array;
/// use ndarray_ndimage::generate_binary_structure;
///
/// let cross = generate_binary_structure(2, 1);
/// assert_eq!(
///     cross,
///     array![[false, true, false], [true, true, true], [false, true, false]].into_dyn()
/// );
/// ```
pub fn generate_binary_structure(rank: usize, connectivity: usize) -> ArrayD<bool> {
    let connectivity = connectivity.max(1);
    ArrayD::from_shape_fn(IxDyn(&vec![3; rank]), |index| {
        index.slice().iter().filter(|&&i| i != 1).count() <= connectivity
    })
}

/// Dilates `structure` with itself `iterations - 1` times.
///
/// The result has extent `iterations * (len - 1) + 1` along every axis, which is
/// the structure equivalent to applying `structure` `iterations` times in a row.
pub fn iterate_structure<S, D>(structure: &ArrayBase<S, D>, iterations: usize) -> Result<Array<bool, D>>
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    if structure.is_empty() {
        return Err(NdImageError::EmptyFootprint);
    }
    if iterations < 2 {
        return Ok(structure.to_owned());
    }

    let ni = iterations - 1;
    let shape: Vec<usize> = structure.shape().iter().map(|&s| s + ni * (s - 1)).collect();
    let mut seed = ArrayD::from_elem(IxDyn(&shape), false);
    seed.slice_each_axis_mut(|ax| {
        let len = structure.len_of(ax.axis);
        let start = ni * (len / 2);
        Slice::from(start..start + len)
    })
    .assign(&structure.view().into_dyn());

    let kernel = Kernel::new(
        structure.to_owned().into_dyn(),
        &vec![0; structure.ndim()],
    )?
    .reflect();
    let out = binary::iterate(seed, &kernel, false, true, Iterations::Count(ni), None)?;
    Ok(out.into_dimensionality::<D>()?)
}

/// The origin matching [`iterate_structure`] for a structure used with `origin`.
pub fn iterated_origin<const N: usize>(origin: impl IntoOrigin<N>, iterations: usize) -> [isize; N] {
    origin.into_origin().map(|o| o * iterations as isize)
}
