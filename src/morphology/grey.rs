//! Grey erosion and dilation, optionally with additive structure weights.

use std::cmp::Ordering;

use ndarray::{ArrayD, ArrayViewD, Zip};

use crate::{
    footprint::{sweep, Kernel},
    rank::extremum_dyn,
    BoundaryMode, Element, Result,
};

/// Minimum of `input - structure` (erosion) or maximum of `input + structure`
/// (dilation) over `mask`. Dilation reflects the neighborhood through `origin`.
pub(crate) fn grey_dyn<T: Element>(
    input: &ArrayViewD<T>,
    mask: &ArrayD<bool>,
    structure: Option<&ArrayD<f64>>,
    origin: &[isize],
    mode: BoundaryMode,
    dilate: bool,
) -> Result<ArrayD<T>> {
    let Some(structure) = structure else {
        let mut kernel = Kernel::new(mask.clone(), origin)?;
        if dilate {
            kernel = kernel.reflect();
        }
        let keep = if dilate {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        return extremum_dyn(input, &kernel, mode, keep);
    };

    let weights = Zip::from(mask)
        .and(structure)
        .map_collect(|&m, &w| m.then_some(w));
    let mut kernel = Kernel::new(weights, origin)?;
    if dilate {
        kernel = kernel.reflect();
    }

    sweep(input, &kernel, mode, Option::is_some, move |data, base, offset_list| {
        let values = offset_list.iter().filter_map(|(o, w)| {
            w.map(|w| {
                let v = data[base + o].to_f64();
                if dilate {
                    v + w
                } else {
                    v - w
                }
            })
        });
        let res = if dilate {
            values.fold(f64::NEG_INFINITY, f64::max)
        } else {
            values.fold(f64::INFINITY, f64::min)
        };
        T::from_f64(res)
    })
}
