//! Binary erosion and dilation passes.

use ndarray::{ArrayD, ArrayViewD, Zip};

use super::Iterations;
use crate::{
    footprint::{sweep, Kernel},
    BoundaryMode, Element, Result,
};

/// One erosion (all selected cells set) or dilation (any selected cell set)
/// pass. Cells outside the input read as `border`.
///
/// For a dilation, `kernel` must already be reflected through its origin.
pub(crate) fn pass(
    input: &ArrayViewD<bool>,
    kernel: &Kernel<bool>,
    border: bool,
    dilate: bool,
) -> Result<ArrayD<bool>> {
    let mode = BoundaryMode::Constant(border.to_f64());
    sweep(input, kernel, mode, |b| *b, move |data, base, offset_list| {
        if dilate {
            offset_list.iter().any(|(o, _)| data[base + o])
        } else {
            offset_list.iter().all(|(o, _)| data[base + o])
        }
    })
}

/// Repeats [`pass`] as requested by `iterations`.
///
/// Cells where `mask` is false keep their value from `input` after every pass.
/// Iteration stops early once a pass leaves the array unchanged.
pub(crate) fn iterate(
    input: ArrayD<bool>,
    kernel: &Kernel<bool>,
    border: bool,
    dilate: bool,
    iterations: Iterations,
    mask: Option<&ArrayViewD<bool>>,
) -> Result<ArrayD<bool>> {
    let (limit, until_stable) = match iterations {
        Iterations::Count(n) if n > 0 => (n, false),
        _ => (input.len() + 1, true),
    };

    let mut current = input.clone();
    for step in 0..limit {
        let mut next = pass(&current.view(), kernel, border, dilate)?;
        if let Some(mask) = mask {
            Zip::from(&mut next)
                .and(mask)
                .and(&input)
                .for_each(|n, &m, &i| {
                    if !m {
                        *n = i;
                    }
                });
        }
        if next == current {
            log::trace!("binary morphology stable after {} passes", step + 1);
            return Ok(next);
        }
        current = next;
    }

    if until_stable {
        log::warn!(
            "binary morphology did not reach a fixed point after {} passes",
            limit
        );
    }
    Ok(current)
}
