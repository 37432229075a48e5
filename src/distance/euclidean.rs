//! Exact Euclidean distance transform by lower envelopes of parabolas.
//!
//! The squared distance separates into one term per axis, so the transform is
//! a one-dimensional minimization along every axis in turn, each carrying the
//! flat index of the background cell that attains the minimum.

use ndarray::{ArrayD, ArrayViewMut1, Axis, Dimension, Zip};

use crate::footprint::raster_strides;

/// Squared distances to the nearest `false` cell and the flat index of that
/// cell, for every cell of `foreground`.
pub(crate) fn transform<const N: usize>(foreground: &ArrayD<bool>, sampling: &[f64; N]) -> (ArrayD<f64>, ArrayD<usize>) {
    let mut squared = foreground.mapv(|f| if f { f64::INFINITY } else { 0.0 });
    let strides = raster_strides(foreground.shape());
    let mut nearest = ArrayD::from_shape_fn(foreground.raw_dim(), |index| {
        index.slice().iter().zip(&strides).map(|(i, s)| i * s).sum::<usize>()
    });

    for (axis, &h) in sampling.iter().enumerate() {
        Zip::from(squared.lanes_mut(Axis(axis)))
            .and(nearest.lanes_mut(Axis(axis)))
            .par_for_each(|f, n| envelope(f, n, h));
    }
    (squared, nearest)
}

/// Replaces `f[p]` by `min_q (p - q)^2 h^2 + f[q]`, and `n[p]` by `n[q]` for
/// the minimizing `q`. Lanes without a finite value are left alone.
fn envelope(mut f: ArrayViewMut1<f64>, mut n: ArrayViewMut1<usize>, h: f64) {
    let values = f.to_vec();
    let owners = n.to_vec();

    // sites of the parabolas on the envelope and the left end of each one's range
    let mut sites: Vec<usize> = Vec::with_capacity(values.len());
    let mut starts: Vec<f64> = Vec::with_capacity(values.len());
    for (q, &fq) in values.iter().enumerate() {
        if !fq.is_finite() {
            continue;
        }
        let xq = q as f64 * h;
        let mut start = f64::NEG_INFINITY;
        while let Some(&v) = sites.last() {
            let xv = v as f64 * h;
            start = ((fq + xq * xq) - (values[v] + xv * xv)) / (2.0 * (xq - xv));
            if start <= starts[starts.len() - 1] {
                sites.pop();
                starts.pop();
                start = f64::NEG_INFINITY;
            } else {
                break;
            }
        }
        sites.push(q);
        starts.push(start);
    }
    if sites.is_empty() {
        return;
    }

    let mut k = 0;
    for (p, (fp, np)) in f.iter_mut().zip(n.iter_mut()).enumerate() {
        let xp = p as f64 * h;
        while k + 1 < sites.len() && starts[k + 1] < xp {
            k += 1;
        }
        let q = sites[k];
        let d = xp - q as f64 * h;
        *fp = d * d + values[q];
        *np = owners[q];
    }
}
