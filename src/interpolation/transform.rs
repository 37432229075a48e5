//! Evaluation of a spline at arbitrary input coordinates.

use ndarray::{ArrayD, IxDyn, Zip};

use super::spline::{bspline, Extension};
use crate::{
    footprint::{raster_positions, raster_strides, unravel},
    BoundaryMode, Element,
};

/// Tolerance for coordinates that land just outside the input in constant mode.
const EPS: f64 = 1e-9;

/// Evaluates the spline of `order` with the given coefficients.
pub(crate) struct Sampler {
    coefficients: Vec<f64>,
    shape: Vec<usize>,
    strides: Vec<usize>,
    order: usize,
    mode: BoundaryMode,
    extension: Extension,
}

impl Sampler {
    pub(crate) fn new(coefficients: ArrayD<f64>, order: usize, mode: BoundaryMode) -> Self {
        let shape = coefficients.shape().to_vec();
        let strides = raster_strides(&shape);
        Self {
            coefficients: coefficients.iter().copied().collect(),
            shape,
            strides,
            order,
            mode,
            extension: Extension::of(mode),
        }
    }

    /// Brings `c` into the interpolation domain of an axis of `len` cells, or
    /// returns `None` when the fill value applies.
    fn resolve(&self, c: f64, len: usize) -> Option<f64> {
        let n = len as f64;
        match self.mode {
            BoundaryMode::Constant(_) => (c >= -EPS && c < n - EPS).then(|| c.max(0.0)),
            BoundaryMode::Nearest => Some(c.clamp(0.0, n - 1.0)),
            BoundaryMode::Wrap => Some(c.rem_euclid(n)),
            BoundaryMode::Reflect => {
                let t = (c + 0.5).rem_euclid(2.0 * n);
                Some(if t >= n { 2.0 * n - t } else { t } - 0.5)
            }
        }
    }

    /// Value of the spline at `coords`, one per input axis.
    pub(crate) fn sample(&self, coords: &[f64]) -> f64 {
        if self.coefficients.is_empty() {
            return self.mode.cval();
        }

        let support = self.order + 1;
        let ndim = self.shape.len();
        let mut offsets = Vec::with_capacity(ndim * support);
        let mut weights = Vec::with_capacity(ndim * support);
        for ((&c, &len), &stride) in coords.iter().zip(&self.shape).zip(&self.strides) {
            let Some(c) = self.resolve(c, len) else {
                return self.mode.cval();
            };
            // odd orders start left of c, even orders at its nearest cell
            let nearest = if self.order % 2 == 1 {
                c.floor()
            } else {
                (c + 0.5).floor()
            };
            let start = nearest as isize - (self.order / 2) as isize;
            for k in 0..support {
                let i = start + k as isize;
                offsets.push(self.extension.index(i, len) * stride);
                weights.push(bspline(self.order, c - i as f64));
            }
        }

        let mut counter = vec![0; ndim];
        let mut total = 0.0;
        loop {
            let mut offset = 0;
            let mut weight = 1.0;
            for (axis, &k) in counter.iter().enumerate() {
                offset += offsets[axis * support + k];
                weight *= weights[axis * support + k];
            }
            total += weight * self.coefficients[offset];

            let mut axis = ndim;
            loop {
                if axis == 0 {
                    return total;
                }
                axis -= 1;
                counter[axis] += 1;
                if counter[axis] < support {
                    break;
                }
                counter[axis] = 0;
            }
        }
    }
}

/// Samples `sampler` at `map(out_index)` for every cell of an output of `shape`.
pub(crate) fn resample_dyn<T, F, const N: usize>(sampler: &Sampler, shape: &[usize], map: F) -> ArrayD<T>
where
    T: Element,
    F: Fn(&[usize]) -> [f64; N] + Sync,
{
    let mut out = ArrayD::from_elem(IxDyn(shape), T::default());
    let raster = raster_strides(shape);
    Zip::from(&mut out)
        .and(&raster_positions(IxDyn(shape)))
        .par_for_each(|o, &p| {
            let mut index = vec![0; raster.len()];
            unravel(p, &raster, &mut index);
            *o = T::round_from_f64(sampler.sample(&map(&index)));
        });
    out
}

/// Rotation of the plane `(a0, a1)` by `angle` radians, as rows of the matrix
/// mapping output to input coordinates.
pub(crate) fn plane_rotation(angle: f64) -> [[f64; 2]; 2] {
    let (s, c) = angle.sin_cos();
    [[c, s], [-s, c]]
}

/// Extent of the rotated `[rows, cols]` plane, large enough to hold all of it.
pub(crate) fn rotated_extent(rotation: &[[f64; 2]; 2], rows: usize, cols: usize) -> [usize; 2] {
    let (rows, cols) = (rows as f64, cols as f64);
    let corners = [[0.0, 0.0], [0.0, cols], [rows, 0.0], [rows, cols]];
    let mut extent = [0; 2];
    for (axis, e) in extent.iter_mut().enumerate() {
        let projected = corners.iter().map(|p| rotation[axis][0] * p[0] + rotation[axis][1] * p[1]);
        let (lo, hi) = projected.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        *e = (hi - lo + 0.5) as usize;
    }
    extent
}
