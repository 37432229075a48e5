//! Spline interpolation and geometric transforms.
//!
//! Every transform maps each output coordinate to an input coordinate and
//! evaluates a B-spline of the requested order there. Orders above 1 need the
//! input turned into spline coefficients first, which is done automatically
//! unless [`Resample::prefilter`] is switched off.

use ndarray::{prelude::*, Data, IntoDimension, Ix, RemoveAxis, Zip};

use crate::{
    element::into_rank,
    footprint::{check_axis, PerAxis},
    BoundaryMode, Element, NdImageError, Result,
};

mod spline;
mod transform;

use spline::{check_order, filter_axis, spline_filter_dyn, Extension};
use transform::{plane_rotation, resample_dyn, rotated_extent, Sampler};

#[cfg(test)]
mod tests;

/// Interpolation settings shared by the geometric transforms.
///
/// Defaults to cubic splines, prefiltering on, and zero outside the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resample {
    order: usize,
    mode: BoundaryMode,
    prefilter: bool,
}

impl Default for Resample {
    fn default() -> Self {
        Self {
            order: 3,
            mode: BoundaryMode::Constant(0.0),
            prefilter: true,
        }
    }
}

impl Resample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spline order, `0` (nearest) to `5`.
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn mode(mut self, mode: BoundaryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether the input holds samples (`true`) or ready-made spline
    /// coefficients, as returned by [`InterpolationExt::spline_filter`].
    ///
    /// Prefiltering continues the input past its ends the way `mode` does:
    /// periodically for [`BoundaryMode::Wrap`], mirrored about the edge for
    /// [`BoundaryMode::Reflect`] and mirrored about the edge cells otherwise.
    /// [`InterpolationExt::spline_filter`] always uses the last of these.
    pub fn prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }
}

/// Linear part of an affine transform from `M` output axes to `N` input axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AffineMatrix<const N: usize, const M: usize> {
    /// One scale factor per axis. Only valid when `N == M`.
    Diagonal([f64; N]),
    /// `N` rows of `M` columns.
    Full([[f64; M]; N]),
}

impl<const N: usize, const M: usize> AffineMatrix<N, M> {
    /// `self · out + offset`.
    fn apply(&self, out: &[usize], offset: &[f64; N]) -> [f64; N] {
        let mut coords = *offset;
        match self {
            AffineMatrix::Diagonal(scale) => {
                for ((c, &s), &o) in coords.iter_mut().zip(scale).zip(out) {
                    *c += s * o as f64;
                }
            }
            AffineMatrix::Full(rows) => {
                for (c, row) in coords.iter_mut().zip(rows) {
                    *c += row.iter().zip(out).map(|(&m, &o)| m * o as f64).sum::<f64>();
                }
            }
        }
        coords
    }
}

/// The spline sampler for `input`, prefiltered as requested.
fn sampler<T: Element>(input: &ArrayViewD<T>, resample: &Resample) -> Result<Sampler> {
    check_order(resample.order)?;
    let coefficients = if resample.prefilter && resample.order > 1 {
        spline_filter_dyn(input, resample.order, Extension::of(resample.mode))?
    } else {
        input.mapv(|v| v.to_f64())
    };
    Ok(Sampler::new(coefficients, resample.order, resample.mode))
}

fn affine_dyn<T: Element, const N: usize, const M: usize>(
    input: &ArrayViewD<T>,
    matrix: &AffineMatrix<N, M>,
    offset: &[f64; N],
    output_shape: &[usize],
    resample: &Resample,
) -> Result<ArrayD<T>> {
    if matches!(matrix, AffineMatrix::Diagonal(_)) && N != M {
        return Err(NdImageError::RankMismatch {
            expected: N,
            found: M,
        });
    }
    let sampler = sampler(input, resample)?;
    Ok(resample_dyn(&sampler, output_shape, |out| {
        matrix.apply(out, offset)
    }))
}

pub trait InterpolationExt<T: Element, const N: usize> {
    /// B-spline coefficients of `self` along one axis.
    fn spline_filter1d(&self, order: usize, axis: isize) -> Result<Array<f64, Dim<[Ix; N]>>>;

    /// B-spline coefficients of `self` along every axis. Evaluating the spline
    /// at the integer coordinates gives back the samples.
    fn spline_filter(&self, order: usize) -> Result<Array<f64, Dim<[Ix; N]>>>;

    /// Resamples `self` at `mapping(out_index)` for every cell of an output of
    /// `output_shape`.
    ///
    /// ```rust
    /// use ndarray::array;
    /// use ndarray_ndimage::{InterpolationExt, Resample};
    ///
    /// let data = array![1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 4.0];
    /// let res = data
    ///     .geometric_transform(|[i]| [2.0 * i as f64], [4], &Resample::new().order(1))
    ///     .unwrap();
    /// assert_eq!(res, array![1.0, 2.0, 3.0, 4.0]);
    /// ```
    fn geometric_transform<F, const M: usize>(
        &self,
        mapping: F,
        output_shape: [usize; M],
        resample: &Resample,
    ) -> Result<Array<T, Dim<[Ix; M]>>>
    where
        F: FnMut([usize; M]) -> [f64; N],
        Dim<[Ix; M]>: Dimension,
        [Ix; M]: IntoDimension<Dim = Dim<[Ix; M]>>;

    /// Resamples `self` at explicit coordinates. The leading axis of
    /// `coordinates` holds one entry per input axis; the rest is the output shape.
    fn map_coordinates<S2, D2>(
        &self,
        coordinates: &ArrayBase<S2, D2>,
        resample: &Resample,
    ) -> Result<Array<T, D2::Smaller>>
    where
        S2: Data<Elem = f64>,
        D2: RemoveAxis;

    /// Resamples `self` at `matrix · out + offset`.
    fn affine_transform<const M: usize>(
        &self,
        matrix: &AffineMatrix<N, M>,
        offset: [f64; N],
        output_shape: [usize; M],
        resample: &Resample,
    ) -> Result<Array<T, Dim<[Ix; M]>>>
    where
        Dim<[Ix; M]>: Dimension,
        [Ix; M]: IntoDimension<Dim = Dim<[Ix; M]>>;

    /// Moves the content of `self` by `shift` cells: `out[x] = in[x - shift]`.
    fn shift(&self, shift: impl PerAxis<f64, N>, resample: &Resample) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Rescales `self` by `zoom`. The output extent is the rounded product of
    /// the input extent and the factor.
    fn zoom(&self, zoom: impl PerAxis<f64, N>, resample: &Resample) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Rotates the plane spanned by `axes` (the last two by default) by
    /// `angle` degrees about the array center.
    ///
    /// With `reshape` the output plane grows to hold the whole rotated input,
    /// otherwise it keeps the input shape.
    fn rotate(
        &self,
        angle: f64,
        axes: Option<[isize; 2]>,
        reshape: bool,
        resample: &Resample,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;
}

impl<T, S, const N: usize> InterpolationExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn spline_filter1d(&self, order: usize, axis: isize) -> Result<Array<f64, Dim<[Ix; N]>>> {
        log::debug!(
            "spline_filter1d: shape {:?}, order {}, axis {}",
            self.shape(),
            order,
            axis
        );
        check_order(order)?;
        let axis = check_axis(axis, N)?;
        let mut coefficients = self.view().into_dyn().mapv(|v| v.to_f64());
        if order > 1 {
            filter_axis(&mut coefficients, order, axis, Extension::Mirror);
        }
        into_rank(coefficients)
    }

    fn spline_filter(&self, order: usize) -> Result<Array<f64, Dim<[Ix; N]>>> {
        log::debug!("spline_filter: shape {:?}, order {}", self.shape(), order);
        into_rank(spline_filter_dyn(&self.view().into_dyn(), order, Extension::Mirror)?)
    }

    fn geometric_transform<F, const M: usize>(
        &self,
        mut mapping: F,
        output_shape: [usize; M],
        resample: &Resample,
    ) -> Result<Array<T, Dim<[Ix; M]>>>
    where
        F: FnMut([usize; M]) -> [f64; N],
        Dim<[Ix; M]>: Dimension,
        [Ix; M]: IntoDimension<Dim = Dim<[Ix; M]>>,
    {
        log::debug!(
            "geometric_transform: shape {:?} -> {:?}, {:?}",
            self.shape(),
            output_shape,
            resample
        );
        let sampler = sampler(&self.view().into_dyn(), resample)?;
        // the mapping may carry state, so coordinates are gathered in order first
        let coordinates = ArrayD::from_shape_fn(IxDyn(&output_shape), |index| {
            let mut out = [0; M];
            out.copy_from_slice(index.slice());
            mapping(out)
        });
        let res = Zip::from(&coordinates).par_map_collect(|c| T::round_from_f64(sampler.sample(c)));
        into_rank(res)
    }

    fn map_coordinates<S2, D2>(
        &self,
        coordinates: &ArrayBase<S2, D2>,
        resample: &Resample,
    ) -> Result<Array<T, D2::Smaller>>
    where
        S2: Data<Elem = f64>,
        D2: RemoveAxis,
    {
        log::debug!(
            "map_coordinates: shape {:?}, coordinates {:?}",
            self.shape(),
            coordinates.shape()
        );
        let found = coordinates.shape().first().copied().unwrap_or(0);
        if coordinates.ndim() == 0 || found != N {
            return Err(NdImageError::RankMismatch { expected: N, found });
        }
        let sampler = sampler(&self.view().into_dyn(), resample)?;
        Ok(Zip::from(coordinates.lanes(Axis(0))).par_map_collect(|lane| {
            let c = lane.to_vec();
            T::round_from_f64(sampler.sample(&c))
        }))
    }

    fn affine_transform<const M: usize>(
        &self,
        matrix: &AffineMatrix<N, M>,
        offset: [f64; N],
        output_shape: [usize; M],
        resample: &Resample,
    ) -> Result<Array<T, Dim<[Ix; M]>>>
    where
        Dim<[Ix; M]>: Dimension,
        [Ix; M]: IntoDimension<Dim = Dim<[Ix; M]>>,
    {
        log::debug!(
            "affine_transform: shape {:?} -> {:?}, {:?}",
            self.shape(),
            output_shape,
            resample
        );
        into_rank(affine_dyn(
            &self.view().into_dyn(),
            matrix,
            &offset,
            &output_shape,
            resample,
        )?)
    }

    fn shift(&self, shift: impl PerAxis<f64, N>, resample: &Resample) -> Result<Array<T, Dim<[Ix; N]>>> {
        let shift = shift.per_axis();
        log::debug!("shift: shape {:?}, shift {:?}", self.shape(), shift);
        let matrix = AffineMatrix::<N, N>::Diagonal([1.0; N]);
        into_rank(affine_dyn(
            &self.view().into_dyn(),
            &matrix,
            &shift.map(|s| -s),
            self.shape(),
            resample,
        )?)
    }

    fn zoom(&self, zoom: impl PerAxis<f64, N>, resample: &Resample) -> Result<Array<T, Dim<[Ix; N]>>> {
        let zoom = zoom.per_axis();
        log::debug!("zoom: shape {:?}, zoom {:?}", self.shape(), zoom);

        let mut output_shape = [0; N];
        let mut scale = [0.0; N];
        for (axis, (&len, &factor)) in self.shape().iter().zip(&zoom).enumerate() {
            let out = (len as f64 * factor).round().max(0.0) as usize;
            output_shape[axis] = out;
            if out > 0 {
                scale[axis] = len as f64 / out as f64;
            }
        }
        into_rank(affine_dyn(
            &self.view().into_dyn(),
            &AffineMatrix::<N, N>::Diagonal(scale),
            &[0.0; N],
            &output_shape,
            resample,
        )?)
    }

    fn rotate(
        &self,
        angle: f64,
        axes: Option<[isize; 2]>,
        reshape: bool,
        resample: &Resample,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "rotate: shape {:?}, angle {}, axes {:?}, reshape {}",
            self.shape(),
            angle,
            axes,
            reshape
        );
        if N < 2 {
            return Err(NdImageError::UnsupportedRank(N));
        }
        let [a, b] = axes.unwrap_or([-2, -1]);
        let (a, b) = (check_axis(a, N)?, check_axis(b, N)?);
        if a == b {
            return Err(NdImageError::DuplicateAxis(a));
        }
        let plane = [a.min(b), a.max(b)];

        let shape = self.shape();
        let rotation = plane_rotation(angle.to_radians());
        let mut output_shape = [0; N];
        output_shape.copy_from_slice(shape);
        if reshape {
            let extent = rotated_extent(&rotation, shape[plane[0]], shape[plane[1]]);
            output_shape[plane[0]] = extent[0];
            output_shape[plane[1]] = extent[1];
        }

        let mut matrix = [[0.0; N]; N];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        let mut offset = [0.0; N];
        for (i, &ai) in plane.iter().enumerate() {
            let mut rotated_center = 0.0;
            for (j, &aj) in plane.iter().enumerate() {
                matrix[ai][aj] = rotation[i][j];
                rotated_center += rotation[i][j] * (output_shape[aj] as f64 - 1.0) / 2.0;
            }
            offset[ai] = (shape[ai] as f64 - 1.0) / 2.0 - rotated_center;
        }

        into_rank(affine_dyn(
            &self.view().into_dyn(),
            &AffineMatrix::Full(matrix),
            &offset,
            &output_shape,
            resample,
        )?)
    }
}
