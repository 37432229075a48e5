//! Correlation and convolution with arbitrary weights.
//!
//! Every output cell is the weighted sum of the input neighborhood covered by
//! the weights array, accumulated in `f64`. Convolution is correlation with
//! the weights point-reflected through their origin.

use ndarray::{prelude::*, Data, IntoDimension, Ix};

use crate::{
    element::{cast_dyn, write_output},
    footprint::{check_axis, line_origin, line_shape, sweep, IntoOrigin, Kernel},
    BoundaryMode, Element, NdImageError, Result,
};


/// Builds the correlation kernel for an N-D weights array.
pub(crate) fn weights_kernel<W, SW, D>(
    weights: &ArrayBase<SW, D>,
    origin: &[isize],
) -> Result<Kernel<f64>>
where
    W: Element,
    SW: Data<Elem = W>,
    D: Dimension,
{
    if weights.is_empty() {
        return Err(NdImageError::EmptyWeights);
    }
    Kernel::new(weights.mapv(|w| w.to_f64()).into_dyn(), origin)
}

/// Builds the kernel of a 1-D weights vector laid along `axis`.
pub(crate) fn line_kernel(
    weights: &[f64],
    ndim: usize,
    axis: usize,
    origin: isize,
) -> Result<Kernel<f64>> {
    if weights.is_empty() {
        return Err(NdImageError::EmptyWeights);
    }
    let kernel = ArrayD::from_shape_vec(line_shape(ndim, axis, weights.len()), weights.to_vec())?;
    Kernel::new(kernel, &line_origin(ndim, axis, origin))
}

/// The correlation engine: `out[i] = Σ_j w[j] · in[i + j - front]`.
pub(crate) fn correlate_dyn<T: Element>(
    input: &ArrayViewD<T>,
    kernel: &Kernel<f64>,
    mode: BoundaryMode,
) -> Result<ArrayD<f64>> {
    sweep(
        input,
        kernel,
        mode,
        |w| *w != 0.0,
        |data, base, offset_list| {
            offset_list
                .iter()
                .map(|(offset, w)| data[base + offset].to_f64() * w)
                .sum()
        },
    )
}

/// Correlates `input` with `weights` along one axis.
pub(crate) fn correlate1d_dyn<T: Element>(
    input: &ArrayViewD<T>,
    weights: &[f64],
    axis: usize,
    mode: BoundaryMode,
    origin: isize,
) -> Result<ArrayD<f64>> {
    let kernel = line_kernel(weights, input.ndim(), axis, origin)?;
    correlate_dyn(input, &kernel, mode)
}

pub trait CorrelateExt<T: Element, const N: usize> {
    /// Multidimensional correlation.
    ///
    /// # Arguments
    ///
    /// * `weights`: A non-empty weights array of the same rank as `self`.
    /// * `mode`: How reads outside `self` are synthesized.
    /// * `origin`: A scalar or per-axis shift of the weights relative to the
    ///   output cell; `0` centers them.
    fn correlate<W: Element, SW: Data<Elem = W>>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Multidimensional convolution, i.e. correlation with the weights reversed
    /// along every axis.
    fn convolve<W: Element, SW: Data<Elem = W>>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Correlation along `axis` with a 1-D weights vector. A negative `axis`
    /// counts from the last one.
    fn correlate1d(
        &self,
        weights: &[f64],
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Convolution along `axis` with a 1-D weights vector.
    fn convolve1d(
        &self,
        weights: &[f64],
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// [`CorrelateExt::correlate`] writing into `output`, cast to its element type.
    fn correlate_into<W: Element, SW: Data<Elem = W>, O: Element>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()>;

    /// [`CorrelateExt::convolve`] writing into `output`, cast to its element type.
    fn convolve_into<W: Element, SW: Data<Elem = W>, O: Element>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()>;
}

impl<T, S, const N: usize> CorrelateExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn correlate<W: Element, SW: Data<Elem = W>>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "correlate: shape {:?}, weights {:?}, mode {:?}",
            self.shape(),
            weights.shape(),
            mode
        );
        let kernel = weights_kernel(weights, &origin.into_origin())?;
        cast_dyn(correlate_dyn(&self.view().into_dyn(), &kernel, mode)?)
    }

    fn convolve<W: Element, SW: Data<Elem = W>>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "convolve: shape {:?}, weights {:?}, mode {:?}",
            self.shape(),
            weights.shape(),
            mode
        );
        let kernel = weights_kernel(weights, &origin.into_origin())?.reflect();
        cast_dyn(correlate_dyn(&self.view().into_dyn(), &kernel, mode)?)
    }

    fn correlate1d(
        &self,
        weights: &[f64],
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "correlate1d: shape {:?}, {} weights along axis {}",
            self.shape(),
            weights.len(),
            axis
        );
        let axis = check_axis(axis, N)?;
        cast_dyn(correlate1d_dyn(
            &self.view().into_dyn(),
            weights,
            axis,
            mode,
            origin,
        )?)
    }

    fn convolve1d(
        &self,
        weights: &[f64],
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "convolve1d: shape {:?}, {} weights along axis {}",
            self.shape(),
            weights.len(),
            axis
        );
        let axis = check_axis(axis, N)?;
        let kernel = line_kernel(weights, N, axis, origin)?.reflect();
        cast_dyn(correlate_dyn(&self.view().into_dyn(), &kernel, mode)?)
    }

    fn correlate_into<W: Element, SW: Data<Elem = W>, O: Element>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()> {
        let kernel = weights_kernel(weights, &origin.into_origin())?;
        let res = correlate_dyn(&self.view().into_dyn(), &kernel, mode)?;
        write_output(&res, output)
    }

    fn convolve_into<W: Element, SW: Data<Elem = W>, O: Element>(
        &self,
        weights: &ArrayBase<SW, Dim<[Ix; N]>>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()> {
        let kernel = weights_kernel(weights, &origin.into_origin())?.reflect();
        let res = correlate_dyn(&self.view().into_dyn(), &kernel, mode)?;
        write_output(&res, output)
    }
}
