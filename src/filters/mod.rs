//! Smoothing and derivative filters built from separable 1-D correlations.

use ndarray::{prelude::*, Data, IntoDimension, Ix};

use crate::{
    correlate::correlate1d_dyn,
    element::{cast_dyn, write_output},
    footprint::{check_axis, check_same_shape, IntoOrigin, PerAxis},
    BoundaryMode, Element, NdImageError, Result,
};


/// Gaussian kernels are cut off at this many standard deviations.
const TRUNCATE: f64 = 4.0;

/// Sigmas below this are treated as zero and skip their axis.
const MIN_SIGMA: f64 = 1e-15;

/// A 1-D pass of a separable filter: weights laid along `axis` with `origin`.
struct Pass {
    axis: usize,
    weights: Vec<f64>,
    origin: isize,
}

/// Weights of a sampled gaussian, or of its first, second or third derivative.
///
/// The kernel spans `int(4σ + 0.5)` cells on each side and the smoothing
/// kernel sums to one.
pub(crate) fn gaussian_kernel1d(sigma: f64, order: usize) -> Result<Vec<f64>> {
    if sigma.is_nan() || sigma < 0.0 {
        return Err(NdImageError::InvalidSigma(sigma));
    }
    if order > 3 {
        return Err(NdImageError::UnsupportedOrder(order));
    }

    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let var = sigma * sigma;
    let mut weights = vec![0.0; 2 * radius + 1];
    weights[radius] = 1.0;
    let mut sum = 1.0;
    for ii in 1..=radius {
        let x = ii as f64;
        let w = (-0.5 * x * x / var).exp();
        weights[radius + ii] = w;
        weights[radius - ii] = w;
        sum += 2.0 * w;
    }
    weights.iter_mut().for_each(|w| *w /= sum);

    match order {
        1 => {
            weights[radius] = 0.0;
            for ii in 1..=radius {
                let x = ii as f64;
                let w = x / var * weights[radius + ii];
                weights[radius + ii] = w;
                weights[radius - ii] = -w;
            }
        }
        2 => {
            weights[radius] *= -1.0 / var;
            for ii in 1..=radius {
                let x = ii as f64;
                let w = (x * x / var - 1.0) * weights[radius + ii] / var;
                weights[radius + ii] = w;
                weights[radius - ii] = w;
            }
        }
        3 => {
            weights[radius] = 0.0;
            for ii in 1..=radius {
                let x = ii as f64;
                let w = (3.0 - x * x / var) * x * weights[radius + ii] / (var * var);
                weights[radius + ii] = -w;
                weights[radius - ii] = w;
            }
        }
        _ => {}
    }
    Ok(weights)
}

/// Runs `passes` one after the other, accumulating in `f64`.
fn separable<T: Element>(
    input: &ArrayViewD<T>,
    passes: &[Pass],
    mode: BoundaryMode,
) -> Result<ArrayD<f64>> {
    let mut current: Option<ArrayD<f64>> = None;
    for pass in passes {
        let next = match &current {
            Some(c) => correlate1d_dyn(&c.view(), &pass.weights, pass.axis, mode, pass.origin)?,
            None => correlate1d_dyn(input, &pass.weights, pass.axis, mode, pass.origin)?,
        };
        current = Some(next);
    }
    Ok(current.unwrap_or_else(|| input.mapv(|v| v.to_f64())))
}

pub(crate) fn gaussian_dyn<T: Element>(
    input: &ArrayViewD<T>,
    sigmas: &[f64],
    orders: &[usize],
    mode: BoundaryMode,
) -> Result<ArrayD<f64>> {
    let mut passes = Vec::with_capacity(sigmas.len());
    for (axis, (&sigma, &order)) in sigmas.iter().zip(orders).enumerate() {
        let weights = gaussian_kernel1d(sigma, order)?;
        if sigma > MIN_SIGMA {
            passes.push(Pass {
                axis,
                weights,
                origin: 0,
            });
        }
    }
    separable(input, &passes, mode)
}

fn uniform_dyn<T: Element>(
    input: &ArrayViewD<T>,
    sizes: &[usize],
    mode: BoundaryMode,
    origins: &[isize],
) -> Result<ArrayD<f64>> {
    let passes: Vec<Pass> = sizes
        .iter()
        .zip(origins)
        .enumerate()
        .filter(|(_, (&size, _))| size > 1)
        .map(|(axis, (&size, &origin))| Pass {
            axis,
            weights: vec![1.0; size],
            origin,
        })
        .collect();
    // box sums first, one division at the end keeps integer means exact
    let count: usize = passes.iter().map(|p| p.weights.len()).product();
    let mut res = separable(input, &passes, mode)?;
    if count > 1 {
        let count = count as f64;
        res.mapv_inplace(|v| v / count);
    }
    Ok(res)
}

/// A derivative `[-1, 0, 1]` along `axis` and `smooth` along every other axis.
fn derivative_dyn<T: Element>(
    input: &ArrayViewD<T>,
    axis: usize,
    smooth: [f64; 3],
    mode: BoundaryMode,
) -> Result<ArrayD<f64>> {
    let passes: Vec<Pass> = (0..input.ndim())
        .map(|ax| Pass {
            axis: ax,
            weights: if ax == axis {
                vec![-1.0, 0.0, 1.0]
            } else {
                smooth.to_vec()
            },
            origin: 0,
        })
        .collect();
    separable(input, &passes, mode)
}

pub trait FilterExt<T: Element, const N: usize> {
    /// Gaussian filter, or one of its first three derivatives, along `axis`.
    ///
    /// # Arguments
    ///
    /// * `sigma`: Standard deviation of the gaussian, in cells.
    /// * `axis`: The axis to filter; negative values count from the last axis.
    /// * `order`: `0` smooths, `1..=3` convolve with that derivative of the gaussian.
    /// * `mode`: How reads outside `self` are synthesized.
    fn gaussian_filter1d(
        &self,
        sigma: f64,
        axis: isize,
        order: usize,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Multidimensional gaussian filter as a sequence of 1-D passes. Axes whose
    /// sigma is zero are left untouched.
    fn gaussian_filter(
        &self,
        sigma: impl PerAxis<f64, N>,
        order: impl PerAxis<usize, N>,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    fn gaussian_filter_into<O: Element>(
        &self,
        sigma: impl PerAxis<f64, N>,
        order: impl PerAxis<usize, N>,
        mode: BoundaryMode,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()>;

    /// Mean over a line of `size` cells along `axis`.
    fn uniform_filter1d(
        &self,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Mean over a box of `size` cells. Sizes of 0 or 1 leave their axis untouched.
    fn uniform_filter(
        &self,
        size: impl PerAxis<usize, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    fn uniform_filter_into<O: Element>(
        &self,
        size: impl PerAxis<usize, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()>;

    /// Prewitt derivative along `axis`.
    fn prewitt(&self, axis: isize, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Sobel derivative along `axis`.
    fn sobel(&self, axis: isize, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Sum of the `[1, -2, 1]` second differences along every axis.
    fn laplace(&self, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Sum over axes of a user-supplied second derivative.
    ///
    /// `derivative2(input, axis, mode)` receives the input as `f64` and must
    /// return an array of the same shape.
    fn generic_laplace<F>(&self, derivative2: F, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(
            ArrayView<f64, Dim<[Ix; N]>>,
            usize,
            BoundaryMode,
        ) -> Result<Array<f64, Dim<[Ix; N]>>>;

    /// Laplace filter using gaussian second derivatives.
    fn gaussian_laplace(
        &self,
        sigma: impl PerAxis<f64, N>,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// `sqrt(Σ d_axis²)` for a user-supplied first derivative, called the same
    /// way as in [`FilterExt::generic_laplace`].
    fn generic_gradient_magnitude<F>(
        &self,
        derivative: F,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(
            ArrayView<f64, Dim<[Ix; N]>>,
            usize,
            BoundaryMode,
        ) -> Result<Array<f64, Dim<[Ix; N]>>>;

    /// Gradient magnitude using gaussian first derivatives.
    fn gaussian_gradient_magnitude(
        &self,
        sigma: impl PerAxis<f64, N>,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;
}

impl<T, S, const N: usize> FilterExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn gaussian_filter1d(
        &self,
        sigma: f64,
        axis: isize,
        order: usize,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "gaussian_filter1d: shape {:?}, sigma {}, axis {}, order {}",
            self.shape(),
            sigma,
            axis,
            order
        );
        let axis = check_axis(axis, N)?;
        let mut sigmas = [0.0; N];
        let mut orders = [0; N];
        sigmas[axis] = sigma;
        orders[axis] = order;
        cast_dyn(gaussian_dyn(&self.view().into_dyn(), &sigmas, &orders, mode)?)
    }

    fn gaussian_filter(
        &self,
        sigma: impl PerAxis<f64, N>,
        order: impl PerAxis<usize, N>,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        let (sigma, order) = (sigma.per_axis(), order.per_axis());
        log::debug!(
            "gaussian_filter: shape {:?}, sigma {:?}, order {:?}",
            self.shape(),
            sigma,
            order
        );
        cast_dyn(gaussian_dyn(&self.view().into_dyn(), &sigma, &order, mode)?)
    }

    fn gaussian_filter_into<O: Element>(
        &self,
        sigma: impl PerAxis<f64, N>,
        order: impl PerAxis<usize, N>,
        mode: BoundaryMode,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()> {
        let res = gaussian_dyn(
            &self.view().into_dyn(),
            &sigma.per_axis(),
            &order.per_axis(),
            mode,
        )?;
        write_output(&res, output)
    }

    fn uniform_filter1d(
        &self,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "uniform_filter1d: shape {:?}, size {}, axis {}",
            self.shape(),
            size,
            axis
        );
        let axis = check_axis(axis, N)?;
        let mut sizes = [1; N];
        let mut origins = [0; N];
        sizes[axis] = size;
        origins[axis] = origin;
        cast_dyn(uniform_dyn(&self.view().into_dyn(), &sizes, mode, &origins)?)
    }

    fn uniform_filter(
        &self,
        size: impl PerAxis<usize, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        let size = size.per_axis();
        log::debug!("uniform_filter: shape {:?}, size {:?}", self.shape(), size);
        cast_dyn(uniform_dyn(
            &self.view().into_dyn(),
            &size,
            mode,
            &origin.into_origin(),
        )?)
    }

    fn uniform_filter_into<O: Element>(
        &self,
        size: impl PerAxis<usize, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()> {
        let res = uniform_dyn(
            &self.view().into_dyn(),
            &size.per_axis(),
            mode,
            &origin.into_origin(),
        )?;
        write_output(&res, output)
    }

    fn prewitt(&self, axis: isize, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("prewitt: shape {:?}, axis {}", self.shape(), axis);
        let axis = check_axis(axis, N)?;
        cast_dyn(derivative_dyn(
            &self.view().into_dyn(),
            axis,
            [1.0, 1.0, 1.0],
            mode,
        )?)
    }

    fn sobel(&self, axis: isize, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("sobel: shape {:?}, axis {}", self.shape(), axis);
        let axis = check_axis(axis, N)?;
        cast_dyn(derivative_dyn(
            &self.view().into_dyn(),
            axis,
            [1.0, 2.0, 1.0],
            mode,
        )?)
    }

    fn laplace(&self, mode: BoundaryMode) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("laplace: shape {:?}", self.shape());
        self.generic_laplace(
            |input, axis, mode| {
                let res = correlate1d_dyn(&input.into_dyn(), &[1.0, -2.0, 1.0], axis, mode, 0)?;
                Ok(res.into_dimensionality()?)
            },
            mode,
        )
    }

    fn generic_laplace<F>(
        &self,
        mut derivative2: F,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(
            ArrayView<f64, Dim<[Ix; N]>>,
            usize,
            BoundaryMode,
        ) -> Result<Array<f64, Dim<[Ix; N]>>>,
    {
        let input = self.mapv(|v| v.to_f64());
        let mut acc = Array::<f64, _>::zeros(self.raw_dim());
        for axis in 0..N {
            let d = derivative2(input.view(), axis, mode)?;
            check_same_shape(self.shape(), d.shape())?;
            acc += &d;
        }
        Ok(acc.mapv(T::from_f64))
    }

    fn gaussian_laplace(
        &self,
        sigma: impl PerAxis<f64, N>,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        let sigma = sigma.per_axis();
        log::debug!("gaussian_laplace: shape {:?}, sigma {:?}", self.shape(), sigma);
        self.generic_laplace(
            |input, axis, mode| {
                let mut order = [0; N];
                order[axis] = 2;
                let res = gaussian_dyn(&input.into_dyn(), &sigma, &order, mode)?;
                Ok(res.into_dimensionality()?)
            },
            mode,
        )
    }

    fn generic_gradient_magnitude<F>(
        &self,
        mut derivative: F,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(
            ArrayView<f64, Dim<[Ix; N]>>,
            usize,
            BoundaryMode,
        ) -> Result<Array<f64, Dim<[Ix; N]>>>,
    {
        let input = self.mapv(|v| v.to_f64());
        let mut acc = Array::<f64, _>::zeros(self.raw_dim());
        for axis in 0..N {
            let d = derivative(input.view(), axis, mode)?;
            check_same_shape(self.shape(), d.shape())?;
            acc.zip_mut_with(&d, |a, &v| *a += v * v);
        }
        Ok(acc.mapv(|v| T::from_f64(v.sqrt())))
    }

    fn gaussian_gradient_magnitude(
        &self,
        sigma: impl PerAxis<f64, N>,
        mode: BoundaryMode,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        let sigma = sigma.per_axis();
        log::debug!(
            "gaussian_gradient_magnitude: shape {:?}, sigma {:?}",
            self.shape(),
            sigma
        );
        self.generic_gradient_magnitude(
            |input, axis, mode| {
                let mut order = [0; N];
                order[axis] = 1;
                let res = gaussian_dyn(&input.into_dyn(), &sigma, &order, mode)?;
                Ok(res.into_dimensionality()?)
            },
            mode,
        )
    }
}
