//! Filters applied to the discrete Fourier transform of an array.
//!
//! Each filter multiplies every frequency bin by the transfer function of a
//! spatial filter, so that transforming back gives the filtered array. The
//! spectrum may come from [`spectrum`] or any other FFT, as long as it is
//! unnormalized and in the usual order (zero frequency first).
//!
//! ```rust
//! use ndarray::Array2;
//! use ndarray_ndimage::fourier::{fourier_gaussian, spectrum, SpectrumKind};
//!
//! let mut impulse = Array2::<f64>::zeros((8, 8));
//! impulse[[0, 0]] = 1.0;
//! let transformed = spectrum::forward_real(&impulse).unwrap();
//! let kind = SpectrumKind::Half { n: 8, axis: -1 };
//! let smoothed = fourier_gaussian(&transformed, 1.0, kind).unwrap();
//! let blurred = spectrum::inverse_real(&smoothed, 8).unwrap();
//! assert!((blurred.sum() - 1.0).abs() < 1e-12);
//! ```

use std::f64::consts::PI;

use ndarray::{prelude::*, Data, Ix, Zip};
use num::Complex;

use crate::{
    footprint::{check_axis, raster_positions, raster_strides, unravel, PerAxis},
    NdImageError, Result,
};

pub mod spectrum;

#[cfg(test)]
mod tests;

/// Layout of the spectrum a filter is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectrumKind {
    /// Complex transform over every axis.
    #[default]
    Full,
    /// Transform of a real array whose `axis` kept only the `n / 2 + 1`
    /// non-negative frequencies of its original length `n`.
    Half { n: usize, axis: isize },
}

/// Frequency in cycles per sample of every bin, per axis.
fn frequencies(shape: &[usize], kind: SpectrumKind) -> Result<Vec<Vec<f64>>> {
    let half = match kind {
        SpectrumKind::Full => None,
        SpectrumKind::Half { n, axis } => {
            let axis = check_axis(axis, shape.len())?;
            if shape[axis] != n / 2 + 1 {
                let mut expected = shape.to_vec();
                expected[axis] = n / 2 + 1;
                return Err(NdImageError::ShapeMismatch {
                    expected,
                    found: shape.to_vec(),
                });
            }
            Some((axis, n))
        }
    };

    Ok(shape
        .iter()
        .enumerate()
        .map(|(axis, &len)| match half {
            Some((h, n)) if h == axis => (0..len).map(|k| k as f64 / n as f64).collect(),
            _ => (0..len)
                .map(|k| {
                    // bins past the middle hold the negative frequencies
                    let k = if k < (len + 1) / 2 { k as f64 } else { k as f64 - len as f64 };
                    k / len as f64
                })
                .collect(),
        })
        .collect())
}

/// Multiplies every bin of `input` by `transfer` of its per-axis frequencies.
fn apply<S, F, const N: usize>(input: &ArrayBase<S, Dim<[Ix; N]>>, kind: SpectrumKind, transfer: F) -> Result<Array<Complex<f64>, Dim<[Ix; N]>>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
    F: Fn(&[f64; N]) -> Complex<f64> + Sync,
{
    let table = frequencies(input.shape(), kind)?;
    let mut output = input.to_owned();
    let raster = raster_strides(input.shape());
    Zip::from(output.view_mut().into_dyn())
        .and(&raster_positions(input.raw_dim().into_dyn()))
        .par_for_each(|v, &p| {
            let mut index = [0; N];
            unravel(p, &raster, &mut index);
            let f: [f64; N] = std::array::from_fn(|axis| table[axis][index[axis]]);
            *v *= transfer(&f);
        });
    Ok(output)
}

/// `sin(x) / x`, continuous at 0.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        x.sin() / x
    }
}

/// Bessel function of the first kind, order 1.
fn bessel_j1(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = x
            * (72362614232.0
                + y * (-7895059235.0
                    + y * (242396853.1 + y * (-2972611.439 + y * (15704.48260 + y * -30.16036606)))));
        let den = 144725228442.0
            + y * (2300535178.0 + y * (18583304.74 + y * (99447.43394 + y * (376.9991397 + y))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 2.356194491;
        let p = 1.0
            + y * (0.183105e-2 + y * (-0.3516396496e-4 + y * (0.2457520174e-5 + y * -0.240337019e-6)));
        let q = 0.04687499995
            + y * (-0.2002690873e-3 + y * (0.8449199096e-5 + y * (-0.88228987e-6 + y * 0.105787412e-6)));
        let ans = (0.636619772 / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q);
        if x < 0.0 {
            -ans
        } else {
            ans
        }
    }
}

/// Transfer function of a gaussian filter with standard deviation `sigma`
/// per axis.
pub fn fourier_gaussian<S, const N: usize>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    sigma: impl PerAxis<f64, N>,
    kind: SpectrumKind,
) -> Result<Array<Complex<f64>, Dim<[Ix; N]>>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    let sigma = sigma.per_axis();
    log::debug!(
        "fourier_gaussian: shape {:?}, sigma {:?}, {:?}",
        input.shape(),
        sigma,
        kind
    );
    if let Some(&s) = sigma.iter().find(|&&s| s < 0.0) {
        return Err(NdImageError::InvalidSigma(s));
    }
    apply(input, kind, |f| {
        let exponent: f64 = f.iter().zip(&sigma).map(|(&f, &s)| (s * f).powi(2)).sum();
        Complex::new((-2.0 * PI * PI * exponent).exp(), 0.0)
    })
}

/// Transfer function of a box filter of `size` cells per axis. A size of 0
/// leaves that axis unfiltered.
pub fn fourier_uniform<S, const N: usize>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    size: impl PerAxis<f64, N>,
    kind: SpectrumKind,
) -> Result<Array<Complex<f64>, Dim<[Ix; N]>>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    let size = size.per_axis();
    log::debug!("fourier_uniform: shape {:?}, size {:?}, {:?}", input.shape(), size, kind);
    apply(input, kind, |f| {
        let gain: f64 = f.iter().zip(&size).map(|(&f, &s)| sinc(PI * s * f)).product();
        Complex::new(gain, 0.0)
    })
}

/// Transfer function of an ellipsoid with the given diameters: a box in one
/// dimension, an ellipse in two and an ellipsoid in three.
pub fn fourier_ellipsoid<S, const N: usize>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    size: impl PerAxis<f64, N>,
    kind: SpectrumKind,
) -> Result<Array<Complex<f64>, Dim<[Ix; N]>>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    let size = size.per_axis();
    log::debug!("fourier_ellipsoid: shape {:?}, size {:?}, {:?}", input.shape(), size, kind);
    if !(1..=3).contains(&N) {
        return Err(NdImageError::UnsupportedRank(N));
    }
    apply(input, kind, |f| {
        let r = f
            .iter()
            .zip(&size)
            .map(|(&f, &s)| (PI * s * f).powi(2))
            .sum::<f64>()
            .sqrt();
        let gain = if r == 0.0 {
            1.0
        } else {
            match N {
                1 => r.sin() / r,
                2 => 2.0 * bessel_j1(r) / r,
                _ => 3.0 * (r.sin() - r * r.cos()) / (r * r * r),
            }
        };
        Complex::new(gain, 0.0)
    })
}

/// Phase ramp moving the content by `shift` cells per axis:
/// `out[x] = in[x - shift]`, periodically.
pub fn fourier_shift<S, const N: usize>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    shift: impl PerAxis<f64, N>,
    kind: SpectrumKind,
) -> Result<Array<Complex<f64>, Dim<[Ix; N]>>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    let shift = shift.per_axis();
    log::debug!("fourier_shift: shape {:?}, shift {:?}, {:?}", input.shape(), shift, kind);
    apply(input, kind, |f| {
        let phase: f64 = f.iter().zip(&shift).map(|(&f, &s)| s * f).sum();
        Complex::from_polar(1.0, -2.0 * PI * phase)
    })
}
