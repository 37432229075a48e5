//! N-dimensional discrete Fourier transforms over every axis.
//!
//! Forward transforms are unnormalized; inverse transforms divide by the
//! number of cells, so a round trip gives back the input.

use ndarray::{prelude::*, Data, Ix};
use num::{Complex, Zero};
use realfft::RealFftPlanner;
use rustfft::{FftDirection, FftPlanner};

use crate::{NdImageError, Result};

/// Transforms every lane of `data` along `axis` in place.
fn complex_axis(mut data: ArrayViewMutD<'_, Complex<f64>>, axis: usize, planner: &mut FftPlanner<f64>, direction: FftDirection) {
    if data.is_empty() {
        return;
    }
    let len = data.len_of(Axis(axis));
    let fft = planner.plan_fft(len, direction);
    let mut scratch = vec![Complex::zero(); fft.get_inplace_scratch_len()];
    let mut buffer = vec![Complex::zero(); len];
    for mut lane in data.lanes_mut(Axis(axis)) {
        for (b, &v) in buffer.iter_mut().zip(lane.iter()) {
            *b = v;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (v, &b) in lane.iter_mut().zip(&buffer) {
            *v = b;
        }
    }
}

fn last_axis(ndim: usize) -> Result<usize> {
    ndim.checked_sub(1).ok_or(NdImageError::UnsupportedRank(0))
}

/// Complex transform along every axis.
pub fn forward_complex<S, const N: usize>(input: &ArrayBase<S, Dim<[Ix; N]>>) -> Array<Complex<f64>, Dim<[Ix; N]>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    log::debug!("forward_complex: shape {:?}", input.shape());
    let mut output = input.to_owned();
    let mut planner = FftPlanner::new();
    for axis in 0..N {
        complex_axis(output.view_mut().into_dyn(), axis, &mut planner, FftDirection::Forward);
    }
    output
}

/// Inverse of [`forward_complex`].
pub fn inverse_complex<S, const N: usize>(spectrum: &ArrayBase<S, Dim<[Ix; N]>>) -> Array<Complex<f64>, Dim<[Ix; N]>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    log::debug!("inverse_complex: shape {:?}", spectrum.shape());
    let mut output = spectrum.to_owned();
    let mut planner = FftPlanner::new();
    for axis in 0..N {
        complex_axis(output.view_mut().into_dyn(), axis, &mut planner, FftDirection::Inverse);
    }
    let len = output.len() as f64;
    output.mapv_inplace(|v| v / len);
    output
}

/// Transform of a real array. The last axis keeps only the `n / 2 + 1`
/// non-negative frequencies.
pub fn forward_real<S, const N: usize>(input: &ArrayBase<S, Dim<[Ix; N]>>) -> Result<Array<Complex<f64>, Dim<[Ix; N]>>>
where
    S: Data<Elem = f64>,
    Dim<[Ix; N]>: Dimension,
{
    log::debug!("forward_real: shape {:?}", input.shape());
    let last = last_axis(N)?;
    let n = input.shape()[last];
    let mut shape = input.raw_dim();
    shape[last] = n / 2 + 1;
    let mut output = Array::zeros(shape);
    if n == 0 || output.is_empty() {
        return Ok(output);
    }

    let r2c = RealFftPlanner::<f64>::new().plan_fft_forward(n);
    let mut samples = r2c.make_input_vec();
    let mut bins = r2c.make_output_vec();
    let mut scratch = r2c.make_scratch_vec();
    for (lane, mut out) in input.lanes(Axis(last)).into_iter().zip(output.lanes_mut(Axis(last))) {
        for (s, &v) in samples.iter_mut().zip(lane.iter()) {
            *s = v;
        }
        r2c.process_with_scratch(&mut samples, &mut bins, &mut scratch)?;
        for (o, &b) in out.iter_mut().zip(&bins) {
            *o = b;
        }
    }

    let mut planner = FftPlanner::new();
    for axis in 0..last {
        complex_axis(output.view_mut().into_dyn(), axis, &mut planner, FftDirection::Forward);
    }
    Ok(output)
}

/// Inverse of [`forward_real`]; `n` is the length of the last axis before
/// the forward transform.
///
/// The imaginary parts of the zero and (for even `n`) Nyquist frequencies of
/// the last axis are discarded.
pub fn inverse_real<S, const N: usize>(spectrum: &ArrayBase<S, Dim<[Ix; N]>>, n: usize) -> Result<Array<f64, Dim<[Ix; N]>>>
where
    S: Data<Elem = Complex<f64>>,
    Dim<[Ix; N]>: Dimension,
{
    log::debug!("inverse_real: shape {:?}, n {}", spectrum.shape(), n);
    let last = last_axis(N)?;
    if spectrum.shape()[last] != n / 2 + 1 {
        let mut expected = spectrum.shape().to_vec();
        expected[last] = n / 2 + 1;
        return Err(NdImageError::ShapeMismatch {
            expected,
            found: spectrum.shape().to_vec(),
        });
    }

    let mut work = spectrum.to_owned();
    let mut planner = FftPlanner::new();
    for axis in 0..last {
        complex_axis(work.view_mut().into_dyn(), axis, &mut planner, FftDirection::Inverse);
    }

    let mut shape = work.raw_dim();
    shape[last] = n;
    let mut output = Array::zeros(shape);
    if output.is_empty() {
        return Ok(output);
    }

    let c2r = RealFftPlanner::<f64>::new().plan_fft_inverse(n);
    let mut bins = c2r.make_input_vec();
    let mut samples = c2r.make_output_vec();
    let mut scratch = c2r.make_scratch_vec();
    for (lane, mut out) in work.lanes(Axis(last)).into_iter().zip(output.lanes_mut(Axis(last))) {
        for (b, &v) in bins.iter_mut().zip(lane.iter()) {
            *b = v;
        }
        bins[0].im = 0.0;
        if n % 2 == 0 {
            bins[n / 2].im = 0.0;
        }
        c2r.process_with_scratch(&mut bins, &mut samples, &mut scratch)?;
        for (o, &s) in out.iter_mut().zip(&samples) {
            *o = s;
        }
    }

    let len = output.len() as f64;
    output.mapv_inplace(|v| v / len);
    Ok(output)
}
