use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use ndarray::{prelude::*, s};
use num::Complex;

use super::*;

fn impulse(shape: (usize, usize)) -> Array2<f64> {
    let mut data = Array2::zeros(shape);
    data[[0, 0]] = 1.0;
    data
}

type Filter = fn(&Array2<Complex<f64>>, [f64; 2], SpectrumKind) -> Result<Array2<Complex<f64>>>;

fn filters() -> [(&'static str, Filter); 3] {
    [
        ("gaussian", |a, p, k| fourier_gaussian(a, p, k)),
        ("uniform", |a, p, k| fourier_uniform(a, p, k)),
        ("ellipsoid", |a, p, k| fourier_ellipsoid(a, p, k)),
    ]
}

#[test]
fn real_filters_preserve_the_sum() {
    for shape in [(32, 16), (31, 15)] {
        let kind = SpectrumKind::Half { n: shape.1, axis: 1 };
        let transformed = spectrum::forward_real(&impulse(shape)).unwrap();
        for (name, filter) in filters() {
            let filtered = filter(&transformed, [5.0, 2.5], kind).unwrap();
            let back = spectrum::inverse_real(&filtered, shape.1).unwrap();
            assert_abs_diff_eq!(back.sum(), 1.0, epsilon = 1e-10);
            assert!(back[[0, 0]] < 1.0, "{} did not spread the impulse", name);
        }
    }
}

#[test]
fn complex_filters_preserve_the_sum() {
    for shape in [(32, 16), (31, 15)] {
        let data = impulse(shape).mapv(|v| Complex::new(v, 0.0));
        let transformed = spectrum::forward_complex(&data);
        for (name, filter) in filters() {
            let filtered = filter(&transformed, [5.0, 2.5], SpectrumKind::Full).unwrap();
            let back = spectrum::inverse_complex(&filtered);
            let total = back.sum();
            assert_abs_diff_eq!(total.re, 1.0, epsilon = 1e-10);
            assert_abs_diff_eq!(total.im, 0.0, epsilon = 1e-10);
            assert!(
                back.iter().all(|v| v.im.abs() < 1e-10),
                "{} left an imaginary part",
                name
            );
        }
    }
}

#[test]
fn shift_moves_the_content() {
    for shape in [(32, 16), (31, 15)] {
        let data = Array2::from_shape_fn(shape, |(i, j)| (i * 17 + j * 5) as f64 % 13.0);

        let kind = SpectrumKind::Half { n: shape.1, axis: -1 };
        let shifted = fourier_shift(&spectrum::forward_real(&data).unwrap(), [1.0, 1.0], kind).unwrap();
        let back = spectrum::inverse_real(&shifted, shape.1).unwrap();
        assert_abs_diff_eq!(back.slice(s![1.., 1..]), data.slice(s![..-1, ..-1]), epsilon = 1e-9);
        assert_abs_diff_eq!(back[[0, 0]], data[[shape.0 - 1, shape.1 - 1]], epsilon = 1e-9);

        let complex = data.mapv(|v| Complex::new(v, 0.0));
        let shifted = fourier_shift(&spectrum::forward_complex(&complex), [1.0, 1.0], SpectrumKind::Full).unwrap();
        let back = spectrum::inverse_complex(&shifted).mapv(|v| v.re);
        assert_abs_diff_eq!(back.slice(s![1.., 1..]), data.slice(s![..-1, ..-1]), epsilon = 1e-9);
    }
}

#[test]
fn gaussian_transfer_values() {
    let ones = Array1::from_elem(8, Complex::new(1.0, 0.0));
    let out = fourier_gaussian(&ones, 1.0, SpectrumKind::Full).unwrap();
    assert_abs_diff_eq!(out[0].re, 1.0);
    assert_abs_diff_eq!(out[1].re, (-2.0 * PI * PI / 64.0).exp(), epsilon = 1e-12);
    // bins 1 and 7 are +1/8 and -1/8 cycles per sample
    assert_abs_diff_eq!(out[7].re, out[1].re, epsilon = 1e-12);
    assert!(out.iter().all(|v| v.im == 0.0));
}

#[test]
fn ellipsoid_in_one_dimension_is_a_box() {
    let data = Array1::from_shape_fn(9, |k| Complex::new(k as f64, 1.0 - k as f64));
    let ellipsoid = fourier_ellipsoid(&data, 3.0, SpectrumKind::Full).unwrap();
    let uniform = fourier_uniform(&data, 3.0, SpectrumKind::Full).unwrap();
    for (e, u) in ellipsoid.iter().zip(&uniform) {
        assert_abs_diff_eq!(e.re, u.re, epsilon = 1e-12);
        assert_abs_diff_eq!(e.im, u.im, epsilon = 1e-12);
    }
}

#[test]
fn ellipsoid_in_three_dimensions() {
    let mut data = Array3::<f64>::zeros((6, 5, 4));
    data[[0, 0, 0]] = 1.0;
    let kind = SpectrumKind::Half { n: 4, axis: 2 };
    let filtered = fourier_ellipsoid(&spectrum::forward_real(&data).unwrap(), [2.0, 1.5, 1.0], kind).unwrap();
    let back = spectrum::inverse_real(&filtered, 4).unwrap();
    assert_abs_diff_eq!(back.sum(), 1.0, epsilon = 1e-10);
}

#[test]
fn zero_size_leaves_the_spectrum_alone() {
    let data = Array2::from_shape_fn((4, 5), |(i, j)| Complex::new(i as f64, j as f64));
    let out = fourier_uniform(&data, 0.0, SpectrumKind::Full).unwrap();
    assert_eq!(out, data);
    let out = fourier_gaussian(&data, 0.0, SpectrumKind::Full).unwrap();
    assert_eq!(out, data);
}

#[test]
fn bessel_function_values() {
    assert_abs_diff_eq!(bessel_j1(0.0), 0.0);
    assert_abs_diff_eq!(bessel_j1(1.0), 0.44005058574, epsilon = 1e-7);
    assert_abs_diff_eq!(bessel_j1(5.0), -0.32757913759, epsilon = 1e-7);
    assert_abs_diff_eq!(bessel_j1(10.0), 0.04347274617, epsilon = 1e-7);
    assert_abs_diff_eq!(bessel_j1(-1.0), -0.44005058574, epsilon = 1e-7);
}

#[test]
fn invalid_arguments() {
    let data = Array2::<Complex<f64>>::zeros((4, 3));
    assert!(matches!(
        fourier_gaussian(&data, [1.0, -0.5], SpectrumKind::Full),
        Err(NdImageError::InvalidSigma(s)) if s == -0.5
    ));
    assert!(matches!(
        fourier_shift(&data, 1.0, SpectrumKind::Half { n: 8, axis: 1 }),
        Err(NdImageError::ShapeMismatch { .. })
    ));
    assert!(fourier_shift(&data, 1.0, SpectrumKind::Half { n: 5, axis: 1 }).is_ok());
    assert!(matches!(
        fourier_uniform(&data, 1.0, SpectrumKind::Half { n: 4, axis: 2 }),
        Err(NdImageError::AxisOutOfRange { axis: 2, ndim: 2 })
    ));

    let four = Array4::<Complex<f64>>::zeros((2, 2, 2, 2));
    assert!(matches!(
        fourier_ellipsoid(&four, 1.0, SpectrumKind::Full),
        Err(NdImageError::UnsupportedRank(4))
    ));
}
