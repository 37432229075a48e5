//! B-spline basis functions and the recursive prefilter that turns samples into
//! interpolating coefficients.

use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis, Zip};

use crate::{BoundaryMode, Element, NdImageError, Result};

/// Highest supported spline order.
pub(crate) const MAX_ORDER: usize = 5;

pub(crate) fn check_order(order: usize) -> Result<()> {
    if order > MAX_ORDER {
        return Err(NdImageError::UnsupportedOrder(order));
    }
    Ok(())
}

/// How a spline continues past the ends of a line of samples `a b c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extension {
    /// `c b | a b c | b a`
    Mirror,
    /// `b a | a b c | c b`
    Reflect,
    /// `b c | a b c | a b`
    Periodic,
}

impl Extension {
    /// The extension matching the samples `mode` reads outside the input.
    /// Constant and nearest coordinates never leave the input, so they keep
    /// the mirror.
    pub(crate) fn of(mode: BoundaryMode) -> Self {
        match mode {
            BoundaryMode::Wrap => Extension::Periodic,
            BoundaryMode::Reflect => Extension::Reflect,
            BoundaryMode::Constant(_) | BoundaryMode::Nearest => Extension::Mirror,
        }
    }

    /// Position of index `i` of the extended line inside `0..len`.
    pub(crate) fn index(self, i: isize, len: usize) -> usize {
        let n = len as isize;
        let k = match self {
            Extension::Mirror if len == 1 => 0,
            Extension::Mirror => {
                let period = 2 * (n - 1);
                let k = i.rem_euclid(period);
                if k >= n {
                    period - k
                } else {
                    k
                }
            }
            Extension::Reflect => {
                let k = i.rem_euclid(2 * n);
                if k >= n {
                    2 * n - 1 - k
                } else {
                    k
                }
            }
            Extension::Periodic => i.rem_euclid(n),
        };
        k as usize
    }
}

/// Poles of the recursive filter inverting the sampled B-spline of `order`.
fn poles(order: usize) -> Vec<f64> {
    match order {
        2 => vec![8f64.sqrt() - 3.0],
        3 => vec![3f64.sqrt() - 2.0],
        4 => vec![
            (664.0 - 438976f64.sqrt()).sqrt() + 304f64.sqrt() - 19.0,
            (664.0 + 438976f64.sqrt()).sqrt() - 304f64.sqrt() - 19.0,
        ],
        5 => vec![
            (67.5 - 4436.25f64.sqrt()).sqrt() + 26.25f64.sqrt() - 6.5,
            (67.5 + 4436.25f64.sqrt()).sqrt() - 26.25f64.sqrt() - 6.5,
        ],
        _ => Vec::new(),
    }
}

/// Centered B-spline of degree `order` evaluated at `x`.
pub(crate) fn bspline(order: usize, x: f64) -> f64 {
    if order == 0 {
        return if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 };
    }

    let half = (order + 1) as f64 / 2.0;
    let mut binom = 1.0;
    let mut sum = 0.0;
    for k in 0..=order + 1 {
        let t = x + half - k as f64;
        if t > 0.0 {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            sum += sign * binom * t.powi(order as i32);
        }
        binom = binom * (order + 1 - k) as f64 / (k + 1) as f64;
    }
    let factorial: f64 = (1..=order).map(|k| k as f64).product();
    sum / factorial
}

/// Initial value of the causal recursion for mirror-symmetric boundaries,
/// summed exactly over one period.
fn causal_init(c: &[f64], z: f64) -> f64 {
    let n = c.len();
    let iz = 1.0 / z;
    let mut zn = z;
    let mut z2n = z.powi(n as i32 - 1);
    let mut sum = c[0] + z2n * c[n - 1];
    z2n *= z2n * iz;
    for &v in &c[1..n - 1] {
        sum += (zn + z2n) * v;
        zn *= z;
        z2n *= iz;
    }
    sum / (1.0 - zn * zn)
}

/// Causal then anticausal recursion over a line that repeats with its own
/// length as period. Both initial values are summed exactly over one period.
fn periodic_pass(line: &mut [f64], z: f64) {
    let n = line.len();
    let zn = z.powi(n as i32);

    let mut sum = line[0];
    let mut zj = z;
    for j in 1..n {
        sum += zj * line[n - j];
        zj *= z;
    }
    line[0] = sum / (1.0 - zn);
    for k in 1..n {
        line[k] += z * line[k - 1];
    }

    let mut sum = line[n - 1];
    let mut zj = z;
    for j in 1..n {
        sum += zj * line[j - 1];
        zj *= z;
    }
    line[n - 1] = -z * sum / (1.0 - zn);
    for k in (0..n - 1).rev() {
        line[k] = z * (line[k + 1] - line[k]);
    }
}

fn mirror_pass(line: &mut [f64], z: f64) {
    let n = line.len();
    line[0] = causal_init(line, z);
    for k in 1..n {
        line[k] += z * line[k - 1];
    }
    line[n - 1] = (z / (z * z - 1.0)) * (z * line[n - 2] + line[n - 1]);
    for k in (0..n - 1).rev() {
        line[k] = z * (line[k + 1] - line[k]);
    }
}

/// Replaces the samples in `line` by their B-spline coefficients, for a
/// spline continued past the ends by `extension`.
pub(crate) fn filter_line(line: &mut [f64], poles: &[f64], extension: Extension) {
    let n = line.len();
    if n < 2 || poles.is_empty() {
        return;
    }

    let gain: f64 = poles.iter().map(|&z| (1.0 - z) * (1.0 - 1.0 / z)).product();
    match extension {
        Extension::Mirror => {
            line.iter_mut().for_each(|v| *v *= gain);
            for &z in poles {
                mirror_pass(line, z);
            }
        }
        Extension::Periodic => {
            line.iter_mut().for_each(|v| *v *= gain);
            for &z in poles {
                periodic_pass(line, z);
            }
        }
        Extension::Reflect => {
            // the half-sample mirror repeats with period 2n
            let mut doubled: Vec<f64> = line.iter().chain(line.iter().rev()).map(|v| v * gain).collect();
            for &z in poles {
                periodic_pass(&mut doubled, z);
            }
            line.copy_from_slice(&doubled[..n]);
        }
    }
}

/// Filters every lane of `data` along `axis` in place.
pub(crate) fn filter_axis(data: &mut ArrayD<f64>, order: usize, axis: usize, extension: Extension) {
    let poles = poles(order);
    if poles.is_empty() || data.len_of(Axis(axis)) < 2 {
        return;
    }

    Zip::from(data.lanes_mut(Axis(axis))).par_for_each(|mut lane| {
        let mut line = lane.to_vec();
        filter_line(&mut line, &poles, extension);
        lane.assign(&ArrayView1::from(&line[..]));
    });
}

/// B-spline coefficients of `input` along every axis.
pub(crate) fn spline_filter_dyn<T: Element>(
    input: &ArrayViewD<T>,
    order: usize,
    extension: Extension,
) -> Result<ArrayD<f64>> {
    check_order(order)?;
    let mut coefficients = input.mapv(|v| v.to_f64());
    if order > 1 {
        for axis in 0..coefficients.ndim() {
            filter_axis(&mut coefficients, order, axis, extension);
        }
    }
    Ok(coefficients)
}
