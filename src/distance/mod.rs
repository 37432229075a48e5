//! Distance transforms.
//!
//! For every nonzero cell, the distance to the nearest zero cell and the
//! coordinates of that cell. Zero cells are at distance 0 from themselves.
//!
//! Three variants share one result type: a brute-force reference for any
//! metric, a two-pass chamfer sweep for the taxicab and chessboard metrics
//! and a separable exact Euclidean transform.

use std::str::FromStr;

use ndarray::{prelude::*, Data, IntoDimension, Ix, Zip};

use crate::{
    footprint::{raster_positions, raster_strides, unravel, PerAxis},
    Element, NdImageError, Result,
};

mod chamfer;
mod euclidean;


/// Distance between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Euclidean,
    /// Sum of the axis steps, also known as city block or Manhattan.
    Taxicab,
    /// Largest axis step, also known as Chebyshev.
    Chessboard,
}

impl Metric {
    fn name(self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Taxicab => "taxicab",
            Metric::Chessboard => "chessboard",
        }
    }

    /// Distance between `a` and `b`, with each axis step scaled by `sampling`.
    fn between(self, a: &[usize], b: &[usize], sampling: &[f64]) -> f64 {
        let steps = a
            .iter()
            .zip(b)
            .zip(sampling)
            .map(|((&a, &b), &s)| a.abs_diff(b) as f64 * s);
        match self {
            Metric::Euclidean => steps.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Taxicab => steps.sum(),
            Metric::Chessboard => steps.fold(0.0, f64::max),
        }
    }
}

impl FromStr for Metric {
    type Err = NdImageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "euclidean" => Ok(Metric::Euclidean),
            "taxicab" | "cityblock" | "manhattan" => Ok(Metric::Taxicab),
            "chessboard" | "chebyshev" => Ok(Metric::Chessboard),
            other => Err(NdImageError::UnknownMetric(other.to_string())),
        }
    }
}

/// Distances and nearest background cells of a distance transform.
pub struct DistanceTransform<const N: usize>
where
    Dim<[Ix; N]>: Dimension,
{
    /// `+inf` everywhere when there is no background cell, `-1` for the
    /// chamfer transform.
    pub distances: Array<f64, Dim<[Ix; N]>>,
    /// One array per axis holding that coordinate of the nearest background
    /// cell. Cells without one point at themselves.
    pub indices: [Array<usize, Dim<[Ix; N]>>; N],
}

impl<const N: usize> DistanceTransform<N>
where
    Dim<[Ix; N]>: Dimension,
{
    /// Builds the result from raster-ordered distances and flat indices of
    /// the nearest background cell.
    fn from_flat(shape: Dim<[Ix; N]>, distances: Vec<f64>, nearest: Vec<usize>) -> Result<Self> {
        let strides = raster_strides(shape.slice());
        let extents = shape.slice().to_vec();
        let distances = Array::from_shape_vec(shape.clone(), distances)?;
        let nearest = Array::from_shape_vec(shape, nearest)?;
        let indices = std::array::from_fn(|axis| nearest.mapv(|flat| flat / strides[axis] % extents[axis]));
        Ok(Self { distances, indices })
    }
}

fn check_sampling<const N: usize>(sampling: &[f64; N]) -> Result<()> {
    match sampling.iter().find(|&&s| !(s > 0.0)) {
        Some(&s) => Err(NdImageError::InvalidSampling(s)),
        None => Ok(()),
    }
}

fn warn_without_background(foreground: &[bool], op: &str) {
    if foreground.iter().all(|&f| f) && !foreground.is_empty() {
        log::warn!("{}: no background cell, every distance is unbounded", op);
    }
}

pub trait DistanceTransformExt<T: Element, const N: usize>
where
    Dim<[Ix; N]>: Dimension,
{
    /// Reference transform comparing every foreground cell against every
    /// background cell, for any metric. The nearest cell is the first in
    /// raster order among equally distant ones.
    fn distance_transform_bf(&self, metric: Metric, sampling: impl PerAxis<f64, N>) -> Result<DistanceTransform<N>>;

    /// Chamfer transform with unit steps to the face neighbors (taxicab) or
    /// to every neighbor (chessboard). Distances are whole numbers.
    fn distance_transform_cdt(&self, metric: Metric) -> Result<DistanceTransform<N>>;

    /// Exact Euclidean transform, separable along the axes.
    ///
    /// ```rust
    /// use ndarray::array;
    /// use ndarray_ndimage::DistanceTransformExt;
    ///
    /// let dt = array![0u8, 1, 1, 1, 1].distance_transform_edt(1.0).unwrap();
    /// assert_eq!(dt.distances, array![0.0, 1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(dt.indices[0], array![0, 0, 0, 0, 0]);
    /// ```
    fn distance_transform_edt(&self, sampling: impl PerAxis<f64, N>) -> Result<DistanceTransform<N>>;
}

impl<T, S, const N: usize> DistanceTransformExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn distance_transform_bf(&self, metric: Metric, sampling: impl PerAxis<f64, N>) -> Result<DistanceTransform<N>> {
        let sampling = sampling.per_axis();
        log::debug!(
            "distance_transform_bf: shape {:?}, metric {:?}, sampling {:?}",
            self.shape(),
            metric,
            sampling
        );
        check_sampling(&sampling)?;

        let input = self.view().into_dyn();
        let foreground: Vec<bool> = input.iter().map(|v| v.is_nonzero()).collect();
        warn_without_background(&foreground, "distance_transform_bf");
        let background: Vec<(usize, IxDyn)> = input
            .indexed_iter()
            .enumerate()
            .filter(|(_, (_, v))| !v.is_nonzero())
            .map(|(flat, (index, _))| (flat, index))
            .collect();

        let strides = raster_strides(input.shape());
        let mut distances = ArrayD::<f64>::zeros(input.raw_dim());
        let mut nearest = ArrayD::<usize>::zeros(input.raw_dim());
        Zip::from(&mut distances)
            .and(&mut nearest)
            .and(&input)
            .and(&raster_positions(input.raw_dim()))
            .par_for_each(|d, n, v, &flat| {
                let mut here = vec![0; strides.len()];
                unravel(flat, &strides, &mut here);
                let here = here.as_slice();
                if !v.is_nonzero() {
                    *n = flat;
                    return;
                }
                *d = f64::INFINITY;
                *n = flat;
                for (b, at) in &background {
                    let dist = metric.between(here, at.slice(), &sampling);
                    if dist < *d {
                        *d = dist;
                        *n = *b;
                    }
                }
            });

        let distances: Vec<f64> = distances.iter().copied().collect();
        let nearest: Vec<usize> = nearest.iter().copied().collect();
        DistanceTransform::from_flat(self.raw_dim(), distances, nearest)
    }

    fn distance_transform_cdt(&self, metric: Metric) -> Result<DistanceTransform<N>> {
        log::debug!("distance_transform_cdt: shape {:?}, metric {:?}", self.shape(), metric);
        let connectivity = match metric {
            Metric::Taxicab => 1,
            Metric::Chessboard => N.max(1),
            Metric::Euclidean => return Err(NdImageError::UnsupportedMetric(metric.name())),
        };
        let foreground: Vec<bool> = self.iter().map(|v| v.is_nonzero()).collect();
        warn_without_background(&foreground, "distance_transform_cdt");

        let (steps, nearest) = chamfer::sweep(self.shape(), &foreground, connectivity);
        let distances = steps
            .into_iter()
            .map(|s| s.map_or(-1.0, |s| s as i64 as f64))
            .collect();
        DistanceTransform::from_flat(self.raw_dim(), distances, nearest)
    }

    fn distance_transform_edt(&self, sampling: impl PerAxis<f64, N>) -> Result<DistanceTransform<N>> {
        let sampling = sampling.per_axis();
        log::debug!(
            "distance_transform_edt: shape {:?}, sampling {:?}",
            self.shape(),
            sampling
        );
        check_sampling(&sampling)?;
        let foreground = self.view().into_dyn().mapv(|v| v.is_nonzero());
        if let Some(flat) = foreground.as_slice() {
            warn_without_background(flat, "distance_transform_edt");
        }

        let (squared, nearest) = euclidean::transform(&foreground, &sampling);
        let distances: Vec<f64> = squared.iter().map(|d| d.sqrt()).collect();
        let nearest: Vec<usize> = nearest.iter().copied().collect();
        DistanceTransform::from_flat(self.raw_dim(), distances, nearest)
    }
}
