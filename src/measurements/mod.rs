//! Connected components, per-region statistics and watershed segmentation.
//!
//! The reducers of [`MeasurementExt`] share one calling convention: an
//! optional label map of the input's shape (or broadcastable to it) and an
//! optional list of label ids. With an index, one value is returned per id,
//! in order. Without one, every cell with a nonzero label forms a single
//! region. Without labels, the whole array is one region and the index is
//! ignored.

use std::ops::Range;

use ndarray::{prelude::*, Data, IntoDimension, Ix};

use crate::{Element, NdImageError, Result};

mod label;
mod stats;
mod watershed;

use label::{find_objects_dyn, label_flat, Connectivity};
use stats::{accumulate, RegionStats};
use watershed::watershed_flat;

pub use watershed::WatershedInput;

#[cfg(test)]
mod tests;

/// Minimum and maximum of a region with the positions of their first occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema<const N: usize> {
    pub min: f64,
    pub max: f64,
    pub min_position: [usize; N],
    pub max_position: [usize; N],
}

pub trait LabelExt<T: Element, const N: usize> {
    /// Numbers the connected components of the nonzero cells from 1, in the
    /// raster order of their first cell, and returns the label map with the
    /// component count.
    ///
    /// `structure` must be a centrosymmetric `3 x .. x 3` mask and defaults to
    /// face connectivity.
    ///
    /// ```rust
    /// use ndarray::array;
    /// use ndarray_ndimage::LabelExt;
    ///
    /// let (labels, count) = array![1u8, 0, 1, 1, 0, 1].label(None).unwrap();
    /// assert_eq!(labels, array![1, 0, 2, 2, 0, 3]);
    /// assert_eq!(count, 3);
    /// ```
    fn label(&self, structure: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>) -> Result<(Array<usize, Dim<[Ix; N]>>, usize)>;

    /// Bounding box of every label id from 1 to the largest one present, or
    /// `None` for ids without cells. `self` is read as a label map.
    fn find_objects(&self) -> Vec<Option<[Range<usize>; N]>>;
}

impl<T, S, const N: usize> LabelExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn label(&self, structure: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>) -> Result<(Array<usize, Dim<[Ix; N]>>, usize)> {
        log::debug!(
            "label: shape {:?}, structure {:?}",
            self.shape(),
            structure.as_ref().map(|s| s.shape())
        );
        let connectivity = Connectivity::new(self.shape(), structure.map(|s| s.into_dyn()))?;
        let foreground: Vec<bool> = self.iter().map(|v| v.is_nonzero()).collect();
        let (labels, count) = label_flat(&foreground, &connectivity);
        Ok((Array::from_shape_vec(self.raw_dim(), labels)?, count))
    }

    fn find_objects(&self) -> Vec<Option<[Range<usize>; N]>> {
        log::debug!("find_objects: shape {:?}", self.shape());
        let labels = self.view().into_dyn().mapv(|v| {
            let v = v.to_f64();
            if v > 0.0 {
                v as usize
            } else {
                0
            }
        });
        find_objects_dyn(&labels.view())
    }
}

/// Region reducers. The sum and mean carry a `_labels` suffix so they do not
/// collide with the inherent `ArrayBase::sum` and `ArrayBase::mean`.
pub trait MeasurementExt<T: Element, const N: usize> {
    fn sum_labels(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>>;

    /// NaN for empty regions.
    fn mean_labels(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>>;

    /// Sample variance (`n - 1` degrees of freedom), 0 below two cells.
    fn variance(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>>;

    fn standard_deviation(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<f64>>;

    fn minimum(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>>;

    fn maximum(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>>;

    /// First position of the minimum in raster order.
    fn minimum_position(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<[usize; N]>>;

    /// First position of the maximum in raster order.
    fn maximum_position(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<[usize; N]>>;

    fn extrema(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<Extrema<N>>>;

    /// Intensity-weighted centroid of each region.
    fn center_of_mass(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<[f64; N]>>;

    /// Counts per region in `bins` equal bins spanning `[min, max]`. The last
    /// bin includes `max`; values outside the range are not counted.
    fn histogram(
        &self,
        min: f64,
        max: f64,
        bins: usize,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<Vec<usize>>>;
}

/// Accumulates `add` over every region of `input`, with `labels` broadcast to
/// the input shape.
fn reduce<T, A, F, const N: usize>(
    input: ArrayViewD<'_, T>,
    labels: Option<ArrayViewD<'_, usize>>,
    index: Option<&[usize]>,
    init: A,
    add: F,
) -> Result<Vec<A>>
where
    T: Element,
    A: Clone,
    F: FnMut(&mut A, f64, [usize; N]),
{
    let broadcast = match &labels {
        Some(l) => Some(l.broadcast(input.raw_dim()).ok_or_else(|| NdImageError::ShapeMismatch {
            expected: input.shape().to_vec(),
            found: l.shape().to_vec(),
        })?),
        None => None,
    };
    Ok(accumulate(&input, broadcast.as_ref(), index, init, add))
}

fn region_stats<T: Element, const N: usize>(
    input: ArrayViewD<'_, T>,
    labels: Option<ArrayViewD<'_, usize>>,
    index: Option<&[usize]>,
) -> Result<Vec<RegionStats<N>>> {
    reduce(input, labels, index, RegionStats::default(), |stats: &mut RegionStats<N>, v, p| {
        stats.add(v, p)
    })
}

impl<T, S, const N: usize> MeasurementExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn sum_labels(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>> {
        log::debug!("sum_labels: shape {:?}, index {:?}", self.shape(), index);
        let stats = region_stats::<T, N>(self.view().into_dyn(), labels.map(|l| l.into_dyn()), index)?;
        Ok(stats.iter().map(|s| s.sum).collect())
    }

    fn mean_labels(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>> {
        log::debug!("mean_labels: shape {:?}, index {:?}", self.shape(), index);
        let stats = region_stats::<T, N>(self.view().into_dyn(), labels.map(|l| l.into_dyn()), index)?;
        Ok(stats.iter().map(RegionStats::mean).collect())
    }

    fn variance(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>> {
        log::debug!("variance: shape {:?}, index {:?}", self.shape(), index);
        let stats = region_stats::<T, N>(self.view().into_dyn(), labels.map(|l| l.into_dyn()), index)?;
        Ok(stats.iter().map(RegionStats::variance).collect())
    }

    fn standard_deviation(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<f64>> {
        Ok(self.variance(labels, index)?.into_iter().map(f64::sqrt).collect())
    }

    fn minimum(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>> {
        Ok(self.extrema(labels, index)?.iter().map(|e| e.min).collect())
    }

    fn maximum(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<f64>> {
        Ok(self.extrema(labels, index)?.iter().map(|e| e.max).collect())
    }

    fn minimum_position(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<[usize; N]>> {
        Ok(self.extrema(labels, index)?.iter().map(|e| e.min_position).collect())
    }

    fn maximum_position(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<[usize; N]>> {
        Ok(self.extrema(labels, index)?.iter().map(|e| e.max_position).collect())
    }

    fn extrema(&self, labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>, index: Option<&[usize]>) -> Result<Vec<Extrema<N>>> {
        log::debug!("extrema: shape {:?}, index {:?}", self.shape(), index);
        let stats = region_stats::<T, N>(self.view().into_dyn(), labels.map(|l| l.into_dyn()), index)?;
        Ok(stats
            .iter()
            .map(|s| Extrema {
                min: s.min(),
                max: s.max(),
                min_position: s.min_position,
                max_position: s.max_position,
            })
            .collect())
    }

    fn center_of_mass(
        &self,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<[f64; N]>> {
        log::debug!("center_of_mass: shape {:?}, index {:?}", self.shape(), index);
        let stats = region_stats::<T, N>(self.view().into_dyn(), labels.map(|l| l.into_dyn()), index)?;
        Ok(stats.iter().map(RegionStats::center_of_mass).collect())
    }

    fn histogram(
        &self,
        min: f64,
        max: f64,
        bins: usize,
        labels: Option<ArrayView<'_, usize, Dim<[Ix; N]>>>,
        index: Option<&[usize]>,
    ) -> Result<Vec<Vec<usize>>> {
        log::debug!(
            "histogram: shape {:?}, range [{}, {}], bins {}, index {:?}",
            self.shape(),
            min,
            max,
            bins,
            index
        );
        if bins == 0 || !(min < max) {
            return Err(NdImageError::InvalidHistogram { min, max, bins });
        }
        let width = (max - min) / bins as f64;
        reduce(
            self.view().into_dyn(),
            labels.map(|l| l.into_dyn()),
            index,
            vec![0; bins],
            |counts: &mut Vec<usize>, v, _: [usize; N]| {
                if v >= min && v <= max {
                    let bin = (((v - min) / width) as usize).min(bins - 1);
                    counts[bin] += 1;
                }
            },
        )
    }
}

pub trait WatershedExt<T: WatershedInput, const N: usize> {
    /// Segments `self` by flooding from `markers`.
    ///
    /// Positive markers are seeds, negative markers are background seeds and
    /// zero cells are unlabeled. Every unlabeled cell receives the marker that
    /// reaches it along the path with the smallest largest step in grey level.
    /// Cells no marker reaches stay 0. `structure` must be a centrosymmetric
    /// `3 x .. x 3` mask and defaults to face connectivity.
    fn watershed_ift<S2>(
        &self,
        markers: &ArrayBase<S2, Dim<[Ix; N]>>,
        structure: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>,
    ) -> Result<Array<i32, Dim<[Ix; N]>>>
    where
        S2: Data<Elem = i32>;
}

impl<T, S, const N: usize> WatershedExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: WatershedInput,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn watershed_ift<S2>(
        &self,
        markers: &ArrayBase<S2, Dim<[Ix; N]>>,
        structure: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>,
    ) -> Result<Array<i32, Dim<[Ix; N]>>>
    where
        S2: Data<Elem = i32>,
    {
        log::debug!(
            "watershed_ift: shape {:?}, structure {:?}",
            self.shape(),
            structure.as_ref().map(|s| s.shape())
        );
        if markers.shape() != self.shape() {
            return Err(NdImageError::ShapeMismatch {
                expected: self.shape().to_vec(),
                found: markers.shape().to_vec(),
            });
        }
        let connectivity = Connectivity::new(self.shape(), structure.map(|s| s.into_dyn()))?;
        let levels: Vec<usize> = self.iter().map(|v| v.level()).collect();
        let markers: Vec<i32> = markers.iter().copied().collect();
        if markers.iter().all(|&m| m == 0) {
            log::warn!("watershed_ift: no markers, every cell stays unlabeled");
        }
        let labels = watershed_flat(&levels, &markers, &connectivity, T::LEVELS);
        Ok(Array::from_shape_vec(self.raw_dim(), labels)?)
    }
}
