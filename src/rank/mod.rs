//! Order-statistic filters and user-callback filters over a window.

use std::cmp::Ordering;

use ndarray::{prelude::*, Data, IntoDimension, Ix, Zip};

use crate::{
    element::{cast_dyn, into_rank, total_cmp},
    footprint::{
        check_axis, line_origin, line_shape, sweep, sweep_mut, IntoOrigin, IntoWindow, Kernel, Window,
    },
    padding::PaddingExt,
    BoundaryMode, Element, NdImageError, Result,
};


/// Which order statistic of the neighborhood to pick.
#[derive(Debug, Clone, Copy)]
enum Selection {
    Rank(isize),
    Percentile(f64),
    Median,
}

impl Selection {
    /// Resolves the selection into a 0-based index among `count` values.
    fn resolve(self, count: usize) -> Result<usize> {
        match self {
            Selection::Rank(rank) => {
                let resolved = if rank < 0 { rank + count as isize } else { rank };
                if resolved < 0 || resolved >= count as isize {
                    return Err(NdImageError::RankOutOfRange { rank, count });
                }
                Ok(resolved as usize)
            }
            Selection::Percentile(p) => {
                if !(-100.0..=100.0).contains(&p) {
                    return Err(NdImageError::InvalidPercentile(p));
                }
                let p = if p < 0.0 { p + 100.0 } else { p };
                if p == 100.0 {
                    Ok(count - 1)
                } else {
                    Ok(((count as f64 * p / 100.0) as usize).min(count - 1))
                }
            }
            Selection::Median => Ok(count / 2),
        }
    }
}

fn selection_dyn<T: Element>(
    input: &ArrayViewD<T>,
    kernel: &Kernel<bool>,
    selection: Selection,
    mode: BoundaryMode,
) -> Result<ArrayD<T>> {
    let count = kernel.weights.iter().filter(|&&b| b).count();
    if count == 0 {
        return Err(NdImageError::EmptyFootprint);
    }
    let rank = selection.resolve(count)?;

    if rank == 0 {
        return extremum_dyn(input, kernel, mode, Ordering::Less);
    }
    if rank == count - 1 {
        return extremum_dyn(input, kernel, mode, Ordering::Greater);
    }
    sweep(input, kernel, mode, |b| *b, |data, base, offset_list| {
        let mut buffer: Vec<T> = offset_list.iter().map(|(o, _)| data[base + o]).collect();
        let (_, v, _) = buffer.select_nth_unstable_by(rank, total_cmp);
        *v
    })
}

/// Minimum (`Less`) or maximum (`Greater`) over the window.
pub(crate) fn extremum_dyn<T: Element>(
    input: &ArrayViewD<T>,
    kernel: &Kernel<bool>,
    mode: BoundaryMode,
    keep: Ordering,
) -> Result<ArrayD<T>> {
    sweep(input, kernel, mode, |b| *b, |data, base, offset_list| {
        offset_list
            .iter()
            .map(|(o, _)| data[base + o])
            .reduce(|acc, v| if total_cmp(&v, &acc) == keep { v } else { acc })
            .unwrap_or_default()
    })
}

pub trait RankFilterExt<T: Element, const N: usize> {
    /// Rank filter.
    ///
    /// # Arguments
    ///
    /// * `rank`: 0-based index into the sorted neighborhood; negative values
    ///   count from the largest.
    /// * `window`: A size (scalar or per axis) or a boolean footprint.
    /// * `mode`: How reads outside `self` are synthesized.
    /// * `origin`: A scalar or per-axis shift of the window.
    fn rank_filter<'a>(
        &self,
        rank: isize,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Percentile filter; `percentile` lies in `[-100, 100]` and negative
    /// values count from 100.
    fn percentile_filter<'a>(
        &self,
        percentile: f64,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    fn median_filter<'a>(
        &self,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    fn minimum_filter<'a>(
        &self,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    fn maximum_filter<'a>(
        &self,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Minimum over a line of `size` cells along `axis`.
    fn minimum_filter1d(
        &self,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Maximum over a line of `size` cells along `axis`.
    fn maximum_filter1d(
        &self,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Calls `f` with the values selected by the window, in raster order, for
    /// every cell. State and extra arguments travel in the closure.
    fn generic_filter<'a, F>(
        &self,
        f: F,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(&[f64]) -> f64;

    /// Calls `f(line, out)` once per line along `axis`.
    ///
    /// `line` is the input line extended by the window (`len + size - 1`
    /// values) and `out` receives the `len` results.
    fn generic_filter1d<F>(
        &self,
        f: F,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(&[f64], &mut [f64]);
}

impl<T, S, const N: usize> RankFilterExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn rank_filter<'a>(
        &self,
        rank: isize,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("rank_filter: shape {:?}, rank {}", self.shape(), rank);
        select(self, Selection::Rank(rank), window.into_window(), mode, origin.into_origin())
    }

    fn percentile_filter<'a>(
        &self,
        percentile: f64,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "percentile_filter: shape {:?}, percentile {}",
            self.shape(),
            percentile
        );
        select(
            self,
            Selection::Percentile(percentile),
            window.into_window(),
            mode,
            origin.into_origin(),
        )
    }

    fn median_filter<'a>(
        &self,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("median_filter: shape {:?}", self.shape());
        select(self, Selection::Median, window.into_window(), mode, origin.into_origin())
    }

    fn minimum_filter<'a>(
        &self,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("minimum_filter: shape {:?}", self.shape());
        select(self, Selection::Rank(0), window.into_window(), mode, origin.into_origin())
    }

    fn maximum_filter<'a>(
        &self,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("maximum_filter: shape {:?}", self.shape());
        select(self, Selection::Rank(-1), window.into_window(), mode, origin.into_origin())
    }

    fn minimum_filter1d(
        &self,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "minimum_filter1d: shape {:?}, size {}, axis {}",
            self.shape(),
            size,
            axis
        );
        let axis = check_axis(axis, N)?;
        let kernel = line_window(N, axis, size, origin)?;
        into_rank(selection_dyn(
            &self.view().into_dyn(),
            &kernel,
            Selection::Rank(0),
            mode,
        )?)
    }

    fn maximum_filter1d(
        &self,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!(
            "maximum_filter1d: shape {:?}, size {}, axis {}",
            self.shape(),
            size,
            axis
        );
        let axis = check_axis(axis, N)?;
        let kernel = line_window(N, axis, size, origin)?;
        into_rank(selection_dyn(
            &self.view().into_dyn(),
            &kernel,
            Selection::Rank(-1),
            mode,
        )?)
    }

    fn generic_filter<'a, F>(
        &self,
        mut f: F,
        window: impl IntoWindow<'a, N>,
        mode: BoundaryMode,
        origin: impl IntoOrigin<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(&[f64]) -> f64,
    {
        log::debug!("generic_filter: shape {:?}", self.shape());
        let kernel = Kernel::new(window.into_window().to_mask(), &origin.into_origin())?;
        let count = kernel.weights.iter().filter(|&&b| b).count();
        if count == 0 {
            return Err(NdImageError::EmptyFootprint);
        }

        let mut buffer = Vec::with_capacity(count);
        let res = sweep_mut(
            &self.view().into_dyn(),
            &kernel,
            mode,
            |b| *b,
            |data, base, offset_list| {
                buffer.clear();
                buffer.extend(offset_list.iter().map(|(o, _)| data[base + o].to_f64()));
                f(&buffer)
            },
        )?;
        cast_dyn(res)
    }

    fn generic_filter1d<F>(
        &self,
        mut f: F,
        size: usize,
        axis: isize,
        mode: BoundaryMode,
        origin: isize,
    ) -> Result<Array<T, Dim<[Ix; N]>>>
    where
        F: FnMut(&[f64], &mut [f64]),
    {
        log::debug!(
            "generic_filter1d: shape {:?}, size {}, axis {}",
            self.shape(),
            size,
            axis
        );
        let axis = check_axis(axis, N)?;
        let kernel = line_window(N, axis, size, origin)?;
        let padding = kernel.unfold()?;

        let mut output = ArrayD::<f64>::zeros(self.shape());
        if self.is_empty() {
            log::trace!("generic_filter1d: empty input");
            return cast_dyn(output);
        }

        let padded = self
            .view()
            .into_dyn()
            .padding(mode, &padding)?
            .mapv(|v| v.to_f64());
        let mut line = Vec::with_capacity(padded.len_of(Axis(axis)));
        let mut out = vec![0.0; self.len_of(Axis(axis))];
        Zip::from(padded.lanes(Axis(axis)))
            .and(output.lanes_mut(Axis(axis)))
            .for_each(|src, mut dst| {
                line.clear();
                line.extend(src.iter().copied());
                f(&line, &mut out);
                dst.iter_mut().zip(&out).for_each(|(d, &v)| *d = v);
            });

        cast_dyn(output)
    }
}

fn select<T, S, const N: usize>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    selection: Selection,
    window: Window<'_, N>,
    mode: BoundaryMode,
    origin: [isize; N],
) -> Result<Array<T, Dim<[Ix; N]>>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    let kernel = Kernel::new(window.to_mask(), &origin)?;
    into_rank(selection_dyn(
        &input.view().into_dyn(),
        &kernel,
        selection,
        mode,
    )?)
}

/// An all-true window of `size` cells along `axis`.
fn line_window(ndim: usize, axis: usize, size: usize, origin: isize) -> Result<Kernel<bool>> {
    if size == 0 {
        return Err(NdImageError::EmptyFootprint);
    }
    let mask = ArrayD::from_elem(line_shape(ndim, axis, size), true);
    Kernel::new(mask, &line_origin(ndim, axis, origin))
}
