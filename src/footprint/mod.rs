//! Neighborhood description shared by the windowed engines.
//!
//! A [`Kernel`] couples a weights (or mask) array with its origin. Placing it
//! over an output cell turns it into a list of flat offsets into the padded
//! input, which is what every windowed sweep iterates over.

use ndarray::{
    Array, ArrayBase, ArrayD, ArrayView, ArrayViewD, Data, Dim, Dimension, IntoDimension, Ix,
    IxDyn, Slice, Zip,
};

use crate::{padding::PaddingExt, BoundaryMode, Element, NdImageError, Result};

/// Trait for converting a value into a per-axis origin.
pub trait IntoOrigin<const N: usize> {
    fn into_origin(self) -> [isize; N];
}

impl<const N: usize> IntoOrigin<N> for isize {
    #[inline]
    fn into_origin(self) -> [isize; N] {
        [self; N]
    }
}

impl<const N: usize> IntoOrigin<N> for [isize; N] {
    #[inline]
    fn into_origin(self) -> [isize; N] {
        self
    }
}

/// Trait for converting a scalar or an array into one value per axis.
pub trait PerAxis<V, const N: usize> {
    fn per_axis(self) -> [V; N];
}

macro_rules! impl_per_axis {
    ($($t:ty),*) => {
        $(
            impl<const N: usize> PerAxis<$t, N> for $t {
                #[inline]
                fn per_axis(self) -> [$t; N] {
                    [self; N]
                }
            }

            impl<const N: usize> PerAxis<$t, N> for [$t; N] {
                #[inline]
                fn per_axis(self) -> [$t; N] {
                    self
                }
            }
        )*
    };
}

impl_per_axis!(usize, f64);

/// The neighborhood of a rank, morphology or generic filter.
///
/// Usually built through [`IntoWindow`] from a size or a boolean array.
#[derive(Clone)]
pub enum Window<'a, const N: usize> {
    /// An all-true box of the given extent.
    Size([usize; N]),
    /// An arbitrary boolean mask.
    Footprint(ArrayView<'a, bool, Dim<[Ix; N]>>),
}

/// Trait for converting a size or a boolean footprint into a [`Window`].
pub trait IntoWindow<'a, const N: usize> {
    fn into_window(self) -> Window<'a, N>;
}

impl<'a, const N: usize> IntoWindow<'a, N> for Window<'a, N> {
    #[inline]
    fn into_window(self) -> Window<'a, N> {
        self
    }
}

impl<'a, const N: usize> IntoWindow<'a, N> for usize {
    #[inline]
    fn into_window(self) -> Window<'a, N> {
        Window::Size([self; N])
    }
}

impl<'a, const N: usize> IntoWindow<'a, N> for [usize; N] {
    #[inline]
    fn into_window(self) -> Window<'a, N> {
        Window::Size(self)
    }
}

impl<'a, S, const N: usize> IntoWindow<'a, N> for &'a ArrayBase<S, Dim<[Ix; N]>>
where
    S: Data<Elem = bool>,
    Dim<[Ix; N]>: Dimension,
{
    #[inline]
    fn into_window(self) -> Window<'a, N> {
        Window::Footprint(self.view())
    }
}

impl<const N: usize> Window<'_, N>
where
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    /// The window as a dynamic-rank boolean mask.
    pub(crate) fn to_mask(&self) -> ArrayD<bool> {
        match self {
            Window::Size(size) => Array::from_elem(IxDyn(size), true),
            Window::Footprint(footprint) => footprint.to_owned().into_dyn(),
        }
    }
}

/// Weights (or mask) plus origin, in dynamic rank.
#[derive(Debug, Clone)]
pub(crate) struct Kernel<W> {
    pub(crate) weights: ArrayD<W>,
    pub(crate) origin: Vec<isize>,
}

impl<W: Clone> Kernel<W> {
    pub(crate) fn new(weights: ArrayD<W>, origin: &[isize]) -> Result<Self> {
        if origin.len() != weights.ndim() {
            return Err(NdImageError::RankMismatch {
                expected: weights.ndim(),
                found: origin.len(),
            });
        }
        Ok(Self {
            weights,
            origin: origin.to_vec(),
        })
    }

    /// Padding `[front, back]` needed along every axis so that the kernel
    /// stays inside the padded input for every output cell.
    pub(crate) fn unfold(&self) -> Result<Vec<[usize; 2]>> {
        self.weights
            .shape()
            .iter()
            .zip(&self.origin)
            .enumerate()
            .map(|(axis, (&size, &origin))| {
                let front = (size / 2) as isize + origin;
                if size == 0 || front < 0 || front >= size as isize {
                    return Err(NdImageError::InvalidOrigin { axis, origin, size });
                }
                Ok([front as usize, size - 1 - front as usize])
            })
            .collect()
    }

    /// Point reflection through the origin: every axis is reversed and the
    /// origin is moved so the same input cell stays under the kernel center.
    pub(crate) fn reflect(&self) -> Self {
        let weights = self
            .weights
            .slice_each_axis(|_| Slice::new(0, None, -1))
            .to_owned();
        let origin = self
            .weights
            .shape()
            .iter()
            .zip(&self.origin)
            .map(|(&size, &o)| -o - if size % 2 == 0 { 1 } else { 0 })
            .collect();
        Self { weights, origin }
    }

    /// Generates a list of offsets into the padded input and the corresponding
    /// weights, keeping only the entries accepted by `keep`.
    ///
    /// # Arguments
    ///
    /// * `pds_strides`: The strides of the padded input array.
    pub(crate) fn gen_offset_list(
        &self,
        pds_strides: &[usize],
        keep: impl Fn(&W) -> bool,
    ) -> Vec<(usize, W)> {
        self.weights
            .indexed_iter()
            .filter(|(_, v)| keep(v))
            .map(|(index, v)| {
                (
                    index
                        .slice()
                        .iter()
                        .zip(pds_strides)
                        .map(|(i, s)| i * s)
                        .sum::<usize>(),
                    v.clone(),
                )
            })
            .collect()
    }
}

/// An input extended by its kernel's padding, flattened for offset access.
pub(crate) struct Padded<T> {
    pub(crate) data: Vec<T>,
    pub(crate) strides: Vec<usize>,
}

impl<T: Element> Padded<T> {
    pub(crate) fn new(
        input: &ArrayViewD<T>,
        mode: BoundaryMode,
        padding: &[[usize; 2]],
    ) -> Result<Self> {
        let pds = input.padding(mode, padding)?;
        let pds = if pds.is_standard_layout() {
            pds
        } else {
            pds.as_standard_layout().into_owned()
        };
        let strides = pds.strides().iter().map(|&s| s as usize).collect();
        let (mut data, offset) = pds.into_raw_vec_and_offset();
        if let Some(offset) = offset.filter(|&o| o > 0) {
            data.drain(..offset);
        }
        Ok(Self { data, strides })
    }

    /// Flat index of the padded cell aligned with the kernel's first element
    /// when the kernel sits on the output cell at raster position `flat`.
    #[inline]
    pub(crate) fn base(&self, mut flat: usize, raster: &[usize]) -> usize {
        let mut base = 0;
        for (&r, &s) in raster.iter().zip(&self.strides) {
            base += flat / r * s;
            flat %= r;
        }
        base
    }
}

/// Evaluates `f(padded, base)` for every cell of `input` in parallel.
pub(crate) fn sweep<T, W, R, F>(
    input: &ArrayViewD<T>,
    kernel: &Kernel<W>,
    mode: BoundaryMode,
    keep: impl Fn(&W) -> bool,
    f: F,
) -> Result<ArrayD<R>>
where
    T: Element,
    W: Clone,
    R: Copy + Default + Send,
    F: Fn(&[T], usize, &[(usize, W)]) -> R + Sync,
    W: Sync,
{
    let padding = kernel.unfold()?;
    let mut output = ArrayD::from_elem(input.raw_dim(), R::default());
    if input.is_empty() {
        return Ok(output);
    }

    let pds = Padded::new(input, mode, &padding)?;
    let offset_list = kernel.gen_offset_list(&pds.strides, keep);

    let raster = raster_strides(input.shape());
    Zip::from(&mut output)
        .and(&raster_positions(input.raw_dim()))
        .par_for_each(|r, &p| {
            *r = f(&pds.data, pds.base(p, &raster), &offset_list);
        });

    Ok(output)
}

/// Same as [`sweep`], running sequentially so that `f` may hold mutable state.
pub(crate) fn sweep_mut<T, W, R, F>(
    input: &ArrayViewD<T>,
    kernel: &Kernel<W>,
    mode: BoundaryMode,
    keep: impl Fn(&W) -> bool,
    mut f: F,
) -> Result<ArrayD<R>>
where
    T: Element,
    W: Clone,
    R: Clone + Default,
    F: FnMut(&[T], usize, &[(usize, W)]) -> R,
{
    let padding = kernel.unfold()?;
    let mut output = ArrayD::from_elem(input.raw_dim(), R::default());
    if input.is_empty() {
        return Ok(output);
    }

    let pds = Padded::new(input, mode, &padding)?;
    let offset_list = kernel.gen_offset_list(&pds.strides, keep);

    let raster = raster_strides(input.shape());
    Zip::from(&mut output)
        .and(&raster_positions(input.raw_dim()))
        .for_each(|r, &p| {
            *r = f(&pds.data, pds.base(p, &raster), &offset_list);
        });

    Ok(output)
}

/// Resolves a possibly negative axis index.
pub(crate) fn check_axis(axis: isize, ndim: usize) -> Result<usize> {
    let resolved = if axis < 0 { axis + ndim as isize } else { axis };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(NdImageError::AxisOutOfRange { axis, ndim });
    }
    Ok(resolved as usize)
}

/// Flat strides of a C-contiguous array of `shape`.
pub(crate) fn raster_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Raster position of every cell of an array of `shape`.
pub(crate) fn raster_positions(shape: IxDyn) -> ArrayD<usize> {
    let strides = raster_strides(shape.slice());
    ArrayD::from_shape_fn(shape, |index| {
        index.slice().iter().zip(&strides).map(|(i, s)| i * s).sum()
    })
}

/// Writes the coordinates of raster position `flat` into `coords`.
#[inline]
pub(crate) fn unravel(mut flat: usize, strides: &[usize], coords: &mut [usize]) {
    for (c, &stride) in coords.iter_mut().zip(strides) {
        *c = flat / stride;
        flat %= stride;
    }
}

/// Shape of a kernel that spans `size` cells along `axis` and one cell elsewhere.
pub(crate) fn line_shape(ndim: usize, axis: usize, size: usize) -> IxDyn {
    let mut shape = vec![1; ndim];
    shape[axis] = size;
    IxDyn(&shape)
}

/// Origin vector that is `origin` along `axis` and zero elsewhere.
pub(crate) fn line_origin(ndim: usize, axis: usize, origin: isize) -> Vec<isize> {
    let mut o = vec![0; ndim];
    o[axis] = origin;
    o
}

/// Checks that a caller-supplied array has the same shape as the input.
pub(crate) fn check_same_shape(expected: &[usize], found: &[usize]) -> Result<()> {
    if expected != found {
        return Err(NdImageError::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        });
    }
    Ok(())
}
