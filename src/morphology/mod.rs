//! Binary and grey mathematical morphology.
//!
//! Binary operations read any element type as "set" when it is nonzero and
//! return boolean arrays. Cells outside the input read as the configured
//! border value. Grey operations are min/max filters over a window, optionally
//! offset by additive structure weights.

use ndarray::{prelude::*, Data, IntoDimension, Ix, Zip};

use crate::{
    element::{into_rank, write_output},
    footprint::{check_same_shape, IntoOrigin, IntoWindow, Kernel, Window},
    BoundaryMode, Element, NdImageError, Result,
};

mod binary;
mod grey;
mod structure;

pub use structure::{generate_binary_structure, iterate_structure, iterated_origin};


/// How many erosion or dilation passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    /// Exactly this many passes. `Count(0)` behaves as [`Iterations::UntilStable`].
    Count(usize),
    /// Repeat until a pass no longer changes the result.
    UntilStable,
}

impl Default for Iterations {
    fn default() -> Self {
        Iterations::Count(1)
    }
}

impl From<usize> for Iterations {
    fn from(n: usize) -> Self {
        Iterations::Count(n)
    }
}

/// Options of the binary morphology operations.
///
/// ```rust
/// use ndarray::array;
/// use ndarray_ndimage::{BinaryMorphology, BinaryMorphologyExt};
///
/// let data = array![1, 1, 1];
/// let eroded = data.binary_erosion(&BinaryMorphology::new()).unwrap();
/// assert_eq!(eroded, array![false, true, false]);
///
/// let eroded = data
///     .binary_erosion(&BinaryMorphology::new().border_value(true))
///     .unwrap();
/// assert_eq!(eroded, array![true, true, true]);
/// ```
#[derive(Clone)]
pub struct BinaryMorphology<'a, const N: usize> {
    structure: Option<ArrayView<'a, bool, Dim<[Ix; N]>>>,
    iterations: Iterations,
    mask: Option<ArrayView<'a, bool, Dim<[Ix; N]>>>,
    border_value: bool,
    origin: [isize; N],
}

impl<const N: usize> Default for BinaryMorphology<'_, N> {
    fn default() -> Self {
        Self {
            structure: None,
            iterations: Iterations::default(),
            mask: None,
            border_value: false,
            origin: [0; N],
        }
    }
}

impl<'a, const N: usize> BinaryMorphology<'a, N>
where
    Dim<[Ix; N]>: Dimension,
{
    /// Face connectivity, one pass, no mask, border value `false`, centered origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// The structuring element. Defaults to `generate_binary_structure(N, 1)`.
    pub fn structure<S: Data<Elem = bool>>(mut self, structure: &'a ArrayBase<S, Dim<[Ix; N]>>) -> Self {
        self.structure = Some(structure.view());
        self
    }

    pub fn iterations(mut self, iterations: impl Into<Iterations>) -> Self {
        self.iterations = iterations.into();
        self
    }

    /// Only cells where `mask` is true may change.
    pub fn mask<S: Data<Elem = bool>>(mut self, mask: &'a ArrayBase<S, Dim<[Ix; N]>>) -> Self {
        self.mask = Some(mask.view());
        self
    }

    pub fn border_value(mut self, border_value: bool) -> Self {
        self.border_value = border_value;
        self
    }

    pub fn origin(mut self, origin: impl IntoOrigin<N>) -> Self {
        self.origin = origin.into_origin();
        self
    }

    fn kernel(&self) -> Result<Kernel<bool>> {
        let structure = match &self.structure {
            Some(s) => s.to_owned().into_dyn(),
            None => generate_binary_structure(N, 1),
        };
        if structure.is_empty() {
            return Err(NdImageError::EmptyFootprint);
        }
        Kernel::new(structure, &self.origin)
    }

    fn mask_for(&self, shape: &[usize]) -> Result<Option<ArrayViewD<'_, bool>>> {
        self.mask
            .as_ref()
            .map(|m| {
                check_same_shape(shape, m.shape())?;
                Ok(m.view().into_dyn())
            })
            .transpose()
    }
}

/// Options of the grey morphology operations.
///
/// Either a window or a structure must be set. A structure adds its weights to
/// the neighborhood values (subtracts them for erosion) and, when no window is
/// set, selects its whole box.
#[derive(Clone)]
pub struct GreyMorphology<'a, const N: usize> {
    window: Option<Window<'a, N>>,
    structure: Option<ArrayView<'a, f64, Dim<[Ix; N]>>>,
    mode: BoundaryMode,
    origin: [isize; N],
}

impl<const N: usize> Default for GreyMorphology<'_, N> {
    fn default() -> Self {
        Self {
            window: None,
            structure: None,
            mode: BoundaryMode::default(),
            origin: [0; N],
        }
    }
}

impl<'a, const N: usize> GreyMorphology<'a, N>
where
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// A size (scalar or per axis) or a boolean footprint.
    pub fn window(mut self, window: impl IntoWindow<'a, N>) -> Self {
        self.window = Some(window.into_window());
        self
    }

    pub fn structure<S: Data<Elem = f64>>(mut self, structure: &'a ArrayBase<S, Dim<[Ix; N]>>) -> Self {
        self.structure = Some(structure.view());
        self
    }

    pub fn mode(mut self, mode: BoundaryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn origin(mut self, origin: impl IntoOrigin<N>) -> Self {
        self.origin = origin.into_origin();
        self
    }

    /// The neighborhood mask and the optional additive weights.
    fn parts(&self) -> Result<(ArrayD<bool>, Option<ArrayD<f64>>)> {
        let structure = self.structure.as_ref().map(|s| s.to_owned().into_dyn());
        let mask = match (&self.window, &structure) {
            (Some(window), _) => window.to_mask(),
            (None, Some(s)) => ArrayD::from_elem(s.raw_dim(), true),
            (None, None) => return Err(NdImageError::MissingWindow),
        };
        if let Some(s) = &structure {
            check_same_shape(mask.shape(), s.shape())?;
        }
        if !mask.iter().any(|&b| b) {
            return Err(NdImageError::EmptyFootprint);
        }
        Ok((mask, structure))
    }
}

pub trait BinaryMorphologyExt<T: Element, const N: usize> {
    /// Binary erosion: a cell is set when every cell selected by the structure,
    /// placed at that cell, is set.
    fn binary_erosion(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>>;

    /// Same as [`BinaryMorphologyExt::binary_erosion`], cast into `output`.
    fn binary_erosion_into<O: Element>(
        &self,
        options: &BinaryMorphology<'_, N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()>;

    /// Binary dilation: a cell is set when the structure, reflected through its
    /// origin and placed at that cell, hits a set cell.
    fn binary_dilation(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>>;

    fn binary_dilation_into<O: Element>(
        &self,
        options: &BinaryMorphology<'_, N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()>;

    /// Erosion followed by dilation with the same options.
    fn binary_opening(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>>;

    /// Dilation followed by erosion with the same options.
    fn binary_closing(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>>;

    /// Dilation repeated until stable, usually restricted by a mask.
    fn binary_propagation(
        &self,
        options: &BinaryMorphology<'_, N>,
    ) -> Result<Array<bool, Dim<[Ix; N]>>>;

    /// Sets every unset region that is not connected to the array border.
    ///
    /// Only the structure and origin of `options` are used.
    fn binary_fill_holes(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>>;

    /// Cells where `hit` fits the set cells and `miss` fits the unset ones.
    /// Outside the input everything is unset.
    ///
    /// `hit` defaults to face connectivity and `miss` to the complement of `hit`.
    fn binary_hit_or_miss(
        &self,
        hit: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>,
        miss: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>,
        hit_origin: impl IntoOrigin<N>,
        miss_origin: impl IntoOrigin<N>,
    ) -> Result<Array<bool, Dim<[Ix; N]>>>;
}

impl<T, S, const N: usize> BinaryMorphologyExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn binary_erosion(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!(
            "binary_erosion: shape {:?}, iterations {:?}, border {}",
            self.shape(),
            options.iterations,
            options.border_value
        );
        into_rank(binary_dyn(&to_bool(self), options, false)?)
    }

    fn binary_erosion_into<O: Element>(
        &self,
        options: &BinaryMorphology<'_, N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()> {
        log::debug!("binary_erosion_into: shape {:?}", self.shape());
        write_output(&binary_dyn(&to_bool(self), options, false)?, output)
    }

    fn binary_dilation(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!(
            "binary_dilation: shape {:?}, iterations {:?}, border {}",
            self.shape(),
            options.iterations,
            options.border_value
        );
        into_rank(binary_dyn(&to_bool(self), options, true)?)
    }

    fn binary_dilation_into<O: Element>(
        &self,
        options: &BinaryMorphology<'_, N>,
        output: &mut ArrayViewMut<O, Dim<[Ix; N]>>,
    ) -> Result<()> {
        log::debug!("binary_dilation_into: shape {:?}", self.shape());
        write_output(&binary_dyn(&to_bool(self), options, true)?, output)
    }

    fn binary_opening(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!("binary_opening: shape {:?}", self.shape());
        let eroded = binary_dyn(&to_bool(self), options, false)?;
        into_rank(binary_dyn(&eroded, options, true)?)
    }

    fn binary_closing(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!("binary_closing: shape {:?}", self.shape());
        let dilated = binary_dyn(&to_bool(self), options, true)?;
        into_rank(binary_dyn(&dilated, options, false)?)
    }

    fn binary_propagation(
        &self,
        options: &BinaryMorphology<'_, N>,
    ) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!("binary_propagation: shape {:?}", self.shape());
        let options = options.clone().iterations(Iterations::UntilStable);
        into_rank(binary_dyn(&to_bool(self), &options, true)?)
    }

    fn binary_fill_holes(&self, options: &BinaryMorphology<'_, N>) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!("binary_fill_holes: shape {:?}", self.shape());
        let mask = to_bool(self).mapv(|v| !v);
        let kernel = options.kernel()?.reflect();
        let seed = ArrayD::from_elem(mask.raw_dim(), false);
        let outside = binary::iterate(
            seed,
            &kernel,
            true,
            true,
            Iterations::UntilStable,
            Some(&mask.view()),
        )?;
        into_rank(outside.mapv(|v| !v))
    }

    fn binary_hit_or_miss(
        &self,
        hit: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>,
        miss: Option<ArrayView<'_, bool, Dim<[Ix; N]>>>,
        hit_origin: impl IntoOrigin<N>,
        miss_origin: impl IntoOrigin<N>,
    ) -> Result<Array<bool, Dim<[Ix; N]>>> {
        log::debug!("binary_hit_or_miss: shape {:?}", self.shape());
        let hit = match hit {
            Some(h) => h.to_owned().into_dyn(),
            None => generate_binary_structure(N, 1),
        };
        let miss = match miss {
            Some(m) => m.to_owned().into_dyn(),
            None => hit.mapv(|v| !v),
        };
        if hit.is_empty() || miss.is_empty() {
            return Err(NdImageError::EmptyFootprint);
        }

        let input = to_bool(self);
        let hit = Kernel::new(hit, &hit_origin.into_origin())?;
        let miss = Kernel::new(miss, &miss_origin.into_origin())?;
        let mut res = binary::pass(&input.view(), &hit, false, false)?;
        // cells outside the input count as background
        let background = binary::pass(&input.mapv(|v| !v).view(), &miss, true, false)?;
        Zip::from(&mut res).and(&background).for_each(|r, &b| *r &= b);
        into_rank(res)
    }
}

pub trait GreyMorphologyExt<T: Element, const N: usize> {
    /// Minimum over the window, minus the structure weights.
    fn grey_erosion(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Maximum over the reflected window, plus the reflected structure weights.
    fn grey_dilation(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Erosion followed by dilation.
    fn grey_opening(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// Dilation followed by erosion.
    fn grey_closing(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// `dilation - erosion`.
    fn morphological_gradient(
        &self,
        options: &GreyMorphology<'_, N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// `dilation + erosion - 2 * input`.
    fn morphological_laplace(
        &self,
        options: &GreyMorphology<'_, N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// `input - opening`.
    fn white_tophat(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>>;

    /// `closing - input`.
    fn black_tophat(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>>;
}

impl<T, S, const N: usize> GreyMorphologyExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn grey_erosion(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("grey_erosion: shape {:?}, mode {:?}", self.shape(), options.mode);
        into_rank(grey_view(&self.view().into_dyn(), options, false)?)
    }

    fn grey_dilation(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("grey_dilation: shape {:?}, mode {:?}", self.shape(), options.mode);
        into_rank(grey_view(&self.view().into_dyn(), options, true)?)
    }

    fn grey_opening(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("grey_opening: shape {:?}", self.shape());
        into_rank(opening(&self.view().into_dyn(), options)?)
    }

    fn grey_closing(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("grey_closing: shape {:?}", self.shape());
        into_rank(closing(&self.view().into_dyn(), options)?)
    }

    fn morphological_gradient(
        &self,
        options: &GreyMorphology<'_, N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("morphological_gradient: shape {:?}", self.shape());
        let input = self.view().into_dyn();
        let dilated = grey_view(&input, options, true)?;
        let eroded = grey_view(&input, options, false)?;
        into_rank(Zip::from(&dilated).and(&eroded).map_collect(|&d, &e| {
            T::from_f64(d.to_f64() - e.to_f64())
        }))
    }

    fn morphological_laplace(
        &self,
        options: &GreyMorphology<'_, N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("morphological_laplace: shape {:?}", self.shape());
        let input = self.view().into_dyn();
        let dilated = grey_view(&input, options, true)?;
        let eroded = grey_view(&input, options, false)?;
        into_rank(
            Zip::from(&dilated)
                .and(&eroded)
                .and(&input)
                .map_collect(|&d, &e, &x| T::from_f64(d.to_f64() + e.to_f64() - 2.0 * x.to_f64())),
        )
    }

    fn white_tophat(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("white_tophat: shape {:?}", self.shape());
        let input = self.view().into_dyn();
        let opened = opening(&input, options)?;
        into_rank(
            Zip::from(&input)
                .and(&opened)
                .map_collect(|&x, &o| T::from_f64(x.to_f64() - o.to_f64())),
        )
    }

    fn black_tophat(&self, options: &GreyMorphology<'_, N>) -> Result<Array<T, Dim<[Ix; N]>>> {
        log::debug!("black_tophat: shape {:?}", self.shape());
        let input = self.view().into_dyn();
        let closed = closing(&input, options)?;
        into_rank(
            Zip::from(&closed)
                .and(&input)
                .map_collect(|&c, &x| T::from_f64(c.to_f64() - x.to_f64())),
        )
    }
}

fn to_bool<T, S, const N: usize>(input: &ArrayBase<S, Dim<[Ix; N]>>) -> ArrayD<bool>
where
    T: Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
{
    input.view().into_dyn().mapv(|v| v.is_nonzero())
}

fn binary_dyn<const N: usize>(
    input: &ArrayD<bool>,
    options: &BinaryMorphology<'_, N>,
    dilate: bool,
) -> Result<ArrayD<bool>>
where
    Dim<[Ix; N]>: Dimension,
{
    let mut kernel = options.kernel()?;
    if dilate {
        kernel = kernel.reflect();
    }
    let mask = options.mask_for(input.shape())?;
    binary::iterate(
        input.clone(),
        &kernel,
        options.border_value,
        dilate,
        options.iterations,
        mask.as_ref(),
    )
}

fn grey_view<T: Element, const N: usize>(
    input: &ArrayViewD<T>,
    options: &GreyMorphology<'_, N>,
    dilate: bool,
) -> Result<ArrayD<T>>
where
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    let (mask, structure) = options.parts()?;
    grey::grey_dyn(
        input,
        &mask,
        structure.as_ref(),
        &options.origin,
        options.mode,
        dilate,
    )
}

fn opening<T: Element, const N: usize>(
    input: &ArrayViewD<T>,
    options: &GreyMorphology<'_, N>,
) -> Result<ArrayD<T>>
where
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    let eroded = grey_view(input, options, false)?;
    grey_view(&eroded.view(), options, true)
}

fn closing<T: Element, const N: usize>(
    input: &ArrayViewD<T>,
    options: &GreyMorphology<'_, N>,
) -> Result<ArrayD<T>>
where
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    let dilated = grey_view(input, options, true)?;
    grey_view(&dilated.view(), options, false)
}
