//! Per-region accumulation for the measurement reducers.

use std::collections::HashMap;

use ndarray::{ArrayViewD, Dimension};

use crate::Element;

/// Which output slots a cell contributes to, given its label.
pub(crate) enum Selection {
    /// Every cell, one region.
    All,
    /// Every cell with a nonzero label, one region.
    Nonzero,
    /// One region per requested label; a label may be requested more than once.
    Index {
        slots: HashMap<usize, Vec<usize>>,
        len: usize,
    },
}

impl Selection {
    pub(crate) fn new(has_labels: bool, index: Option<&[usize]>) -> Self {
        match (has_labels, index) {
            (false, _) => Selection::All,
            (true, None) => Selection::Nonzero,
            (true, Some(index)) => {
                let mut slots: HashMap<usize, Vec<usize>> = HashMap::new();
                for (slot, &label) in index.iter().enumerate() {
                    slots.entry(label).or_default().push(slot);
                }
                Selection::Index {
                    slots,
                    len: index.len(),
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Selection::All | Selection::Nonzero => 1,
            Selection::Index { len, .. } => *len,
        }
    }

    pub(crate) fn slots(&self, label: usize) -> &[usize] {
        match self {
            Selection::All => &[0],
            Selection::Nonzero if label != 0 => &[0],
            Selection::Nonzero => &[],
            Selection::Index { slots, .. } => slots.get(&label).map(Vec::as_slice).unwrap_or(&[]),
        }
    }
}

/// Folds every selected cell of `input` into one accumulator per region,
/// visiting cells in raster order.
///
/// `labels`, when given, must already have the shape of `input`.
pub(crate) fn accumulate<T, A, F, const N: usize>(
    input: &ArrayViewD<T>,
    labels: Option<&ArrayViewD<usize>>,
    index: Option<&[usize]>,
    init: A,
    mut add: F,
) -> Vec<A>
where
    T: Element,
    A: Clone,
    F: FnMut(&mut A, f64, [usize; N]),
{
    let selection = Selection::new(labels.is_some(), index);
    let mut regions = vec![init; selection.len()];
    let mut label_iter = labels.map(|l| l.iter());

    for (position, &value) in input.indexed_iter() {
        let label = match &mut label_iter {
            Some(it) => it.next().copied().unwrap_or(0),
            None => 0,
        };
        let slots = selection.slots(label);
        if slots.is_empty() {
            continue;
        }
        let mut pos = [0; N];
        pos.copy_from_slice(position.slice());
        for &slot in slots {
            add(&mut regions[slot], value.to_f64(), pos);
        }
    }
    regions
}

/// Running statistics of one region.
#[derive(Debug, Clone)]
pub(crate) struct RegionStats<const N: usize> {
    pub(crate) count: usize,
    pub(crate) sum: f64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    pub(crate) min_position: [usize; N],
    pub(crate) max_position: [usize; N],
    moment: [f64; N],
}

impl<const N: usize> Default for RegionStats<N> {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: 0.0,
            max: 0.0,
            min_position: [0; N],
            max_position: [0; N],
            moment: [0.0; N],
        }
    }
}

impl<const N: usize> RegionStats<N> {
    pub(crate) fn add(&mut self, value: f64, position: [usize; N]) {
        // strict comparisons keep the first occurrence
        if self.count == 0 || value < self.min {
            self.min = value;
            self.min_position = position;
        }
        if self.count == 0 || value > self.max {
            self.max = value;
            self.max_position = position;
        }

        self.count += 1;
        self.sum += value;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        for (m, &p) in self.moment.iter_mut().zip(&position) {
            *m += value * p as f64;
        }
    }

    /// NaN for an empty region.
    pub(crate) fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    /// Sample variance with `n - 1` degrees of freedom.
    pub(crate) fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub(crate) fn min(&self) -> f64 {
        self.min
    }

    pub(crate) fn max(&self) -> f64 {
        self.max
    }

    pub(crate) fn center_of_mass(&self) -> [f64; N] {
        self.moment.map(|m| m / self.sum)
    }
}
