//! Connected components and their bounding boxes.

use std::ops::Range;

use ndarray::{ArrayD, ArrayViewD, Dimension, Slice};

use crate::{footprint::raster_strides, generate_binary_structure, NdImageError, Result};

/// Neighbor offsets of a `3^N` structuring element over an array of a given shape.
pub(crate) struct Connectivity {
    shape: Vec<usize>,
    strides: Vec<usize>,
    offsets: Vec<Vec<isize>>,
}

impl Connectivity {
    /// Face connectivity when `structure` is `None`.
    pub(crate) fn new(shape: &[usize], structure: Option<ArrayViewD<bool>>) -> Result<Self> {
        let structure: ArrayD<bool> = match structure {
            Some(s) => s.to_owned(),
            None => generate_binary_structure(shape.len(), 1),
        };
        if structure.ndim() != shape.len() {
            return Err(NdImageError::RankMismatch {
                expected: shape.len(),
                found: structure.ndim(),
            });
        }
        if structure.shape().iter().any(|&s| s != 3) {
            return Err(NdImageError::InvalidStructure(
                "structure must have extent 3 along every axis",
            ));
        }
        let mirrored = structure.slice_each_axis(|_| Slice::new(0, None, -1));
        if structure.view() != mirrored {
            return Err(NdImageError::InvalidStructure(
                "structure must be symmetric about its center",
            ));
        }

        let offsets = structure
            .indexed_iter()
            .filter(|(index, on)| **on && index.slice().iter().any(|&i| i != 1))
            .map(|(index, _)| index.slice().iter().map(|&i| i as isize - 1).collect())
            .collect();

        Ok(Self {
            shape: shape.to_vec(),
            strides: raster_strides(shape),
            offsets,
        })
    }

    /// Calls `f` with the flat index of every in-bounds neighbor of `flat`.
    pub(crate) fn for_each_neighbor(&self, flat: usize, mut f: impl FnMut(usize)) {
        let mut coords = Vec::with_capacity(self.shape.len());
        let mut rest = flat;
        for &stride in &self.strides {
            coords.push(rest / stride);
            rest %= stride;
        }

        'offsets: for offset in &self.offsets {
            let mut neighbor = 0;
            for (axis, (&c, &d)) in coords.iter().zip(offset).enumerate() {
                let c = c as isize + d;
                if c < 0 || c >= self.shape[axis] as isize {
                    continue 'offsets;
                }
                neighbor += c as usize * self.strides[axis];
            }
            f(neighbor);
        }
    }
}

/// Labels the connected `true` cells of a raster-ordered mask, numbering the
/// components by their first cell.
pub(crate) fn label_flat(foreground: &[bool], connectivity: &Connectivity) -> (Vec<usize>, usize) {
    let mut labels = vec![0; foreground.len()];
    let mut count = 0;
    let mut stack = Vec::new();

    for start in 0..foreground.len() {
        if !foreground[start] || labels[start] != 0 {
            continue;
        }
        count += 1;
        labels[start] = count;
        stack.push(start);
        while let Some(p) = stack.pop() {
            connectivity.for_each_neighbor(p, |q| {
                if foreground[q] && labels[q] == 0 {
                    labels[q] = count;
                    stack.push(q);
                }
            });
        }
    }
    (labels, count)
}

/// Bounding boxes of the labels `1..=max` found in `labels`.
pub(crate) fn find_objects_dyn<const N: usize>(labels: &ArrayViewD<usize>) -> Vec<Option<[Range<usize>; N]>> {
    let mut boxes: Vec<Option<([usize; N], [usize; N])>> = Vec::new();
    for (index, &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        if boxes.len() < label {
            boxes.resize(label, None);
        }
        let index = index.slice();
        match &mut boxes[label - 1] {
            Some((lo, hi)) => {
                for (axis, &i) in index.iter().enumerate() {
                    lo[axis] = lo[axis].min(i);
                    hi[axis] = hi[axis].max(i);
                }
            }
            slot => {
                let mut corner = [0; N];
                corner.copy_from_slice(index);
                *slot = Some((corner, corner));
            }
        }
    }

    boxes
        .into_iter()
        .map(|b| b.map(|(lo, hi)| std::array::from_fn(|axis| lo[axis]..hi[axis] + 1)))
        .collect()
}
