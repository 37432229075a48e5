use ndarray::{Array, Axis, Dimension, Slice};

use crate::{BoundaryMode, Element};

#[inline]
fn copy_plane<T: Element, D: Dimension>(
    buffer: &mut Array<T, D>,
    dim: usize,
    from: usize,
    to: usize,
) {
    let plane = buffer
        .slice_axis(Axis(dim), Slice::from(from..from + 1))
        .to_owned();
    buffer
        .slice_axis_mut(Axis(dim), Slice::from(to..to + 1))
        .assign(&plane);
}

#[inline]
fn fill_plane<T: Element, D: Dimension>(buffer: &mut Array<T, D>, dim: usize, at: usize, value: T) {
    buffer
        .slice_axis_mut(Axis(dim), Slice::from(at..at + 1))
        .fill(value);
}

#[inline]
pub fn constant_front<T: Element, D: Dimension>(
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
    constant: T,
) {
    for j in 0..padding[0] {
        fill_plane(buffer, dim, j, constant);
    }
}

#[inline]
pub fn constant_back<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
    constant: T,
) {
    for j in input_len + padding[0]..buffer.len_of(Axis(dim)) {
        fill_plane(buffer, dim, j, constant);
    }
}

/// Fills the front padding of `dim` by mapping every padded position back
/// into the source range through `mode`.
#[inline]
pub fn mapped_front<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
    mode: BoundaryMode,
) {
    for j in 0..padding[0] {
        if let Some(src) = mode.map_index(j as isize - padding[0] as isize, input_len) {
            copy_plane(buffer, dim, padding[0] + src, j);
        }
    }
}

#[inline]
pub fn mapped_back<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
    mode: BoundaryMode,
) {
    for j in input_len + padding[0]..buffer.len_of(Axis(dim)) {
        if let Some(src) = mode.map_index((j - padding[0]) as isize, input_len) {
            copy_plane(buffer, dim, padding[0] + src, j);
        }
    }
}
