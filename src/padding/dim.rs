use ndarray::{Array, Dimension};

use super::half_dim;
use crate::{BoundaryMode, Element};

#[inline]
pub fn constant<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
    constant: T,
) {
    half_dim::constant_front(buffer, dim, padding, constant);
    half_dim::constant_back(input_len, buffer, dim, padding, constant);
}

#[inline]
pub fn nearest<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
) {
    half_dim::mapped_front(input_len, buffer, dim, padding, BoundaryMode::Nearest);
    half_dim::mapped_back(input_len, buffer, dim, padding, BoundaryMode::Nearest);
}

#[inline]
pub fn reflect<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
) {
    half_dim::mapped_front(input_len, buffer, dim, padding, BoundaryMode::Reflect);
    half_dim::mapped_back(input_len, buffer, dim, padding, BoundaryMode::Reflect);
}

#[inline]
pub fn wrap<T: Element, D: Dimension>(
    input_len: usize,
    buffer: &mut Array<T, D>,
    dim: usize,
    padding: [usize; 2],
) {
    half_dim::mapped_front(input_len, buffer, dim, padding, BoundaryMode::Wrap);
    half_dim::mapped_back(input_len, buffer, dim, padding, BoundaryMode::Wrap);
}
