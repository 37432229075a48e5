//! Two-pass chamfer sweep with unit steps.

use ndarray::Dimension;

use crate::{
    footprint::{raster_strides, unravel},
    generate_binary_structure,
};

/// Neighbor offsets of the structure with the given connectivity, split into
/// those preceding the center in raster order and those following it.
fn half_masks(rank: usize, connectivity: usize) -> (Vec<Vec<isize>>, Vec<Vec<isize>>) {
    let structure = generate_binary_structure(rank, connectivity);
    let mut before = Vec::new();
    let mut after = Vec::new();
    for (index, &on) in structure.indexed_iter() {
        let offset: Vec<isize> = index.slice().iter().map(|&i| i as isize - 1).collect();
        match offset.iter().find(|&&d| d != 0) {
            Some(&d) if on && d < 0 => before.push(offset),
            Some(_) if on => after.push(offset),
            _ => {}
        }
    }
    (before, after)
}

/// Flat index of `coords + offset`, if inside `shape`.
fn step(coords: &[usize], offset: &[isize], shape: &[usize], strides: &[usize]) -> Option<usize> {
    let mut flat = 0;
    for (((&c, &d), &len), &stride) in coords.iter().zip(offset).zip(shape).zip(strides) {
        let c = c as isize + d;
        if c < 0 || c >= len as isize {
            return None;
        }
        flat += c as usize * stride;
    }
    Some(flat)
}

/// Number of unit steps from every cell to the nearest background cell, with
/// the flat index of that cell. `None` when there is no background at all.
pub(crate) fn sweep(shape: &[usize], foreground: &[bool], connectivity: usize) -> (Vec<Option<usize>>, Vec<usize>) {
    let strides = raster_strides(shape);
    let (before, after) = half_masks(shape.len(), connectivity);

    let mut steps: Vec<Option<usize>> = foreground.iter().map(|&f| (!f).then_some(0)).collect();
    let mut nearest: Vec<usize> = (0..foreground.len()).collect();
    let mut coords = vec![0; shape.len()];

    let mut relax = |p: usize, mask: &[Vec<isize>], coords: &mut [usize]| {
        if steps[p] == Some(0) {
            return;
        }
        unravel(p, &strides, coords);
        for offset in mask {
            let Some(q) = step(coords, offset, shape, &strides) else {
                continue;
            };
            if let Some(s) = steps[q] {
                if steps[p].map_or(true, |current| s + 1 < current) {
                    steps[p] = Some(s + 1);
                    nearest[p] = nearest[q];
                }
            }
        }
    };

    for p in 0..foreground.len() {
        relax(p, &before, &mut coords);
    }
    for p in (0..foreground.len()).rev() {
        relax(p, &after, &mut coords);
    }
    (steps, nearest)
}
