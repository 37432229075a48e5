//! Marker-based watershed by the image foresting transform.

use std::collections::VecDeque;

use super::label::Connectivity;

/// Grey levels accepted by the watershed. The number of levels bounds the
/// priority queue.
pub trait WatershedInput: Copy + Send + Sync {
    const LEVELS: usize;

    fn level(self) -> usize;
}

impl WatershedInput for u8 {
    const LEVELS: usize = 1 << 8;

    #[inline]
    fn level(self) -> usize {
        self as usize
    }
}

impl WatershedInput for u16 {
    const LEVELS: usize = 1 << 16;

    #[inline]
    fn level(self) -> usize {
        self as usize
    }
}

/// Floods `levels` from the nonzero `markers`, both in raster order.
///
/// The cost of a path is its largest step between neighboring levels. Every
/// cell takes the label of the marker reaching it at the lowest cost. Within
/// one cost, cells reached from a positive marker are expanded newest first,
/// cells reached from a negative marker oldest first.
pub(crate) fn watershed_flat(
    levels: &[usize],
    markers: &[i32],
    connectivity: &Connectivity,
    level_count: usize,
) -> Vec<i32> {
    let n = levels.len();
    let mut cost = vec![usize::MAX; n];
    let mut labels = vec![0; n];
    let mut done = vec![false; n];
    let mut buckets: Vec<VecDeque<usize>> = vec![VecDeque::new(); level_count];

    let push = |bucket: &mut VecDeque<usize>, p: usize, label: i32| {
        if label > 0 {
            bucket.push_front(p);
        } else {
            bucket.push_back(p);
        }
    };

    for (p, &m) in markers.iter().enumerate() {
        if m != 0 {
            cost[p] = 0;
            labels[p] = m;
            push(&mut buckets[0], p, m);
        }
    }

    for level in 0..level_count {
        while let Some(v) = buckets[level].pop_front() {
            // superseded entries of already settled cells
            if done[v] {
                continue;
            }
            done[v] = true;
            connectivity.for_each_neighbor(v, |p| {
                if done[p] {
                    return;
                }
                let step = levels[p].abs_diff(levels[v]);
                let c = cost[v].max(step);
                if c < cost[p] {
                    cost[p] = c;
                    labels[p] = labels[v];
                    push(&mut buckets[c], p, labels[v]);
                }
            });
        }
    }
    labels
}
