//! In-place quicksort over a run of sibling ids.
//!
//! Sorting permutes the entries of one [`DepthIndex`](crate::DepthIndex) row
//! and never moves node records, so slot ids held elsewhere (parents, alias
//! targets) stay valid. Not stable.

use std::cmp::Ordering;

use crate::arena::Arena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Key,
    Value,
}

/// Sorts row positions `[lo, hi)` at `depth`.
pub(crate) fn sort_run(arena: &mut Arena<'_>, depth: usize, lo: usize, hi: usize, mode: SortMode) {
    let mut lo = lo;
    let mut hi = hi.min(arena.index().len(depth));
    // recurse into the smaller side, loop on the larger
    while hi > lo + 1 {
        let mid = partition(arena, depth, lo, hi, mode);
        if mid - lo < hi - mid {
            sort_run(arena, depth, lo, mid, mode);
            lo = mid + 1;
        } else {
            sort_run(arena, depth, mid + 1, hi, mode);
            hi = mid;
        }
    }
}

fn partition(arena: &mut Arena<'_>, depth: usize, lo: usize, hi: usize, mode: SortMode) -> usize {
    let pivot = hi - 1;
    arena.index_mut().swap(depth, lo + (hi - lo) / 2, pivot);
    let mut store = lo;
    for pos in lo..pivot {
        if compare(arena, depth, pos, pivot, mode) == Ordering::Less {
            arena.index_mut().swap(depth, pos, store);
            store += 1;
        }
    }
    arena.index_mut().swap(depth, store, pivot);
    store
}

fn compare(arena: &Arena<'_>, depth: usize, a: usize, b: usize, mode: SortMode) -> Ordering {
    let (Some(a), Some(b)) = (arena.index().val(depth, a), arena.index().val(depth, b)) else {
        return Ordering::Equal;
    };
    let (a, b) = (arena.node_at(a), arena.node_at(b));
    match mode {
        SortMode::Key => a.key_bytes().cmp(&b.key_bytes()),
        SortMode::Value => a.value().bytes(arena).cmp(&b.value().bytes(arena)),
    }
}
