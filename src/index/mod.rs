//! Depth-bucketed node index.
//!
//! Row `d` holds the ids of every node registered at depth `d`, in
//! registration order. A parent at depth `d` owns the contiguous run
//! `row(d + 1)[offset..limit]` as its child list.

use crate::NodeId;

#[derive(Debug, Default, Clone)]
pub struct DepthIndex {
    tree: Vec<Vec<NodeId>>,
    depth: usize,
}

impl DepthIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the row at `depth` and returns the new row length.
    pub fn register(&mut self, depth: usize, id: NodeId) -> usize {
        while self.tree.len() <= depth {
            self.tree.push(Vec::new());
        }
        self.depth = self.depth.max(depth + 1);
        let row = &mut self.tree[depth];
        row.push(id);
        row.len()
    }

    pub fn len(&self, depth: usize) -> usize {
        self.tree.get(depth).map_or(0, Vec::len)
    }

    /// Number of rows touched since the last reset.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn row(&self, depth: usize) -> &[NodeId] {
        self.tree.get(depth).map_or(&[], Vec::as_slice)
    }

    /// Subset `[lo, hi)` of a row, clamped to the live row length.
    pub fn get(&self, depth: usize, lo: usize, hi: usize) -> &[NodeId] {
        let row = self.row(depth);
        let hi = hi.min(row.len());
        row.get(lo..hi).unwrap_or(&[])
    }

    pub fn val(&self, depth: usize, pos: usize) -> Option<NodeId> {
        self.row(depth).get(pos).copied()
    }

    /// Truncates row `depth` to `offset` entries and empties every deeper row.
    pub fn reset_from(&mut self, depth: usize, offset: usize) {
        let Some(row) = self.tree.get_mut(depth) else {
            return;
        };
        row.truncate(offset);
        for deeper in self.tree.iter_mut().skip(depth + 1) {
            deeper.clear();
        }
    }

    /// Drops every id at or above `id`, wherever it sits in its row.
    ///
    /// Returns, per row, the count of dropped entries before each position
    /// of the old row (`len + 1` entries), so ranges into the old row can be
    /// remapped onto the compacted one.
    pub(crate) fn forget_from(&mut self, id: NodeId) -> Vec<Vec<usize>> {
        let mut dropped = Vec::with_capacity(self.tree.len());
        for row in &mut self.tree {
            let mut prefix = Vec::with_capacity(row.len() + 1);
            let mut count = 0;
            prefix.push(count);
            for &entry in row.iter() {
                if entry >= id {
                    count += 1;
                }
                prefix.push(count);
            }
            row.retain(|&entry| entry < id);
            dropped.push(prefix);
        }
        dropped
    }

    pub(crate) fn remove(&mut self, depth: usize, pos: usize) -> Option<NodeId> {
        let row = self.tree.get_mut(depth)?;
        (pos < row.len()).then(|| row.remove(pos))
    }

    pub(crate) fn set(&mut self, depth: usize, pos: usize, id: NodeId) -> bool {
        match self.tree.get_mut(depth).and_then(|row| row.get_mut(pos)) {
            Some(slot) => {
                *slot = id;
                true
            }
            None => false,
        }
    }

    pub(crate) fn position(&self, depth: usize, id: NodeId) -> Option<usize> {
        self.row(depth).iter().position(|&entry| entry == id)
    }

    pub(crate) fn swap(&mut self, depth: usize, a: usize, b: usize) {
        if let Some(row) = self.tree.get_mut(depth) {
            if a < row.len() && b < row.len() {
                row.swap(a, b);
            }
        }
    }

    /// Empties every row in O(depth); row capacity is kept for the next parse.
    pub fn reset(&mut self) {
        for row in &mut self.tree {
            row.clear();
        }
        self.depth = 0;
    }
}
