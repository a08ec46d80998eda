//! Structural edits on built trees: filtering, ordering, aliasing, swapping.

use crate::index::DepthIndex;
use crate::node::{NodeRef, NodeType};
use crate::sort::{self, SortMode};
use crate::{Error, NodeId, Result};

use super::Arena;

impl Arena<'_> {
    pub(crate) fn index_mut(&mut self) -> &mut DepthIndex {
        &mut self.index
    }

    /// Calls `f` for each child of the first root.
    pub fn each(&self, f: impl FnMut(usize, NodeRef<'_>)) {
        self.root().each(f)
    }

    /// Drops every direct child of `parent` matching `pred` from the parent's
    /// child range. Slots stay allocated. Returns the number removed.
    pub fn remove_if(
        &mut self,
        parent: NodeId,
        mut pred: impl FnMut(usize, NodeRef<'_>) -> bool,
    ) -> Result<usize> {
        let node = *self.live_node(parent)?;
        let depth = node.depth + 1;
        let mut pos = node.offset;
        let mut limit = node.limit.min(self.index.len(depth));
        let mut seen = 0;
        let mut removed = 0;
        while pos < limit {
            let Some(id) = self.index.val(depth, pos) else {
                break;
            };
            let hit = pred(seen, self.node_at(id));
            seen += 1;
            if !hit {
                pos += 1;
                continue;
            }
            self.index.remove(depth, pos);
            limit -= 1;
            removed += 1;
            self.shift_ranges(node.depth, parent, pos);
        }
        if let Some(owner) = self.node_mut(parent) {
            owner.limit = limit.max(owner.offset);
        }
        Ok(removed)
    }

    /// Pulls back the child ranges that start past a removed row position.
    fn shift_ranges(&mut self, depth: usize, owner: NodeId, removed: usize) {
        for (id, node) in self.nodes[..self.live].iter_mut().enumerate() {
            if id != owner && node.depth == depth && node.offset > removed {
                node.offset -= 1;
                node.limit = node.limit.saturating_sub(1).max(node.offset);
            }
        }
    }

    /// Orders the children of an object by decoded key. Other types are left
    /// untouched.
    pub fn sort_keys(&mut self, id: NodeId) -> Result<()> {
        let node = *self.live_node(id)?;
        if node.kind == NodeType::Object {
            sort::sort_run(self, node.depth + 1, node.offset, node.limit, SortMode::Key);
        }
        Ok(())
    }

    /// Orders the children of an object or array by decoded value.
    pub fn sort(&mut self, id: NodeId) -> Result<()> {
        let node = *self.live_node(id)?;
        if node.kind.is_container() {
            sort::sort_run(self, node.depth + 1, node.offset, node.limit, SortMode::Value);
        }
        Ok(())
    }

    /// Points alias node `alias` at `target`. Lookups through the alias then
    /// resolve to the target's subtree.
    pub fn alias_of(&mut self, alias: NodeId, target: NodeId) -> Result<()> {
        let node = *self.live_node(alias)?;
        self.live_node(target)?;
        if node.kind != NodeType::Alias {
            return Err(Error::incompatible(NodeType::Alias, node.kind));
        }
        let depth = node.depth + 1;
        if node.limit > node.offset && self.index.set(depth, node.offset, target) {
            if let Some(owner) = self.node_mut(alias) {
                owner.limit = owner.offset + 1;
            }
            return Ok(());
        }
        let len = self.index.register(depth, target);
        if let Some(owner) = self.node_mut(alias) {
            owner.offset = len - 1;
            owner.limit = len;
        }
        Ok(())
    }

    /// Exchanges the tree positions of two nodes at the same depth, parents
    /// included. Slot ids and subtrees stay attached to their nodes.
    pub fn swap_with(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let (left, right) = (*self.live_node(a)?, *self.live_node(b)?);
        if a == b {
            return Ok(());
        }
        if left.depth != right.depth {
            return Err(Error::internal("swapped nodes must share a depth"));
        }
        let depth = left.depth;
        let (Some(pa), Some(pb)) = (self.index.position(depth, a), self.index.position(depth, b))
        else {
            return Err(Error::internal("swapped node is not registered"));
        };
        self.index.swap(depth, pa, pb);
        self.nodes[a].parent = right.parent;
        self.nodes[b].parent = left.parent;
        Ok(())
    }
}
