//! Node arena: the owning container behind every parse session.
//!
//! The arena owns a slot store of fixed-size [`Node`] records, the
//! [`DepthIndex`] that encodes parent/child ranges, a scratch byte buffer and
//! the installed source. Slots are recycled across [`Arena::reset`]: the live
//! count drops to zero while allocated capacity is kept for the next parse.

mod buffer;
mod edit;

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::helper::{Helper, Parser};
use crate::index::DepthIndex;
use crate::node::{Node, NodeRef, NodeType};
use crate::options::ArenaOptions;
use crate::{Error, NodeId, Result};

#[derive(Debug, Clone, Copy, Default)]
enum Source<'a> {
    #[default]
    None,
    Borrowed(&'a [u8]),
    /// Lives in `Arena::source_buf`.
    Owned,
}

/// Lifetime-free storage of an arena, detached for reuse with another source.
#[derive(Default)]
pub struct ArenaParts {
    nodes: Vec<Node>,
    buf: Vec<u8>,
    source_buf: Vec<u8>,
    index: DepthIndex,
    helper: Option<Arc<dyn Helper>>,
    options: ArenaOptions,
}

impl ArenaParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated node slots held by these parts.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }
}

pub struct Arena<'a> {
    source: Source<'a>,
    source_buf: Vec<u8>,
    buf: Vec<u8>,
    nodes: Vec<Node>,
    live: usize,
    err_offset: usize,
    index: DepthIndex,
    helper: Option<Arc<dyn Helper>>,
    options: ArenaOptions,
}

impl fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("live", &self.live)
            .field("capacity", &self.nodes.len())
            .field("depth", &self.index.depth())
            .field("source_len", &self.source_len())
            .field("buf_len", &self.buf.len())
            .field("helper", &self.helper.is_some())
            .finish()
    }
}

impl Default for Arena<'_> {
    fn default() -> Self {
        Self::with_options(ArenaOptions::default())
    }
}

impl<'a> Arena<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ArenaOptions) -> Self {
        let mut parts = ArenaParts::new();
        parts.options = options;
        Self::with_parts(parts)
    }

    /// Builds an arena over recycled storage. Live state is cleared, capacity
    /// is kept.
    pub fn with_parts(parts: ArenaParts) -> Self {
        let mut arena = Self {
            source: Source::None,
            source_buf: parts.source_buf,
            buf: parts.buf,
            nodes: parts.nodes,
            live: 0,
            err_offset: 0,
            index: parts.index,
            helper: parts.helper,
            options: parts.options,
        };
        arena.buf.clear();
        arena.source_buf.clear();
        arena.index.reset();
        let prealloc = arena.options.prealloc;
        arena.prealloc(prealloc);
        trace!(capacity = arena.nodes.len(), "arena built from parts");
        arena
    }

    /// Resets the arena and releases its storage for reuse.
    pub fn into_parts(mut self) -> ArenaParts {
        self.reset();
        trace!(capacity = self.nodes.len(), "arena detached into parts");
        ArenaParts {
            nodes: self.nodes,
            buf: self.buf,
            source_buf: self.source_buf,
            index: self.index,
            helper: self.helper,
            options: self.options,
        }
    }

    pub fn options(&self) -> &ArenaOptions {
        &self.options
    }

    pub fn set_helper(&mut self, helper: Arc<dyn Helper>) {
        self.helper = Some(helper);
    }

    pub fn clear_helper(&mut self) {
        self.helper = None;
    }

    pub fn helper(&self) -> Option<&dyn Helper> {
        self.helper.as_deref()
    }

    /// Aliases caller-owned bytes as the parse source.
    pub fn set_source(&mut self, source: &'a [u8]) -> Result<()> {
        if source.is_empty() {
            return Err(Error::EmptySource);
        }
        self.source = Source::Borrowed(source);
        debug!(len = source.len(), copy = false, "source installed");
        Ok(())
    }

    /// Copies `source` into arena-owned storage, decoupling its lifetime.
    pub fn set_source_copy(&mut self, source: &[u8]) -> Result<()> {
        if source.is_empty() {
            return Err(Error::EmptySource);
        }
        self.source_buf.clear();
        self.source_buf.extend_from_slice(source);
        self.source = Source::Owned;
        debug!(len = source.len(), copy = true, "source installed");
        Ok(())
    }

    pub fn source(&self) -> &[u8] {
        match self.source {
            Source::None => &[],
            Source::Borrowed(source) => source,
            Source::Owned => &self.source_buf,
        }
    }

    pub fn source_len(&self) -> usize {
        self.source().len()
    }

    pub fn source_at(&self, pos: usize) -> Option<u8> {
        self.source().get(pos).copied()
    }

    /// Decodes the UTF-8 character starting at byte `pos` and returns it with
    /// its encoded width. Invalid sequences yield U+FFFD with width 1.
    pub fn read_char_at(&self, pos: usize) -> Option<(char, usize)> {
        let tail = self.source().get(pos..).filter(|tail| !tail.is_empty())?;
        let head = &tail[..tail.len().min(4)];
        let valid = match std::str::from_utf8(head) {
            Ok(text) => text,
            Err(err) => std::str::from_utf8(&head[..err.valid_up_to()]).unwrap_or_default(),
        };
        match valid.chars().next() {
            Some(ch) => Some((ch, ch.len_utf8())),
            None => Some((char::REPLACEMENT_CHARACTER, 1)),
        }
    }

    pub fn set_error_offset(&mut self, offset: usize) {
        self.err_offset = offset;
    }

    pub fn error_offset(&self) -> usize {
        self.err_offset
    }

    /// Live node count.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocated node slots, live or recyclable.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn index(&self) -> &DepthIndex {
        &self.index
    }

    pub fn acquire_node(&mut self, depth: usize) -> NodeId {
        self.acquire_node_with_type(depth, NodeType::Unknown)
    }

    /// Takes the next slot at `depth` and registers it in that depth's row.
    /// The node gets no parent; depth-0 nodes become roots.
    pub fn acquire_node_with_type(&mut self, depth: usize, kind: NodeType) -> NodeId {
        let id = self.acquire_slot(depth, kind);
        self.index.register(depth, id);
        id
    }

    pub fn acquire_child(&mut self, parent: NodeId) -> Result<NodeId> {
        self.acquire_child_with_type(parent, NodeType::Unknown)
    }

    /// Takes the next slot one level below `parent` and appends it to the
    /// parent's child range. All children of one parent must be acquired
    /// before another node at the parent's depth starts its own children.
    pub fn acquire_child_with_type(&mut self, parent: NodeId, kind: NodeType) -> Result<NodeId> {
        let depth = self.live_node(parent)?.depth + 1;
        let id = self.acquire_slot(depth, kind);
        self.nodes[id].parent = Some(parent);
        let limit = self.index.register(depth, id);
        let owner = &mut self.nodes[parent];
        if owner.limit == owner.offset {
            owner.offset = limit - 1;
        }
        owner.limit = limit;
        Ok(id)
    }

    fn acquire_slot(&mut self, depth: usize, kind: NodeType) -> NodeId {
        let id = self.live;
        if id == self.nodes.len() {
            self.nodes.push(Node::default());
        }
        let offset = self.index.len(depth + 1);
        let node = &mut self.nodes[id];
        node.reset();
        node.kind = kind;
        node.depth = depth;
        node.index = id;
        node.offset = offset;
        node.limit = offset;
        self.live += 1;
        id
    }

    /// Commits a node built by value back into slot `id`.
    pub fn release_node(&mut self, id: NodeId, mut node: Node) -> Result<()> {
        let slot = self.live_node_mut(id)?;
        node.index = id;
        *slot = node;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes[..self.live].get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes[..self.live].get_mut(id)
    }

    /// Node at slot `id`, or the null sentinel when `id` is not live.
    pub fn node_at(&self, id: NodeId) -> NodeRef<'_> {
        match self.node(id) {
            Some(node) => NodeRef::new(self, node),
            None => NodeRef::null(self),
        }
    }

    pub(crate) fn live_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(Error::internal("node id is not live in this arena"))
    }

    pub(crate) fn live_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id)
            .ok_or(Error::internal("node id is not live in this arena"))
    }

    /// Grows the slot store to at least `size` slots ahead of a parse.
    pub fn prealloc(&mut self, size: usize) {
        if self.nodes.len() < size {
            trace!(from = self.nodes.len(), to = size, "preallocating node slots");
            self.nodes.resize(size, Node::default());
        }
    }

    /// Drops all live state. Allocated slots, index rows and buffers keep
    /// their capacity.
    pub fn reset(&mut self) {
        if self.options.clear_on_reset {
            for node in &mut self.nodes[..self.live] {
                node.reset();
            }
        }
        debug!(
            live = self.live,
            clear = self.options.clear_on_reset,
            "arena reset"
        );
        self.live = 0;
        self.err_offset = 0;
        self.buf.clear();
        self.source_buf.clear();
        self.source = Source::None;
        self.index.reset();
    }

    /// Rolls back every slot from `id` on, e.g. a subtree left half-built by
    /// a parse error.
    pub fn forget_from(&mut self, id: NodeId) {
        if id >= self.live {
            return;
        }
        debug!(from = id, live = self.live, "forgetting nodes");
        for node in &mut self.nodes[id..self.live] {
            node.reset();
        }
        self.live = id;
        let dropped = self.index.forget_from(id);
        for node in &mut self.nodes[..id] {
            // rows reordered by sort or swap can drop entries mid-range
            let Some(prefix) = dropped.get(node.depth + 1) else {
                continue;
            };
            let remap = |pos: usize| {
                let pos = pos.min(prefix.len() - 1);
                pos - prefix[pos]
            };
            node.offset = remap(node.offset);
            node.limit = remap(node.limit).max(node.offset);
        }
    }

    /// First registered root, or the null sentinel when there is none.
    pub fn root(&self) -> NodeRef<'_> {
        self.root_by_index(0)
    }

    pub fn root_len(&self) -> usize {
        self.index.len(0)
    }

    pub fn root_by_index(&self, index: usize) -> NodeRef<'_> {
        match self.index.val(0, index) {
            Some(id) => self.node_at(id),
            None => NodeRef::null(self),
        }
    }

    pub fn root_top(&self) -> NodeRef<'_> {
        match self.index.row(0).last() {
            Some(&id) => self.node_at(id),
            None => NodeRef::null(self),
        }
    }

    pub fn each_root(&self, mut f: impl FnMut(usize, NodeRef<'_>)) {
        for (idx, &id) in self.index.row(0).iter().enumerate() {
            f(idx, self.node_at(id));
        }
    }

    /// Unregisters every root matching `pred`. Slots are not reclaimed.
    pub fn remove_root_if(&mut self, mut pred: impl FnMut(usize, NodeRef<'_>) -> bool) -> usize {
        let mut pos = 0;
        let mut seen = 0;
        let mut removed = 0;
        while let Some(id) = self.index.val(0, pos) {
            let hit = pred(seen, self.node_at(id));
            seen += 1;
            if hit {
                self.index.remove(0, pos);
                removed += 1;
            } else {
                pos += 1;
            }
        }
        removed
    }

    pub fn exists(&self, key: &str) -> bool {
        self.root().exists(key)
    }

    pub fn equal_with(&self, other: &Arena<'_>) -> bool {
        self.root().equal_with(&other.root())
    }

    pub fn beautify(&self, w: &mut dyn Write) -> Result<()> {
        let helper = self.helper().ok_or(Error::NoHelper)?;
        helper.beautify(w, self.root())
    }

    pub fn marshal(&self, w: &mut dyn Write) -> Result<()> {
        let helper = self.helper().ok_or(Error::NoHelper)?;
        helper.marshal(w, self.root())
    }
}

/// Root-level forwards of the `NodeRef` query surface.
macro_rules! forward_to_root {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        impl Arena<'_> {
            $(
                pub fn $name(&self, $($arg: $ty),*) -> $ret {
                    self.root().$name($($arg),*)
                }
            )*
        }
    };
}

forward_to_root! {
    get(keys: &[&str]) -> NodeRef<'_>;
    get_object(keys: &[&str]) -> Result<NodeRef<'_>>;
    get_array(keys: &[&str]) -> Result<NodeRef<'_>>;
    get_bytes(keys: &[&str]) -> Result<std::borrow::Cow<'_, [u8]>>;
    get_string(keys: &[&str]) -> Result<std::borrow::Cow<'_, str>>;
    get_bool(keys: &[&str]) -> Result<bool>;
    get_float(keys: &[&str]) -> Result<f64>;
    get_int(keys: &[&str]) -> Result<i64>;
    get_uint(keys: &[&str]) -> Result<u64>;
    get_ps(path: &str, sep: &str) -> NodeRef<'_>;
    get_with(splitter: &mut crate::path::PathSplitter, path: &str, sep: &str) -> NodeRef<'_>;
    get_object_ps(path: &str, sep: &str) -> Result<NodeRef<'_>>;
    get_array_ps(path: &str, sep: &str) -> Result<NodeRef<'_>>;
    get_bytes_ps(path: &str, sep: &str) -> Result<std::borrow::Cow<'_, [u8]>>;
    get_string_ps(path: &str, sep: &str) -> Result<std::borrow::Cow<'_, str>>;
    get_bool_ps(path: &str, sep: &str) -> Result<bool>;
    get_float_ps(path: &str, sep: &str) -> Result<f64>;
    get_int_ps(path: &str, sep: &str) -> Result<i64>;
    get_uint_ps(path: &str, sep: &str) -> Result<u64>;
    dot(path: &str) -> NodeRef<'_>;
    dot_object(path: &str) -> Result<NodeRef<'_>>;
    dot_array(path: &str) -> Result<NodeRef<'_>>;
    dot_bytes(path: &str) -> Result<std::borrow::Cow<'_, [u8]>>;
    dot_string(path: &str) -> Result<std::borrow::Cow<'_, str>>;
    dot_bool(path: &str) -> Result<bool>;
    dot_float(path: &str) -> Result<f64>;
    dot_int(path: &str) -> Result<i64>;
    dot_uint(path: &str) -> Result<u64>;
}

/// The bare engine owns no grammar: every parse entry point reports
/// `NotImplemented`.
impl<'a> Parser<'a> for Arena<'a> {}
