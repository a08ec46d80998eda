use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::slice;

use crate::arena::Arena;
use crate::constants::{is_attribute_key, DEFAULT_SEPARATOR};
use crate::path::PathSplitter;
use crate::view::ByteView;
use crate::{Error, NodeId, Result};

use super::{Node, NodeType, NULL_NODE};

/// Read-only handle pairing a node with the arena it lives in.
///
/// Every lookup returns a `NodeRef`; misses return the shared null sentinel,
/// so chained lookups degrade to further misses instead of failing early.
#[derive(Clone, Copy)]
pub struct NodeRef<'s> {
    arena: &'s Arena<'s>,
    node: &'s Node,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("kind", &self.node.kind)
            .field("index", &self.node.index)
            .field("key", &self.key_text())
            .field("value", &self.node.value.raw_text(self.arena))
            .finish()
    }
}

impl<'s> NodeRef<'s> {
    pub(crate) fn new(arena: &'s Arena<'s>, node: &'s Node) -> Self {
        Self { arena, node }
    }

    pub(crate) fn null(arena: &'s Arena<'s>) -> Self {
        Self {
            arena,
            node: &NULL_NODE,
        }
    }

    pub fn node(&self) -> &'s Node {
        self.node
    }

    pub fn arena(&self) -> &'s Arena<'s> {
        self.arena
    }

    pub fn id(&self) -> NodeId {
        self.node.index
    }

    pub fn kind(&self) -> NodeType {
        self.node.kind
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }

    pub fn key(&self) -> ByteView {
        self.node.key
    }

    pub fn value(&self) -> ByteView {
        self.node.value
    }

    pub fn key_text(&self) -> Cow<'s, str> {
        self.node.key.text(self.arena)
    }

    pub fn key_bytes(&self) -> Cow<'s, [u8]> {
        self.node.key.bytes(self.arena)
    }

    /// Raw value text of any node type, without a type check.
    pub fn value_text(&self) -> Cow<'s, str> {
        self.node.value.text(self.arena)
    }

    pub fn parent(&self) -> NodeRef<'s> {
        match self.node.parent {
            Some(id) => self.arena.node_at(id),
            None => NodeRef::null(self.arena),
        }
    }

    /// True for the shared miss sentinel, as opposed to a parsed null value.
    pub fn is_sentinel(&self) -> bool {
        std::ptr::eq(self.node, &NULL_NODE)
    }

    pub fn is_null(&self) -> bool {
        self.node.kind == NodeType::Null
    }

    pub fn children_len(&self) -> usize {
        self.children().len()
    }

    pub fn children(&self) -> Children<'s> {
        let node = self.node;
        Children {
            arena: self.arena,
            ids: self
                .arena
                .index()
                .get(node.depth + 1, node.offset, node.limit)
                .iter(),
        }
    }

    /// Calls `f` for each direct child, left to right.
    pub fn each(&self, mut f: impl FnMut(usize, NodeRef<'s>)) {
        for (idx, child) in self.children().enumerate() {
            f(idx, child);
        }
    }

    /// Follows alias nodes to the node they stand for.
    pub fn resolve(&self) -> NodeRef<'s> {
        let mut current = *self;
        // bounded by the live count so alias cycles terminate
        for _ in 0..=self.arena.len() {
            if current.kind() != NodeType::Alias {
                return current;
            }
            match current.children().next() {
                Some(target) => current = target,
                None => return current,
            }
        }
        NodeRef::null(self.arena)
    }

    /// Object child lookup by exact key. A leading `@` restricts the match to
    /// attribute children; plain keys never match attributes.
    pub fn look(&self, key: &str) -> NodeRef<'s> {
        let node = self.resolve();
        if node.kind() != NodeType::Object {
            return NodeRef::null(self.arena);
        }
        let attribute = is_attribute_key(key);
        let wanted = if attribute { &key[1..] } else { key };
        node.children()
            .find(|child| {
                (child.kind() == NodeType::Attribute) == attribute
                    && child.key_bytes().as_ref() == wanted.as_bytes()
            })
            .unwrap_or(NodeRef::null(self.arena))
    }

    pub fn exists(&self, key: &str) -> bool {
        !self.look(key).is_sentinel()
    }

    /// Array child by position.
    pub fn at(&self, index: usize) -> NodeRef<'s> {
        let node = self.resolve();
        if node.kind() != NodeType::Array {
            return NodeRef::null(self.arena);
        }
        node.children()
            .nth(index)
            .unwrap_or(NodeRef::null(self.arena))
    }

    /// Resolves one key per level. With no keys, returns this node unchanged.
    pub fn get(&self, keys: &[&str]) -> NodeRef<'s> {
        let mut node = *self;
        for (pos, key) in keys.iter().enumerate() {
            let last = pos + 1 == keys.len();
            let current = node.resolve();
            node = match current.kind() {
                NodeType::Object => current.look(key),
                NodeType::Array => current.array_step(key, last),
                _ => NodeRef::null(self.arena),
            };
            if node.is_sentinel() {
                return node;
            }
        }
        if keys.is_empty() {
            node
        } else {
            node.resolve()
        }
    }

    fn array_step(&self, key: &str, last: bool) -> NodeRef<'s> {
        if let Ok(index) = key.parse::<usize>() {
            return self.at(index);
        }
        // an array may be addressed by its own textual name as a final segment
        let name = self.node.value;
        if last && !name.is_empty() && name.raw_bytes(self.arena) == key.as_bytes() {
            return *self;
        }
        NodeRef::null(self.arena)
    }

    fn expect(&self, kind: NodeType) -> Result<NodeRef<'s>> {
        let node = self.resolve();
        if node.kind() != kind {
            return Err(Error::incompatible(kind, node.kind()));
        }
        Ok(node)
    }

    fn expect_text(&self) -> Result<NodeRef<'s>> {
        let node = self.resolve();
        match node.kind() {
            NodeType::String | NodeType::Attribute => Ok(node),
            found => Err(Error::incompatible(NodeType::String, found)),
        }
    }

    pub fn object(&self) -> Result<NodeRef<'s>> {
        self.expect(NodeType::Object)
    }

    pub fn array(&self) -> Result<NodeRef<'s>> {
        self.expect(NodeType::Array)
    }

    pub fn bytes(&self) -> Result<Cow<'s, [u8]>> {
        let node = self.expect_text()?;
        Ok(node.node.value.bytes(self.arena))
    }

    pub fn string(&self) -> Result<Cow<'s, str>> {
        let node = self.expect_text()?;
        Ok(node.node.value.text(self.arena))
    }

    pub fn bool(&self) -> Result<bool> {
        let node = self.expect(NodeType::Bool)?;
        Ok(node.value_text().trim().parse::<bool>()?)
    }

    pub fn int(&self) -> Result<i64> {
        let node = self.expect(NodeType::Number)?;
        Ok(node.value_text().trim().parse::<i64>()?)
    }

    pub fn uint(&self) -> Result<u64> {
        let node = self.expect(NodeType::Number)?;
        Ok(node.value_text().trim().parse::<u64>()?)
    }

    pub fn float(&self) -> Result<f64> {
        let node = self.expect(NodeType::Number)?;
        Ok(node.value_text().trim().parse::<f64>()?)
    }

    fn found(&self, keys: &[&str]) -> Result<NodeRef<'s>> {
        let node = self.get(keys);
        if node.is_sentinel() {
            return Err(Error::NotFound);
        }
        Ok(node)
    }

    pub fn get_object(&self, keys: &[&str]) -> Result<NodeRef<'s>> {
        self.found(keys)?.object()
    }

    pub fn get_array(&self, keys: &[&str]) -> Result<NodeRef<'s>> {
        self.found(keys)?.array()
    }

    pub fn get_bytes(&self, keys: &[&str]) -> Result<Cow<'s, [u8]>> {
        self.found(keys)?.bytes()
    }

    pub fn get_string(&self, keys: &[&str]) -> Result<Cow<'s, str>> {
        self.found(keys)?.string()
    }

    pub fn get_bool(&self, keys: &[&str]) -> Result<bool> {
        self.found(keys)?.bool()
    }

    pub fn get_float(&self, keys: &[&str]) -> Result<f64> {
        self.found(keys)?.float()
    }

    pub fn get_int(&self, keys: &[&str]) -> Result<i64> {
        self.found(keys)?.int()
    }

    pub fn get_uint(&self, keys: &[&str]) -> Result<u64> {
        self.found(keys)?.uint()
    }

    fn with_path<T>(&self, path: &str, sep: &str, f: impl FnOnce(&[&str]) -> T) -> T {
        let mut splitter = PathSplitter::with_short_limit(self.arena.options().short_path_limit);
        let keys = splitter.split_keys(path, sep);
        f(&keys)
    }

    pub fn get_ps(&self, path: &str, sep: &str) -> NodeRef<'s> {
        self.with_path(path, sep, |keys| self.get(keys))
    }

    /// `get_ps` through a caller-held splitter, reusing its scratch across
    /// queries on long paths.
    pub fn get_with(&self, splitter: &mut PathSplitter, path: &str, sep: &str) -> NodeRef<'s> {
        let keys = splitter.split_keys(path, sep);
        self.get(&keys)
    }

    pub fn get_object_ps(&self, path: &str, sep: &str) -> Result<NodeRef<'s>> {
        self.with_path(path, sep, |keys| self.get_object(keys))
    }

    pub fn get_array_ps(&self, path: &str, sep: &str) -> Result<NodeRef<'s>> {
        self.with_path(path, sep, |keys| self.get_array(keys))
    }

    pub fn get_bytes_ps(&self, path: &str, sep: &str) -> Result<Cow<'s, [u8]>> {
        self.with_path(path, sep, |keys| self.get_bytes(keys))
    }

    pub fn get_string_ps(&self, path: &str, sep: &str) -> Result<Cow<'s, str>> {
        self.with_path(path, sep, |keys| self.get_string(keys))
    }

    pub fn get_bool_ps(&self, path: &str, sep: &str) -> Result<bool> {
        self.with_path(path, sep, |keys| self.get_bool(keys))
    }

    pub fn get_float_ps(&self, path: &str, sep: &str) -> Result<f64> {
        self.with_path(path, sep, |keys| self.get_float(keys))
    }

    pub fn get_int_ps(&self, path: &str, sep: &str) -> Result<i64> {
        self.with_path(path, sep, |keys| self.get_int(keys))
    }

    pub fn get_uint_ps(&self, path: &str, sep: &str) -> Result<u64> {
        self.with_path(path, sep, |keys| self.get_uint(keys))
    }

    pub fn dot(&self, path: &str) -> NodeRef<'s> {
        self.get_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_object(&self, path: &str) -> Result<NodeRef<'s>> {
        self.get_object_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_array(&self, path: &str) -> Result<NodeRef<'s>> {
        self.get_array_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_bytes(&self, path: &str) -> Result<Cow<'s, [u8]>> {
        self.get_bytes_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_string(&self, path: &str) -> Result<Cow<'s, str>> {
        self.get_string_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_bool(&self, path: &str) -> Result<bool> {
        self.get_bool_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_float(&self, path: &str) -> Result<f64> {
        self.get_float_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_int(&self, path: &str) -> Result<i64> {
        self.get_int_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn dot_uint(&self, path: &str) -> Result<u64> {
        self.get_uint_ps(path, DEFAULT_SEPARATOR)
    }

    pub fn beautify(&self, w: &mut dyn Write) -> Result<()> {
        let helper = self.arena.helper().ok_or(Error::NoHelper)?;
        helper.beautify(w, *self)
    }

    pub fn marshal(&self, w: &mut dyn Write) -> Result<()> {
        let helper = self.arena.helper().ok_or(Error::NoHelper)?;
        helper.marshal(w, *self)
    }
}

/// Direct children of a node in index order.
pub struct Children<'s> {
    arena: &'s Arena<'s>,
    ids: slice::Iter<'s, NodeId>,
}

impl<'s> Iterator for Children<'s> {
    type Item = NodeRef<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| self.arena.node_at(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| self.arena.node_at(id))
    }
}

impl ExactSizeIterator for Children<'_> {}
