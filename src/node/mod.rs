mod equal;
mod query;

use std::fmt;
use std::num::NonZeroUsize;

use crate::view::ByteView;
use crate::NodeId;

pub use query::{Children, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeType {
    #[default]
    Unknown,
    Null,
    Object,
    Array,
    String,
    Number,
    Bool,
    Attribute,
    Alias,
}

impl NodeType {
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::Object | NodeType::Array)
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            NodeType::String | NodeType::Number | NodeType::Bool | NodeType::Attribute
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Unknown => "unknown",
            NodeType::Null => "null",
            NodeType::Object => "object",
            NodeType::Array => "array",
            NodeType::String => "string",
            NodeType::Number => "number",
            NodeType::Bool => "bool",
            NodeType::Attribute => "attribute",
            NodeType::Alias => "alias",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size node record stored in the arena slot store.
///
/// Children are not stored on the node: they are the ids found at
/// `DepthIndex::row(depth + 1)[offset..limit]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Node {
    pub(crate) kind: NodeType,
    pub(crate) depth: usize,
    pub(crate) key: ByteView,
    pub(crate) value: ByteView,
    pub(crate) offset: usize,
    pub(crate) limit: usize,
    pub(crate) index: NodeId,
    pub(crate) parent: Option<NodeId>,
}

/// Shared sentinel returned by every lookup miss. Holds no arena state.
pub(crate) static NULL_NODE: Node = Node::NULL;

impl Node {
    pub const NULL: Node = Node {
        kind: NodeType::Null,
        depth: 0,
        key: ByteView::EMPTY,
        value: ByteView::EMPTY,
        offset: 0,
        limit: 0,
        index: NodeId::MAX,
        parent: None,
    };

    pub fn kind(&self) -> NodeType {
        self.kind
    }

    pub fn set_type(&mut self, kind: NodeType) -> &mut Self {
        self.kind = kind;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn key(&self) -> ByteView {
        self.key
    }

    pub fn key_mut(&mut self) -> &mut ByteView {
        &mut self.key
    }

    pub fn set_key(&mut self, key: ByteView) -> &mut Self {
        self.key = key;
        self
    }

    pub fn value(&self) -> ByteView {
        self.value
    }

    pub fn value_mut(&mut self) -> &mut ByteView {
        &mut self.value
    }

    pub fn set_value(&mut self, value: ByteView) -> &mut Self {
        self.value = value;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) -> &mut Self {
        self.offset = offset;
        self.limit = self.limit.max(offset);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit.max(self.offset);
        self
    }

    /// Slot id of this node in its arena; `NodeId::MAX` for the sentinel.
    pub fn index(&self) -> NodeId {
        self.index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Registered children; zero for scalars and empty containers.
    pub fn children_len(&self) -> usize {
        self.limit.saturating_sub(self.offset)
    }

    /// `None` when the node has no registered children, never an implicit one.
    pub fn child_count(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.children_len())
    }

    pub fn reset(&mut self) {
        *self = Node::default();
    }
}
