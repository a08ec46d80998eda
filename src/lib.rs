//! Zero-copy parse-tree engine for hierarchical text formats.
//!
//! A format grammar implements [`Parser`] and fills an [`Arena`] with
//! [`Node`] records whose keys and values are [`ByteView`]s into the source.
//! Queries go through [`NodeRef`]:
//!
//! ```
//! use treevec::{Arena, NodeType};
//!
//! let source = br#"{"name":"vec"}"#;
//! let mut arena = Arena::new();
//! arena.set_source(source).unwrap();
//! let root = arena.acquire_node_with_type(0, NodeType::Object);
//! let name = arena.acquire_child_with_type(root, NodeType::String).unwrap();
//! let key = arena.view_source(2, 4);
//! let value = arena.view_source(9, 3);
//! arena.node_mut(name).unwrap().set_key(key).set_value(value);
//!
//! assert_eq!(arena.dot_string("name").unwrap(), "vec");
//! assert!(arena.dot("missing").is_sentinel());
//! ```

pub mod arena;
pub mod constants;
pub mod error;
pub mod helper;
pub mod index;
pub mod node;
pub mod options;
pub mod path;
pub mod sort;
pub mod view;

pub use crate::arena::{Arena, ArenaParts};
pub use crate::error::{Error, ErrorKind};
pub use crate::helper::{Helper, Parser};
pub use crate::index::DepthIndex;
pub use crate::node::{Children, Node, NodeRef, NodeType};
pub use crate::options::ArenaOptions;
pub use crate::path::{PathSplitter, Span};
pub use crate::sort::SortMode;
pub use crate::view::{ByteView, Flags};

/// Slot id of a node within its arena.
pub type NodeId = usize;

pub type Result<T> = std::result::Result<T, Error>;
