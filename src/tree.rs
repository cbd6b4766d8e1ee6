//! The intermediate tree shared by encoding and decoding.
//!
//! Nodes live in an arena ([`Tree`]) and refer to each other by [`NodeId`].
//! A container handed out to serialization code only keeps the id of its
//! node, so a nested container that is still being filled in is already
//! reachable from its parent: the parent stores the id, not a snapshot.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry as MapEntry;

use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::Primitive;

/// Stable index of a node inside a [`Tree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contents of a [`Node::Single`] leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    /// Nothing was written yet.
    Empty,
    Primitive(Primitive),
    /// The leaf was asked to encode a nested value which requested its own
    /// container.
    Nested(NodeId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Keyed(IndexMap<String, NodeId>),
    Unkeyed(Vec<NodeId>),
    Single(Slot),
    /// A delegated encoding context. `None` until the context produced its
    /// container.
    Deferred(Option<NodeId>),
}

#[derive(Debug)]
struct Entry {
    path: Path,
    node: Node,
}

/// Arena of nodes for a single encode or decode call.
///
/// The root is always [`Tree::root`] and starts out as an empty leaf.
#[derive(Debug)]
pub struct Tree {
    entries: Vec<Entry>,
    max_depth: usize,
}

impl Tree {
    pub fn new(max_depth: usize) -> Self {
        Tree {
            entries: vec![Entry {
                path: Path::root(),
                node: Node::Single(Slot::Empty),
            }],
            max_depth,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.entries[id.0].node
    }

    pub fn path(&self, id: NodeId) -> &Path {
        &self.entries[id.0].path
    }

    /// Allocates a detached node at `path`.
    pub(crate) fn alloc(&mut self, path: Path, node: Node) -> Result<NodeId> {
        if path.depth() > self.max_depth {
            return Err(Error::contract(format_args!(
                "`{path}` is nested deeper than the maximum depth of {}",
                self.max_depth
            )));
        }
        let id = NodeId(self.entries.len());
        self.entries.push(Entry { path, node });
        Ok(id)
    }

    pub(crate) fn replace(&mut self, id: NodeId, node: Node) {
        self.entries[id.0].node = node;
    }

    /// Writes a primitive into an empty leaf.
    pub(crate) fn store(&mut self, id: NodeId, value: Primitive) -> Result<()> {
        let entry = &mut self.entries[id.0];
        match &mut entry.node {
            Node::Single(slot @ Slot::Empty) => {
                *slot = Slot::Primitive(value);
                Ok(())
            }
            Node::Single(_) => Err(Error::contract(format_args!(
                "a value was already stored in the single value container at `{}`",
                entry.path
            ))),
            _ => Err(Error::contract(format_args!(
                "cannot store a primitive into the container at `{}`",
                entry.path
            ))),
        }
    }

    /// Points an empty leaf or an unresolved deferred node at `child`.
    pub(crate) fn attach(&mut self, id: NodeId, child: NodeId) -> Result<()> {
        let entry = &mut self.entries[id.0];
        match &mut entry.node {
            Node::Single(slot @ Slot::Empty) => {
                *slot = Slot::Nested(child);
                Ok(())
            }
            Node::Deferred(target @ None) => {
                *target = Some(child);
                Ok(())
            }
            _ => Err(Error::contract(format_args!(
                "a container was already created for the encoder at `{}`",
                entry.path
            ))),
        }
    }

    pub(crate) fn insert_child(&mut self, parent: NodeId, key: String, child: NodeId) -> Result<()> {
        let entry = &mut self.entries[parent.0];
        let Node::Keyed(children) = &mut entry.node else {
            return Err(Error::contract(format_args!(
                "the node at `{}` is not a keyed container",
                entry.path
            )));
        };
        match children.entry(key) {
            MapEntry::Occupied(o) => Err(Error::contract(format_args!(
                "key `{}` was already encoded in the container at `{}`",
                o.key(),
                entry.path
            ))),
            MapEntry::Vacant(v) => {
                v.insert(child);
                Ok(())
            }
        }
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let entry = &mut self.entries[parent.0];
        let Node::Unkeyed(children) = &mut entry.node else {
            return Err(Error::contract(format_args!(
                "the node at `{}` is not an unkeyed container",
                entry.path
            )));
        };
        children.push(child);
        Ok(())
    }

    /// Follows nested leaves and resolved deferred nodes down to the node
    /// that holds the actual content.
    pub fn resolve(&self, mut id: NodeId) -> Result<NodeId> {
        loop {
            match self.node(id) {
                Node::Single(Slot::Nested(child)) | Node::Deferred(Some(child)) => id = *child,
                Node::Deferred(None) => {
                    return Err(Error::contract(format_args!(
                        "nothing was ever encoded to the delegated encoder at `{}`",
                        self.path(id)
                    )));
                }
                _ => return Ok(id),
            }
        }
    }
}
