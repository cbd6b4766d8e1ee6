//! The three container capabilities handed out by an [`Encoder`].
//!
//! Each container only remembers the id of its node. Children are linked
//! into the parent as soon as they are created, so a nested container that
//! is still being filled in is already visible in the tree.

use indexmap::IndexMap;
use serde::ser::{self, Serialize};

use super::Encoder;
use super::key::KeySerializer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::tree::{Node, NodeId, Slot, Tree};
use crate::value::Primitive;

/// A container of named children.
pub struct KeyedContainer<'a> {
    tree: &'a mut Tree,
    config: &'a Config,
    node: NodeId,
}

impl<'a> KeyedContainer<'a> {
    pub(crate) fn new(tree: &'a mut Tree, config: &'a Config, node: NodeId) -> Self {
        KeyedContainer { tree, config, node }
    }

    pub fn path(&self) -> &Path {
        self.tree.path(self.node)
    }

    /// Number of keys written so far.
    pub fn len(&self) -> usize {
        match self.tree.node(self.node) {
            Node::Keyed(children) => children.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies the key encoding strategy and returns the stored key with the
    /// path of the child it names.
    fn child_key(&self, key: &str) -> (String, Path) {
        let parent = self.tree.path(self.node);
        let key = self.config.keys_out().encode(parent, key).into_owned();
        let path = parent.appending(key.as_str());
        (key, path)
    }

    fn new_child(&mut self, key: &str, node: Node) -> Result<NodeId> {
        let (key, path) = self.child_key(key);
        let child = self.tree.alloc(path, node)?;
        self.tree.insert_child(self.node, key, child)?;
        Ok(child)
    }

    pub fn encode_primitive(&mut self, key: &str, value: impl Into<Primitive>) -> Result<()> {
        let (key, path) = self.child_key(key);
        let value = self.config.floats().apply(&path, value.into())?;
        let child = self.tree.alloc(path, Node::Single(Slot::Primitive(value)))?;
        self.tree.insert_child(self.node, key, child)
    }

    pub fn encode_nil(&mut self, key: &str) -> Result<()> {
        self.new_child(key, Node::Single(Slot::Primitive(Primitive::Nil)))?;
        Ok(())
    }

    /// Encodes `value` under `key`. A `None` is kept as an explicit nil.
    pub fn encode<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let child = self.new_child(key, Node::Single(Slot::Empty))?;
        value.serialize(Encoder::new(&mut *self.tree, self.config, child))
    }

    /// Encodes `value` under `key`, leaving the key out entirely when the
    /// value encodes to nil.
    pub fn encode_if_present<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let (key, path) = self.child_key(key);
        let child = self.tree.alloc(path, Node::Single(Slot::Empty))?;
        value.serialize(Encoder::new(&mut *self.tree, self.config, child))?;
        if let Node::Single(Slot::Primitive(Primitive::Nil)) = self.tree.node(child) {
            return Ok(());
        }
        self.tree.insert_child(self.node, key, child)
    }

    pub fn nested_container(&mut self, key: &str) -> Result<KeyedContainer<'_>> {
        let child = self.new_child(key, Node::Keyed(IndexMap::new()))?;
        Ok(KeyedContainer::new(&mut *self.tree, self.config, child))
    }

    pub fn nested_unkeyed_container(&mut self, key: &str) -> Result<UnkeyedContainer<'_>> {
        let child = self.new_child(key, Node::Unkeyed(Vec::new()))?;
        Ok(UnkeyedContainer::new(&mut *self.tree, self.config, child))
    }

    /// Hands the child at `key` to another encoder.
    ///
    /// The returned encoder must produce exactly one container or value
    /// before the tree is flattened.
    pub fn super_encoder(&mut self, key: &str) -> Result<Encoder<'_>> {
        let child = self.new_child(key, Node::Deferred(None))?;
        Ok(Encoder::new(&mut *self.tree, self.config, child))
    }

    pub(crate) fn into_super_encoder(mut self, key: &str) -> Result<Encoder<'a>> {
        let child = self.new_child(key, Node::Deferred(None))?;
        Ok(Encoder::new(self.tree, self.config, child))
    }
}

/// An ordered container of children named by position.
pub struct UnkeyedContainer<'a> {
    tree: &'a mut Tree,
    config: &'a Config,
    node: NodeId,
    count: usize,
}

impl<'a> UnkeyedContainer<'a> {
    pub(crate) fn new(tree: &'a mut Tree, config: &'a Config, node: NodeId) -> Self {
        UnkeyedContainer {
            tree,
            config,
            node,
            count: 0,
        }
    }

    pub fn path(&self) -> &Path {
        self.tree.path(self.node)
    }

    /// Number of elements written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    fn next_child(&mut self, node: Node) -> Result<NodeId> {
        let path = self.tree.path(self.node).appending(self.count);
        let child = self.tree.alloc(path, node)?;
        self.tree.push_child(self.node, child)?;
        self.count += 1;
        Ok(child)
    }

    pub fn encode_primitive(&mut self, value: impl Into<Primitive>) -> Result<()> {
        let path = self.tree.path(self.node).appending(self.count);
        let value = self.config.floats().apply(&path, value.into())?;
        self.next_child(Node::Single(Slot::Primitive(value)))?;
        Ok(())
    }

    pub fn encode_nil(&mut self) -> Result<()> {
        self.next_child(Node::Single(Slot::Primitive(Primitive::Nil)))?;
        Ok(())
    }

    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let child = self.next_child(Node::Single(Slot::Empty))?;
        value.serialize(Encoder::new(&mut *self.tree, self.config, child))
    }

    pub fn nested_container(&mut self) -> Result<KeyedContainer<'_>> {
        let child = self.next_child(Node::Keyed(IndexMap::new()))?;
        Ok(KeyedContainer::new(&mut *self.tree, self.config, child))
    }

    pub fn nested_unkeyed_container(&mut self) -> Result<UnkeyedContainer<'_>> {
        let child = self.next_child(Node::Unkeyed(Vec::new()))?;
        Ok(UnkeyedContainer::new(&mut *self.tree, self.config, child))
    }

    pub fn super_encoder(&mut self) -> Result<Encoder<'_>> {
        let child = self.next_child(Node::Deferred(None))?;
        Ok(Encoder::new(&mut *self.tree, self.config, child))
    }
}

/// A leaf accepting exactly one value.
pub struct SingleValueContainer<'a> {
    tree: &'a mut Tree,
    config: &'a Config,
    node: NodeId,
}

impl<'a> SingleValueContainer<'a> {
    pub(crate) fn new(tree: &'a mut Tree, config: &'a Config, node: NodeId) -> Self {
        SingleValueContainer { tree, config, node }
    }

    pub fn path(&self) -> &Path {
        self.tree.path(self.node)
    }

    pub fn encode_primitive(&mut self, value: impl Into<Primitive>) -> Result<()> {
        let value = self.config.floats().apply(self.tree.path(self.node), value.into())?;
        self.tree.store(self.node, value)
    }

    pub fn encode_nil(&mut self) -> Result<()> {
        self.tree.store(self.node, Primitive::Nil)
    }

    /// Encodes a nested value into this leaf. A value that requests its own
    /// container is linked in as a nested node.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if !matches!(self.tree.node(self.node), Node::Single(Slot::Empty)) {
            return Err(Error::contract(format_args!(
                "a value was already stored in the single value container at `{}`",
                self.tree.path(self.node)
            )));
        }
        value.serialize(Encoder::new(&mut *self.tree, self.config, self.node))
    }
}

/// Adapts a [`KeyedContainer`] to serde's key-then-value map protocol.
#[doc(hidden)]
pub struct MapContainer<'a> {
    keyed: KeyedContainer<'a>,
    key: Option<String>,
}

impl<'a> MapContainer<'a> {
    pub(crate) fn new(keyed: KeyedContainer<'a>) -> Self {
        MapContainer { keyed, key: None }
    }
}

impl ser::SerializeStruct for KeyedContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.encode_if_present(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for KeyedContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.encode_if_present(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeMap for MapContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::contract("map value serialized before its key"))?;
        self.keyed.encode(&key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeSeq for UnkeyedContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.encode(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTuple for UnkeyedContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.encode(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for UnkeyedContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.encode(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for UnkeyedContainer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.encode(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}
