//! Serialization support for query items.

mod container;
mod flatten;
mod key;

pub use container::{KeyedContainer, MapContainer, SingleValueContainer, UnkeyedContainer};
pub use flatten::flatten;

use indexmap::IndexMap;
use serde::ser;

use crate::config::Config;
use crate::date::{DATE_TOKEN, Date};
use crate::error::{Error, Result};
use crate::item::QueryItem;
use crate::path::Path;
use crate::strategy::DataStrategy;
use crate::tree::{Node, NodeId, Slot, Tree};
use crate::value::Primitive;
use key::KeySerializer;

/// Serializes a value into query items.
///
/// ```
/// #[derive(serde::Serialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     tags: Vec<&'static str>,
/// }
///
/// let q = Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     tags: vec!["a", "b"],
/// };
///
/// let items = serde_query_items::to_items(&q).unwrap();
/// let pairs: Vec<String> = items.iter().map(ToString::to_string).collect();
/// assert_eq!(pairs, ["name=Alice", "age=24", "tags.0=a", "tags.1=b"]);
/// ```
pub fn to_items<T: ser::Serialize + ?Sized>(input: &T) -> Result<Vec<QueryItem>> {
    Config::default().serialize_items(input)
}

/// An encoding context bound to one slot of the tree.
///
/// An encoder can produce exactly one of: a keyed container, an unkeyed
/// container, or a single value. Asking for a second one is a contract
/// violation.
///
/// The encoder is also a [`serde::Serializer`], which picks the capability
/// matching the shape of the value being serialized.
pub struct Encoder<'a> {
    tree: &'a mut Tree,
    config: &'a Config,
    slot: NodeId,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(tree: &'a mut Tree, config: &'a Config, slot: NodeId) -> Self {
        Encoder { tree, config, slot }
    }

    pub fn path(&self) -> &Path {
        self.tree.path(self.slot)
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Creates a container node at the encoder's path and links it into the
    /// slot.
    fn open(&mut self, node: Node) -> Result<NodeId> {
        let path = self.tree.path(self.slot).clone();
        let child = self.tree.alloc(path, node)?;
        self.tree.attach(self.slot, child)?;
        Ok(child)
    }

    pub fn container(mut self) -> Result<KeyedContainer<'a>> {
        let node = self.open(Node::Keyed(IndexMap::new()))?;
        Ok(KeyedContainer::new(self.tree, self.config, node))
    }

    pub fn unkeyed_container(mut self) -> Result<UnkeyedContainer<'a>> {
        let node = self.open(Node::Unkeyed(Vec::new()))?;
        Ok(UnkeyedContainer::new(self.tree, self.config, node))
    }

    pub fn single_value_container(mut self) -> Result<SingleValueContainer<'a>> {
        let node = match self.tree.node(self.slot) {
            Node::Single(Slot::Empty) => self.slot,
            Node::Deferred(None) => self.open(Node::Single(Slot::Empty))?,
            _ => {
                return Err(Error::contract(format_args!(
                    "a container was already created for the encoder at `{}`",
                    self.tree.path(self.slot)
                )));
            }
        };
        Ok(SingleValueContainer::new(self.tree, self.config, node))
    }

    fn encode_primitive(self, value: impl Into<Primitive>) -> Result<()> {
        self.single_value_container()?.encode_primitive(value)
    }

    /// Applies the date strategy to the RFC 3339 text written by [`Date`].
    fn encode_date<T: ser::Serialize + ?Sized>(self, value: &T) -> Result<()> {
        let text = value.serialize(KeySerializer)?;
        let date = Date::parse_rfc3339(&text).ok_or_else(|| Error::InvalidValue {
            path: self.path().clone(),
            message: format!("`{text}` is not an RFC 3339 date"),
        })?;
        let encoded = self.config.dates().encode(&date.0);
        self.encode_primitive(encoded)
    }
}

macro_rules! serialize_primitive {
    (
        $($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                self.encode_primitive(v)
            }
        )*
    };
}

impl<'a> ser::Serializer for Encoder<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = UnkeyedContainer<'a>;
    type SerializeTuple = UnkeyedContainer<'a>;
    type SerializeTupleStruct = UnkeyedContainer<'a>;
    type SerializeTupleVariant = UnkeyedContainer<'a>;
    type SerializeMap = MapContainer<'a>;
    type SerializeStruct = KeyedContainer<'a>;
    type SerializeStructVariant = KeyedContainer<'a>;

    serialize_primitive! {
        bool => serialize_bool,
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
        f32 => serialize_f32,
        f64 => serialize_f64,
        &str => serialize_str,
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        self.encode_primitive(v.to_string())
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Self::Ok> {
        match self.config.data() {
            DataStrategy::Base64 => self.encode_primitive(DataStrategy::encode_base64(value)),
            DataStrategy::DeferredToData => {
                let mut bytes = self.unkeyed_container()?;
                for byte in value {
                    bytes.encode_primitive(*byte)?;
                }
                Ok(())
            }
        }
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        self.encode_primitive("")
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok> {
        self.encode_primitive("")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.encode_primitive(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        if name == DATE_TOKEN {
            return self.encode_date(value);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self.container()?.into_super_encoder(variant)?)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        self.single_value_container()?.encode_nil()
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.unkeyed_container()
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.unkeyed_container()
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.unkeyed_container()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.container()?
            .into_super_encoder(variant)?
            .unkeyed_container()
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapContainer::new(self.container()?))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.container()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.container()?.into_super_encoder(variant)?.container()
    }
}
