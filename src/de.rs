//! Deserialization support for query items.

mod access;
mod group;
mod string_parser;

pub(crate) use group::group;

use std::borrow::Cow;
use std::iter;
use std::str::FromStr;

use serde::de;

use crate::config::{ArrayFormat, Config};
use crate::date::{DATE_TOKEN, date_deserializer};
use crate::error::{Error, Result};
use crate::item::QueryItem;
use crate::path::{Path, Segment};
use crate::strategy::{DataStrategy, Float};
use crate::tree::{Node, NodeId, Slot, Tree};
use crate::value::Primitive;
use access::{KeyedAccess, UnkeyedAccess, VariantAccess};
use string_parser::StringParsingDeserializer;

/// Deserializes a value from query items.
///
/// ```
/// use serde_query_items::QueryItem;
///
/// #[derive(Debug, PartialEq, serde::Deserialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     tags: Vec<String>,
/// }
///
/// let items = [
///     QueryItem::new("name", "Alice"),
///     QueryItem::new("age", "24"),
///     QueryItem::new("tags.0", "a"),
///     QueryItem::new("tags.1", "b"),
/// ];
/// let q: Query = serde_query_items::from_items(&items).unwrap();
/// assert_eq!(
///     q,
///     Query {
///         name: "Alice".to_owned(),
///         age: 24,
///         tags: vec!["a".to_owned(), "b".to_owned()],
///     }
/// );
/// ```
pub fn from_items<T: de::DeserializeOwned>(items: &[QueryItem]) -> Result<T> {
    Config::default().deserialize_items(items)
}

/// A decoding context bound to one node of a tree.
///
/// The decoder is a [`serde::Deserializer`]: the container kind requested by
/// the target type decides how the node is read. A leaf asked for a keyed or
/// an unkeyed container behaves as an empty one.
#[derive(Clone, Copy)]
pub struct Decoder<'t> {
    tree: &'t Tree,
    config: &'t Config,
    node: NodeId,
}

impl<'t> Decoder<'t> {
    pub(crate) fn new(tree: &'t Tree, config: &'t Config, node: NodeId) -> Self {
        Decoder { tree, config, node }
    }

    pub fn path(&self) -> &'t Path {
        self.tree.path(self.node)
    }

    fn at(self, node: NodeId) -> Self {
        Decoder { node, ..self }
    }

    fn resolved(&self) -> Result<(NodeId, &'t Node)> {
        let id = self.tree.resolve(self.node)?;
        Ok((id, self.tree.node(id)))
    }

    /// The text of a leaf.
    fn text(&self, expected: &'static str) -> Result<(&'t Path, Cow<'t, str>)> {
        let (id, node) = self.resolved()?;
        let path = self.tree.path(id);
        match node {
            Node::Single(Slot::Primitive(value)) => match value.render() {
                Some(text) => Ok((path, text)),
                None => Err(Error::ValueNotFound {
                    path: path.clone(),
                    expected,
                }),
            },
            Node::Single(Slot::Empty) => Err(Error::ValueNotFound {
                path: path.clone(),
                expected,
            }),
            _ => Err(Error::structural(
                path,
                format_args!("expected {expected}, found a nested container"),
            )),
        }
    }

    fn parse<T: FromStr>(&self, expected: &'static str) -> Result<T> {
        let (path, text) = self.text(expected)?;
        text.parse().map_err(|_| Error::TypeMismatch {
            path: path.clone(),
            expected,
            found: text.into_owned(),
        })
    }

    fn float<F: Float>(&self, expected: &'static str) -> Result<F> {
        let (path, text) = self.text(expected)?;
        self.config
            .floats()
            .decode(&text)
            .ok_or_else(|| Error::TypeMismatch {
                path: path.clone(),
                expected,
                found: text.into_owned(),
            })
    }

    fn bytes(&self) -> Result<Vec<u8>> {
        match self.config.data() {
            DataStrategy::Base64 => {
                let (path, text) = self.text("base64 data")?;
                DataStrategy::decode_base64(&text).ok_or_else(|| Error::TypeMismatch {
                    path: path.clone(),
                    expected: "base64 data",
                    found: text.into_owned(),
                })
            }
            DataStrategy::DeferredToData => {
                let (id, node) = self.resolved()?;
                match node {
                    Node::Unkeyed(children) => children
                        .iter()
                        .map(|child| self.at(*child).parse::<u8>("u8"))
                        .collect(),
                    Node::Keyed(children) if !children.is_empty() => Err(Error::structural(
                        self.tree.path(id),
                        "expected a sequence of bytes, found a keyed container",
                    )),
                    _ => Ok(Vec::new()),
                }
            }
        }
    }

    fn deserialize_date<'de, V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (path, text) = self.text("a date")?;
        let date = self
            .config
            .dates()
            .decode(&text)
            .ok_or_else(|| Error::TypeMismatch {
                path: path.clone(),
                expected: "a date",
                found: text.into_owned(),
            })?;
        visitor.visit_newtype_struct(date_deserializer::<Error>(&date))
    }
}

macro_rules! deserialize_parsed {
    ($($ty:ident => $method:ident, $visit_method:ident,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit_method(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Decoder<'_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (_, node) = self.resolved()?;
        match node {
            Node::Keyed(_) => self.deserialize_map(visitor),
            Node::Unkeyed(_) => self.deserialize_seq(visitor),
            Node::Single(Slot::Primitive(value)) => match value {
                Primitive::Bool(v) => visitor.visit_bool(*v),
                Primitive::I8(v) => visitor.visit_i8(*v),
                Primitive::I16(v) => visitor.visit_i16(*v),
                Primitive::I32(v) => visitor.visit_i32(*v),
                Primitive::I64(v) => visitor.visit_i64(*v),
                Primitive::U8(v) => visitor.visit_u8(*v),
                Primitive::U16(v) => visitor.visit_u16(*v),
                Primitive::U32(v) => visitor.visit_u32(*v),
                Primitive::U64(v) => visitor.visit_u64(*v),
                Primitive::F32(v) => visitor.visit_f32(*v),
                Primitive::F64(v) => visitor.visit_f64(*v),
                Primitive::String(v) => visitor.visit_str(v),
                Primitive::Nil => visitor.visit_unit(),
            },
            _ => visitor.visit_unit(),
        }
    }

    deserialize_parsed! {
        bool => deserialize_bool, visit_bool,
        i8 => deserialize_i8, visit_i8,
        i16 => deserialize_i16, visit_i16,
        i32 => deserialize_i32, visit_i32,
        i64 => deserialize_i64, visit_i64,
        u8 => deserialize_u8, visit_u8,
        u16 => deserialize_u16, visit_u16,
        u32 => deserialize_u32, visit_u32,
        u64 => deserialize_u64, visit_u64,
        char => deserialize_char, visit_char,
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f32(self.float("f32")?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(self.float("f64")?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.text("a string")? {
            (_, Cow::Borrowed(text)) => visitor.visit_str(text),
            (_, Cow::Owned(text)) => visitor.visit_string(text),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.bytes()?)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.bytes()?)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.resolved()?.1 {
            Node::Single(Slot::Primitive(Primitive::Nil) | Slot::Empty) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (id, node) = self.resolved()?;
        match node {
            Node::Single(_) => visitor.visit_unit(),
            Node::Keyed(children) if children.is_empty() => visitor.visit_unit(),
            _ => Err(Error::structural(
                self.tree.path(id),
                "expected a unit value, found a nested container",
            )),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == DATE_TOKEN {
            return self.deserialize_date(visitor);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (id, node) = self.resolved()?;
        let path = self.tree.path(id);
        let (tree, config) = (self.tree, self.config);
        let result = match node {
            Node::Unkeyed(children) => {
                visitor.visit_seq(UnkeyedAccess::new(tree, config, children.iter().copied()))
            }
            Node::Keyed(children) if !children.is_empty() => {
                let key = children
                    .keys()
                    .find(|key| Segment::parse(key).as_index().is_none())
                    .or_else(|| children.keys().next())
                    .map_or("", String::as_str);
                Err(Error::structural(
                    path,
                    format_args!("expected a sequence, found key `{key}`"),
                ))
            }
            Node::Single(Slot::Primitive(value))
                if !value.is_nil() && config.array_format_kind() == ArrayFormat::Repeated =>
            {
                visitor.visit_seq(UnkeyedAccess::new(tree, config, iter::once(id)))
            }
            _ => visitor.visit_seq(UnkeyedAccess::new(tree, config, iter::empty())),
        };
        result.map_err(|err| err.at(path))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (id, node) = self.resolved()?;
        let path = self.tree.path(id);
        let (tree, config) = (self.tree, self.config);
        let result = match node {
            Node::Keyed(children) => {
                let strategy = config.keys_in();
                let entries = children
                    .iter()
                    .map(|(key, child)| (strategy.decode(path, key), *child));
                visitor.visit_map(KeyedAccess::new(tree, config, entries))
            }
            Node::Unkeyed(children) => {
                let entries = children.iter().enumerate().map(|(position, child)| {
                    let index = match tree.path(*child).last() {
                        Some(Segment::Index(index)) => *index,
                        _ => position,
                    };
                    (Cow::Owned(index.to_string()), *child)
                });
                visitor.visit_map(KeyedAccess::new(tree, config, entries))
            }
            _ => visitor.visit_map(KeyedAccess::new(tree, config, iter::empty())),
        };
        result.map_err(|err| err.at(path))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (id, node) = self.resolved()?;
        let path = self.tree.path(id);
        let result = match node {
            Node::Single(Slot::Primitive(value)) if !value.is_nil() => match value.render() {
                Some(variant) => visitor.visit_enum(StringParsingDeserializer::new(variant)),
                None => Err(Error::ValueNotFound {
                    path: path.clone(),
                    expected: "an enum variant",
                }),
            },
            Node::Keyed(children) if children.len() == 1 => {
                let (variant, payload) = children
                    .first()
                    .ok_or_else(|| Error::contract("keyed enum node lost its entry"))?;
                visitor.visit_enum(VariantAccess {
                    variant: self.config.keys_in().decode(path, variant),
                    payload: self.at(*payload),
                })
            }
            Node::Single(_) => Err(Error::ValueNotFound {
                path: path.clone(),
                expected: "an enum variant",
            }),
            _ => Err(Error::structural(
                path,
                "expected an enum: a variant name or a container with exactly one key",
            )),
        };
        result.map_err(|err| err.at(path))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}
