use std::borrow::Cow;

use serde::de;

use super::Decoder;
use super::string_parser::StringParsingDeserializer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::tree::{NodeId, Tree};

fn exact_size<I: Iterator>(iter: &I) -> Option<usize> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(lower),
        _ => None,
    }
}

/// Presents a node's children as map entries.
pub(crate) struct KeyedAccess<'t, I> {
    tree: &'t Tree,
    config: &'t Config,
    entries: I,
    value: Option<NodeId>,
}

impl<'t, I> KeyedAccess<'t, I> {
    pub(crate) fn new(tree: &'t Tree, config: &'t Config, entries: I) -> Self {
        KeyedAccess {
            tree,
            config,
            entries,
            value: None,
        }
    }
}

impl<'de, 't, I> de::MapAccess<'de> for KeyedAccess<'t, I>
where
    I: Iterator<Item = (Cow<'t, str>, NodeId)>,
{
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some((key, node)) = self.entries.next() else {
            return Ok(None);
        };
        self.value = Some(node);
        seed.deserialize(StringParsingDeserializer::new(key)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let node = self
            .value
            .take()
            .ok_or_else(|| Error::contract("map value requested before its key"))?;
        seed.deserialize(Decoder::new(self.tree, self.config, node))
    }

    fn size_hint(&self) -> Option<usize> {
        exact_size(&self.entries)
    }
}

/// Presents a node's children as sequence elements.
pub(crate) struct UnkeyedAccess<'t, I> {
    tree: &'t Tree,
    config: &'t Config,
    elements: I,
}

impl<'t, I> UnkeyedAccess<'t, I> {
    pub(crate) fn new(tree: &'t Tree, config: &'t Config, elements: I) -> Self {
        UnkeyedAccess {
            tree,
            config,
            elements,
        }
    }
}

impl<'de, I> de::SeqAccess<'de> for UnkeyedAccess<'_, I>
where
    I: Iterator<Item = NodeId>,
{
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.elements.next() {
            Some(node) => seed
                .deserialize(Decoder::new(self.tree, self.config, node))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        exact_size(&self.elements)
    }
}

/// A keyed node with a single entry, read as `{variant: payload}`.
pub(crate) struct VariantAccess<'t> {
    pub(crate) variant: Cow<'t, str>,
    pub(crate) payload: Decoder<'t>,
}

impl<'de, 't> de::EnumAccess<'de> for VariantAccess<'t> {
    type Error = Error;
    type Variant = Decoder<'t>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(StringParsingDeserializer::new(self.variant))?;
        Ok((variant, self.payload))
    }
}

impl<'de> de::VariantAccess<'de> for Decoder<'_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self, visitor)
    }
}
