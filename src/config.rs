use serde::de::DeserializeOwned;
use serde::ser::Serialize;

use crate::de::{Decoder, group};
use crate::error::Result;
use crate::item::QueryItem;
use crate::ser::{Encoder, flatten};
use crate::strategy::{
    DataStrategy, DateStrategy, KeyDecodingStrategy, KeyEncodingStrategy, NonFiniteFloatStrategy,
};
use crate::tree::Tree;

/// Configuration for encoding and decoding behavior.
///
/// ## Nesting Depth
///
/// `max_depth` bounds the number of path segments of any node, both when
/// encoding and when decoding. Exceeding it is a contract violation rather
/// than a recoverable error, since it almost always means a recursive value
/// or hostile input.
///
/// Default value: `max_depth = 16`
///
/// ```
/// use serde_query_items::{ArrayFormat, Config};
///
/// #[derive(serde::Serialize)]
/// struct Query {
///     tags: Vec<&'static str>,
/// }
///
/// let config = Config::new().array_format(ArrayFormat::Repeated);
/// let items = config.serialize_items(&Query { tags: vec!["a", "b"] }).unwrap();
/// assert_eq!(items[0].name, "tags");
/// assert_eq!(items[1].name, "tags");
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    max_depth: usize,
    array_format: ArrayFormat,
    sort_keys: bool,
    key_encoding_strategy: KeyEncodingStrategy,
    key_decoding_strategy: KeyDecodingStrategy,
    date_strategy: DateStrategy,
    data_strategy: DataStrategy,
    non_finite_float_strategy: NonFiniteFloatStrategy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArrayFormat {
    /// Use the `a.0=1&a.1=2` format.
    #[default]
    Ordered,
    /// Use the `a=1&a=2` format.
    Repeated,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            max_depth: 16,
            array_format: ArrayFormat::Ordered,
            sort_keys: false,
            key_encoding_strategy: KeyEncodingStrategy::UseDefaultKeys,
            key_decoding_strategy: KeyDecodingStrategy::UseDefaultKeys,
            date_strategy: DateStrategy::Iso8601,
            data_strategy: DataStrategy::Base64,
            non_finite_float_strategy: NonFiniteFloatStrategy::Throw,
        }
    }

    /// Specifies the maximum number of path segments. Default is 16.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Specifies how sequence elements are named.
    ///
    /// The default is `Ordered`, which results in names like `a.0`, `a.1`.
    /// `Repeated` drops the index and repeats the sequence's own name. Only
    /// sequences of leaves can be decoded back from `Repeated` output.
    pub const fn array_format(mut self, array_format: ArrayFormat) -> Self {
        self.array_format = array_format;
        self
    }

    /// Sorts the encoded items by name. Items with equal names keep their
    /// relative order.
    pub const fn sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn key_encoding_strategy(mut self, strategy: KeyEncodingStrategy) -> Self {
        self.key_encoding_strategy = strategy;
        self
    }

    pub fn key_decoding_strategy(mut self, strategy: KeyDecodingStrategy) -> Self {
        self.key_decoding_strategy = strategy;
        self
    }

    pub const fn date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date_strategy = strategy;
        self
    }

    pub const fn data_strategy(mut self, strategy: DataStrategy) -> Self {
        self.data_strategy = strategy;
        self
    }

    pub fn non_finite_float_strategy(mut self, strategy: NonFiniteFloatStrategy) -> Self {
        self.non_finite_float_strategy = strategy;
        self
    }

    pub(crate) fn max_depth_limit(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn array_format_kind(&self) -> ArrayFormat {
        self.array_format
    }

    pub(crate) fn keys_out(&self) -> &KeyEncodingStrategy {
        &self.key_encoding_strategy
    }

    pub(crate) fn keys_in(&self) -> &KeyDecodingStrategy {
        &self.key_decoding_strategy
    }

    pub(crate) fn dates(&self) -> DateStrategy {
        self.date_strategy
    }

    pub(crate) fn data(&self) -> DataStrategy {
        self.data_strategy
    }

    pub(crate) fn floats(&self) -> &NonFiniteFloatStrategy {
        &self.non_finite_float_strategy
    }

    /// Serializes a value to query items using this `Config`.
    pub fn serialize_items<T: Serialize + ?Sized>(&self, input: &T) -> Result<Vec<QueryItem>> {
        let tree = self.encode_tree(input)?;
        self.flatten_tree(&tree)
    }

    /// Serializes a value into the intermediate tree without flattening it.
    pub fn encode_tree<T: Serialize + ?Sized>(&self, input: &T) -> Result<Tree> {
        self.encode_with(|encoder| input.serialize(encoder))
    }

    /// Runs a hand-written encoding against a fresh tree.
    ///
    /// The closure receives the root encoder and may request exactly one
    /// container from it.
    ///
    /// ```
    /// use serde_query_items::{Config, QueryItem};
    ///
    /// let config = Config::new();
    /// let tree = config
    ///     .encode_with(|encoder| {
    ///         let mut page = encoder.container()?;
    ///         page.encode_primitive("size", 20u32)?;
    ///         page.nested_container("filter")?.encode_primitive("q", "rust")
    ///     })
    ///     .unwrap();
    /// let items = config.flatten_tree(&tree).unwrap();
    /// assert_eq!(items, [QueryItem::new("size", "20"), QueryItem::new("filter.q", "rust")]);
    /// ```
    pub fn encode_with<F>(&self, encode: F) -> Result<Tree>
    where
        F: FnOnce(Encoder<'_>) -> Result<()>,
    {
        let mut tree = Tree::new(self.max_depth);
        let root = tree.root();
        encode(Encoder::new(&mut tree, self, root))
            .inspect_err(|err| tracing::debug!(error = %err, "failed to encode value"))?;
        tracing::debug!(nodes = tree.len(), "encoded value");
        Ok(tree)
    }

    /// Flattens a tree into query items, honouring `array_format` and
    /// `sort_keys`.
    pub fn flatten_tree(&self, tree: &Tree) -> Result<Vec<QueryItem>> {
        let mut items = flatten(tree, self.array_format)?;
        if self.sort_keys {
            items.sort_by(|a, b| a.name.cmp(&b.name));
        }
        tracing::debug!(items = items.len(), "flattened query items");
        Ok(items)
    }

    /// Deserializes query items using this `Config`.
    pub fn deserialize_items<T: DeserializeOwned>(&self, items: &[QueryItem]) -> Result<T> {
        let tree = self.decode_tree(items)?;
        self.deserialize_tree(&tree)
    }

    /// Groups query items into the intermediate tree.
    pub fn decode_tree(&self, items: &[QueryItem]) -> Result<Tree> {
        tracing::debug!(items = items.len(), "decoding query items");
        group(items, self)
            .inspect_err(|err| tracing::debug!(error = %err, "failed to group query items"))
    }

    /// Deserializes a value from a tree built by [`Config::decode_tree`] or
    /// [`Config::encode_tree`].
    pub fn deserialize_tree<T: DeserializeOwned>(&self, tree: &Tree) -> Result<T> {
        T::deserialize(Decoder::new(tree, self, tree.root()))
            .inspect_err(|err| tracing::debug!(error = %err, "failed to decode value"))
    }
}
