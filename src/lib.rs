//! Serde support for URL query items.
//!
//! A value is encoded into an ordered list of [`QueryItem`]s, each a name
//! with an optional value, and decoded back from such a list. Nesting is
//! expressed in the names: keys of nested records and maps are joined with
//! `.`, and sequence elements are named by their index.
//!
//! Encoding goes through an intermediate [`Tree`]. Serializing fills the
//! tree, and [`flatten`] turns it into items. Decoding groups the items back
//! into a tree which is then read by the target type's `Deserialize` impl.
//! Both halves are available separately through [`Config`].
//!
//! This crate does not percent-encode anything: items are meant to be handed
//! to a URL library which takes care of that.
//!
//! ## Usage
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_query_items::QueryItem;
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Address {
//!     city: String,
//!     postcode: String,
//! }
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct QueryParams {
//!     id: u8,
//!     name: String,
//!     address: Address,
//!     nickname: Option<String>,
//!     user_ids: Vec<u8>,
//! }
//!
//! let params = QueryParams {
//!     id: 42,
//!     name: "Acme".to_string(),
//!     address: Address {
//!         city: "Carrot City".to_string(),
//!         postcode: "12345".to_string(),
//!     },
//!     nickname: None,
//!     user_ids: vec![1, 2],
//! };
//!
//! let items = serde_query_items::to_items(&params).unwrap();
//! assert_eq!(
//!     items,
//!     [
//!         QueryItem::new("id", "42"),
//!         QueryItem::new("name", "Acme"),
//!         QueryItem::new("address.city", "Carrot City"),
//!         QueryItem::new("address.postcode", "12345"),
//!         QueryItem::new("user_ids.0", "1"),
//!         QueryItem::new("user_ids.1", "2"),
//!     ]
//! );
//!
//! let decoded: QueryParams = serde_query_items::from_items(&items).unwrap();
//! assert_eq!(decoded, params);
//! ```
//!
//! ## Absent values
//!
//! A `None` struct field produces no item at all. A `None` anywhere else (a
//! map value, a sequence element) produces an item without a value. A nested
//! record whose fields are all absent still produces one item with an empty
//! value, so its presence survives the round trip. Empty sequences produce
//! nothing, so decode them into fields marked `#[serde(default)]`.
//!
//! ## Supported Types
//!
//! Primitives, strings, options, sequences, tuples, maps with scalar keys,
//! structs, and all four enum variant kinds. Byte buffers (`serde_bytes`) go
//! through [`DataStrategy`], timestamps wrapped in [`Date`] through
//! [`DateStrategy`].

mod config;
mod date;
mod de;
mod error;
mod item;
mod path;
mod ser;
mod strategy;
mod tree;
mod value;

#[doc(inline)]
pub use config::{ArrayFormat, Config};
#[doc(inline)]
pub use date::Date;
#[doc(inline)]
pub use de::{Decoder, from_items};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use item::QueryItem;
#[doc(inline)]
pub use path::{Path, Segment};
#[doc(inline)]
pub use ser::{
    Encoder, KeyedContainer, SingleValueContainer, UnkeyedContainer, flatten, to_items,
};
#[doc(inline)]
pub use strategy::{
    DataStrategy, DateStrategy, KeyDecodingStrategy, KeyEncodingStrategy, NonFiniteFloatStrategy,
    from_snake_case, to_snake_case,
};
#[doc(inline)]
pub use tree::{Node, NodeId, Slot, Tree};
#[doc(inline)]
pub use value::Primitive;
