//! Primitive leaf values.

use std::borrow::Cow;
use std::fmt;

/// A scalar stored in a leaf of the tree.
///
/// `Nil` means "explicitly absent": it is rendered as a query item with no
/// value at all, which is different from a field that was never visited
/// (no query item) and from an empty string (`name=`).
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Nil,
}

macro_rules! render_itoa {
    ($v:expr) => {{
        let mut buffer = itoa::Buffer::new();
        Cow::Owned(buffer.format($v).to_owned())
    }};
}

macro_rules! render_ryu {
    ($v:expr) => {{
        let mut buffer = ryu::Buffer::new();
        Cow::Owned(buffer.format($v).to_owned())
    }};
}

impl Primitive {
    pub fn is_nil(&self) -> bool {
        matches!(self, Primitive::Nil)
    }

    /// Renders the primitive as it appears on the wire.
    ///
    /// Returns `None` for `Nil`, which has no textual form.
    pub fn render(&self) -> Option<Cow<'_, str>> {
        let rendered = match self {
            Primitive::Bool(true) => Cow::Borrowed("true"),
            Primitive::Bool(false) => Cow::Borrowed("false"),
            Primitive::I8(v) => render_itoa!(*v),
            Primitive::I16(v) => render_itoa!(*v),
            Primitive::I32(v) => render_itoa!(*v),
            Primitive::I64(v) => render_itoa!(*v),
            Primitive::U8(v) => render_itoa!(*v),
            Primitive::U16(v) => render_itoa!(*v),
            Primitive::U32(v) => render_itoa!(*v),
            Primitive::U64(v) => render_itoa!(*v),
            Primitive::F32(v) => render_ryu!(*v),
            Primitive::F64(v) => render_ryu!(*v),
            Primitive::String(s) => Cow::Borrowed(s.as_str()),
            Primitive::Nil => return None,
        };
        Some(rendered)
    }

    /// A short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Bool(_) => "bool",
            Primitive::I8(_) => "i8",
            Primitive::I16(_) => "i16",
            Primitive::I32(_) => "i32",
            Primitive::I64(_) => "i64",
            Primitive::U8(_) => "u8",
            Primitive::U16(_) => "u16",
            Primitive::U32(_) => "u32",
            Primitive::U64(_) => "u64",
            Primitive::F32(_) => "f32",
            Primitive::F64(_) => "f64",
            Primitive::String(_) => "string",
            Primitive::Nil => "nil",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(rendered) => f.write_str(&rendered),
            None => f.write_str("nil"),
        }
    }
}

macro_rules! primitive_from {
    ($($ty:ty => $variant:ident,)*) => {
        $(
            impl From<$ty> for Primitive {
                fn from(v: $ty) -> Self {
                    Primitive::$variant(v)
                }
            }
        )*
    };
}

primitive_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for Primitive {
    fn from(v: &str) -> Self {
        Primitive::String(v.to_owned())
    }
}

impl<T: Into<Primitive>> From<Option<T>> for Primitive {
    fn from(v: Option<T>) -> Self {
        v.map_or(Primitive::Nil, Into::into)
    }
}
