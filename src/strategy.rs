//! Pluggable policies applied by the encoder and the decoder.
//!
//! Each strategy is independent of the others and is installed through the
//! matching [`Config`](crate::Config) builder method.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::Primitive;

type KeyFn = Arc<dyn Fn(&Path, &str) -> String + Send + Sync>;

/// How keys of keyed containers are written.
///
/// The function passed to `Custom` receives the path of the container the
/// key belongs to.
#[derive(Clone, Default)]
pub enum KeyEncodingStrategy {
    /// Use the keys declared by the type.
    #[default]
    UseDefaultKeys,
    /// Convert `camelCase` keys to `snake_case`.
    ConvertToSnakeCase,
    Custom(KeyFn),
}

impl KeyEncodingStrategy {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Path, &str) -> String + Send + Sync + 'static,
    {
        KeyEncodingStrategy::Custom(Arc::new(f))
    }

    pub(crate) fn encode<'k>(&self, path: &Path, key: &'k str) -> Cow<'k, str> {
        match self {
            KeyEncodingStrategy::UseDefaultKeys => Cow::Borrowed(key),
            KeyEncodingStrategy::ConvertToSnakeCase => Cow::Owned(to_snake_case(key)),
            KeyEncodingStrategy::Custom(f) => Cow::Owned(f(path, key)),
        }
    }
}

impl fmt::Debug for KeyEncodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEncodingStrategy::UseDefaultKeys => f.write_str("UseDefaultKeys"),
            KeyEncodingStrategy::ConvertToSnakeCase => f.write_str("ConvertToSnakeCase"),
            KeyEncodingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How keys found in query item names are mapped back to the keys declared
/// by the target type.
#[derive(Clone, Default)]
pub enum KeyDecodingStrategy {
    #[default]
    UseDefaultKeys,
    /// Convert `snake_case` keys to `camelCase`.
    ConvertFromSnakeCase,
    Custom(KeyFn),
}

impl KeyDecodingStrategy {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Path, &str) -> String + Send + Sync + 'static,
    {
        KeyDecodingStrategy::Custom(Arc::new(f))
    }

    pub(crate) fn decode<'k>(&self, path: &Path, key: &'k str) -> Cow<'k, str> {
        match self {
            KeyDecodingStrategy::UseDefaultKeys => Cow::Borrowed(key),
            KeyDecodingStrategy::ConvertFromSnakeCase => from_snake_case(key),
            KeyDecodingStrategy::Custom(f) => Cow::Owned(f(path, key)),
        }
    }
}

impl fmt::Debug for KeyDecodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyDecodingStrategy::UseDefaultKeys => f.write_str("UseDefaultKeys"),
            KeyDecodingStrategy::ConvertFromSnakeCase => f.write_str("ConvertFromSnakeCase"),
            KeyDecodingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// `myURLValue` becomes `my_url_value`.
///
/// A word starts at an uppercase letter that follows a lowercase letter or a
/// digit, or at the last uppercase letter of a run that is followed by a
/// lowercase letter.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut snake = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            snake.push(c);
            continue;
        }
        let starts_word = match i.checked_sub(1).map(|prev| chars[prev]) {
            Some(prev) if prev.is_lowercase() || prev.is_ascii_digit() => true,
            Some(prev) if prev.is_uppercase() => chars.get(i + 1).is_some_and(|n| n.is_lowercase()),
            _ => false,
        };
        if starts_word {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
    }
    snake
}

/// `my_url_value` becomes `myUrlValue`.
///
/// Leading and trailing underscores are preserved and keys without an inner
/// underscore are returned untouched.
pub fn from_snake_case(key: &str) -> Cow<'_, str> {
    let trimmed = key.trim_matches('_');
    if !trimmed.contains('_') {
        return Cow::Borrowed(key);
    }
    let leading = &key[..key.len() - key.trim_start_matches('_').len()];
    let trailing = &key[key.trim_end_matches('_').len()..];

    let mut camel = String::with_capacity(key.len());
    camel.push_str(leading);
    let mut words = trimmed.split('_').filter(|w| !w.is_empty());
    if let Some(first) = words.next() {
        camel.extend(first.chars().flat_map(char::to_lowercase));
    }
    for word in words {
        let mut chars = word.chars();
        if let Some(initial) = chars.next() {
            camel.extend(initial.to_uppercase());
            camel.extend(chars.flat_map(char::to_lowercase));
        }
    }
    camel.push_str(trailing);
    Cow::Owned(camel)
}

/// How the [`Date`](crate::Date) leaf type is represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateStrategy {
    /// RFC 3339, e.g. `2023-04-11T09:30:00Z`.
    #[default]
    Iso8601,
    /// Seconds since the Unix epoch. Fractional seconds are kept.
    SecondsSince1970,
    MillisecondsSince1970,
    /// A `chrono` format string, e.g. `"%Y-%m-%d %H:%M:%S"`. Values are
    /// written in UTC.
    Formatted(&'static str),
}

impl DateStrategy {
    pub(crate) fn encode(&self, date: &DateTime<Utc>) -> Primitive {
        match self {
            DateStrategy::Iso8601 => {
                Primitive::String(date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DateStrategy::SecondsSince1970 => match date.timestamp_subsec_nanos() {
                0 => Primitive::I64(date.timestamp()),
                nanos => Primitive::F64(date.timestamp() as f64 + f64::from(nanos) / 1e9),
            },
            DateStrategy::MillisecondsSince1970 => Primitive::I64(date.timestamp_millis()),
            DateStrategy::Formatted(format) => Primitive::String(date.format(format).to_string()),
        }
    }

    pub(crate) fn decode(&self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            DateStrategy::Iso8601 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|date| date.with_timezone(&Utc)),
            DateStrategy::SecondsSince1970 => {
                if let Ok(secs) = text.parse::<i64>() {
                    return DateTime::from_timestamp(secs, 0);
                }
                let secs = text.parse::<f64>().ok().filter(|s| s.is_finite())?;
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9).round() as u32;
                DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
            }
            DateStrategy::MillisecondsSince1970 => {
                DateTime::from_timestamp_millis(text.parse().ok()?)
            }
            DateStrategy::Formatted(format) => {
                if let Ok(date) = DateTime::parse_from_str(text, format) {
                    return Some(date.with_timezone(&Utc));
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                    return Some(naive.and_utc());
                }
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .and_then(|day| day.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }
        }
    }
}

/// How byte buffers (`serialize_bytes`, e.g. through `serde_bytes`) are
/// represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataStrategy {
    /// A single padded, standard-alphabet base64 string.
    #[default]
    Base64,
    /// A sequence with one item per byte.
    DeferredToData,
}

impl DataStrategy {
    pub(crate) fn encode_base64(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    pub(crate) fn decode_base64(text: &str) -> Option<Vec<u8>> {
        BASE64.decode(text).ok()
    }
}

/// How `NaN` and the infinities are represented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NonFiniteFloatStrategy {
    /// Refuse to encode non-finite floats and refuse to decode them.
    #[default]
    Throw,
    /// Write the given strings in place of the non-finite values, and accept
    /// exactly those strings when decoding.
    ConvertToString {
        positive_infinity: String,
        negative_infinity: String,
        nan: String,
    },
}

impl NonFiniteFloatStrategy {
    pub fn convert_to_string(
        positive_infinity: impl Into<String>,
        negative_infinity: impl Into<String>,
        nan: impl Into<String>,
    ) -> Self {
        NonFiniteFloatStrategy::ConvertToString {
            positive_infinity: positive_infinity.into(),
            negative_infinity: negative_infinity.into(),
            nan: nan.into(),
        }
    }

    /// Checks a primitive about to be stored at `path`.
    ///
    /// Anything but a non-finite float passes through unchanged.
    pub(crate) fn apply(&self, path: &Path, value: Primitive) -> Result<Primitive> {
        let float = match value {
            Primitive::F32(v) if !v.is_finite() => f64::from(v),
            Primitive::F64(v) if !v.is_finite() => v,
            other => return Ok(other),
        };
        match self {
            NonFiniteFloatStrategy::Throw => Err(Error::InvalidValue {
                path: path.clone(),
                message: format!("unable to encode non-finite float `{float}`"),
            }),
            NonFiniteFloatStrategy::ConvertToString {
                positive_infinity,
                negative_infinity,
                nan,
            } => {
                let text = if float.is_nan() {
                    nan
                } else if float.is_sign_positive() {
                    positive_infinity
                } else {
                    negative_infinity
                };
                Ok(Primitive::String(text.clone()))
            }
        }
    }

    /// Parses a float, honouring the configured spellings of non-finite
    /// values. Non-finite values spelled any other way are rejected.
    pub(crate) fn decode<F: Float>(&self, text: &str) -> Option<F> {
        if let NonFiniteFloatStrategy::ConvertToString {
            positive_infinity,
            negative_infinity,
            nan,
        } = self
        {
            if text == positive_infinity {
                return Some(F::INFINITY);
            } else if text == negative_infinity {
                return Some(F::NEG_INFINITY);
            } else if text == nan {
                return Some(F::NAN);
            }
        }
        text.parse::<F>().ok().filter(|v| v.is_finite())
    }
}

pub(crate) trait Float: FromStr + Copy {
    const INFINITY: Self;
    const NEG_INFINITY: Self;
    const NAN: Self;
    fn is_finite(self) -> bool;
}

macro_rules! impl_float {
    ($($ty:ident,)*) => {
        $(
            impl Float for $ty {
                const INFINITY: Self = $ty::INFINITY;
                const NEG_INFINITY: Self = $ty::NEG_INFINITY;
                const NAN: Self = $ty::NAN;
                fn is_finite(self) -> bool {
                    $ty::is_finite(self)
                }
            }
        )*
    };
}

impl_float! {
    f32,
    f64,
}
