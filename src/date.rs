//! The date leaf type.

use std::fmt;
use std::ops::Deref;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, IntoDeserializer, Visitor};
use serde::ser::{Serialize, Serializer};

/// Newtype name the engine recognises to apply the configured
/// [`DateStrategy`](crate::DateStrategy).
pub(crate) const DATE_TOKEN: &str = "$serde_query_items::private::Date";

/// A UTC timestamp encoded through the configured date strategy.
///
/// Other serializers see an RFC 3339 string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub DateTime<Utc>);

impl Date {
    pub(crate) fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub(crate) fn parse_rfc3339(text: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|date| Date(date.with_timezone(&Utc)))
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(date: DateTime<Utc>) -> Self {
        Date(date)
    }
}

impl From<Date> for DateTime<Utc> {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Deref for Date {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(DATE_TOKEN, &self.to_rfc3339())
    }
}

impl<'de> de::Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(DATE_TOKEN, DateVisitor)
    }
}

struct DateVisitor;

impl<'de> Visitor<'de> for DateVisitor {
    type Value = Date;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an RFC 3339 date")
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, deserializer: D) -> Result<Date, D::Error> {
        deserializer.deserialize_str(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Date, E> {
        Date::parse_rfc3339(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// Feeds a date back into [`Date`]'s `Deserialize` impl.
pub(crate) fn date_deserializer<E: de::Error>(date: &DateTime<Utc>) -> de::value::StringDeserializer<E> {
    Date(*date).to_rfc3339().into_deserializer()
}
