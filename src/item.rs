use std::fmt;

/// One `name=value` pair of a query.
///
/// `value` is `None` for a name without a value (`?flag`), which is how an
/// explicit nil is written. `Some("")` is an empty value (`?flag=`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

impl QueryItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        QueryItem {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// An item with a name and no value.
    pub fn nil(name: impl Into<String>) -> Self {
        QueryItem {
            name: name.into(),
            value: None,
        }
    }
}

impl From<(&str, &str)> for QueryItem {
    fn from((name, value): (&str, &str)) -> Self {
        QueryItem::new(name, value)
    }
}

impl From<(&str, Option<&str>)> for QueryItem {
    fn from((name, value): (&str, Option<&str>)) -> Self {
        QueryItem {
            name: name.to_owned(),
            value: value.map(str::to_owned),
        }
    }
}

impl From<(String, Option<String>)> for QueryItem {
    fn from((name, value): (String, Option<String>)) -> Self {
        QueryItem { name, value }
    }
}

/// Writes `name=value`, or just `name` without a value. Nothing is
/// percent-encoded.
impl fmt::Display for QueryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
