//! Query keys.
//!
//! A key is an ordered list of parts. Invalidation and cancellation match
//! by prefix: `["invoices"]` covers `["invoices", "latest"]` and
//! `["invoices", {"page": "1", "query": ""}]`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One segment of a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeyPart {
    Text(String),
    Params(BTreeMap<String, String>),
}

impl From<&str> for KeyPart {
    fn from(text: &str) -> Self {
        KeyPart::Text(text.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(text: String) -> Self {
        KeyPart::Text(text)
    }
}

impl From<BTreeMap<String, String>> for KeyPart {
    fn from(params: BTreeMap<String, String>) -> Self {
        KeyPart::Params(params)
    }
}

/// Identity of a cached query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key built from the given parts, in order.
    pub fn of<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Append one part.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading text part, e.g. `invoices` for every invoice key.
    pub fn family(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// True when `prefix` matches the first parts of this key. The empty
    /// key is a prefix of everything.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Parameter map part from `(name, value)` pairs.
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> KeyPart {
    KeyPart::Params(
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    )
}
