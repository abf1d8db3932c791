//! Ordered multi-map for query parameters.
//!
//! # Design
//! Keys are kept sorted so the encoded query string is deterministic; values
//! under a key keep their insertion order. Mutation goes through two explicit
//! operations: `set` replaces every value of a key, `add` appends one.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Reasons a raw query string is rejected by [`Params::parse`].
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid percent escape in {0:?}")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in {0:?}")]
    Semicolon(String),

    #[error("{0:?} does not decode to UTF-8")]
    InvalidUtf8(String),
}

/// Query parameters as key → ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: BTreeMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), vec![value.into()]);
    }

    /// Append `value` to the values of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// First value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Every value of `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// All pairs, keys ascending, values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Append every pair of `other`.
    pub fn extend(&mut self, other: Params) {
        for (key, values) in other.inner {
            self.inner.entry(key).or_default().extend(values);
        }
    }

    /// Encode as `application/x-www-form-urlencoded`, sorted by key.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Parse a raw query string.
    ///
    /// Stricter than form decoding: a `%` not followed by two hex digits, a
    /// `;` anywhere in a pair, or an escape sequence that decodes to invalid
    /// UTF-8 rejects the whole input.
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let mut params = Params::new();
        for segment in query.split('&').filter(|s| !s.is_empty()) {
            if segment.contains(';') {
                return Err(QueryError::Semicolon(segment.to_string()));
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            params.add(decode(key)?, decode(value)?);
        }
        Ok(params)
    }
}

/// Decode one form component: `+` is a space, `%XX` a raw byte.
fn decode(component: &str) -> Result<String, QueryError> {
    if !valid_escapes(component) {
        return Err(QueryError::InvalidEscape(component.to_string()));
    }
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| QueryError::InvalidUtf8(component.to_string()))
}

fn valid_escapes(component: &str) -> bool {
    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}
