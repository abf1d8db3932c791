//! Request body shapes accepted by `Client::set_body`.
//!
//! # Design
//! The caller picks the shape through `From` conversions: bytes and text go
//! on the wire verbatim, a `serde_json::Value` is encoded as JSON. Typed
//! values go through `RequestBody::json`, which encodes them directly so
//! struct fields stay in declaration order. Only objects and arrays count as
//! structured values; scalars are rejected.

use bytes::Bytes;
use serde_json::Value;

use crate::error::{Error, Result};

/// A request body before it is turned into wire bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Bytes(Bytes),
    Text(String),
    Json(Value),
}

impl RequestBody {
    /// Encode `value` as JSON, keeping the field order serde emits.
    ///
    /// The result is a `Bytes` body; anything that does not encode to an
    /// object or an array is rejected.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(value).map_err(Error::Serialize)?;
        match encoded.iter().copied().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') | Some(b'[') => Ok(RequestBody::Bytes(Bytes::from(encoded))),
            Some(b'"') => Err(Error::UnsupportedBody("string")),
            Some(b'n') => Err(Error::UnsupportedBody("null")),
            Some(b't') | Some(b'f') => Err(Error::UnsupportedBody("bool")),
            _ => Err(Error::UnsupportedBody("number")),
        }
    }

    /// Produce the bytes sent to the handler.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            RequestBody::Bytes(bytes) => Ok(bytes),
            RequestBody::Text(text) => Ok(Bytes::from(text)),
            RequestBody::Json(value @ (Value::Object(_) | Value::Array(_))) => {
                serde_json::to_vec(&value)
                    .map(Bytes::from)
                    .map_err(Error::Serialize)
            }
            RequestBody::Json(other) => Err(Error::UnsupportedBody(shape_of(&other))),
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for RequestBody {
    fn from(bytes: &[u8]) -> Self {
        RequestBody::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for RequestBody {
    fn from(bytes: &[u8; N]) -> Self {
        RequestBody::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[test]
    fn bytes_are_sent_verbatim() {
        let body = RequestBody::from(b"x").into_bytes().unwrap();
        assert_eq!(body, Bytes::from_static(b"x"));
    }

    #[test]
    fn text_is_sent_verbatim() {
        let body = RequestBody::from("{not json").into_bytes().unwrap();
        assert_eq!(body, Bytes::from_static(b"{not json"));
    }

    #[test]
    fn object_is_encoded_as_json() {
        let body = RequestBody::from(json!({"a": 1})).into_bytes().unwrap();
        assert_eq!(body, Bytes::from_static(br#"{"a":1}"#));
    }

    #[test]
    fn array_is_encoded_as_json() {
        let body = RequestBody::from(json!([1, "two"])).into_bytes().unwrap();
        assert_eq!(body, Bytes::from_static(br#"[1,"two"]"#));
    }

    #[test]
    fn struct_serializes_through_json() {
        #[derive(Serialize)]
        struct Login<'a> {
            username: &'a str,
            password: &'a str,
        }

        let body = RequestBody::json(&Login {
            username: "bob",
            password: "secret",
        })
        .unwrap();
        assert_eq!(
            body.into_bytes().unwrap(),
            Bytes::from_static(br#"{"username":"bob","password":"secret"}"#)
        );
    }

    #[test]
    fn scalar_json_is_unsupported() {
        for value in [json!(null), json!(true), json!(42), json!("text")] {
            let err = RequestBody::from(value).into_bytes().unwrap_err();
            assert!(matches!(err, Error::UnsupportedBody(_)), "{err}");
        }
    }

    #[test]
    fn typed_scalars_are_unsupported() {
        assert!(matches!(
            RequestBody::json(&42),
            Err(Error::UnsupportedBody("number"))
        ));
        assert!(matches!(
            RequestBody::json("text"),
            Err(Error::UnsupportedBody("string"))
        ));
        assert!(matches!(
            RequestBody::json(&Option::<u8>::None),
            Err(Error::UnsupportedBody("null"))
        ));
        assert!(matches!(
            RequestBody::json(&false),
            Err(Error::UnsupportedBody("bool"))
        ));
    }

    #[test]
    fn typed_sequence_is_encoded() {
        let body = RequestBody::json(&vec!["a", "b"]).unwrap();
        assert_eq!(body.into_bytes().unwrap(), Bytes::from_static(br#"["a","b"]"#));
    }

    #[test]
    fn map_with_non_string_keys_fails_to_serialize() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], "v");
        let err = RequestBody::json(&map).unwrap_err();
        assert!(matches!(err, Error::Serialize(_)));
    }
}
