//! Response envelopes.
//!
//! Endpoints wrap their payload differently: some return the record or array
//! as-is, some under `data`, some under an entity name. Each collection
//! declares the wrapper it expects; a body without that key is taken as the
//! bare payload, since some endpoints drop the wrapper.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The body is the record (or array) itself.
    Bare,
    /// `{ "data": ... }`
    Data,
    /// `{ "<key>": ... }`, e.g. `{ "categories": [...] }`.
    Named(&'static str),
}

impl Envelope {
    /// Extract the payload from a response body.
    ///
    /// The declared key wins when present; otherwise the body itself is the
    /// payload and decoding decides whether it fits.
    pub fn unwrap(self, body: Value) -> Value {
        match self {
            Envelope::Bare => body,
            Envelope::Data => take_key(body, "data"),
            Envelope::Named(key) => take_key(body, key),
        }
    }

    /// Inverse of `unwrap`, used by the in-memory backend.
    pub fn wrap(self, inner: Value) -> Value {
        match self {
            Envelope::Bare => inner,
            Envelope::Data => single_key("data", inner),
            Envelope::Named(key) => single_key(key, inner),
        }
    }
}

fn take_key(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    }
}

fn single_key(key: &str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), inner);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn each_shape_unwraps_its_own_key() {
        let list = json!([{ "id": "a" }]);
        assert_eq!(Envelope::Bare.unwrap(list.clone()), list);
        assert_eq!(Envelope::Data.unwrap(json!({ "data": list.clone() })), list);
        assert_eq!(
            Envelope::Named("categories").unwrap(json!({ "success": true, "categories": list.clone() })),
            list
        );
    }

    #[test]
    fn missing_wrapper_falls_back_to_the_bare_body() {
        let list = json!([{ "_id": "a", "name": "Fruits" }]);
        assert_eq!(Envelope::Data.unwrap(list.clone()), list);

        let record = json!({ "_id": "c1", "code": "FRESH20" });
        assert_eq!(Envelope::Named("coupon").unwrap(record.clone()), record);
    }

    #[test]
    fn bare_collections_keep_a_data_key_as_a_field() {
        let body = json!({ "data": "kept", "id": "x" });
        assert_eq!(Envelope::Bare.unwrap(body.clone()), body);
    }

    #[test]
    fn wrap_is_inverse_of_unwrap() {
        for envelope in [Envelope::Bare, Envelope::Data, Envelope::Named("deal")] {
            let inner = json!({ "id": "x", "title": "Half price melons" });
            assert_eq!(envelope.unwrap(envelope.wrap(inner.clone())), inner);
        }
    }
}
