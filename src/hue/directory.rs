//! Decoding of the bridge's light listing
//!
//! The listing is one JSON object keyed by each light's numeric id, e.g.
//! `{"1": {...}, "4": {...}, "10": {...}}`. Keys are neither contiguous nor
//! ordered, so the object is walked as a key to raw value map and each
//! value is decoded on its own. A bad entry is skipped and reported in
//! [LightDirectory::skipped], it never fails the whole listing.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use super::light::Light;
use super::session::BridgeSession;
use super::bridge_errors;
use crate::transport::Transport;
use crate::{Error, Result};

const CONTEXT: &str = "light listing";

/// An entry of the listing which could not be decoded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    /// Key of the entry in the listing
    pub key: String,

    /// Why decoding failed
    pub reason: String,
}

/// Result of one listing fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightDirectory {
    lights: Vec<Light>,
    skipped: Vec<Skipped>,
}

impl LightDirectory {
    /// Decoded lights, ascending by numeric id
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Entries left out of [Self::lights]
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Take the lights, dropping the diagnostics
    pub fn into_lights(self) -> Vec<Light> {
        self.lights
    }
}

/// Fetch and decode the listing behind the session's base URL
pub(crate) async fn fetch(transport: &dyn Transport, session: &BridgeSession) -> Result<LightDirectory> {
    let reply = transport.get(session.base_url(), None).await?;
    if !reply.is_success() {
        return Err(Error::rejected(CONTEXT, reply.status, reply.reason()));
    }
    decode(reply.body)
}

/// Decode a listing document
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use homegate::hue::directory::decode;
///
/// let directory = decode(json!({
///     "10": {"name": "Desk", "type": "Color light", "state": {"on": true}},
///     "2": {"name": "Hall", "type": "Dimmable light", "state": {"on": false}},
///     "3": {"name": "Broken"},
/// }))
/// .unwrap();
///
/// let ids: Vec<&str> = directory.lights().iter().map(|l| l.id()).collect();
/// assert_eq!(ids, ["2", "10"]);
/// assert_eq!(directory.skipped()[0].key, "3");
///
/// assert!(decode(json!([])).is_err());
/// ```
///
pub fn decode(doc: Value) -> Result<LightDirectory> {
    let entries = match doc {
        Value::Object(entries) => entries,
        other => return Err(not_a_listing(&other)),
    };

    let mut lights = BTreeMap::new();
    let mut skipped = Vec::new();

    for (key, raw) in entries {
        let order = match numeric_key(&key) {
            Some(order) => order,
            None => {
                warn!("skipping light listing entry {key:?}: key is not a light id");
                skipped.push(Skipped {
                    key,
                    reason: String::from("key is not a light id"),
                });
                continue;
            }
        };

        match Light::from_bridge(&key, raw) {
            Ok(light) => {
                lights.insert((order, key), light);
            }
            Err(e) => {
                warn!("skipping light listing entry {key:?}: {e}");
                skipped.push(Skipped {
                    key,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!("decoded {} light(s), skipped {}", lights.len(), skipped.len());

    Ok(LightDirectory {
        lights: lights.into_values().collect(),
        skipped,
    })
}

/// The bridge answers with an array of error entries when it refuses
fn not_a_listing(doc: &Value) -> Error {
    let reason = match bridge_errors(doc).first() {
        Some(err) => format!("bridge error {}: {}", err.kind, err.description),
        None => format!("expected an object keyed by light id, found {}", json_type(doc)),
    };
    Error::decode(CONTEXT, reason)
}

/// Sort position of a listing key, `None` unless it is all digits
fn numeric_key(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;
    use serde_json::{json, Map};

    fn entry(name: &str) -> Value {
        json!({
            "state": {"on": true, "bri": 254, "hue": 8418, "sat": 140,
                      "xy": [0.5, 0.25], "colormode": "hs", "reachable": true},
            "type": "Extended color light",
            "name": name,
        })
    }

    #[test]
    fn test_n_entries_ascending() {
        for n in [0usize, 1, 2, 9, 10, 11, 25] {
            let mut doc = Map::new();
            // insert in reverse to make sure the input order does not matter
            for i in (1..=n).rev() {
                doc.insert(i.to_string(), entry(&format!("light {i}")));
            }

            let directory = decode(Value::Object(doc)).unwrap();
            assert_eq!(directory.lights().len(), n);
            assert!(directory.skipped().is_empty());

            let ids: Vec<String> = directory.lights().iter().map(|l| l.id().to_string()).collect();
            let expected: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_sparse_keys() {
        let directory = decode(json!({"17": entry("c"), "3": entry("a"), "100": entry("d"), "9": entry("b")}))
            .unwrap();
        let names: Vec<&str> = directory.lights().iter().map(|l| l.name()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_one_malformed_entry() {
        let directory = decode(json!({
            "1": entry("one"),
            "2": {"name": "two", "type": "x", "state": {"on": "yes"}},
            "3": entry("three"),
            "4": entry("four"),
        }))
        .unwrap();

        assert_eq!(directory.lights().len(), 3);
        assert_eq!(directory.skipped().len(), 1);
        assert_eq!(directory.skipped()[0].key, "2");
        assert!(directory.skipped()[0].reason.contains("light 2"));
    }

    #[test]
    fn test_non_numeric_key() {
        let directory = decode(json!({"1": entry("one"), "group": entry("nope")})).unwrap();
        assert_eq!(directory.lights().len(), 1);
        assert_eq!(
            directory.skipped(),
            [Skipped {
                key: String::from("group"),
                reason: String::from("key is not a light id"),
            }]
        );
    }

    #[test]
    fn test_not_an_object() {
        for doc in [json!(null), json!("nope"), json!(42), json!([1, 2])] {
            let err = decode(doc).unwrap_err();
            assert!(matches!(err, Error::Decode { .. }), "{err}");
        }
    }

    #[test]
    fn test_bridge_error_body() {
        let err = decode(json!([
            {"error": {"type": 1, "address": "/lights", "description": "unauthorized user"}}
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            Error::decode(CONTEXT, "bridge error 1: unauthorized user")
        );
    }

    #[tokio::test]
    async fn test_fetch() {
        let session = BridgeSession::new("10.0.0.5", "abc").unwrap();
        let transport = FakeTransport::new().reply(
            "GET",
            "http://10.0.0.5/api/abc/lights",
            200,
            json!({"2": entry("b"), "1": entry("a")}),
        );

        let directory = fetch(&transport, &session).await.unwrap();
        assert_eq!(directory.into_lights()[0].name(), "a");
    }

    #[tokio::test]
    async fn test_fetch_non_success() {
        let session = BridgeSession::new("10.0.0.5", "abc").unwrap();
        let transport = FakeTransport::new().reply(
            "GET",
            "http://10.0.0.5/api/abc/lights",
            503,
            Value::String(String::from("busy")),
        );

        let err = fetch(&transport, &session).await.unwrap_err();
        assert_eq!(err, Error::rejected(CONTEXT, 503, "busy"));
    }
}
