//! Hue bridge client
//!
//! The bridge address is looked up through the vendor's discovery service
//! and combined with an externally provisioned user id into a
//! [BridgeSession]. The session is built once per [HueClient] and shared by
//! every request after that.

use std::sync::Arc;

use serde_json::Value;

mod command;
pub mod directory;
mod discovery;
mod light;
mod session;

pub use command::{ColorCommand, StatePatch};
pub use directory::{LightDirectory, Skipped};
pub use discovery::{DiscoveredBridge, Discovery};
pub use light::{Chromaticity, ColorMode, Light, LightState};
pub use session::{BridgeSession, SessionCell};

use crate::config::{Config, HUE_USER_ID_VAR};
use crate::credentials::{CredentialProvider, EnvCredential};
use crate::transport::Transport;
use crate::{Error, Result};

/// Bridge error type for an unknown resource (light id)
const RESOURCE_NOT_AVAILABLE: u64 = 3;

/// Lighting bridge client
///
/// Cheap to share behind an [Arc] or [actix_web::web::Data]; nothing in
/// here needs `&mut`.
///
pub struct HueClient {
    transport: Arc<dyn Transport>,
    session: SessionCell,
}

impl HueClient {
    /// Create a client, nothing is contacted until the first request
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        discovery_url: &str,
        address: Option<String>,
    ) -> Self {
        let discovery = Discovery::new(discovery_url, Arc::clone(&transport));
        HueClient {
            session: SessionCell::new(discovery, credentials, address),
            transport,
        }
    }

    /// Create a client reading the user id from `HUE_USER_ID`
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self::new(
            transport,
            Arc::new(EnvCredential::new(HUE_USER_ID_VAR)),
            &config.discovery_url,
            config.bridge_address.clone(),
        )
    }

    /// The bridge session, discovering and authenticating on first use
    pub async fn session(&self) -> Result<Arc<BridgeSession>> {
        self.session.get().await
    }

    /// Whether the session has been built, without building it
    pub fn session_ready(&self) -> bool {
        self.session.current().is_some()
    }

    /// All lights on the bridge, ascending by id
    pub async fn get_lights(&self) -> Result<LightDirectory> {
        let session = self.session().await?;
        directory::fetch(self.transport.as_ref(), &session).await
    }

    /// A single light by id
    pub async fn light(&self, light_id: &str) -> Result<Light> {
        let session = self.session().await?;
        let reply = self
            .transport
            .get(&session.light_url(light_id), None)
            .await?;

        if !reply.is_success() {
            return Err(Error::rejected(
                &format!("light {light_id} lookup"),
                reply.status,
                reply.reason(),
            ));
        }
        if let Some(err) = bridge_errors(&reply.body).into_iter().next() {
            return Err(if err.kind == RESOURCE_NOT_AVAILABLE {
                Error::LightNotFound(light_id.to_string())
            } else {
                Error::decode(&format!("light {light_id}"), err.description)
            });
        }

        Light::from_bridge(light_id, reply.body)
    }

    /// Turn a light on or off
    pub async fn set_power(&self, light_id: &str, on: bool) -> Result<()> {
        let session = self.session().await?;
        command::send(
            self.transport.as_ref(),
            &session,
            light_id,
            &StatePatch::power(on),
        )
        .await
    }

    /// Change a light's color
    ///
    /// A command with every field at zero turns the light on instead.
    ///
    pub async fn set_color_state(&self, light_id: &str, color: &ColorCommand) -> Result<()> {
        color.validate()?;
        let session = self.session().await?;
        command::send(
            self.transport.as_ref(),
            &session,
            light_id,
            &StatePatch::from(color),
        )
        .await
    }
}

/// One `{"error": {...}}` entry of a bridge reply
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BridgeError {
    pub kind: u64,
    pub description: String,
}

/// Error entries of a bridge reply, empty for anything else
pub(crate) fn bridge_errors(body: &Value) -> Vec<BridgeError> {
    let Some(entries) = body.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("error"))
        .map(|err| BridgeError {
            kind: err.get("type").and_then(Value::as_u64).unwrap_or_default(),
            description: err
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unknown bridge error")
                .to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredential;
    use crate::transport::testing::FakeTransport;
    use serde_json::json;

    const DISCOVERY: &str = "https://discovery.example/";
    const BASE: &str = "http://10.0.0.5/api/abc/lights";

    fn light(name: &str) -> Value {
        json!({"state": {"on": false, "bri": 1, "reachable": true}, "type": "Dimmable light", "name": name})
    }

    fn client(transport: FakeTransport) -> (Arc<FakeTransport>, HueClient) {
        let transport = Arc::new(transport.reply(
            "GET",
            DISCOVERY,
            200,
            json!([{"id": "b1", "internalipaddress": "10.0.0.5"}]),
        ));
        let client = HueClient::new(
            transport.clone(),
            Arc::new(StaticCredential::new("abc")),
            DISCOVERY,
            None,
        );
        (transport, client)
    }

    #[test]
    fn test_bridge_errors() {
        let errors = bridge_errors(&json!([
            {"success": {"/lights/1/state/on": true}},
            {"error": {"type": 7, "address": "/lights/1/state/xy", "description": "invalid value"}}
        ]));
        assert_eq!(
            errors,
            [BridgeError {
                kind: 7,
                description: String::from("invalid value")
            }]
        );
        assert!(bridge_errors(&json!({"1": {}})).is_empty());
    }

    #[tokio::test]
    async fn test_requests_share_one_session() {
        let (transport, client) = client(
            FakeTransport::new()
                .reply("GET", BASE, 200, json!({"2": light("b"), "1": light("a")}))
                .reply("PUT", &format!("{BASE}/1/state"), 200, json!([{"success": {}}])),
        );

        let lights = client.get_lights().await.unwrap();
        assert_eq!(lights.lights().len(), 2);
        client.set_power("1", true).await.unwrap();
        client
            .set_color_state("1", &ColorCommand::default())
            .await
            .unwrap();

        assert_eq!(transport.count("GET", DISCOVERY), 1);
        assert_eq!(transport.count("PUT", &format!("{BASE}/1/state")), 2);
    }

    #[tokio::test]
    async fn test_single_light() {
        let (_, client) = client(
            FakeTransport::new()
                .reply("GET", &format!("{BASE}/5"), 200, light("porch"))
                .reply(
                    "GET",
                    &format!("{BASE}/6"),
                    200,
                    json!([{"error": {"type": 3, "address": "/lights/6", "description": "resource, /lights/6, not available"}}]),
                ),
        );

        let porch = client.light("5").await.unwrap();
        assert_eq!(porch.id(), "5");
        assert_eq!(porch.name(), "porch");

        assert_eq!(
            client.light("6").await.unwrap_err(),
            Error::LightNotFound(String::from("6"))
        );
    }

    #[tokio::test]
    async fn test_invalid_color_never_reaches_bridge() {
        let (transport, client) = client(FakeTransport::new());
        let err = client
            .set_color_state(
                "1",
                &ColorCommand {
                    x: -0.1,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_discovery_failure_surfaces() {
        let transport = Arc::new(FakeTransport::new().reply("GET", DISCOVERY, 200, json!([])));
        let client = HueClient::new(
            transport,
            Arc::new(StaticCredential::new("abc")),
            DISCOVERY,
            None,
        );
        assert_eq!(client.get_lights().await.unwrap_err(), Error::NoBridge);
    }

    #[tokio::test]
    async fn test_unreachable_bridge_hides_user_id() {
        let addr = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = crate::transport::HttpTransport::new(std::time::Duration::from_secs(2)).unwrap();
        let client = HueClient::new(
            Arc::new(transport),
            Arc::new(StaticCredential::new("s3cretkey")),
            DISCOVERY,
            Some(addr.to_string()),
        );

        let err = client.get_lights().await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }), "{err}");
        assert!(!err.to_string().contains("s3cretkey"), "{err}");
    }
}
