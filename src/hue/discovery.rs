//! Bridge address lookup through the vendor's cloud discovery service

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::transport::Transport;
use crate::{Error, Result};

/// One bridge record from the discovery service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    /// Bridge id
    pub id: String,

    /// Address of the bridge on the caller's local network
    #[serde(rename = "internalipaddress")]
    pub address: String,
}

/// Resolves the bridge address, one outbound call per resolution
///
/// There is no retry here, callers decide whether to try again.
pub struct Discovery {
    url: String,
    transport: Arc<dyn Transport>,
}

impl Discovery {
    /// Create a resolver against the given discovery endpoint
    pub fn new(url: &str, transport: Arc<dyn Transport>) -> Self {
        Discovery {
            url: url.to_string(),
            transport,
        }
    }

    /// All bridges the discovery service reports for this network
    pub async fn bridges(&self) -> Result<Vec<DiscoveredBridge>> {
        let reply = self.transport.get(&self.url, None).await?;
        if !reply.is_success() {
            return Err(Error::rejected(
                "bridge discovery",
                reply.status,
                reply.reason(),
            ));
        }

        serde_json::from_value(reply.body).map_err(|e| Error::decode("discovery response", e))
    }

    /// Address of the first bridge reported
    pub async fn resolve(&self) -> Result<String> {
        let bridges = self.bridges().await?;
        debug!("discovery reported {} bridge(s)", bridges.len());

        match bridges.into_iter().next() {
            Some(bridge) if !bridge.address.trim().is_empty() => Ok(bridge.address),
            Some(bridge) => Err(Error::decode(
                "discovery response",
                format!("bridge {} has no address", bridge.id),
            )),
            None => Err(Error::NoBridge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;
    use serde_json::json;

    const URL: &str = "https://discovery.example/";

    fn discovery(transport: FakeTransport) -> Discovery {
        Discovery::new(URL, Arc::new(transport))
    }

    #[tokio::test]
    async fn test_first_bridge_wins() {
        let transport = FakeTransport::new().reply(
            "GET",
            URL,
            200,
            json!([
                {"id": "b1", "internalipaddress": "10.0.0.5", "port": 443},
                {"id": "b2", "internalipaddress": "10.0.0.6"}
            ]),
        );
        assert_eq!(discovery(transport).resolve().await.unwrap(), "10.0.0.5");
    }

    #[tokio::test]
    async fn test_empty_is_no_bridge() {
        let transport = FakeTransport::new().reply("GET", URL, 200, json!([]));
        assert_eq!(discovery(transport).resolve().await.unwrap_err(), Error::NoBridge);
    }

    #[tokio::test]
    async fn test_wrong_shape() {
        let transport = FakeTransport::new().reply("GET", URL, 200, json!({"id": "b1"}));
        let err = discovery(transport).resolve().await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let transport = FakeTransport::new().reply("GET", URL, 429, json!("slow down"));
        let err = discovery(transport).resolve().await.unwrap_err();
        assert_eq!(err, Error::rejected("bridge discovery", 429, "slow down"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let transport = FakeTransport::new().fail("GET", URL, Error::timeout("GET"));
        let err = discovery(transport).resolve().await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
