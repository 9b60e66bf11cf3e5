//! Lazily built, process-wide bridge session

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info};

use super::discovery::Discovery;
use crate::credentials::CredentialProvider;
use crate::{Error, Result};

/// Resolved bridge address and credential
///
/// `base_url` is derived from the other two and is never empty.
///
/// # Examples
///
/// ```
/// use homegate::hue::BridgeSession;
///
/// let session = BridgeSession::new("10.0.0.5", "abc").unwrap();
/// assert_eq!(session.base_url(), "http://10.0.0.5/api/abc/lights");
/// assert_eq!(session.state_url("4"), "http://10.0.0.5/api/abc/lights/4/state");
///
/// assert!(BridgeSession::new("", "abc").is_err());
/// ```
///
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeSession {
    address: String,
    credential: String,
    base_url: String,
}

impl BridgeSession {
    /// Create a session, both parts must be non-empty
    pub fn new(address: &str, credential: &str) -> Result<Self> {
        let address = address.trim().trim_end_matches('/');
        let credential = credential.trim();
        if address.is_empty() {
            return Err(Error::invalid_config("bridge address", "empty"));
        }
        if credential.is_empty() {
            return Err(Error::MissingCredential(String::from("hue user id")));
        }

        Ok(BridgeSession {
            address: address.to_string(),
            credential: credential.to_string(),
            base_url: format!("http://{address}/api/{credential}/lights"),
        })
    }

    /// Network location of the bridge
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Bridge user id
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Lights endpoint scoped by the credential
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint of a single light
    pub fn light_url(&self, light_id: &str) -> String {
        format!("{}/{}", self.base_url, light_id)
    }

    /// Endpoint accepting partial state patches for a light
    pub fn state_url(&self, light_id: &str) -> String {
        format!("{}/{}/state", self.base_url, light_id)
    }
}

// the credential stays out of logs
impl fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSession")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Steps of building a [BridgeSession]
#[derive(Debug)]
enum SessionState {
    Empty,
    AddressResolved { address: String },
    Authenticated { address: String, credential: String },
    Ready(BridgeSession),
}

type Pending = Shared<BoxFuture<'static, Result<Arc<BridgeSession>>>>;

/// Owns the one [BridgeSession] of a client
///
/// The first caller runs discovery and authentication, callers arriving
/// while that is in flight wait on the same attempt and get the same
/// session or the same error. Once ready, reads take no lock. A failed
/// attempt is forgotten so a later call starts over.
///
pub struct SessionCell {
    ready: OnceLock<Arc<BridgeSession>>,
    pending: Mutex<Option<Pending>>,
    discovery: Arc<Discovery>,
    credentials: Arc<dyn CredentialProvider>,
    address: Option<String>,
}

impl SessionCell {
    /// Create an empty cell
    ///
    /// A known `address` skips discovery.
    ///
    pub fn new(
        discovery: Discovery,
        credentials: Arc<dyn CredentialProvider>,
        address: Option<String>,
    ) -> Self {
        SessionCell {
            ready: OnceLock::new(),
            pending: Mutex::new(None),
            discovery: Arc::new(discovery),
            credentials,
            address: address.filter(|a| !a.trim().is_empty()),
        }
    }

    /// The session if it has already been built
    pub fn current(&self) -> Option<Arc<BridgeSession>> {
        self.ready.get().cloned()
    }

    /// Get the session, building it on first use
    pub async fn get(&self) -> Result<Arc<BridgeSession>> {
        if let Some(session) = self.ready.get() {
            return Ok(Arc::clone(session));
        }

        let pending = {
            let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = self.bootstrap().boxed().shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        if let Ok(session) = &result {
            // only the first writer wins, later ones hold the same Arc
            let _ = self.ready.set(Arc::clone(session));
        }

        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|p| p.ptr_eq(&pending)) {
            *slot = None;
        }

        result
    }

    fn bootstrap(&self) -> impl std::future::Future<Output = Result<Arc<BridgeSession>>> {
        let discovery = Arc::clone(&self.discovery);
        let credentials = Arc::clone(&self.credentials);
        let address = self.address.clone();

        async move {
            let mut state = match address {
                Some(address) => SessionState::AddressResolved { address },
                None => SessionState::Empty,
            };

            loop {
                state = match state {
                    SessionState::Empty => {
                        debug!("resolving bridge address");
                        let address = discovery.resolve().await?;
                        SessionState::AddressResolved { address }
                    }
                    SessionState::AddressResolved { address } => {
                        debug!("bridge at {address}, fetching credential");
                        let credential = credentials.credential().await?;
                        SessionState::Authenticated {
                            address,
                            credential,
                        }
                    }
                    SessionState::Authenticated {
                        address,
                        credential,
                    } => SessionState::Ready(BridgeSession::new(&address, &credential)?),
                    SessionState::Ready(session) => {
                        info!("bridge session ready at {}", session.address());
                        return Ok(Arc::new(session));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredential;
    use crate::transport::testing::FakeTransport;
    use serde_json::json;
    use std::time::Duration;

    const URL: &str = "https://discovery.example/";

    fn cell(transport: &Arc<FakeTransport>, credential: StaticCredential) -> SessionCell {
        SessionCell::new(
            Discovery::new(URL, transport.clone()),
            Arc::new(credential),
            None,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_base_url() {
        let transport = Arc::new(FakeTransport::new().reply(
            "GET",
            URL,
            200,
            json!([{"id": "b1", "internalipaddress": "10.0.0.5"}]),
        ));
        let cell = cell(&transport, StaticCredential::new("abc"));

        assert!(cell.current().is_none());
        let session = cell.get().await.unwrap();
        assert_eq!(session.base_url(), "http://10.0.0.5/api/abc/lights");
        assert_eq!(cell.current().unwrap().address(), "10.0.0.5");
    }

    #[tokio::test]
    async fn test_ready_is_memoized() {
        let transport = Arc::new(FakeTransport::new().reply(
            "GET",
            URL,
            200,
            json!([{"id": "b1", "internalipaddress": "10.0.0.5"}]),
        ));
        let cell = cell(&transport, StaticCredential::new("abc"));

        let first = cell.get().await.unwrap();
        let second = cell.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.count("GET", URL), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_discovers_once() {
        let transport = Arc::new(
            FakeTransport::with_delay(Duration::from_millis(50)).reply(
                "GET",
                URL,
                200,
                json!([{"id": "b1", "internalipaddress": "10.0.0.5"}]),
            ),
        );
        let cell = cell(&transport, StaticCredential::new("abc"));

        let (a, b) = futures::join!(cell.get(), cell.get());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(transport.count("GET", URL), 1);
    }

    #[tokio::test]
    async fn test_concurrent_failure_is_shared() {
        let transport = Arc::new(
            FakeTransport::with_delay(Duration::from_millis(50)).reply("GET", URL, 200, json!([])),
        );
        let cell = cell(&transport, StaticCredential::new("abc"));

        let (a, b) = futures::join!(cell.get(), cell.get());
        assert_eq!(a.unwrap_err(), Error::NoBridge);
        assert_eq!(b.unwrap_err(), Error::NoBridge);
        assert_eq!(transport.count("GET", URL), 1);

        // failures are not cached
        assert!(cell.get().await.is_err());
        assert_eq!(transport.count("GET", URL), 2);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let transport = Arc::new(FakeTransport::new().reply(
            "GET",
            URL,
            200,
            json!([{"id": "b1", "internalipaddress": "10.0.0.5"}]),
        ));
        let cell = cell(&transport, StaticCredential::missing());

        let err = cell.get().await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
        assert!(cell.current().is_none());
    }

    #[tokio::test]
    async fn test_known_address_skips_discovery() {
        let transport = Arc::new(FakeTransport::new());
        let cell = SessionCell::new(
            Discovery::new(URL, transport.clone()),
            Arc::new(StaticCredential::new("abc")),
            Some(String::from("192.168.1.2")),
        );

        let session = cell.get().await.unwrap();
        assert_eq!(session.base_url(), "http://192.168.1.2/api/abc/lights");
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_debug_hides_credential() {
        let session = BridgeSession::new("10.0.0.5", "secret").unwrap();
        assert!(!format!("{session:?}").contains("secret"));
    }
}
