//! Outbound HTTP calls to vendor endpoints

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::{Error, Result};

/// Status and body of a vendor reply
///
/// Bodies which are not JSON are kept as a [Value::String] so callers can
/// decide how to report them.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    /// Create a reply
    pub fn new(status: u16, body: Value) -> Self {
        Reply { status, body }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort human readable reason from an error body
    pub fn reason(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            Value::Object(o) => o
                .get("message")
                .or_else(|| o.get("error"))
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| self.body.to_string()),
            other => other.to_string(),
        }
    }
}

/// Something that can issue the gateway's outbound requests
///
/// Every call must be bounded in time; a hung endpoint fails the call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`, optionally with a bearer token
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<Reply>;

    /// PUT `body` as JSON to `url`, optionally with a bearer token
    async fn put(&self, url: &str, body: &Value, bearer: Option<&str>) -> Result<Reply>;
}

/// [Transport] backed by one shared [reqwest::Client]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport where every request times out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| Error::network("client setup", e))?;
        Ok(HttpTransport { client })
    }

    async fn send(&self, action: &str, request: reqwest::RequestBuilder) -> Result<Reply> {
        let response = request.send().await.map_err(|e| map_err(action, e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| map_err(action, e))?;
        debug!("{action} answered {status} ({} bytes)", text.len());

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(Reply { status, body })
    }
}

fn map_err(action: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(action)
    } else {
        Error::network(action, err.without_url())
    }
}

/// `url` with the bridge user segment (`/api/<user>/...`) masked
fn redacted(url: &str) -> String {
    const USER_PREFIX: &str = "/api/";

    let Some(start) = url.find(USER_PREFIX).map(|i| i + USER_PREFIX.len()) else {
        return url.to_string();
    };
    let rest = &url[start..];
    match rest.find('/').unwrap_or(rest.len()) {
        0 => url.to_string(),
        end => format!("{}***{}", &url[..start], &rest[end..]),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<Reply> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(&format!("GET {}", redacted(url)), request).await
    }

    async fn put(&self, url: &str, body: &Value, bearer: Option<&str>) -> Result<Reply> {
        let mut request = self.client.put(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(&format!("PUT {}", redacted(url)), request).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_reply_reason() {
        let reply = Reply::new(401, json!({"error": "unauthorized", "message": "bad token"}));
        assert!(!reply.is_success());
        assert_eq!(reply.reason(), "bad token");

        let reply = Reply::new(502, Value::String("upstream down".into()));
        assert_eq!(reply.reason(), "upstream down");

        assert!(Reply::new(204, Value::Null).is_success());
    }

    #[test]
    fn test_redacted() {
        assert_eq!(
            redacted("http://10.0.0.5/api/s3cretkey/lights/4/state"),
            "http://10.0.0.5/api/***/lights/4/state"
        );
        assert_eq!(redacted("http://10.0.0.5/api/s3cretkey"), "http://10.0.0.5/api/***");
        assert_eq!(
            redacted("https://developer-api.nest.com/devices/thermostats"),
            "https://developer-api.nest.com/devices/thermostats"
        );
    }

    /// Address of a port nothing listens on
    async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    #[tokio::test]
    async fn test_failure_hides_bridge_user() {
        let addr = closed_port().await;
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();

        let err = transport
            .get(&format!("http://{addr}/api/s3cretkey/lights"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network { .. }), "{err}");
        assert!(!err.to_string().contains("s3cretkey"), "{err}");
        assert!(!format!("{err:?}").contains("s3cretkey"), "{err:?}");
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // hold the connection open without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let transport = HttpTransport::new(Duration::from_millis(100)).unwrap();
        let err = transport
            .get(&format!("http://{addr}/api/s3cretkey/lights"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }), "{err}");
        assert!(!err.to_string().contains("s3cretkey"), "{err}");
    }

    #[tokio::test]
    async fn test_plain_text_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 11\r\nConnection: close\r\n\r\nbridge busy",
                )
                .await
                .unwrap();
        });

        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let reply = transport
            .get(&format!("http://{addr}/"), None)
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, Value::String(String::from("bridge busy")));
    }
}
