//! Where vendor credentials come from

use std::env;

use async_trait::async_trait;

use crate::{Error, Result};

/// Supplies a vendor credential (Hue user id, Nest access token)
///
/// The session asks for the credential once and caches the result, so an
/// implementation may be slow (e.g. a pairing flow) without hurting
/// subsequent requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Fetch the credential, [Error::MissingCredential] if there is none
    async fn credential(&self) -> Result<String>;
}

/// Reads the credential from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    /// Create a provider for the given variable name
    pub fn new(var: &str) -> Self {
        EnvCredential {
            var: var.to_string(),
        }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredential {
    async fn credential(&self) -> Result<String> {
        match env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(Error::MissingCredential(self.var.clone())),
        }
    }
}

/// A credential known up front (CLI flag, tests)
///
/// # Examples
///
/// ```
/// use homegate::credentials::{CredentialProvider, StaticCredential};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let provider = StaticCredential::new("abc");
/// assert_eq!(provider.credential().await.unwrap(), "abc");
/// # });
/// ```
///
#[derive(Debug, Clone)]
pub struct StaticCredential {
    value: Option<String>,
}

impl StaticCredential {
    /// Create a provider that always returns `value`
    pub fn new(value: &str) -> Self {
        StaticCredential {
            value: Some(value.to_string()).filter(|v| !v.is_empty()),
        }
    }

    /// Create a provider with nothing provisioned
    pub fn missing() -> Self {
        StaticCredential { value: None }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn credential(&self) -> Result<String> {
        self.value
            .clone()
            .ok_or_else(|| Error::MissingCredential(String::from("static credential")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_missing() {
        let provider = EnvCredential::new("HOMEGATE_TEST_SURELY_UNSET_VARIABLE");
        let err = provider.credential().await.unwrap_err();
        assert_eq!(
            err,
            Error::MissingCredential("HOMEGATE_TEST_SURELY_UNSET_VARIABLE".into())
        );
    }

    #[tokio::test]
    async fn test_static_empty_is_missing() {
        assert!(StaticCredential::new("").credential().await.is_err());
        assert!(StaticCredential::missing().credential().await.is_err());
    }
}
