use strum_macros::Display;

/// Broad classes of [Error], used to pick a transport status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// Transport failure or timeout talking to a vendor endpoint
    Network,

    /// The vendor answered with something we could not use
    Protocol,

    /// The requested bridge, light or thermostat does not exist
    NotFound,

    /// Caller supplied parameters are malformed or out of range
    Validation,

    /// Missing credential or unusable configuration
    Config,
}

/// All potential errors in homegate
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Some transport error when talking to a vendor endpoint
    #[error("network {action} error: {reason}")]
    Network { action: String, reason: String },

    /// The vendor endpoint did not answer within the configured timeout
    #[error("timed out during {action}")]
    Timeout { action: String },

    /// Response body did not have the expected shape
    #[error("failed to decode {context}: {reason}")]
    Decode { context: String, reason: String },

    /// Used when failing to dump json
    #[error("failed to dump json: {0}")]
    JsonDump(String),

    /// The vendor answered with a non-success status
    #[error("{action} rejected with status {status}: {reason}")]
    Rejected {
        action: String,
        status: u16,
        reason: String,
    },

    /// The bridge refused a light state change
    #[error("command for light {light_id} failed: {reason}")]
    Command { light_id: String, reason: String },

    /// Discovery returned no bridge reachable from this network
    #[error("no hue bridge found on this network")]
    NoBridge,

    /// The bridge does not know the light
    #[error("light {0} not found")]
    LightNotFound(String),

    /// The thermostat service does not know the device
    #[error("thermostat {0} not found")]
    ThermostatNotFound(String),

    /// A caller supplied value is malformed or out of range
    #[error("invalid {name} {value:?}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// No credential was provisioned for a vendor
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// A configuration value cannot be used
    #[error("invalid config {key}: {reason}")]
    InvalidConfig { key: String, reason: String },
}

impl Error {
    /// Create a new network error
    pub fn network(action: &str, reason: impl ToString) -> Self {
        Error::Network {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new timeout error
    pub fn timeout(action: &str) -> Self {
        Error::Timeout {
            action: action.to_string(),
        }
    }

    /// Create a new decode error
    pub fn decode(context: &str, reason: impl ToString) -> Self {
        Error::Decode {
            context: context.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new rejected error from a non-success reply
    pub fn rejected(action: &str, status: u16, reason: impl ToString) -> Self {
        Error::Rejected {
            action: action.to_string(),
            status,
            reason: reason.to_string(),
        }
    }

    /// Create a new light command error
    pub fn command(light_id: &str, reason: impl ToString) -> Self {
        Error::Command {
            light_id: light_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(name: &str, value: impl ToString, reason: &str) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new invalid config error
    pub fn invalid_config(key: &str, reason: impl ToString) -> Self {
        Error::InvalidConfig {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Which broad class this error falls in
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. } | Error::Timeout { .. } => ErrorKind::Network,
            Error::Decode { .. }
            | Error::JsonDump(_)
            | Error::Rejected { .. }
            | Error::Command { .. } => ErrorKind::Protocol,
            Error::NoBridge | Error::LightNotFound(_) | Error::ThermostatNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::InvalidParameter { .. } => ErrorKind::Validation,
            Error::MissingCredential(_) | Error::InvalidConfig { .. } => ErrorKind::Config,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
