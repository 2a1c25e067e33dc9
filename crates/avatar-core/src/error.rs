//! Error taxonomy for vendor calls, session bookkeeping and configuration.

use thiserror::Error;

/// Result type alias for avatar operations
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Every failure the client can surface. Transport and client code classify
/// into one of these and never swallow an error.
#[derive(Error, Debug)]
pub enum AvatarError {
    /// Caller-supplied data failed a local precondition (e.g. empty speech text).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Vendor quota exhausted: {0}")]
    QuotaExceeded(String),

    /// DNS, connect, refused or timed out. The call may not have reached the vendor.
    #[error("Vendor unreachable: {0}")]
    NetworkUnavailable(String),

    /// Response shape violates the expected contract.
    #[error("Unexpected vendor response (HTTP {status}): {detail}")]
    Protocol { status: u16, detail: String },

    /// Vendor-reported failure not otherwise classified.
    #[error("Vendor error (HTTP {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AvatarError {
    /// Stable machine-readable kind, safe to hand to untrusted callers.
    pub fn kind(&self) -> &'static str {
        match self {
            AvatarError::InvalidArgument(_) => "invalid_argument",
            AvatarError::QuotaExceeded(_) => "quota_exceeded",
            AvatarError::NetworkUnavailable(_) => "network_unavailable",
            AvatarError::Protocol { .. } => "protocol_error",
            AvatarError::Backend { .. } => "backend_error",
            AvatarError::NotFound(_) => "not_found",
            AvatarError::Config(_) => "config_error",
        }
    }
}

impl From<config::ConfigError> for AvatarError {
    fn from(err: config::ConfigError) -> Self {
        AvatarError::Config(err.to_string())
    }
}
