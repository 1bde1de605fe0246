use thiserror::Error;

/// Remote endpoint configuration is structurally invalid for a store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported API URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("API store ID is not configured")]
    MissingStoreId,

    #[error("API key is not configured")]
    MissingApiKey,
}

/// A single batch submission failed
#[derive(Debug, Error)]
pub enum RemoteSyncError {
    #[error("Remote client is not configured")]
    NotConfigured,

    #[error("Failed to reach products API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Products API rejected batch ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to encode products: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RemoteSyncError {
    fn from(err: reqwest::Error) -> Self {
        RemoteSyncError::Transport(err)
    }
}
