use thiserror::Error;

/// Failure of the single outbound chat-completion request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(
        "Model request timed out after {timeout_secs}s while calling '{api_url}'. \
         Increase MODEL_TIMEOUT_SECS or check model responsiveness."
    )]
    Timeout {
        api_url: String,
        timeout_secs: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "Connection refused by model API at '{api_url}'. \
         Ensure the model provider is reachable and MODEL_BASE_URL is correct."
    )]
    ConnectionRefused {
        api_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "Failed to connect to model API at '{api_url}'. \
         Check MODEL_BASE_URL and network connectivity."
    )]
    Connect {
        api_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to call model API at '{api_url}'")]
    Transport {
        api_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Model request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse model chat response")]
    Decode(#[source] reqwest::Error),
}

impl RequestError {
    /// HTTP status for `Status` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
