use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::RequestError;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

/// Classifies a transport failure so timeouts and refused connections get their own kinds.
pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> RequestError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return RequestError::Timeout {
            api_url: api_url.to_string(),
            timeout_secs,
            source: err,
        };
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return RequestError::ConnectionRefused {
                api_url: api_url.to_string(),
                source: err,
            };
        }

        return RequestError::Connect {
            api_url: api_url.to_string(),
            source: err,
        };
    }

    RequestError::Transport {
        api_url: api_url.to_string(),
        source: err,
    }
}
