use std::time::Duration;

use thiserror::Error;

/// Unified application error type to simplify bubbling errors through async flows.
///
/// The first four variants are the failure taxonomy every caller branches on:
/// missing credentials, a non-2xx upstream response, an elapsed deadline, and
/// an undecodable response body. The rest are conversions from the libraries
/// the crate crosses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration. {0}")]
    Config(String),
    #[error("Upstream API error ({status}). {body}")]
    Upstream { status: u16, body: String },
    #[error("Timed out after {budget:?} waiting on {waiting_on}")]
    Timeout { waiting_on: String, budget: Duration },
    #[error("Unable to parse an upstream response. {0}")]
    Parse(String),
    #[error("Error accessing the internet. {0}")]
    Http(#[from] reqwest::Error),
    #[error("Error serializing json. {0}")]
    Json(#[from] serde_json::Error),
    #[error("Errored while handling a file. {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing the duration string. {0}")]
    DurationParse(#[from] humantime::DurationError),
}

/// Upstream error bodies can be arbitrarily large; keep only this much.
const MAX_BODY_LEN: usize = 500;

impl AppError {
    /// Build an `Upstream` error, truncating the response body.
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_BODY_LEN {
            let mut cut = MAX_BODY_LEN;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push('…');
        }
        AppError::Upstream { status, body }
    }

    /// Build a `Timeout` error naming the call that exceeded its budget.
    pub fn timeout(waiting_on: impl Into<String>, budget: Duration) -> Self {
        AppError::Timeout {
            waiting_on: waiting_on.into(),
            budget,
        }
    }

    /// Timeouts are logged distinctly even though callers handle them like
    /// any other failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout { .. })
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(e: base64::DecodeError) -> Self {
        AppError::Parse(format!("invalid base64 payload: {e}"))
    }
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        AppError::Parse(format!("payload is not valid UTF-8: {e}"))
    }
}

/// Convenience alias for results that bubble `AppError`.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_truncates_long_bodies() {
        let err = AppError::upstream(502, "x".repeat(2000));
        match err {
            AppError::Upstream { status, body } => {
                assert_eq!(status, 502);
                assert!(body.len() <= MAX_BODY_LEN + '…'.len_utf8());
                assert!(body.ends_with('…'));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn timeout_is_distinguishable() {
        let err = AppError::timeout("AI summary", Duration::from_secs(20));
        assert!(err.is_timeout());
        assert!(!AppError::Config("no token".into()).is_timeout());
    }
}
