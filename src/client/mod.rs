pub mod session;

pub use session::{Session, SessionUser};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error ({status}): {error}")]
    Api {
        status: u16,
        error: String,
        message: Option<String>,
    },
    #[error("not logged in")]
    NotLoggedIn,
    #[error("could not access the session file: {0}")]
    Store(#[from] std::io::Error),
    #[error("could not encode the session: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The `{error, message}` body every failing route answers with.
#[derive(Debug, Deserialize)]
struct ApiFailure {
    error: String,
    message: Option<String>,
}

impl ClientError {
    fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiFailure>(body) {
            Ok(failure) => ClientError::Api {
                status,
                error: failure.error,
                message: failure.message,
            },
            Err(_) => ClientError::Api {
                status,
                error: body.trim().to_string(),
                message: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_failures_keep_server_wording() {
        let err = ClientError::from_body(404, r#"{"error":"Team not found"}"#);
        match err {
            ClientError::Api {
                status,
                error,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(error, "Team not found");
                assert!(message.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = ClientError::from_body(502, "Bad Gateway\n");
        assert!(matches!(err, ClientError::Api { error, .. } if error == "Bad Gateway"));
    }
}
