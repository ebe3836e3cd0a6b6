//! Response handling and HTTP error type.

use reqwest::Response;
use serde::de::DeserializeOwned;

/// Longest error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Errors from outbound HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to create HTTP client: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Check the status and decode a JSON body.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let mut body = String::from_utf8_lossy(&bytes).into_owned();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(HttpError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode(e.to_string()))
}
