//! JSON encoding and decoding of request and response payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, WebParkError};

/// Serialize `value` to a JSON byte payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| WebParkError::Encode(e.to_string()))
}

/// Deserialize a JSON byte payload into `T`.
///
/// An empty payload is a decode failure, never a default value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.is_empty() {
        return Err(WebParkError::Decode("empty response body".to_string()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        warn!(error = %e, "failed to decode response body");
        WebParkError::Decode(e.to_string())
    })
}
