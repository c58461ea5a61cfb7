//! Message codec: typed game messages to and from opaque payload bytes.
//!
//! Messages are plain serde types owned by callers; the wire representation is
//! JSON. Anything beyond "structured bytes" belongs to the transport.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, Result};

/// Encode an outgoing message into payload bytes.
pub fn encode<M: Serialize>(message: &M) -> Result<Vec<u8>> {
    serde_json::to_vec(message).map_err(|e| ApiError::Encode(e.to_string()))
}

/// Decode a response payload into the expected message type.
pub fn decode<M: DeserializeOwned>(payload: &[u8]) -> Result<M> {
    serde_json::from_slice(payload).map_err(|e| ApiError::Decode(e.to_string()))
}
