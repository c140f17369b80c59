//! Frame Codec
//!
//! JSON encoding and decoding of leaderboard frames. Every frame is a single
//! JSON object carrying a `type` discriminator.

use crate::messages::ScoreMessage;

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame carried a `type` this codec does not know.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// Frame had no `type` field.
    #[error("message has no type field")]
    MissingType,

    /// Frame was not a JSON object.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),
}

/// JSON codec for leaderboard frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encode a message into a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self, message: &ScoreMessage) -> Result<String, CodecError> {
        Ok(serde_json::to_string(message)?)
    }

    /// Decode a text frame into a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a JSON object, has no `type`,
    /// names an unknown type, or does not match the message shape.
    pub fn decode(&self, text: &str) -> Result<ScoreMessage, CodecError> {
        let value: serde_json::Value = serde_json::from_str(text.trim())?;

        let Some(object) = value.as_object() else {
            return Err(CodecError::InvalidFormat(format!(
                "expected JSON object, got: {}",
                json_kind(&value)
            )));
        };

        match object.get("type").and_then(serde_json::Value::as_str) {
            Some("snapshot" | "score_update") => Ok(serde_json::from_value(value)?),
            Some(other) => Err(CodecError::UnknownMessageType(other.to_string())),
            None => Err(CodecError::MissingType),
        }
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
