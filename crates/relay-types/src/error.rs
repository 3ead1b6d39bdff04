use thiserror::Error;

/// Errors raised while decoding or validating wire values.
#[derive(Debug, Error)]
pub enum TypesError {
    /// The frame was not valid JSON or did not match any known event.
    #[error("malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// A `newMessage` payload failed field validation.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] validator::ValidationErrors),

    /// A caller-supplied template identifier cannot be used as a file stem.
    #[error("invalid template id '{id}': {reason}")]
    InvalidTemplateId { id: String, reason: &'static str },
}
