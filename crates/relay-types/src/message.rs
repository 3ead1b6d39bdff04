use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A chat message as persisted by the store.
///
/// `seq` is the store's insertion sequence. It orders history and lets a
/// connection skip broadcasts it already received as part of its replay; it
/// is not part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub username: String,
    pub message: String,
    #[serde(skip)]
    pub seq: i64,
}

/// A chat message as submitted by a client, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("username must not be blank".into());
        return Err(err);
    }
    Ok(())
}
