//! Shared wire types for the relay.
//!
//! Everything that crosses the realtime channel or names a template file
//! lives here so the server and any Rust client agree on the JSON shape:
//!
//! - [`MessageRecord`] / [`NewMessage`]: chat messages as stored and as submitted.
//! - [`ServerEvent`] / [`ClientEvent`]: `{"event": ..., "data": ...}` frames.
//! - [`TemplateId`]: validated template file stem.

pub mod error;
pub mod event;
pub mod message;
pub mod template;

pub use error::TypesError;
pub use event::{ClientEvent, ServerEvent};
pub use message::{MessageRecord, NewMessage};
pub use template::TemplateId;
