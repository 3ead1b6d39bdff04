//! Domain logic behind the routes: the template file store and the chat hub.

pub mod chat;
pub mod template;

pub use chat::{ChatHub, Subscription};
pub use template::{TemplateError, TemplateStore};
