//! Conversation state and orchestration.

mod controller;
mod message;
mod store;

pub use controller::ChatController;
pub use message::{Message, MessageSource, MessageStatus, MessageUpdate, NewMessage, Role};
pub use store::{MessageStore, Subscription, WELCOME_MESSAGE};
