//! Shared types and error hierarchy for ocichat.

pub mod chat;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

pub use chat::*;
pub use error::{ChatError, ConfigError};
pub use message::*;
pub use provider::InferenceProvider;
pub use tool::*;
