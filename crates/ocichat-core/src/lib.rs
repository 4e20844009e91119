//! The tool-orchestration loop for ocichat.
//!
//! Connects a chat model to one tool server: the catalog adapter translates
//! the server's tool schemas into the model's tool-definition shape, the turn
//! engine drives one query/response/tool-call/tool-result cycle, and the
//! session loop reads user input until the exit sentinel.

pub mod catalog;
pub mod error;
pub mod session;
pub mod turn;

pub use catalog::{convert_tool, fetch_catalog};
pub use error::CoreError;
pub use session::{ChatSession, SessionControl, is_exit_command};
pub use turn::run_turn;
