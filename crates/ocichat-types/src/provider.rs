//! Provider trait for chat inference backends.

use crate::{ChatDetails, ChatError, CohereChatResponse};
use std::future::Future;
use std::pin::Pin;

/// A boxed future resolving to one chat response.
pub type ChatFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CohereChatResponse, ChatError>> + Send + 'a>>;

/// Trait for chat inference backends.
///
/// The turn engine only sees this seam, so tests can drive it with a stub
/// model. Dyn-compatible so the session works with `Box<dyn InferenceProvider>`.
pub trait InferenceProvider: Send + Sync {
    /// Send one chat request and wait for the complete response.
    ///
    /// The call suspends until the response or a transport error arrives;
    /// there is no streaming and no retry at this seam.
    fn chat<'a>(&'a self, request: &'a ChatDetails) -> ChatFuture<'a>;

    /// Provider name for logging/display (e.g., "oci-genai").
    fn name(&self) -> &str;
}
