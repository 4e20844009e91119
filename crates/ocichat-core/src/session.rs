//! Session loop state and lifecycle.
//!
//! A session owns the tool-server connection, the catalog snapshot, the
//! model handle, and the append-only conversation history. It processes one
//! input line at a time until the exit sentinel, and the connection is
//! closed exactly once on every exit path.

use crate::catalog::fetch_catalog;
use crate::error::CoreError;
use crate::turn::run_turn;
use ocichat_mcp::{McpClient, ServerLocator};
use ocichat_types::{ChatSettings, ConversationMessage, InferenceProvider, ToolCatalog};

/// What the loop should do after handling one input line.
#[derive(Debug)]
pub enum SessionControl {
    /// Print the transcript and prompt again.
    Reply(String),
    /// The turn failed; report it and prompt again.
    TurnFailed(CoreError),
    /// Exit sentinel seen; terminate the session.
    Quit,
}

/// One interactive chat session against one tool server.
pub struct ChatSession {
    model: Box<dyn InferenceProvider>,
    mcp: McpClient,
    settings: ChatSettings,
    catalog: ToolCatalog,
    history: Vec<ConversationMessage>,
}

impl ChatSession {
    /// Connect to the tool server and build the session catalog.
    ///
    /// Failures here are fatal to the session. If the catalog fetch fails
    /// after the connection opened, the connection is closed before the
    /// error is returned, so teardown still happens exactly once.
    pub async fn connect(
        locator: &ServerLocator,
        timeout_ms: u64,
        model: Box<dyn InferenceProvider>,
        settings: ChatSettings,
    ) -> Result<Self, CoreError> {
        let mcp = McpClient::connect(locator, timeout_ms).await?;

        let catalog = match fetch_catalog(&mcp).await {
            Ok(catalog) => catalog,
            Err(e) => {
                mcp.shutdown().await;
                return Err(e);
            }
        };

        Ok(Self {
            model,
            mcp,
            settings,
            catalog,
            history: Vec::new(),
        })
    }

    /// The session's immutable catalog snapshot.
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// The conversation history accumulated so far.
    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// Handle one line of user input.
    ///
    /// The exit sentinel terminates without invoking the turn engine.
    /// Per-query failures are reported and the session stays alive; only
    /// setup failures end the process.
    pub async fn handle_line(&mut self, line: &str) -> SessionControl {
        let query = line.trim();
        if is_exit_command(query) {
            return SessionControl::Quit;
        }

        match run_turn(
            query,
            self.model.as_ref(),
            &self.mcp,
            &self.settings,
            &self.catalog,
            &mut self.history,
        )
        .await
        {
            Ok(transcript) => SessionControl::Reply(transcript),
            Err(e) => SessionControl::TurnFailed(e),
        }
    }

    /// Close the tool-server connection. Consumes the session, so teardown
    /// cannot run twice.
    pub async fn shutdown(self) {
        self.mcp.shutdown().await;
    }
}

/// True when the trimmed line equals the exit sentinel, case-insensitively.
pub fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_sentinel_is_case_insensitive() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("Quit"));
        assert!(is_exit_command("qUiT"));
    }

    #[test]
    fn non_sentinel_lines_do_not_exit() {
        assert!(!is_exit_command("quit now"));
        assert!(!is_exit_command("exit"));
        assert!(!is_exit_command(""));
        assert!(!is_exit_command("quitter"));
    }
}
