//! Memory handler facade used by the chat loop.
//!
//! One call per user turn builds the contextualized prompt; two recorder calls
//! feed the assistant reply or a failure back into the same session.

use std::fmt::Display;

use crate::error::MemoryResult;
use crate::scope::ConversationScope;
use crate::short_term::{MessageRole, ShortTermMemory};

/// Prefix of the line carrying the user's current message.
pub const CURRENT_QUESTION_PREFIX: &str = "CURRENT QUESTION: ";

/// Handles memory only; no model calls happen here.
pub struct MessageMemoryHandler {
    memory: ShortTermMemory,
}

impl MessageMemoryHandler {
    pub fn new(memory: ShortTermMemory) -> Self {
        Self { memory }
    }

    /// Underlying session memory.
    pub fn memory(&self) -> &ShortTermMemory {
        &self.memory
    }

    /// Build the prompt for this turn: rendered history followed by
    /// `CURRENT QUESTION: <user_text>`.
    ///
    /// The user turn is stored only after the history has been rendered, so it
    /// shows up in the history of the next turn and never twice in this one.
    /// The scope's message count moves only once that store succeeds.
    pub async fn prepare_contextual_message(
        &self,
        scope: &mut dyn ConversationScope,
        user_text: &str,
    ) -> MemoryResult<String> {
        let session_key = self.memory.get_or_create_session_key(scope);

        let context = self.memory.render_history(&session_key).await?;
        let full_message = format!("{context}{CURRENT_QUESTION_PREFIX}{user_text}");

        self.memory
            .store_message(&session_key, MessageRole::User, user_text)
            .await?;
        let count = self.memory.update_message_count(scope);

        tracing::debug!(
            session_key = %session_key,
            message_count = count,
            "Prepared contextual message"
        );
        Ok(full_message)
    }

    /// Store the assistant's reply in the conversation's session.
    pub async fn record_assistant_reply(
        &self,
        scope: &mut dyn ConversationScope,
        reply: &str,
    ) -> MemoryResult<()> {
        let session_key = self.memory.get_or_create_session_key(scope);
        self.memory
            .store_message(&session_key, MessageRole::Bot, reply)
            .await
    }

    /// Store a textual form of `error` for later debugging.
    ///
    /// Never fails: a store error here is logged and dropped so the caller's
    /// own error path stays intact.
    pub async fn record_failure(&self, scope: &mut dyn ConversationScope, error: &dyn Display) {
        let session_key = self.memory.get_or_create_session_key(scope);
        let content = format!("Error - {error}");

        if let Err(e) = self
            .memory
            .store_message(&session_key, MessageRole::System, &content)
            .await
        {
            tracing::warn!(
                session_key = %session_key,
                error = %e,
                "Failed to record failure in session memory"
            );
        }
    }

    /// Manually clear the conversation's stored history.
    pub async fn clear_session(&self, scope: &mut dyn ConversationScope) -> MemoryResult<()> {
        let session_key = self.memory.get_or_create_session_key(scope);
        self.memory.delete(&session_key).await
    }
}
