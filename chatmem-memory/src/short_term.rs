//! Short-term session memory.
//!
//! Keeps the most recent `max_messages` records of each conversation in a
//! [`ListStore`] and renders the newest `display_window` of them as a framed
//! history block for the next prompt.

use std::fmt;
use std::sync::Arc;

use chatmem_common::{MemoryConfig, Validate};
use chrono::{DateTime, Local, TimeZone};

use crate::error::{MemoryError, MemoryResult};
use crate::scope::{ConversationScope, MESSAGE_COUNT_FIELD, SESSION_KEY_FIELD};
use crate::store::ListStore;

/// First line of a rendered history block.
pub const HISTORY_HEADER: &str = "=== CONVERSATION HISTORY ===";

/// Last line of a rendered history block.
pub const HISTORY_FOOTER: &str = "=== END HISTORY ===";

/// Author of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// End user
    User,
    /// Assistant reply
    Bot,
    /// Errors and other system notes
    System,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
            Self::System => "System",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a record as `[HH:MM] Role: content`.
pub fn format_record<Tz: TimeZone>(role: MessageRole, content: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("[{}] {role}: {content}", at.format("%H:%M"))
}

/// Build a session key `user_<8 hex>_<YYYYMMDD_HHMM>` for the given instant.
pub fn session_key_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("user_{}_{}", &id[..8], at.format("%Y%m%d_%H%M"))
}

/// Bounded per-session message history.
pub struct ShortTermMemory {
    store: Arc<dyn ListStore>,
    max_messages: usize,
    display_window: usize,
}

impl ShortTermMemory {
    /// Create a memory over `store` with validated window sizes.
    pub fn new(store: Arc<dyn ListStore>, config: &MemoryConfig) -> MemoryResult<Self> {
        config
            .validate()
            .map_err(|e| MemoryError::Config(e.to_string()))?;

        Ok(Self {
            store,
            max_messages: config.max_messages,
            display_window: config.display_window,
        })
    }

    /// Create a memory with the default windows (15 retained, 8 displayed).
    pub fn with_defaults(store: Arc<dyn ListStore>) -> Self {
        let config = MemoryConfig::default();
        Self {
            store,
            max_messages: config.max_messages,
            display_window: config.display_window,
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn display_window(&self) -> usize {
        self.display_window
    }

    /// Backing store.
    pub fn list_store(&self) -> &Arc<dyn ListStore> {
        &self.store
    }

    /// Prepend `message` to the session and drop everything past the
    /// retention window.
    pub async fn store(&self, key: &str, message: &str) -> MemoryResult<()> {
        let len = self
            .store
            .push_bounded(key, message, self.max_messages)
            .await?;

        tracing::debug!(
            key = key,
            len,
            message = %chatmem_common::util::truncate_with_ellipsis(message, 80),
            "Stored session message"
        );
        Ok(())
    }

    /// All retained records, most recent first. Empty when the session is unknown.
    pub async fn retrieve(&self, key: &str) -> MemoryResult<Vec<String>> {
        self.store.range(key, None).await
    }

    /// Drop every record of the session. No-op when the session is unknown.
    pub async fn delete(&self, key: &str) -> MemoryResult<()> {
        let existed = self.store.delete(key).await?;
        tracing::debug!(key = key, existed, "Deleted session messages");
        Ok(())
    }

    /// Return the scope's session key, creating and saving one on first use.
    pub fn get_or_create_session_key(&self, scope: &mut dyn ConversationScope) -> String {
        if let Some(key) = scope.get(SESSION_KEY_FIELD).filter(|k| !k.is_empty()) {
            return key.to_string();
        }

        let key = session_key_at(&Local::now());
        scope.set(SESSION_KEY_FIELD, key.clone());
        tracing::info!(session_key = %key, "Created new session");
        key
    }

    /// Render the newest `display_window` records, oldest first, between the
    /// history header and footer.
    ///
    /// An unknown or empty session renders the framing with an empty body.
    pub async fn render_history(&self, key: &str) -> MemoryResult<String> {
        let history = self.retrieve(key).await?;
        Ok(self.render_records(&history))
    }

    fn render_records(&self, history: &[String]) -> String {
        let mut context = format!("\n{HISTORY_HEADER}\n");
        if history.len() > self.display_window {
            context.push_str(&format!(
                "[Showing last {} messages]\n",
                self.display_window
            ));
        }

        let recent: Vec<&str> = history
            .iter()
            .take(self.display_window)
            .rev()
            .map(String::as_str)
            .collect();
        context.push_str(&recent.join("\n"));
        context.push_str(&format!("\n{HISTORY_FOOTER}\n\n"));
        context
    }

    /// Store a role-tagged record stamped with the current local time.
    pub async fn store_message(
        &self,
        key: &str,
        role: MessageRole,
        content: &str,
    ) -> MemoryResult<()> {
        self.store(key, &format_record(role, content, &Local::now()))
            .await
    }

    /// Increment and return the scope's message counter.
    pub fn update_message_count(&self, scope: &mut dyn ConversationScope) -> u64 {
        let count = scope
            .get(MESSAGE_COUNT_FIELD)
            .and_then(|c| c.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        scope.set(MESSAGE_COUNT_FIELD, count.to_string());
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SessionScope;
    use crate::store::InMemoryListStore;
    use chrono::NaiveDate;

    fn memory(max_messages: usize, display_window: usize) -> ShortTermMemory {
        ShortTermMemory::new(
            Arc::new(InMemoryListStore::new()),
            &MemoryConfig {
                max_messages,
                display_window,
            },
        )
        .unwrap()
    }

    #[test]
    fn session_key_format() {
        let at = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 7, 14)
                    .unwrap()
                    .and_hms_opt(9, 5, 0)
                    .unwrap(),
            )
            .unwrap();
        let key = session_key_at(&at);

        let parts: Vec<&str> = key.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "user");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts[2], "20250714");
        assert_eq!(parts[3], "0905");
    }

    #[test]
    fn record_format() {
        let at = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 1, 2)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(
            format_record(MessageRole::Bot, "hi there", &at),
            "[14:30] Bot: hi there"
        );
    }

    #[test]
    fn invalid_windows_rejected() {
        let result = ShortTermMemory::new(
            Arc::new(InMemoryListStore::new()),
            &MemoryConfig {
                max_messages: 4,
                display_window: 8,
            },
        );
        assert!(matches!(result, Err(MemoryError::Config(_))));
    }

    #[test]
    fn existing_scope_key_is_reused() {
        let mem = memory(15, 8);
        let mut scope = SessionScope::with_session_key("user_deadbeef_20250101_0000");
        assert_eq!(
            mem.get_or_create_session_key(&mut scope),
            "user_deadbeef_20250101_0000"
        );
    }

    #[test]
    fn message_count_increments() {
        let mem = memory(15, 8);
        let mut scope = SessionScope::new();
        assert_eq!(mem.update_message_count(&mut scope), 1);
        assert_eq!(mem.update_message_count(&mut scope), 2);
        assert_eq!(scope.get(MESSAGE_COUNT_FIELD), Some("2"));
    }

    #[tokio::test]
    async fn render_shows_newest_window_in_chronological_order() {
        let mem = memory(15, 3);
        for i in 1..=5 {
            mem.store("k", &format!("m{i}")).await.unwrap();
        }

        let rendered = mem.render_history("k").await.unwrap();
        assert!(rendered.contains("[Showing last 3 messages]"));
        assert!(rendered.contains("m3\nm4\nm5"));
        assert!(!rendered.contains("m2"));
    }

    #[tokio::test]
    async fn render_without_overflow_note() {
        let mem = memory(15, 8);
        mem.store("k", "only").await.unwrap();

        let rendered = mem.render_history("k").await.unwrap();
        assert!(!rendered.contains("[Showing last"));
        assert_eq!(
            rendered,
            format!("\n{HISTORY_HEADER}\nonly\n{HISTORY_FOOTER}\n\n")
        );
    }

    #[tokio::test]
    async fn store_message_tags_role() {
        let mem = memory(15, 8);
        mem.store_message("k", MessageRole::System, "Error - boom")
            .await
            .unwrap();

        let records = mem.retrieve("k").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].starts_with('['));
        assert!(records[0].ends_with("] System: Error - boom"));
    }
}
