//! Per-conversation key/value scope.
//!
//! The hosting chat surface owns one scope per open conversation and passes it
//! explicitly into every memory call.

use std::collections::HashMap;

/// Scope field holding the resolved session key.
pub const SESSION_KEY_FIELD: &str = "session_key";

/// Scope field holding the number of prepared user messages.
pub const MESSAGE_COUNT_FIELD: &str = "message_count";

/// Key/value bag that lives as long as one conversation.
pub trait ConversationScope: Send {
    /// Read a value; `None` when unset.
    fn get(&self, name: &str) -> Option<&str>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, name: &str, value: String);

    /// Remove a value.
    fn remove(&mut self, name: &str) -> Option<String>;
}

/// In-process conversation scope.
#[derive(Debug, Clone, Default)]
pub struct SessionScope {
    values: HashMap<String, String>,
}

impl SessionScope {
    /// Create an empty scope (a fresh conversation).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope already bound to an existing session key, e.g. when a
    /// caller resumes a conversation it persisted elsewhere.
    pub fn with_session_key(key: impl Into<String>) -> Self {
        let mut scope = Self::new();
        scope.set(SESSION_KEY_FIELD, key.into());
        scope
    }
}

impl ConversationScope for SessionScope {
    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn set(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }

    fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_remove() {
        let mut scope = SessionScope::new();
        assert!(scope.get("x").is_none());
        scope.set("x", "1".into());
        assert_eq!(scope.get("x"), Some("1"));
        scope.set("x", "2".into());
        assert_eq!(scope.get("x"), Some("2"));
        assert_eq!(scope.remove("x").as_deref(), Some("2"));
        assert!(scope.get("x").is_none());
    }

    #[test]
    fn with_session_key_binds_key() {
        let scope = SessionScope::with_session_key("user_abc");
        assert_eq!(scope.get(SESSION_KEY_FIELD), Some("user_abc"));
    }
}
