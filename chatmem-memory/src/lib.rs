//! chatmem memory - Short-term conversational memory.
//!
//! Recent messages of each conversation are kept in an ordered list store
//! (Redis in production) and rendered into the next prompt:
//!
//! ```text
//! user text ──► MessageMemoryHandler ──► render_history(session) ──► prompt
//!                     │                                             │
//!                     └──── store(session, "[HH:MM] User: ...") ◄───┘
//!                                   │
//!                              ListStore (LPUSH + LTRIM, newest first)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod handler;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod scope;
pub mod short_term;
pub mod store;

pub use error::{MemoryError, MemoryResult};
pub use handler::{MessageMemoryHandler, CURRENT_QUESTION_PREFIX};
#[cfg(feature = "redis-backend")]
pub use redis::RedisListStore;
pub use scope::{ConversationScope, SessionScope, MESSAGE_COUNT_FIELD, SESSION_KEY_FIELD};
pub use short_term::{
    format_record, session_key_at, MessageRole, ShortTermMemory, HISTORY_FOOTER, HISTORY_HEADER,
};
pub use store::{InMemoryListStore, ListStore};
