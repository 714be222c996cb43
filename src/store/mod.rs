mod sqlite;
mod unavailable;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Message, Participant};

pub use sqlite::SqliteStore;
pub use unavailable::UnavailableStore;

pub type SharedStore = Arc<dyn ChatStore>;

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_participant(&self, name: &str) -> anyhow::Result<Option<Participant>>;

    /// Inserts the participant and its arrival announcement together, or neither.
    /// Returns `Ok(false)` when the name is already taken.
    async fn join(&self, participant: &Participant, announcement: &Message) -> anyhow::Result<bool>;

    async fn list_participants(&self) -> anyhow::Result<Vec<Participant>>;

    /// Sets `lastStatus` and returns how many participants matched.
    async fn touch_participant(&self, name: &str, now: i64) -> anyhow::Result<u64>;

    /// Participants whose `lastStatus` is older than `cutoff`.
    async fn stale_participants(&self, cutoff: i64) -> anyhow::Result<Vec<Participant>>;

    /// Deletes the named participants in one batch, skipping any that heartbeated at or
    /// after `cutoff` since the scan. Returns the names actually removed.
    async fn remove_participants(&self, names: &[String], cutoff: i64) -> anyhow::Result<Vec<String>>;

    async fn insert_message(&self, message: &Message) -> anyhow::Result<()>;

    async fn insert_messages(&self, messages: &[Message]) -> anyhow::Result<()>;

    /// Messages sent by `user`, addressed to `user`, or broadcast; newest first.
    async fn list_messages(&self, user: Option<&str>, limit: Option<i64>) -> anyhow::Result<Vec<Message>>;
}
