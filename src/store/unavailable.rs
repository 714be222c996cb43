use anyhow::bail;
use async_trait::async_trait;

use crate::models::{Message, Participant};

use super::ChatStore;

/// Stands in for a store that could not be opened at startup. Every call fails with the
/// original connection error, so requests answer 500 while the process keeps serving.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn fail<T>(&self) -> anyhow::Result<T> {
        bail!("store unavailable: {}", self.reason)
    }
}

#[async_trait]
impl ChatStore for UnavailableStore {
    async fn find_participant(&self, _name: &str) -> anyhow::Result<Option<Participant>> {
        self.fail()
    }

    async fn join(&self, _participant: &Participant, _announcement: &Message) -> anyhow::Result<bool> {
        self.fail()
    }

    async fn list_participants(&self) -> anyhow::Result<Vec<Participant>> {
        self.fail()
    }

    async fn touch_participant(&self, _name: &str, _now: i64) -> anyhow::Result<u64> {
        self.fail()
    }

    async fn stale_participants(&self, _cutoff: i64) -> anyhow::Result<Vec<Participant>> {
        self.fail()
    }

    async fn remove_participants(&self, _names: &[String], _cutoff: i64) -> anyhow::Result<Vec<String>> {
        self.fail()
    }

    async fn insert_message(&self, _message: &Message) -> anyhow::Result<()> {
        self.fail()
    }

    async fn insert_messages(&self, _messages: &[Message]) -> anyhow::Result<()> {
        self.fail()
    }

    async fn list_messages(&self, _user: Option<&str>, _limit: Option<i64>) -> anyhow::Result<Vec<Message>> {
        self.fail()
    }
}
