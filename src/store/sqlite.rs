use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    QueryBuilder, Sqlite, SqlitePool,
};

use crate::models::{Message, Participant, BROADCAST};

use super::ChatStore;

type MessageRow = (String, String, String, String, String);

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `database_url`, creating the file if needed, and applies migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database. Pinned to one connection that never expires, since
    /// every new SQLite memory connection starts empty.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Seeds a participant without the join announcement.
    #[cfg(test)]
    pub(crate) async fn insert_participant(&self, participant: &Participant) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO participants (name,last_status) VALUES (?,?)")
            .bind(&participant.name)
            .bind(participant.last_status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn message_from_row((from, to, text, kind, time): MessageRow) -> anyhow::Result<Message> {
    Ok(Message { from, to, text, kind: kind.parse()?, time })
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn find_participant(&self, name: &str) -> anyhow::Result<Option<Participant>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name,last_status FROM participants WHERE name=?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(name, last_status)| Participant { name, last_status }))
    }

    async fn join(&self, participant: &Participant, announcement: &Message) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO participants (name,last_status) VALUES (?,?)")
            .bind(&participant.name)
            .bind(participant.last_status)
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => {}
            // dropping the transaction rolls it back
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => return Ok(false),
            Err(err) => return Err(err.into()),
        }

        sqlx::query("INSERT INTO messages (sender,recipient,text,kind,time) VALUES (?,?,?,?,?)")
            .bind(&announcement.from)
            .bind(&announcement.to)
            .bind(&announcement.text)
            .bind(announcement.kind.as_str())
            .bind(&announcement.time)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn list_participants(&self) -> anyhow::Result<Vec<Participant>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name,last_status FROM participants ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(name, last_status)| Participant { name, last_status })
            .collect())
    }

    async fn touch_participant(&self, name: &str, now: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("UPDATE participants SET last_status=? WHERE name=?")
            .bind(now)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn stale_participants(&self, cutoff: i64) -> anyhow::Result<Vec<Participant>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name,last_status FROM participants WHERE last_status<?")
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(name, last_status)| Participant { name, last_status })
            .collect())
    }

    async fn remove_participants(&self, names: &[String], cutoff: i64) -> anyhow::Result<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM participants WHERE last_status<");
        query.push_bind(cutoff);
        query.push(" AND name IN (");
        let mut list = query.separated(",");
        for name in names {
            list.push_bind(name.clone());
        }
        list.push_unseparated(") RETURNING name");

        let removed: Vec<(String,)> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(removed.into_iter().map(|(name,)| name).collect())
    }

    async fn insert_message(&self, message: &Message) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO messages (sender,recipient,text,kind,time) VALUES (?,?,?,?,?)")
            .bind(&message.from)
            .bind(&message.to)
            .bind(&message.text)
            .bind(message.kind.as_str())
            .bind(&message.time)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_messages(&self, messages: &[Message]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for message in messages {
            sqlx::query("INSERT INTO messages (sender,recipient,text,kind,time) VALUES (?,?,?,?,?)")
                .bind(&message.from)
                .bind(&message.to)
                .bind(&message.text)
                .bind(message.kind.as_str())
                .bind(&message.time)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn list_messages(&self, user: Option<&str>, limit: Option<i64>) -> anyhow::Result<Vec<Message>> {
        // LIMIT -1 is unbounded in SQLite
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT sender,recipient,text,kind,time FROM messages \
             WHERE sender=?1 OR recipient=?1 OR recipient=?2 \
             ORDER BY id DESC LIMIT ?3",
        )
        .bind(user)
        .bind(BROADCAST)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(message_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageType;

    fn participant(name: &str, last_status: i64) -> Participant {
        Participant { name: name.to_owned(), last_status }
    }

    fn message(from: &str, to: &str, text: &str) -> Message {
        Message {
            from: from.to_owned(),
            to: to.to_owned(),
            text: text.to_owned(),
            kind: if to == BROADCAST { MessageType::Message } else { MessageType::PrivateMessage },
            time: "12:00:00".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_join_is_rejected_by_constraint() {
        let store = SqliteStore::in_memory().await.unwrap();

        assert!(store.join(&participant("Alice", 1), &Message::joined("Alice")).await.unwrap());
        assert!(!store.join(&participant("Alice", 2), &Message::joined("Alice")).await.unwrap());

        let all = store.list_participants().await.unwrap();
        assert_eq!(all, vec![participant("Alice", 1)]);

        // the rejected join leaves no second announcement behind
        let announcements = store.list_messages(Some("Alice"), None).await.unwrap();
        assert_eq!(announcements.len(), 1);
        assert_eq!(announcements[0].kind, MessageType::Status);
    }

    #[tokio::test]
    async fn test_join_rolls_back_when_announcement_fails() {
        let store = SqliteStore::in_memory().await.unwrap();
        sqlx::query("DROP TABLE messages").execute(&store.pool).await.unwrap();

        assert!(store.join(&participant("Alice", 1), &Message::joined("Alice")).await.is_err());
        assert!(store.find_participant("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_touch_reports_matches() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_participant(&participant("Alice", 1)).await.unwrap();

        assert_eq!(store.touch_participant("Alice", 99).await.unwrap(), 1);
        assert_eq!(store.touch_participant("Nobody", 99).await.unwrap(), 0);
        assert_eq!(
            store.find_participant("Alice").await.unwrap(),
            Some(participant("Alice", 99))
        );
    }

    #[tokio::test]
    async fn test_stale_scan_and_removal() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_participant(&participant("Old", 100)).await.unwrap();
        store.insert_participant(&participant("Fresh", 500)).await.unwrap();

        let stale = store.stale_participants(300).await.unwrap();
        assert_eq!(stale, vec![participant("Old", 100)]);

        let removed = store.remove_participants(&["Old".to_owned()], 300).await.unwrap();
        assert_eq!(removed, vec!["Old".to_owned()]);
        assert_eq!(store.list_participants().await.unwrap(), vec![participant("Fresh", 500)]);
    }

    #[tokio::test]
    async fn test_removal_skips_participants_that_heartbeated() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_participant(&participant("Alice", 100)).await.unwrap();
        let names: Vec<String> = store
            .stale_participants(300)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        store.touch_participant("Alice", 400).await.unwrap();

        assert!(store.remove_participants(&names, 300).await.unwrap().is_empty());
        assert!(store.find_participant("Alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_messages_visibility_and_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_message(&message("Bob", BROADCAST, "hi all")).await.unwrap();
        store.insert_message(&message("Bob", "Carol", "secret")).await.unwrap();
        store.insert_message(&message("Carol", "Alice", "for alice")).await.unwrap();
        store.insert_message(&message("Alice", "Bob", "from alice")).await.unwrap();

        let texts: Vec<String> = store
            .list_messages(Some("Alice"), None)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["from alice", "for alice", "hi all"]);

        let limited = store.list_messages(Some("Alice"), Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].text, "from alice");

        let anonymous = store.list_messages(None, None).await.unwrap();
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].text, "hi all");
    }

    #[tokio::test]
    async fn test_insert_messages_batch() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_messages(&[Message::left("A"), Message::left("B")])
            .await
            .unwrap();

        let all = store.list_messages(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|m| m.kind == MessageType::Status));
    }
}
