//! `SQLite` implementation of the inbox ports ([`InboxSink`] and [`InboxRepository`]).

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use cronpilot_app::ports::{InboxRepository, InboxSink};
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::id::ChatId;
use cronpilot_domain::inbox::{INBOX_DESTINATION, InboxChat, InboxEntry, InboxMessage};

use crate::error::StorageError;
use crate::row;

struct ChatRow(InboxChat);

impl<'r> FromRow<'r, SqliteRow> for ChatRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let automation_id: Option<String> = row.try_get("automation_id")?;
        let execution_id: Option<String> = row.try_get("execution_id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(InboxChat {
            id: row::decode_parsed(&id)?,
            title: row.try_get("title")?,
            destination: row.try_get("destination")?,
            automation_id: automation_id
                .as_deref()
                .map(row::decode_parsed)
                .transpose()?,
            execution_id: execution_id
                .as_deref()
                .map(row::decode_parsed)
                .transpose()?,
            created_at: row::decode_ts(&created_at)?,
        }))
    }
}

struct MessageRow(InboxMessage);

impl<'r> FromRow<'r, SqliteRow> for MessageRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let chat_id: String = row.try_get("chat_id")?;
        let role: String = row.try_get("role")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(InboxMessage {
            id: row::decode_parsed(&id)?,
            chat_id: row::decode_parsed(&chat_id)?,
            role: row::decode_parsed(&role)?,
            content: row.try_get("content")?,
            created_at: row::decode_ts(&created_at)?,
        }))
    }
}

const INSERT_CHAT: &str = r"
    INSERT INTO inbox_chats (id, title, destination, automation_id, execution_id, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";
const INSERT_MESSAGE: &str = r"
    INSERT INTO inbox_messages (id, chat_id, role, content, created_at)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_CHATS: &str = r"
    SELECT * FROM inbox_chats
    WHERE destination = ?
    ORDER BY created_at DESC, rowid DESC
    LIMIT ?
";
const SELECT_CHAT: &str = "SELECT * FROM inbox_chats WHERE id = ?";
const SELECT_MESSAGES: &str =
    "SELECT * FROM inbox_messages WHERE chat_id = ? ORDER BY created_at, rowid";

/// `SQLite`-backed inbox.
#[derive(Clone)]
pub struct SqliteInbox {
    pool: SqlitePool,
}

impl SqliteInbox {
    /// Create a new inbox backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl InboxSink for SqliteInbox {
    async fn create_entry(&self, entry: InboxEntry) -> Result<ChatId, CronpilotError> {
        let (chat, message) = entry.into_records();

        // Chat and message land together or not at all.
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        sqlx::query(INSERT_CHAT)
            .bind(chat.id.to_string())
            .bind(&chat.title)
            .bind(&chat.destination)
            .bind(chat.automation_id.map(|id| id.to_string()))
            .bind(chat.execution_id.map(|id| id.to_string()))
            .bind(row::encode_ts(chat.created_at))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        sqlx::query(INSERT_MESSAGE)
            .bind(message.id.to_string())
            .bind(message.chat_id.to_string())
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(row::encode_ts(message.created_at))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(chat.id)
    }
}

impl InboxRepository for SqliteInbox {
    async fn list_chats(&self, limit: usize) -> Result<Vec<InboxChat>, CronpilotError> {
        let rows: Vec<ChatRow> = sqlx::query_as(SELECT_CHATS)
            .bind(INBOX_DESTINATION)
            .bind(row::encode_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn get_chat(&self, id: ChatId) -> Result<Option<InboxChat>, CronpilotError> {
        let row: Option<ChatRow> = sqlx::query_as(SELECT_CHAT)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| r.0))
    }

    async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<InboxMessage>, CronpilotError> {
        let rows: Vec<MessageRow> = sqlx::query_as(SELECT_MESSAGES)
            .bind(chat_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
