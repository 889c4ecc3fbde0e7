use {
    async_trait::async_trait,
    parlo_core::{ConversationMessage, Error, HistoryStore, MessageRole, Result},
    sqlx::SqlitePool,
};

type MessageRow = (i64, String, String, String, i64, Option<String>, Option<String>);

/// SQLite-backed history store.
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the conversation_messages table schema.
    ///
    /// Called once at startup; safe to call again on an existing database.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS conversation_messages (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id             TEXT    NOT NULL,
                role                TEXT    NOT NULL,
                content             TEXT    NOT NULL,
                timestamp           INTEGER NOT NULL,
                external_message_id TEXT,
                delivery_status     TEXT
            )",
        )
        .execute(pool)
        .await
        .map_err(|e| Error::external("create conversation_messages table", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_messages_user_timestamp
             ON conversation_messages (user_id, timestamp)",
        )
        .execute(pool)
        .await
        .map_err(|e| Error::external("create conversation_messages index", e))?;

        Ok(())
    }
}

fn row_to_message(row: MessageRow) -> Result<ConversationMessage> {
    Ok(ConversationMessage {
        id: row.0,
        user_id: row.1,
        role: MessageRole::try_from(row.2.as_str())?,
        content: row.3,
        timestamp: row.4,
        external_message_id: row.5,
        delivery_status: row.6,
    })
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, message: ConversationMessage) -> Result<ConversationMessage> {
        let result = sqlx::query(
            "INSERT INTO conversation_messages
             (user_id, role, content, timestamp, external_message_id, delivery_status)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.user_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.timestamp)
        .bind(&message.external_message_id)
        .bind(&message.delivery_status)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::external("append conversation message", e))?;

        let mut stored = message;
        stored.id = result.last_insert_rowid();
        Ok(stored)
    }

    async fn append_many(&self, messages: Vec<ConversationMessage>) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::external("begin bulk append", e))?;

        for message in &messages {
            sqlx::query(
                "INSERT INTO conversation_messages
                 (user_id, role, content, timestamp, external_message_id, delivery_status)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&message.user_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.timestamp)
            .bind(&message.external_message_id)
            .bind(&message.delivery_status)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::external("bulk append conversation message", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::external("commit bulk append", e))?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str, limit: u32) -> Result<Vec<ConversationMessage>> {
        // Newest `limit` rows, then reversed so callers see oldest-first.
        let mut rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, user_id, role, content, timestamp, external_message_id, delivery_status
             FROM conversation_messages
             WHERE user_id = ?
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::external("list conversation messages", e))?;

        rows.reverse();
        Ok(rows
            .into_iter()
            .filter_map(|row| match row_to_message(row) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("skipping malformed history row: {e}");
                    None
                },
            })
            .collect())
    }

    async fn update_status_by_external_id(
        &self,
        external_message_id: &str,
        status: &str,
    ) -> Result<Option<ConversationMessage>> {
        let result = sqlx::query(
            "UPDATE conversation_messages
             SET delivery_status = ?
             WHERE external_message_id = ?",
        )
        .bind(status)
        .bind(external_message_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::external("update delivery status", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, user_id, role, content, timestamp, external_message_id, delivery_status
             FROM conversation_messages
             WHERE external_message_id = ?
             LIMIT 1",
        )
        .bind(external_message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::external("load updated message", e))?;

        row.map(row_to_message).transpose()
    }

    async fn last_user_message(&self, user_id: &str) -> Result<Option<ConversationMessage>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, user_id, role, content, timestamp, external_message_id, delivery_status
             FROM conversation_messages
             WHERE user_id = ? AND role = 'user'
             ORDER BY timestamp DESC, id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::external("load last user message", e))?;

        row.map(row_to_message).transpose()
    }
}
