//! `SQLite` implementation of [`ExecutionRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use cronpilot_app::ports::ExecutionRepository;
use cronpilot_domain::error::{CronpilotError, ValidationError};
use cronpilot_domain::execution::{Execution, ExecutionPatch};
use cronpilot_domain::id::{AutomationId, ExecutionId};

use crate::error::StorageError;
use crate::row;

struct Wrapper(Execution);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Execution> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let automation_id: String = row.try_get("automation_id")?;
        let triggered_by: String = row.try_get("triggered_by")?;
        let trigger_data: String = row.try_get("trigger_data")?;
        let status: String = row.try_get("status")?;
        let result: Option<String> = row.try_get("result")?;
        let started_at: String = row.try_get("started_at")?;
        let completed_at: Option<String> = row.try_get("completed_at")?;
        let inbox_chat_id: Option<String> = row.try_get("inbox_chat_id")?;

        Ok(Self(Execution {
            id: row::decode_parsed(&id)?,
            automation_id: row::decode_parsed(&automation_id)?,
            triggered_by: row::decode_parsed(&triggered_by)?,
            trigger_data: row::decode_json(&trigger_data)?,
            status: row::decode_parsed(&status)?,
            result: result.as_deref().map(row::decode_json).transpose()?,
            error_message: row.try_get("error_message")?,
            started_at: row::decode_ts(&started_at)?,
            completed_at: row::decode_opt_ts(completed_at)?,
            duration_ms: row.try_get("duration_ms")?,
            inbox_chat_id: inbox_chat_id
                .as_deref()
                .map(row::decode_parsed)
                .transpose()?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO executions (
        id, automation_id, triggered_by, trigger_data, status, result, error_message,
        started_at, completed_at, duration_ms, inbox_chat_id
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

// One statement per patch: absent fields keep their value, and a status is
// only written while the row is still running.
const PATCH: &str = r"
    UPDATE executions
    SET status = COALESCE(?1, status),
        result = COALESCE(?2, result),
        error_message = COALESCE(?3, error_message),
        completed_at = COALESCE(?4, completed_at),
        duration_ms = COALESCE(?5, duration_ms),
        inbox_chat_id = COALESCE(?6, inbox_chat_id)
    WHERE id = ?7 AND (?1 IS NULL OR status = 'running')
    RETURNING *
";

const SELECT_BY_ID: &str = "SELECT * FROM executions WHERE id = ?";
const SELECT_BY_AUTOMATION: &str = r"
    SELECT * FROM executions
    WHERE automation_id = ?
    ORDER BY started_at DESC, rowid DESC
    LIMIT ?
";
const SELECT_RECENT: &str =
    "SELECT * FROM executions ORDER BY started_at DESC, rowid DESC LIMIT ?";

/// `SQLite`-backed execution history.
#[derive(Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: ExecutionId) -> Result<Option<Execution>, StorageError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(Wrapper::maybe(row))
    }
}

fn encode_json(value: Option<&serde_json::Value>) -> Result<Option<String>, StorageError> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

impl ExecutionRepository for SqliteExecutionRepository {
    async fn create(&self, execution: Execution) -> Result<Execution, CronpilotError> {
        let trigger_data =
            serde_json::to_string(&execution.trigger_data).map_err(StorageError::from)?;
        let result = encode_json(execution.result.as_ref())?;

        sqlx::query(INSERT)
            .bind(execution.id.to_string())
            .bind(execution.automation_id.to_string())
            .bind(execution.triggered_by.as_str())
            .bind(&trigger_data)
            .bind(execution.status.as_str())
            .bind(&result)
            .bind(&execution.error_message)
            .bind(row::encode_ts(execution.started_at))
            .bind(execution.completed_at.map(row::encode_ts))
            .bind(execution.duration_ms)
            .bind(execution.inbox_chat_id.map(|id| id.to_string()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(execution)
    }

    async fn get_by_id(&self, id: ExecutionId) -> Result<Option<Execution>, CronpilotError> {
        Ok(self.fetch(id).await?)
    }

    async fn update(
        &self,
        id: ExecutionId,
        patch: ExecutionPatch,
    ) -> Result<Execution, CronpilotError> {
        let result = encode_json(patch.result.as_ref())?;

        let row: Option<Wrapper> = sqlx::query_as(PATCH)
            .bind(patch.status.map(|status| status.as_str()))
            .bind(&result)
            .bind(&patch.error_message)
            .bind(patch.completed_at.map(row::encode_ts))
            .bind(patch.duration_ms)
            .bind(patch.inbox_chat_id.map(|chat_id| chat_id.to_string()))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if let Some(Wrapper(execution)) = row {
            return Ok(execution);
        }
        // Nothing matched: either the row is missing or it is already final.
        match self.fetch(id).await? {
            Some(_) => Err(ValidationError::ExecutionAlreadyFinished(id.to_string()).into()),
            None => Err(id.not_found().into()),
        }
    }

    async fn list_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> Result<Vec<Execution>, CronpilotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_AUTOMATION)
            .bind(automation_id.to_string())
            .bind(row::encode_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Execution>, CronpilotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(row::encode_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
