//! `SQLite` implementation of [`AutomationRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use cronpilot_app::ports::AutomationRepository;
use cronpilot_domain::automation::{Automation, RunOutcome, RunRecord};
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::id::AutomationId;

use crate::error::StorageError;
use crate::row;

struct Wrapper(Automation);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Automation> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let triggers: String = row.try_get("triggers")?;
        let agent_settings: String = row.try_get("agent_settings")?;
        let actions: String = row.try_get("actions")?;
        let last_triggered: Option<String> = row.try_get("last_triggered")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Automation {
            id: row::decode_parsed(&id)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            enabled: row.try_get("enabled")?,
            triggers: row::decode_json(&triggers)?,
            agent_prompt: row.try_get("agent_prompt")?,
            agent: row::decode_json(&agent_settings)?,
            actions: row::decode_json(&actions)?,
            last_triggered: row::decode_opt_ts(last_triggered)?,
            total_executions: row::decode_counter(row.try_get("total_executions")?)?,
            successful_executions: row::decode_counter(row.try_get("successful_executions")?)?,
            failed_executions: row::decode_counter(row.try_get("failed_executions")?)?,
            created_at: row::decode_ts(&created_at)?,
            updated_at: row::decode_ts(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO automations (
        id, name, description, enabled, triggers, agent_prompt, agent_settings, actions,
        last_triggered, total_executions, successful_executions, failed_executions,
        created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE: &str = r"
    UPDATE automations
    SET name = ?, description = ?, enabled = ?, triggers = ?, agent_prompt = ?,
        agent_settings = ?, actions = ?, updated_at = ?
    WHERE id = ?
";

// Counters are bumped in place so that concurrent completions never lose an
// increment.
const RECORD_RUN: &str = r"
    UPDATE automations
    SET total_executions = total_executions + 1,
        successful_executions = successful_executions + ?,
        failed_executions = failed_executions + ?,
        last_triggered = COALESCE(?, last_triggered)
    WHERE id = ?
    RETURNING *
";

const SELECT_BY_ID: &str = "SELECT * FROM automations WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM automations ORDER BY created_at, rowid";
const SELECT_ENABLED: &str =
    "SELECT * FROM automations WHERE enabled = 1 ORDER BY created_at, rowid";
const DELETE: &str = "DELETE FROM automations WHERE id = ?";

/// `SQLite`-backed automation repository.
#[derive(Clone)]
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: AutomationId) -> Result<Option<Automation>, StorageError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(Wrapper::maybe(row))
    }
}

fn to_i64(counter: u64) -> i64 {
    i64::try_from(counter).unwrap_or(i64::MAX)
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn create(&self, automation: Automation) -> Result<Automation, CronpilotError> {
        let triggers = serde_json::to_string(&automation.triggers).map_err(StorageError::from)?;
        let agent = serde_json::to_string(&automation.agent).map_err(StorageError::from)?;
        let actions = serde_json::to_string(&automation.actions).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(automation.id.to_string())
            .bind(&automation.name)
            .bind(&automation.description)
            .bind(automation.enabled)
            .bind(&triggers)
            .bind(&automation.agent_prompt)
            .bind(&agent)
            .bind(&actions)
            .bind(automation.last_triggered.map(row::encode_ts))
            .bind(to_i64(automation.total_executions))
            .bind(to_i64(automation.successful_executions))
            .bind(to_i64(automation.failed_executions))
            .bind(row::encode_ts(automation.created_at))
            .bind(row::encode_ts(automation.updated_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<Automation>, CronpilotError> {
        Ok(self.fetch(id).await?)
    }

    async fn get_all(&self) -> Result<Vec<Automation>, CronpilotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_enabled(&self) -> Result<Vec<Automation>, CronpilotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ENABLED)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, automation: Automation) -> Result<Automation, CronpilotError> {
        let triggers = serde_json::to_string(&automation.triggers).map_err(StorageError::from)?;
        let agent = serde_json::to_string(&automation.agent).map_err(StorageError::from)?;
        let actions = serde_json::to_string(&automation.actions).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE)
            .bind(&automation.name)
            .bind(&automation.description)
            .bind(automation.enabled)
            .bind(&triggers)
            .bind(&automation.agent_prompt)
            .bind(&agent)
            .bind(&actions)
            .bind(row::encode_ts(automation.updated_at))
            .bind(automation.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(automation.id.not_found().into());
        }

        // Counters are owned by `record_run`; return what is actually stored.
        self.fetch(automation.id)
            .await?
            .ok_or_else(|| automation.id.not_found().into())
    }

    async fn delete(&self, id: AutomationId) -> Result<(), CronpilotError> {
        let result = sqlx::query(DELETE)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(id.not_found().into());
        }
        Ok(())
    }

    async fn record_run(
        &self,
        id: AutomationId,
        record: RunRecord,
    ) -> Result<Option<Automation>, CronpilotError> {
        let (success, failure) = match record.outcome {
            RunOutcome::Success => (1_i64, 0_i64),
            RunOutcome::Failure => (0, 1),
        };
        let row: Option<Wrapper> = sqlx::query_as(RECORD_RUN)
            .bind(success)
            .bind(failure)
            .bind(record.triggered_at.map(row::encode_ts))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }
}
