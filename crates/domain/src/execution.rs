//! Execution: the historical record of one automation firing.
//!
//! An execution is created in [`ExecutionStatus::Running`] when a firing
//! starts and is moved exactly once to [`ExecutionStatus::Success`] or
//! [`ExecutionStatus::Failed`]. Terminal statuses are never revisited.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{AutomationId, ChatId, ExecutionId};
use crate::time::{self, Timestamp};

/// What caused an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerSource {
    /// Fired by a user or an API call.
    Manual,
    /// Fired by a live cron timer.
    Cron,
    /// Fired by the startup backfill pass.
    StartupMissed,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Cron => "cron",
            Self::StartupMissed => "startup-missed",
        }
    }
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "cron" => Ok(Self::Cron),
            "startup-missed" => Ok(Self::StartupMissed),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

/// Lifecycle state of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
}

impl ExecutionStatus {
    /// `true` for [`Success`](Self::Success) and [`Failed`](Self::Failed).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

/// Why and with which context an execution was started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerContext {
    pub triggered_by: TriggerSource,
    /// Free-form context captured at fire time.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl TriggerContext {
    #[must_use]
    pub fn manual(data: serde_json::Value) -> Self {
        Self {
            triggered_by: TriggerSource::Manual,
            data,
        }
    }

    #[must_use]
    pub fn cron(expression: &str) -> Self {
        Self {
            triggered_by: TriggerSource::Cron,
            data: serde_json::json!({ "expression": expression }),
        }
    }

    #[must_use]
    pub fn startup_missed(expression: &str) -> Self {
        Self {
            triggered_by: TriggerSource::StartupMissed,
            data: serde_json::json!({ "expression": expression }),
        }
    }
}

/// Result stored on a successful execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub ai_result: String,
    pub action_results: Vec<serde_json::Value>,
}

impl From<ExecutionReport> for serde_json::Value {
    fn from(report: ExecutionReport) -> Self {
        serde_json::json!({
            "aiResult": report.ai_result,
            "actionResults": report.action_results,
        })
    }
}

/// One historical firing of an automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub automation_id: AutomationId,
    pub triggered_by: TriggerSource,
    pub trigger_data: serde_json::Value,
    pub status: ExecutionStatus,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub duration_ms: Option<i64>,
    pub inbox_chat_id: Option<ChatId>,
}

impl Execution {
    /// A fresh execution in [`ExecutionStatus::Running`], started now.
    #[must_use]
    pub fn start(automation_id: AutomationId, context: TriggerContext) -> Self {
        Self {
            id: ExecutionId::new(),
            automation_id,
            triggered_by: context.triggered_by,
            trigger_data: context.data,
            status: ExecutionStatus::Running,
            result: None,
            error_message: None,
            started_at: time::now(),
            completed_at: None,
            duration_ms: None,
            inbox_chat_id: None,
        }
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ExecutionAlreadyFinished`] if the patch
    /// carries a status and the execution is already terminal. Nothing is
    /// modified in that case.
    pub fn apply(&mut self, patch: &ExecutionPatch) -> Result<(), ValidationError> {
        if let Some(status) = patch.status {
            if self.status.is_terminal() {
                return Err(ValidationError::ExecutionAlreadyFinished(self.id.to_string()));
            }
            self.status = status;
        }
        if let Some(result) = &patch.result {
            self.result = Some(result.clone());
        }
        if let Some(message) = &patch.error_message {
            self.error_message = Some(message.clone());
        }
        if let Some(ts) = patch.completed_at {
            self.completed_at = Some(ts);
        }
        if let Some(ms) = patch.duration_ms {
            self.duration_ms = Some(ms);
        }
        if let Some(chat_id) = patch.inbox_chat_id {
            self.inbox_chat_id = Some(chat_id);
        }
        Ok(())
    }
}

/// Partial update of an [`Execution`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionPatch {
    pub status: Option<ExecutionStatus>,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub duration_ms: Option<i64>,
    pub inbox_chat_id: Option<ChatId>,
}

impl ExecutionPatch {
    /// Terminal success, with timing derived from `started_at`.
    #[must_use]
    pub fn success(result: serde_json::Value, started_at: Timestamp, completed_at: Timestamp) -> Self {
        Self {
            status: Some(ExecutionStatus::Success),
            result: Some(result),
            completed_at: Some(completed_at),
            duration_ms: Some(time::elapsed_ms(started_at, completed_at)),
            ..Self::default()
        }
    }

    /// Terminal failure, with timing derived from `started_at`.
    #[must_use]
    pub fn failure(
        message: impl Into<String>,
        started_at: Timestamp,
        completed_at: Timestamp,
    ) -> Self {
        Self {
            status: Some(ExecutionStatus::Failed),
            error_message: Some(message.into()),
            completed_at: Some(completed_at),
            duration_ms: Some(time::elapsed_ms(started_at, completed_at)),
            ..Self::default()
        }
    }

    /// Back-link to the inbox conversation created by an action.
    #[must_use]
    pub fn inbox_chat(chat_id: ChatId) -> Self {
        Self {
            inbox_chat_id: Some(chat_id),
            ..Self::default()
        }
    }
}
