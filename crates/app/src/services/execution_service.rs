//! Execution service: read side of the execution history.

use std::sync::Arc;

use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::execution::Execution;
use cronpilot_domain::id::{AutomationId, ExecutionId};

use crate::ports::ExecutionRepository;

/// Default page size of history listings.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Upper bound of history listings.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Application service for querying executions.
pub struct ExecutionService<R> {
    repo: Arc<R>,
}

impl<R: ExecutionRepository> ExecutionService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Look up an execution by id.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::NotFound`] when no execution with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_execution(&self, id: ExecutionId) -> Result<Execution, CronpilotError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| id.not_found().into())
    }

    /// Most recent executions of one automation, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_for_automation(
        &self,
        automation_id: AutomationId,
        limit: Option<usize>,
    ) -> Result<Vec<Execution>, CronpilotError> {
        self.repo
            .list_by_automation(automation_id, clamp_limit(limit))
            .await
    }

    /// Most recent executions across all automations, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Execution>, CronpilotError> {
        self.repo.list_recent(clamp_limit(limit)).await
    }
}

/// Apply the default page size and cap it.
#[must_use]
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}
