//! Execution repository port: the history of automation firings.

use std::future::Future;

use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::execution::{Execution, ExecutionPatch};
use cronpilot_domain::id::{AutomationId, ExecutionId};

/// Repository for persisting and querying [`Execution`]s.
///
/// Implementations must apply [`update`](Self::update) atomically per row:
/// concurrent patches of different fields must not overwrite each other, and
/// a status patch on an already terminal execution must be rejected.
pub trait ExecutionRepository {
    /// Insert a new execution.
    fn create(
        &self,
        execution: Execution,
    ) -> impl Future<Output = Result<Execution, CronpilotError>> + Send;

    /// Get an execution by its unique identifier.
    fn get_by_id(
        &self,
        id: ExecutionId,
    ) -> impl Future<Output = Result<Option<Execution>, CronpilotError>> + Send;

    /// Apply a partial update and return the updated row.
    ///
    /// Fails with `NotFound` for an unknown id and with
    /// `Validation(ExecutionAlreadyFinished)` when changing a terminal status.
    fn update(
        &self,
        id: ExecutionId,
        patch: ExecutionPatch,
    ) -> impl Future<Output = Result<Execution, CronpilotError>> + Send;

    /// Most recent executions of one automation, newest first.
    fn list_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, CronpilotError>> + Send;

    /// Most recent executions across all automations, newest first.
    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, CronpilotError>> + Send;
}
