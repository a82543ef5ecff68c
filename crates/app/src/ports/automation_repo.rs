//! Automation repository port: persistence for automations.

use std::future::Future;

use cronpilot_domain::automation::{Automation, RunRecord};
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::id::AutomationId;

/// Repository for persisting and querying [`Automation`]s.
pub trait AutomationRepository {
    /// Create a new automation in storage.
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, CronpilotError>> + Send;

    /// Get an automation by its unique identifier.
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, CronpilotError>> + Send;

    /// Get all automations.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, CronpilotError>> + Send;

    /// Get all enabled automations.
    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Automation>, CronpilotError>> + Send;

    /// Update the definition of an existing automation.
    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, CronpilotError>> + Send;

    /// Delete an automation by its unique identifier.
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), CronpilotError>> + Send;

    /// Atomically fold the outcome of one execution into the counters.
    ///
    /// Returns `None` when the automation no longer exists.
    fn record_run(
        &self,
        id: AutomationId,
        record: RunRecord,
    ) -> impl Future<Output = Result<Option<Automation>, CronpilotError>> + Send;
}
