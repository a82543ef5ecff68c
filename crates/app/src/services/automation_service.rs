//! Automation service: use-cases for managing automations.
//!
//! Every mutation is mirrored into the scheduler through [`ScheduleSync`],
//! so live timers always match the stored definition.

use std::sync::Arc;

use cronpilot_domain::automation::Automation;
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::id::AutomationId;
use cronpilot_domain::time;

use crate::ports::AutomationRepository;

/// Keeps the live schedule in step with stored automations.
pub trait ScheduleSync {
    /// Re-derive the timers of `automation` from its current definition.
    fn sync(&self, automation: &Automation);

    /// Drop every timer of a deleted automation.
    fn remove(&self, automation_id: AutomationId);
}

impl<T: ScheduleSync + ?Sized> ScheduleSync for Arc<T> {
    fn sync(&self, automation: &Automation) {
        self.as_ref().sync(automation);
    }

    fn remove(&self, automation_id: AutomationId) {
        self.as_ref().remove(automation_id);
    }
}

/// Application service for automation CRUD operations.
pub struct AutomationService<R, S> {
    repo: Arc<R>,
    schedule: S,
}

impl<R, S> AutomationService<R, S>
where
    R: AutomationRepository,
    S: ScheduleSync,
{
    /// Create a new service backed by the given repository and schedule.
    pub fn new(repo: Arc<R>, schedule: S) -> Self {
        Self { repo, schedule }
    }

    /// Create a new automation after validating domain invariants, then
    /// schedule it.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, automation), fields(automation_name = %automation.name))]
    pub async fn create_automation(
        &self,
        automation: Automation,
    ) -> Result<Automation, CronpilotError> {
        automation.validate()?;
        let created = self.repo.create(automation).await?;
        self.schedule.sync(&created);
        tracing::info!(automation_id = %created.id, "automation created");
        Ok(created)
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::NotFound`] when no automation with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_automation(&self, id: AutomationId) -> Result<Automation, CronpilotError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| id.not_found().into())
    }

    /// List all automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_automations(&self) -> Result<Vec<Automation>, CronpilotError> {
        self.repo.get_all().await
    }

    /// Replace the definition of an existing automation and reschedule it.
    ///
    /// Counters, `last_triggered` and `created_at` are owned by the system
    /// and kept from the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::Validation`] if invariants fail,
    /// [`CronpilotError::NotFound`] if the automation does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, automation), fields(automation_id = %automation.id))]
    pub async fn update_automation(
        &self,
        mut automation: Automation,
    ) -> Result<Automation, CronpilotError> {
        automation.validate()?;
        let existing = self.get_automation(automation.id).await?;
        automation.total_executions = existing.total_executions;
        automation.successful_executions = existing.successful_executions;
        automation.failed_executions = existing.failed_executions;
        automation.last_triggered = existing.last_triggered;
        automation.created_at = existing.created_at;
        automation.updated_at = time::now();

        let updated = self.repo.update(automation).await?;
        self.schedule.sync(&updated);
        Ok(updated)
    }

    /// Enable or disable an automation.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::NotFound`] if the automation does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        id: AutomationId,
        enabled: bool,
    ) -> Result<Automation, CronpilotError> {
        let mut automation = self.get_automation(id).await?;
        automation.enabled = enabled;
        self.update_automation(automation).await
    }

    /// Delete an automation by id and stop its timers.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::NotFound`] if the automation does not exist,
    /// or a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_automation(&self, id: AutomationId) -> Result<(), CronpilotError> {
        self.repo.delete(id).await?;
        self.schedule.remove(id);
        tracing::info!(automation_id = %id, "automation deleted");
        Ok(())
    }
}
