//! Shared application state for axum handlers.

use std::sync::Arc;

use cronpilot_app::orchestrator::Orchestrator;
use cronpilot_app::ports::{AiProvider, AutomationRepository, ExecutionRepository, InboxRepository};
use cronpilot_app::services::{AutomationService, ExecutionService, InboxService};

/// Automation CRUD whose mutations are mirrored into the orchestrator's
/// scheduler.
pub type ScheduledAutomationService<AR, ER, AI> =
    AutomationService<AR, Arc<Orchestrator<AR, ER, AI>>>;

/// Application state shared across all axum handlers.
///
/// Generic over the automation repository, execution repository, AI provider
/// and inbox repository to avoid dynamic dispatch. `Clone` is implemented
/// manually so the underlying types themselves do not need to be `Clone`;
/// only the `Arc` wrappers are cloned.
pub struct AppState<AR, ER, AI, IR> {
    /// Automation CRUD service.
    pub automation_service: Arc<ScheduledAutomationService<AR, ER, AI>>,
    /// Runs automations on demand.
    pub orchestrator: Arc<Orchestrator<AR, ER, AI>>,
    /// Execution history queries.
    pub execution_service: Arc<ExecutionService<ER>>,
    /// Inbox queries.
    pub inbox_service: Arc<InboxService<IR>>,
}

impl<AR, ER, AI, IR> Clone for AppState<AR, ER, AI, IR> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            orchestrator: Arc::clone(&self.orchestrator),
            execution_service: Arc::clone(&self.execution_service),
            inbox_service: Arc::clone(&self.inbox_service),
        }
    }
}

impl<AR, ER, AI, IR> AppState<AR, ER, AI, IR>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    /// Build every service around the shared repositories and orchestrator.
    ///
    /// The orchestrator must have been built over the same `automations` and
    /// `executions` repositories.
    pub fn new(
        automations: Arc<AR>,
        executions: Arc<ER>,
        inbox: Arc<IR>,
        orchestrator: Arc<Orchestrator<AR, ER, AI>>,
    ) -> Self {
        Self {
            automation_service: Arc::new(AutomationService::new(
                automations,
                Arc::clone(&orchestrator),
            )),
            orchestrator,
            execution_service: Arc::new(ExecutionService::new(executions)),
            inbox_service: Arc::new(InboxService::new(inbox)),
        }
    }
}
