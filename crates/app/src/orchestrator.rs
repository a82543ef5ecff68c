//! Execution orchestrator: runs one automation end to end.
//!
//! The orchestrator owns the [`TriggerScheduler`] and is its
//! [`FireHandler`]: every cron fire, startup backfill and manual trigger goes
//! through [`Orchestrator::execute_automation`], which records an
//! [`Execution`], calls the AI provider, runs the action pipeline and
//! updates the automation counters.

use std::sync::{Arc, Weak};

use cronpilot_domain::automation::{Automation, RunRecord, Trigger};
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::execution::{Execution, ExecutionPatch, ExecutionReport, TriggerContext};
use cronpilot_domain::id::{AutomationId, ExecutionId};
use cronpilot_domain::time::{self, Timestamp};

use crate::actions::{ActionContext, ActionPipeline};
use crate::ports::{AiProvider, AutomationRepository, CompletionOptions, ExecutionRepository};
use crate::scheduler::{BoxFuture, FireHandler, SchedulerConfig, TriggerScheduler};
use crate::services::ScheduleSync;

/// Text used as the AI result when there is no prompt or no usable provider.
pub const NO_AI_PLACEHOLDER: &str = "No AI result: the automation has no prompt or no AI provider is configured.";

/// What [`Orchestrator::initialize`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupSummary {
    /// Enabled automations loaded.
    pub automations: usize,
    /// Cron timers started.
    pub timers: usize,
    /// Missed fires replayed.
    pub backfilled: usize,
}

/// Result of one run: the execution that recorded it and, if it failed, why.
#[derive(Debug)]
pub struct ExecutionOutcome {
    /// Execution that recorded the run.
    pub execution_id: ExecutionId,
    /// Why the run failed; `None` on success.
    pub error: Option<CronpilotError>,
}

impl ExecutionOutcome {
    /// `Ok(execution_id)` on success, the failure otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error that failed the execution.
    pub fn into_result(self) -> Result<ExecutionId, CronpilotError> {
        match self.error {
            None => Ok(self.execution_id),
            Some(err) => Err(err),
        }
    }
}

/// Coordinates scheduling and execution of automations.
pub struct Orchestrator<AR, ER, AI> {
    automations: Arc<AR>,
    executions: Arc<ER>,
    provider: AI,
    actions: ActionPipeline,
    scheduler: TriggerScheduler,
}

impl<AR, ER, AI> Orchestrator<AR, ER, AI>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
{
    /// Build an orchestrator and register it as the fire handler of its own
    /// scheduler.
    pub fn new(
        automations: Arc<AR>,
        executions: Arc<ER>,
        provider: AI,
        actions: ActionPipeline,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let scheduler = TriggerScheduler::new(config);
            let handler: Weak<dyn FireHandler> = this.clone();
            scheduler.set_handler(handler);
            Self {
                automations,
                executions,
                provider,
                actions,
                scheduler,
            }
        })
    }

    #[must_use]
    pub fn scheduler(&self) -> &TriggerScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn provider(&self) -> &AI {
        &self.provider
    }

    /// Register the triggers of every enabled automation, then dispatch the
    /// missed fires. Backfilled executions run in the background.
    ///
    /// Call once per process: a second call registers every timer again.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the enabled automations cannot be loaded.
    /// Backfill failures are logged only.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&self) -> Result<StartupSummary, CronpilotError> {
        let enabled = self.automations.get_enabled().await?;
        let timers = enabled
            .iter()
            .map(|automation| self.register_triggers(automation.id, &automation.triggers))
            .sum();
        let backfilled = self
            .scheduler
            .check_missed_tasks(self.automations.as_ref())
            .await;

        let summary = StartupSummary {
            automations: enabled.len(),
            timers,
            backfilled,
        };
        tracing::info!(
            automations = summary.automations,
            timers = summary.timers,
            backfilled = summary.backfilled,
            "orchestrator initialized"
        );
        Ok(summary)
    }

    /// Start a timer for every cron trigger; other trigger types are ignored.
    ///
    /// Returns the number of timers started.
    pub fn register_triggers(&self, automation_id: AutomationId, triggers: &[Trigger]) -> usize {
        triggers
            .iter()
            .filter(|trigger| match trigger {
                Trigger::Cron { expression, strict } => {
                    self.scheduler
                        .register_cron_trigger(automation_id, expression, *strict)
                }
                Trigger::Unknown => {
                    tracing::debug!(%automation_id, "ignoring unknown trigger type");
                    false
                }
            })
            .count()
    }

    /// Stop every timer of an automation. Returns the number stopped.
    pub fn unregister_automation(&self, automation_id: AutomationId) -> usize {
        self.scheduler.unregister_automation(automation_id)
    }

    /// Re-derive the timers of an automation from its current definition.
    ///
    /// Returns the number of timers now running for it.
    pub fn sync_automation(&self, automation: &Automation) -> usize {
        self.scheduler.unregister_automation(automation.id);
        if automation.enabled {
            self.register_triggers(automation.id, &automation.triggers)
        } else {
            0
        }
    }

    /// Stop every timer. Call on shutdown.
    pub fn cleanup(&self) {
        let stopped = self.scheduler.stop_all();
        tracing::info!(stopped, "orchestrator cleaned up");
    }

    /// Run an automation once and record the outcome.
    ///
    /// On return the created execution is `success` or `failed`, and the
    /// automation counters have been bumped (best effort).
    ///
    /// # Errors
    ///
    /// Returns the error that failed the execution: `NotFound` for an unknown
    /// automation, `Provider` for a failed completion, `Action` for a failed
    /// action, or a storage error.
    pub async fn execute_automation(
        &self,
        automation_id: AutomationId,
        context: TriggerContext,
    ) -> Result<ExecutionId, CronpilotError> {
        self.execute(automation_id, context).await?.into_result()
    }

    /// Same as [`execute_automation`](Self::execute_automation), but a failed
    /// run is reported in the returned [`ExecutionOutcome`] together with the
    /// id of the failed execution.
    ///
    /// # Errors
    ///
    /// Returns a storage error only when the execution record itself could not
    /// be created.
    #[tracing::instrument(skip(self, context), fields(triggered_by = %context.triggered_by))]
    pub async fn execute(
        &self,
        automation_id: AutomationId,
        context: TriggerContext,
    ) -> Result<ExecutionOutcome, CronpilotError> {
        let execution = self
            .executions
            .create(Execution::start(automation_id, context))
            .await?;
        let execution_id = execution.id;
        let started_at = execution.started_at;
        tracing::info!(%execution_id, "execution started");

        let outcome = match self.run(automation_id, execution_id).await {
            Ok(report) => {
                let completed_at = time::now();
                let patch = ExecutionPatch::success(report.into(), started_at, completed_at);
                self.executions
                    .update(execution_id, patch)
                    .await
                    .map(|_| completed_at)
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(completed_at) => {
                self.record_run(automation_id, RunRecord::success(completed_at))
                    .await;
                tracing::info!(%execution_id, "execution succeeded");
                Ok(ExecutionOutcome {
                    execution_id,
                    error: None,
                })
            }
            Err(err) => {
                self.mark_failed(execution_id, started_at, &err).await;
                self.record_run(automation_id, RunRecord::failure()).await;
                tracing::warn!(%execution_id, error = %err, "execution failed");
                Ok(ExecutionOutcome {
                    execution_id,
                    error: Some(err),
                })
            }
        }
    }

    async fn run(
        &self,
        automation_id: AutomationId,
        execution_id: ExecutionId,
    ) -> Result<ExecutionReport, CronpilotError> {
        let automation = self
            .automations
            .get_by_id(automation_id)
            .await?
            .ok_or_else(|| automation_id.not_found())?;

        let ai_result = if !automation.has_prompt() {
            tracing::debug!("automation has no prompt, skipping AI call");
            NO_AI_PLACEHOLDER.to_string()
        } else if !self.provider.is_available() {
            tracing::warn!("AI provider unavailable, skipping AI call");
            NO_AI_PLACEHOLDER.to_string()
        } else {
            let options = CompletionOptions::from(&automation.agent);
            let completion = self
                .provider
                .complete(&automation.agent_prompt, &options)
                .await?;
            tracing::debug!(model = ?completion.model, chars = completion.text.len(), "AI completion received");
            completion.text
        };

        let ctx = ActionContext {
            automation: &automation,
            execution_id,
            ai_result: &ai_result,
        };
        let action_results = self.actions.run(&ctx, &automation.actions).await?;

        Ok(ExecutionReport {
            ai_result,
            action_results,
        })
    }

    async fn mark_failed(&self, execution_id: ExecutionId, started_at: Timestamp, err: &CronpilotError) {
        let patch = ExecutionPatch::failure(err.to_string(), started_at, time::now());
        if let Err(update_err) = self.executions.update(execution_id, patch).await {
            tracing::error!(%execution_id, error = %update_err, "could not mark execution as failed");
        }
    }

    async fn record_run(&self, automation_id: AutomationId, record: RunRecord) {
        match self.automations.record_run(automation_id, record).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(%automation_id, "automation vanished, counters not updated");
            }
            Err(err) => {
                tracing::warn!(%automation_id, error = %err, "could not update automation counters");
            }
        }
    }
}

impl<AR, ER, AI> FireHandler for Orchestrator<AR, ER, AI>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
{
    fn fire(
        &self,
        automation_id: AutomationId,
        context: TriggerContext,
    ) -> BoxFuture<'_, Result<ExecutionId, CronpilotError>> {
        Box::pin(self.execute_automation(automation_id, context))
    }
}

impl<AR, ER, AI> ScheduleSync for Orchestrator<AR, ER, AI>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
{
    fn sync(&self, automation: &Automation) {
        self.sync_automation(automation);
    }

    fn remove(&self, automation_id: AutomationId) {
        self.unregister_automation(automation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::actions::InboxActionHandler;
    use crate::testing::{
        FakeProvider, InMemoryAutomationRepo, InMemoryExecutionRepo, InMemoryInbox, settle,
    };
    use cronpilot_domain::automation::{Action, AgentSettings};
    use cronpilot_domain::error::ProviderError;
    use cronpilot_domain::execution::{ExecutionStatus, TriggerSource};

    type TestOrchestrator = Orchestrator<InMemoryAutomationRepo, InMemoryExecutionRepo, FakeProvider>;

    struct Harness {
        automations: Arc<InMemoryAutomationRepo>,
        executions: Arc<InMemoryExecutionRepo>,
        inbox: Arc<InMemoryInbox>,
        orchestrator: Arc<TestOrchestrator>,
    }

    fn harness_with(
        provider: FakeProvider,
        automations: Vec<Automation>,
        executions: InMemoryExecutionRepo,
    ) -> Harness {
        let automations = Arc::new(InMemoryAutomationRepo::with(automations));
        let executions = Arc::new(executions);
        let inbox = Arc::new(InMemoryInbox::default());
        let pipeline = ActionPipeline::new().with_handler(InboxActionHandler::new(
            Arc::clone(&inbox),
            Arc::clone(&executions),
        ));
        let orchestrator = Orchestrator::new(
            Arc::clone(&automations),
            Arc::clone(&executions),
            provider,
            pipeline,
            SchedulerConfig::default(),
        );
        Harness {
            automations,
            executions,
            inbox,
            orchestrator,
        }
    }

    fn harness(provider: FakeProvider, automations: Vec<Automation>) -> Harness {
        harness_with(provider, automations, InMemoryExecutionRepo::default())
    }

    fn hourly(name: &str) -> Automation {
        Automation::builder()
            .name(name)
            .trigger(Trigger::cron("0 * * * *"))
            .agent_prompt("Summarize the news")
            .build()
            .unwrap()
    }

    fn assert_counters_balanced(automation: &Automation) {
        assert_eq!(
            automation.total_executions,
            automation.successful_executions + automation.failed_executions
        );
    }

    #[tokio::test]
    async fn should_backfill_once_when_never_triggered() {
        let auto = hourly("Scenario A");
        let h = harness(FakeProvider::replying("news"), vec![auto.clone()]);

        let summary = h.orchestrator.initialize().await.unwrap();

        assert_eq!(summary.automations, 1);
        assert_eq!(summary.timers, 1);
        assert_eq!(summary.backfilled, 1);
        settle().await;
        let executions = h.executions.all();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].triggered_by, TriggerSource::StartupMissed);
        assert_eq!(executions[0].status, ExecutionStatus::Success);
        assert_eq!(executions[0].trigger_data["expression"], "0 * * * *");
        assert_eq!(h.orchestrator.scheduler().timer_count(auto.id), 1);
        h.orchestrator.cleanup();
    }

    #[tokio::test(start_paused = true)]
    async fn should_initialize_without_waiting_for_backfills() {
        let automations: Vec<_> = (0..5).map(|i| hourly(&format!("Hourly {i}"))).collect();
        let h = harness(
            FakeProvider::replying("late").with_delay(Duration::from_secs(60)),
            automations,
        );

        let started = tokio::time::Instant::now();
        let summary = h.orchestrator.initialize().await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(summary.backfilled, 5);
        assert_eq!(summary.timers, 5);

        settle().await;
        let running = h.executions.all();
        assert_eq!(running.len(), 5);
        assert!(running.iter().all(|e| e.status == ExecutionStatus::Running));

        tokio::time::sleep(Duration::from_secs(61)).await;
        settle().await;
        let backfills: Vec<_> = h
            .executions
            .all()
            .into_iter()
            .filter(|e| e.triggered_by == TriggerSource::StartupMissed)
            .collect();
        assert_eq!(backfills.len(), 5);
        assert!(backfills.iter().all(|e| e.status == ExecutionStatus::Success));
        h.orchestrator.cleanup();
    }

    #[tokio::test]
    async fn should_neither_register_nor_fire_when_disabled() {
        let mut auto = hourly("Scenario B");
        auto.enabled = false;
        let h = harness(FakeProvider::replying("news"), vec![auto.clone()]);

        let summary = h.orchestrator.initialize().await.unwrap();

        assert_eq!(summary, StartupSummary::default());
        assert_eq!(h.orchestrator.scheduler().timer_count(auto.id), 0);
        assert!(h.executions.all().is_empty());
        assert!(h.orchestrator.provider().prompts().is_empty());
    }

    #[tokio::test]
    async fn should_fail_execution_when_provider_rate_limited() {
        let auto = hourly("Scenario C");
        let h = harness(
            FakeProvider::failing(ProviderError::RateLimited("rate limited".to_string())),
            vec![auto.clone()],
        );

        let err = h
            .orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap_err();

        assert!(matches!(err, CronpilotError::Provider(ProviderError::RateLimited(_))));
        let executions = h.executions.all();
        assert_eq!(executions.len(), 1);
        let execution = &executions[0];
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.error_message.as_deref(), Some("rate limited"));
        assert!(execution.completed_at.is_some());
        assert!(execution.duration_ms.is_some());

        let stored = h.automations.snapshot(auto.id).unwrap();
        assert_eq!(stored.failed_executions, 1);
        assert_eq!(stored.successful_executions, 0);
        assert!(stored.last_triggered.is_none());
        assert_counters_balanced(&stored);
    }

    #[tokio::test]
    async fn should_create_one_inbox_chat_and_backlink_it() {
        let auto = Automation::builder()
            .name("Scenario D")
            .trigger(Trigger::cron("0 8 * * *"))
            .agent_prompt("Plan my day")
            .action(Action::inbox())
            .build()
            .unwrap();
        let h = harness(FakeProvider::replying("Your plan"), vec![auto.clone()]);

        let execution_id = h
            .orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap();

        let chats = h.inbox.chats();
        assert_eq!(chats.len(), 1);
        let execution = h.executions.find(execution_id).unwrap();
        assert_eq!(execution.status, ExecutionStatus::Success);
        assert_eq!(execution.inbox_chat_id, Some(chats[0].id));
        let result = execution.result.unwrap();
        assert_eq!(result["aiResult"], "Your plan");
        assert_eq!(result["actionResults"][0]["chatId"], chats[0].id.to_string());
        assert_eq!(h.inbox.messages()[0].content, "Your plan");
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_concurrent_executions_independently() {
        let auto = hourly("Scenario E");
        let h = harness(
            FakeProvider::replying("done").with_delay(Duration::from_millis(200)),
            vec![auto.clone()],
        );

        let (first, second) = tokio::join!(
            h.orchestrator
                .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null)),
            h.orchestrator
                .execute_automation(auto.id, TriggerContext::cron("0 * * * *")),
        );

        let first = first.unwrap();
        let second = second.unwrap();
        assert_ne!(first, second);
        for id in [first, second] {
            let execution = h.executions.find(id).unwrap();
            assert_eq!(execution.status, ExecutionStatus::Success);
            assert_eq!(execution.result.unwrap()["aiResult"], "done");
        }
        let stored = h.automations.snapshot(auto.id).unwrap();
        assert_eq!(stored.total_executions, 2);
        assert_eq!(stored.successful_executions, 2);
        assert_counters_balanced(&stored);
    }

    #[tokio::test]
    async fn should_report_failed_execution_id_in_outcome() {
        let auto = hourly("Outcome");
        let h = harness(
            FakeProvider::failing(ProviderError::Request("connection reset".to_string())),
            vec![auto.clone()],
        );

        let outcome = h
            .orchestrator
            .execute(auto.id, TriggerContext::manual(serde_json::json!({ "source": "api" })))
            .await
            .unwrap();

        let execution = h.executions.find(outcome.execution_id).unwrap();
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.trigger_data["source"], "api");
        assert_eq!(
            outcome.error.map(|err| err.to_string()).as_deref(),
            Some("connection reset")
        );
    }

    #[tokio::test]
    async fn should_fail_with_not_found_when_automation_missing() {
        let h = harness(FakeProvider::replying("x"), vec![]);
        let missing = AutomationId::new();

        let err = h
            .orchestrator
            .execute_automation(missing, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap_err();

        assert!(matches!(err, CronpilotError::NotFound(_)));
        let executions = h.executions.all();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].status, ExecutionStatus::Failed);
        assert!(executions[0].error_message.as_deref().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn should_use_placeholder_when_prompt_is_empty() {
        let auto = Automation::builder()
            .name("No prompt")
            .action(Action::inbox())
            .build()
            .unwrap();
        let h = harness(FakeProvider::replying("unused"), vec![auto.clone()]);

        let id = h
            .orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap();

        assert!(h.orchestrator.provider().prompts().is_empty());
        let execution = h.executions.find(id).unwrap();
        assert_eq!(execution.result.unwrap()["aiResult"], NO_AI_PLACEHOLDER);
        assert_eq!(h.inbox.messages()[0].content, NO_AI_PLACEHOLDER);
    }

    #[tokio::test]
    async fn should_use_placeholder_when_provider_unavailable() {
        let auto = hourly("Offline");
        let h = harness(FakeProvider::unavailable(), vec![auto.clone()]);

        let id = h
            .orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap();

        let execution = h.executions.find(id).unwrap();
        assert_eq!(execution.status, ExecutionStatus::Success);
        assert_eq!(execution.result.unwrap()["aiResult"], NO_AI_PLACEHOLDER);
    }

    #[tokio::test]
    async fn should_pass_agent_settings_to_provider() {
        let auto = Automation::builder()
            .name("Tuned")
            .agent_prompt("Write a haiku")
            .agent(AgentSettings {
                model: Some("gpt-4o-mini".to_string()),
                temperature: Some(0.9),
                ..AgentSettings::default()
            })
            .build()
            .unwrap();
        let h = harness(FakeProvider::replying("haiku"), vec![auto.clone()]);

        h.orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap();

        let prompts = h.orchestrator.provider().prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, "Write a haiku");
        assert_eq!(prompts[0].1.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(prompts[0].1.temperature, Some(0.9));
    }

    #[tokio::test]
    async fn should_advance_last_triggered_on_success() {
        let auto = hourly("Success");
        let h = harness(FakeProvider::replying("ok"), vec![auto.clone()]);

        let id = h
            .orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap();

        let stored = h.automations.snapshot(auto.id).unwrap();
        let execution = h.executions.find(id).unwrap();
        assert_eq!(stored.successful_executions, 1);
        assert_eq!(stored.last_triggered, execution.completed_at);
        assert_counters_balanced(&stored);
    }

    #[tokio::test]
    async fn should_fail_execution_when_action_fails() {
        let auto = Automation::builder()
            .name("Broken inbox")
            .agent_prompt("hi")
            .action(Action::inbox())
            .build()
            .unwrap();
        let automations = Arc::new(InMemoryAutomationRepo::with(vec![auto.clone()]));
        let executions = Arc::new(InMemoryExecutionRepo::default());
        let pipeline = ActionPipeline::new().with_handler(InboxActionHandler::new(
            Arc::new(InMemoryInbox::failing()),
            Arc::clone(&executions),
        ));
        let orchestrator = Orchestrator::new(
            Arc::clone(&automations),
            Arc::clone(&executions),
            FakeProvider::replying("hello"),
            pipeline,
            SchedulerConfig::default(),
        );

        let err = orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap_err();

        assert!(matches!(err, CronpilotError::Action(_)));
        let execution = &executions.all()[0];
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert!(execution.error_message.as_deref().unwrap().starts_with("inbox action failed"));
        assert_eq!(automations.snapshot(auto.id).unwrap().failed_executions, 1);
    }

    #[tokio::test]
    async fn should_count_failure_when_result_cannot_be_stored() {
        let auto = hourly("Disk full");
        let h = harness_with(
            FakeProvider::replying("ok"),
            vec![auto.clone()],
            InMemoryExecutionRepo::failing_updates(),
        );

        let err = h
            .orchestrator
            .execute_automation(auto.id, TriggerContext::manual(serde_json::Value::Null))
            .await
            .unwrap_err();

        assert!(matches!(err, CronpilotError::Storage(_)));
        let stored = h.automations.snapshot(auto.id).unwrap();
        assert_eq!(stored.failed_executions, 1);
        assert_counters_balanced(&stored);
    }

    #[tokio::test]
    async fn should_resync_timers_from_definition() {
        let mut auto = hourly("Sync");
        auto.triggers.push(Trigger::strict_cron("*/15 * * * *"));
        let h = harness(FakeProvider::replying("ok"), vec![]);

        assert_eq!(h.orchestrator.sync_automation(&auto), 2);
        assert_eq!(h.orchestrator.sync_automation(&auto), 2);
        assert_eq!(h.orchestrator.scheduler().timer_count(auto.id), 2);

        auto.enabled = false;
        assert_eq!(h.orchestrator.sync_automation(&auto), 0);
        assert_eq!(h.orchestrator.scheduler().timer_count(auto.id), 0);
    }

    #[tokio::test]
    async fn should_ignore_unknown_triggers_when_registering() {
        let h = harness(FakeProvider::replying("ok"), vec![]);
        let id = AutomationId::new();

        let started = h
            .orchestrator
            .register_triggers(id, &[Trigger::Unknown, Trigger::cron("0 * * * *")]);

        assert_eq!(started, 1);
        assert_eq!(h.orchestrator.unregister_automation(id), 1);
    }

    #[tokio::test]
    async fn should_stop_every_timer_on_cleanup() {
        let h = harness(FakeProvider::replying("ok"), vec![hourly("a"), hourly("b")]);
        let summary = h.orchestrator.initialize().await.unwrap();
        assert_eq!(summary.timers, 2);

        h.orchestrator.cleanup();

        assert_eq!(h.orchestrator.scheduler().total_timers(), 0);
    }
}
