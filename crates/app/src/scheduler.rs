//! Trigger scheduler: turns cron expressions into live timers.
//!
//! Every registered cron trigger owns one tokio task that sleeps until the
//! next fire time (computed in the configured timezone) and then hands the
//! firing to the [`FireHandler`]. Each firing runs in its own task so that a
//! slow or failing execution never delays or stops the timer.
//!
//! The scheduler also provides the startup backfill pass
//! ([`TriggerScheduler::check_missed_tasks`]), which is the only place where
//! it reads from storage.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, OnceLock, Weak};

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;

use cronpilot_domain::automation::CronSchedule;
use cronpilot_domain::automation::schedule::{self, DEFAULT_BACKFILL_THRESHOLD};
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::execution::TriggerContext;
use cronpilot_domain::id::{AutomationId, ExecutionId};
use cronpilot_domain::time;

use crate::ports::AutomationRepository;

/// Boxed, sendable future used at object-safe seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Receives firings from the scheduler (implemented by the orchestrator).
pub trait FireHandler: Send + Sync {
    /// Run the automation once for the given trigger context.
    fn fire(
        &self,
        automation_id: AutomationId,
        context: TriggerContext,
    ) -> BoxFuture<'_, Result<ExecutionId, CronpilotError>>;
}

/// Scheduler settings.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Timezone every cron expression is evaluated in.
    pub timezone: Tz,
    /// Staleness bound of the startup backfill pass.
    pub backfill_threshold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            backfill_threshold: DEFAULT_BACKFILL_THRESHOLD,
        }
    }
}

/// One live timer. Dropping it stops the timer.
struct ScheduledTask {
    expression: String,
    handle: JoinHandle<()>,
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Owns the live cron timers of every automation.
pub struct TriggerScheduler {
    config: SchedulerConfig,
    handler: OnceLock<Weak<dyn FireHandler>>,
    tasks: Mutex<HashMap<AutomationId, Vec<ScheduledTask>>>,
}

impl TriggerScheduler {
    /// Create a scheduler with no handler and no timers.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            handler: OnceLock::new(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Settings this scheduler was built with.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Inject the collaborator that receives firings. Only the first call
    /// has an effect.
    pub fn set_handler(&self, handler: Weak<dyn FireHandler>) {
        if self.handler.set(handler).is_err() {
            tracing::warn!("fire handler already set, ignoring");
        }
    }

    /// Start a recurring timer for one cron trigger of an automation.
    ///
    /// Registrations accumulate: calling this twice with the same expression
    /// creates two independent timers. Returns `false` (and logs) when the
    /// handler is not set, the expression is invalid, or no tokio runtime is
    /// running.
    pub fn register_cron_trigger(
        &self,
        automation_id: AutomationId,
        expression: &str,
        strict: bool,
    ) -> bool {
        let Some(handler) = self.handler.get() else {
            tracing::error!(
                %automation_id,
                expression,
                "cron trigger registered before the fire handler was set"
            );
            return false;
        };
        let schedule = match CronSchedule::parse(expression) {
            Ok(schedule) => schedule,
            Err(err) => {
                tracing::error!(%automation_id, error = %err, "refusing to register cron trigger");
                return false;
            }
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(%automation_id, expression, "no tokio runtime to run the cron timer");
            return false;
        };

        let handle = runtime.spawn(run_timer(
            automation_id,
            schedule,
            self.config.timezone,
            Weak::clone(handler),
        ));
        self.lock_tasks()
            .entry(automation_id)
            .or_default()
            .push(ScheduledTask {
                expression: expression.to_string(),
                handle,
            });
        tracing::info!(%automation_id, expression, strict, timezone = %self.config.timezone, "cron trigger registered");
        true
    }

    /// Stop every timer owned by `automation_id`. Idempotent.
    ///
    /// Returns the number of timers stopped.
    pub fn unregister_automation(&self, automation_id: AutomationId) -> usize {
        let removed = self.lock_tasks().remove(&automation_id).unwrap_or_default();
        if !removed.is_empty() {
            tracing::info!(%automation_id, count = removed.len(), "cron triggers unregistered");
        }
        removed.len()
    }

    /// Stop every timer. Returns the number of timers stopped.
    pub fn stop_all(&self) -> usize {
        let drained: Vec<_> = self.lock_tasks().drain().collect();
        let count = drained.iter().map(|(_, tasks)| tasks.len()).sum();
        tracing::info!(count, "all cron triggers stopped");
        count
    }

    /// Number of live timers of one automation.
    #[must_use]
    pub fn timer_count(&self, automation_id: AutomationId) -> usize {
        self.lock_tasks().get(&automation_id).map_or(0, Vec::len)
    }

    /// Number of live timers across all automations.
    #[must_use]
    pub fn total_timers(&self) -> usize {
        self.lock_tasks().values().map(Vec::len).sum()
    }

    /// Expressions currently scheduled for one automation, in registration order.
    #[must_use]
    pub fn expressions(&self, automation_id: AutomationId) -> Vec<String> {
        self.lock_tasks()
            .get(&automation_id)
            .map(|tasks| tasks.iter().map(|t| t.expression.clone()).collect())
            .unwrap_or_default()
    }

    /// Startup backfill: fire once for every non-strict cron trigger of every
    /// enabled automation that missed a fire while the process was down.
    ///
    /// Strict triggers are never backfilled. Each firing runs in its own task,
    /// so this returns once the firings are dispatched, not once they finish.
    /// Failed firings are logged. Returns the number of firings dispatched.
    pub async fn check_missed_tasks<AR>(&self, automations: &AR) -> usize
    where
        AR: AutomationRepository + Sync,
    {
        let Some(handler) = self.handler.get().and_then(Weak::upgrade) else {
            tracing::error!("missed-task check requested without a fire handler");
            return 0;
        };
        let enabled = match automations.get_enabled().await {
            Ok(enabled) => enabled,
            Err(err) => {
                tracing::error!(error = %err, "could not load automations for missed-task check");
                return 0;
            }
        };

        let now = time::now();
        let mut fired = 0;
        for automation in &enabled {
            if !schedule::is_missed(automation.last_triggered, now, self.config.backfill_threshold)
            {
                continue;
            }
            for (expression, strict) in automation.cron_triggers() {
                if strict {
                    tracing::debug!(automation_id = %automation.id, expression, "strict trigger, not backfilled");
                    continue;
                }
                tracing::info!(
                    automation_id = %automation.id,
                    expression,
                    last_triggered = ?automation.last_triggered,
                    "backfilling missed fire"
                );
                fired += 1;
                dispatch(
                    Arc::clone(&handler),
                    automation.id,
                    TriggerContext::startup_missed(expression),
                );
            }
        }
        fired
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, HashMap<AutomationId, Vec<ScheduledTask>>> {
        // A poisoned map still holds valid handles.
        self.tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Drop for TriggerScheduler {
    fn drop(&mut self) {
        let tasks = self
            .tasks
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        tasks.clear();
    }
}

async fn run_timer(
    automation_id: AutomationId,
    schedule: CronSchedule,
    timezone: Tz,
    handler: Weak<dyn FireHandler>,
) {
    let mut last_slot = None;
    loop {
        let now = Utc::now().with_timezone(&timezone);
        // Never fire the same slot twice, even if the sleep woke up early.
        let from = match last_slot {
            Some(slot) if slot > now => slot,
            _ => now,
        };
        let Some(next) = schedule.next_after(&from) else {
            tracing::warn!(%automation_id, expression = schedule.expression(), "cron expression has no upcoming fire");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(%automation_id, expression = schedule.expression(), next = %next, "cron timer sleeping");
        tokio::time::sleep(wait).await;
        last_slot = Some(next);

        let Some(handler) = handler.upgrade() else {
            tracing::debug!(%automation_id, "fire handler dropped, stopping cron timer");
            return;
        };
        dispatch(handler, automation_id, TriggerContext::cron(schedule.expression()));
    }
}

/// Run one firing in its own task; errors and panics are logged and never
/// reach the timer.
fn dispatch(handler: Arc<dyn FireHandler>, automation_id: AutomationId, context: TriggerContext) {
    let triggered_by = context.triggered_by;
    tokio::spawn(async move {
        let worker = tokio::spawn(async move { handler.fire(automation_id, context).await });
        match worker.await {
            Ok(Ok(execution_id)) => {
                tracing::info!(%automation_id, %triggered_by, %execution_id, "scheduled execution finished");
            }
            Ok(Err(err)) => {
                tracing::error!(%automation_id, %triggered_by, error = %err, "scheduled execution failed");
            }
            Err(err) => {
                tracing::error!(%automation_id, %triggered_by, error = %err, "scheduled execution panicked");
            }
        }
    });
}
