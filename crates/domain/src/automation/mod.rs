//! Automation: a recurring AI job made of cron triggers, an agent prompt and follow-up actions.
//!
//! Each automation owns one or more [`Trigger`]s that decide when it fires,
//! an agent prompt sent to the AI provider, and an ordered list of
//! [`Action`]s run against the completion.

mod action;
pub mod schedule;
mod trigger;

pub use action::Action;
pub use schedule::CronSchedule;
pub use trigger::Trigger;

use serde::{Deserialize, Serialize};

use crate::error::{CronpilotError, ValidationError};
use crate::id::AutomationId;
use crate::time::{self, Timestamp};

/// Per-automation overrides passed to the AI provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A user-defined recurring job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    pub id: AutomationId,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub triggers: Vec<Trigger>,
    pub agent_prompt: String,
    pub agent: AgentSettings,
    pub actions: Vec<Action>,
    pub last_triggered: Option<Timestamp>,
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - a cron trigger does not parse ([`ValidationError::InvalidCron`])
    pub fn validate(&self) -> Result<(), CronpilotError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        for trigger in &self.triggers {
            trigger.validate()?;
        }
        Ok(())
    }

    /// Whether there is something to send to the AI provider.
    #[must_use]
    pub fn has_prompt(&self) -> bool {
        !self.agent_prompt.trim().is_empty()
    }

    /// Iterate over `(expression, strict)` for every cron trigger.
    pub fn cron_triggers(&self) -> impl Iterator<Item = (&str, bool)> {
        self.triggers.iter().filter_map(|trigger| match trigger {
            Trigger::Cron { expression, strict } => Some((expression.as_str(), *strict)),
            Trigger::Unknown => None,
        })
    }

    /// Fold the outcome of one execution into the counters.
    pub fn apply_run(&mut self, record: &RunRecord) {
        self.total_executions += 1;
        match record.outcome {
            RunOutcome::Success => self.successful_executions += 1,
            RunOutcome::Failure => self.failed_executions += 1,
        }
        if let Some(ts) = record.triggered_at {
            self.last_triggered = Some(ts);
        }
    }
}

/// Terminal outcome of an execution, as seen by the automation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    Failure,
}

/// Counter bump recorded on an automation once an execution finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRecord {
    pub outcome: RunOutcome,
    /// New `last_triggered` value, if it should move.
    pub triggered_at: Option<Timestamp>,
}

impl RunRecord {
    /// A successful run, which also advances `last_triggered`.
    #[must_use]
    pub fn success(at: Timestamp) -> Self {
        Self {
            outcome: RunOutcome::Success,
            triggered_at: Some(at),
        }
    }

    /// A failed run; `last_triggered` is left untouched.
    #[must_use]
    pub fn failure() -> Self {
        Self {
            outcome: RunOutcome::Failure,
            triggered_at: None,
        }
    }
}

/// Step-by-step builder for [`Automation`].
#[derive(Debug, Default)]
pub struct AutomationBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    description: Option<String>,
    enabled: Option<bool>,
    triggers: Vec<Trigger>,
    agent_prompt: Option<String>,
    agent: AgentSettings,
    actions: Vec<Action>,
    last_triggered: Option<Timestamp>,
    created_at: Option<Timestamp>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn agent_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.agent_prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn agent(mut self, agent: AgentSettings) -> Self {
        self.agent = agent;
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn last_triggered(mut self, ts: Timestamp) -> Self {
        self.last_triggered = Some(ts);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`Automation`].
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::Validation`] if the name is empty or a
    /// trigger is malformed.
    pub fn build(self) -> Result<Automation, CronpilotError> {
        let created_at = self.created_at.unwrap_or_else(time::now);
        let automation = Automation {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            enabled: self.enabled.unwrap_or(true),
            triggers: self.triggers,
            agent_prompt: self.agent_prompt.unwrap_or_default(),
            agent: self.agent,
            actions: self.actions,
            last_triggered: self.last_triggered,
            total_executions: 0,
            successful_executions: 0,
            failed_executions: 0,
            created_at,
            updated_at: created_at,
        };
        automation.validate()?;
        Ok(automation)
    }
}
