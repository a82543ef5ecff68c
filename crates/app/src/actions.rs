//! Action pipeline: post-completion side effects of an automation.
//!
//! Handlers are registered by action type. The pipeline runs an
//! automation's actions in declaration order and stops at the first failure;
//! side effects of the actions that already ran are kept.

pub mod inbox;

pub use inbox::InboxActionHandler;

use std::collections::HashMap;

use cronpilot_domain::automation::{Action, Automation};
use cronpilot_domain::error::ActionError;
use cronpilot_domain::id::ExecutionId;
use serde_json::Value;

use crate::scheduler::BoxFuture;

/// What an action gets to see about the execution it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub automation: &'a Automation,
    pub execution_id: ExecutionId,
    pub ai_result: &'a str,
}

/// Runs one type of [`Action`].
pub trait ActionHandler: Send + Sync {
    /// The action type this handler serves (e.g. `"inbox"`).
    fn kind(&self) -> &'static str;

    /// Run the action and return a JSON summary of what it did.
    fn run<'a>(
        &'a self,
        action: &'a Action,
        ctx: &'a ActionContext<'a>,
    ) -> BoxFuture<'a, Result<Value, ActionError>>;
}

/// Registry of [`ActionHandler`]s keyed by action type.
#[derive(Default)]
pub struct ActionPipeline {
    handlers: HashMap<&'static str, Box<dyn ActionHandler>>,
}

impl ActionPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_handler(mut self, handler: impl ActionHandler + 'static) -> Self {
        self.register(handler);
        self
    }

    /// Register a handler, replacing any previous handler of the same kind.
    pub fn register(&mut self, handler: impl ActionHandler + 'static) {
        let kind = handler.kind();
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            tracing::warn!(kind, "replacing action handler");
        }
    }

    #[must_use]
    pub fn has_handler(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Run `actions` in order.
    ///
    /// Unknown action types and types without a handler are skipped. Returns
    /// one result per action that actually ran.
    ///
    /// # Errors
    ///
    /// Returns the first [`ActionError`]; later actions are not run.
    pub async fn run(
        &self,
        ctx: &ActionContext<'_>,
        actions: &[Action],
    ) -> Result<Vec<Value>, ActionError> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            if matches!(action, Action::Unknown) {
                tracing::debug!(automation_id = %ctx.automation.id, "skipping unknown action type");
                continue;
            }
            let kind = action.kind();
            let Some(handler) = self.handlers.get(kind) else {
                tracing::warn!(automation_id = %ctx.automation.id, kind, "no handler for action");
                continue;
            };
            tracing::debug!(automation_id = %ctx.automation.id, kind, "running action");
            results.push(handler.run(action, ctx).await?);
        }
        Ok(results)
    }
}
