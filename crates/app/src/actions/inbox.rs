//! Inbox action: posts the AI result as a new inbox conversation.

use std::sync::Arc;

use cronpilot_domain::automation::Action;
use cronpilot_domain::error::ActionError;
use cronpilot_domain::execution::ExecutionPatch;
use cronpilot_domain::inbox::InboxEntry;
use serde_json::Value;

use super::{ActionContext, ActionHandler};
use crate::ports::{ExecutionRepository, InboxSink};
use crate::scheduler::BoxFuture;

/// Creates one inbox chat per run and back-links it onto the execution.
pub struct InboxActionHandler<IS, ER> {
    sink: Arc<IS>,
    executions: Arc<ER>,
}

impl<IS, ER> InboxActionHandler<IS, ER> {
    pub fn new(sink: Arc<IS>, executions: Arc<ER>) -> Self {
        Self { sink, executions }
    }
}

impl<IS, ER> ActionHandler for InboxActionHandler<IS, ER>
where
    IS: InboxSink + Send + Sync,
    ER: ExecutionRepository + Send + Sync,
{
    fn kind(&self) -> &'static str {
        Action::INBOX
    }

    fn run<'a>(
        &'a self,
        action: &'a Action,
        ctx: &'a ActionContext<'a>,
    ) -> BoxFuture<'a, Result<Value, ActionError>> {
        Box::pin(async move {
            let title = match action {
                Action::Inbox { title: Some(title) } if !title.trim().is_empty() => title.clone(),
                _ => ctx.automation.name.clone(),
            };
            let entry = InboxEntry {
                title,
                text: ctx.ai_result.to_string(),
                automation_id: ctx.automation.id,
                execution_id: ctx.execution_id,
            };

            let chat_id = self
                .sink
                .create_entry(entry)
                .await
                .map_err(|err| ActionError::new(Action::INBOX, err.to_string()))?;
            self.executions
                .update(ctx.execution_id, ExecutionPatch::inbox_chat(chat_id))
                .await
                .map_err(|err| ActionError::new(Action::INBOX, err.to_string()))?;

            tracing::info!(
                automation_id = %ctx.automation.id,
                execution_id = %ctx.execution_id,
                %chat_id,
                "inbox entry created"
            );
            Ok(serde_json::json!({ "type": Action::INBOX, "chatId": chat_id }))
        })
    }
}
