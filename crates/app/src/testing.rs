//! In-memory fakes of every port, shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use cronpilot_domain::automation::{Automation, RunRecord};
use cronpilot_domain::error::{CronpilotError, NotFoundError, ProviderError};
use cronpilot_domain::execution::{Execution, ExecutionPatch, TriggerContext};
use cronpilot_domain::id::{AutomationId, ChatId, ExecutionId};
use cronpilot_domain::inbox::{InboxChat, InboxEntry, InboxMessage};

use crate::ports::{
    AiProvider, AutomationRepository, Completion, CompletionOptions, ExecutionRepository,
    InboxRepository, InboxSink,
};
use crate::scheduler::{BoxFuture, FireHandler};

fn not_found(entity: &'static str, id: impl ToString) -> CronpilotError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
    .into()
}

/// Let spawned firings run to completion on the current-thread test runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub struct InMemoryAutomationRepo {
    store: Mutex<HashMap<AutomationId, Automation>>,
}

impl InMemoryAutomationRepo {
    pub fn with(automations: Vec<Automation>) -> Self {
        let repo = Self::default();
        {
            let mut store = repo.store.lock().unwrap();
            for automation in automations {
                store.insert(automation.id, automation);
            }
        }
        repo
    }

    pub fn snapshot(&self, id: AutomationId) -> Option<Automation> {
        self.store.lock().unwrap().get(&id).cloned()
    }
}

impl AutomationRepository for InMemoryAutomationRepo {
    async fn create(&self, automation: Automation) -> Result<Automation, CronpilotError> {
        self.store
            .lock()
            .unwrap()
            .insert(automation.id, automation.clone());
        Ok(automation)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<Automation>, CronpilotError> {
        Ok(self.snapshot(id))
    }

    async fn get_all(&self) -> Result<Vec<Automation>, CronpilotError> {
        let mut all: Vec<_> = self.store.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|a| a.created_at);
        Ok(all)
    }

    async fn get_enabled(&self) -> Result<Vec<Automation>, CronpilotError> {
        let all = self.get_all().await?;
        Ok(all.into_iter().filter(|a| a.enabled).collect())
    }

    async fn update(&self, automation: Automation) -> Result<Automation, CronpilotError> {
        let mut store = self.store.lock().unwrap();
        if !store.contains_key(&automation.id) {
            return Err(not_found("automation", automation.id));
        }
        store.insert(automation.id, automation.clone());
        Ok(automation)
    }

    async fn delete(&self, id: AutomationId) -> Result<(), CronpilotError> {
        self.store
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("automation", id))
    }

    async fn record_run(
        &self,
        id: AutomationId,
        record: RunRecord,
    ) -> Result<Option<Automation>, CronpilotError> {
        let mut store = self.store.lock().unwrap();
        Ok(store.get_mut(&id).map(|automation| {
            automation.apply_run(&record);
            automation.clone()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryExecutionRepo {
    store: Mutex<Vec<Execution>>,
    fail_updates: bool,
}

impl InMemoryExecutionRepo {
    /// A repository whose `update` always fails with a storage error.
    pub fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn all(&self) -> Vec<Execution> {
        self.store.lock().unwrap().clone()
    }

    pub fn find(&self, id: ExecutionId) -> Option<Execution> {
        self.store
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }
}

impl ExecutionRepository for InMemoryExecutionRepo {
    async fn create(&self, execution: Execution) -> Result<Execution, CronpilotError> {
        self.store.lock().unwrap().push(execution.clone());
        Ok(execution)
    }

    async fn get_by_id(&self, id: ExecutionId) -> Result<Option<Execution>, CronpilotError> {
        Ok(self.find(id))
    }

    async fn update(
        &self,
        id: ExecutionId,
        patch: ExecutionPatch,
    ) -> Result<Execution, CronpilotError> {
        if self.fail_updates {
            return Err(CronpilotError::Storage("disk full".into()));
        }
        let mut store = self.store.lock().unwrap();
        let execution = store
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found("execution", id))?;
        execution.apply(&patch)?;
        Ok(execution.clone())
    }

    async fn list_by_automation(
        &self,
        automation_id: AutomationId,
        limit: usize,
    ) -> Result<Vec<Execution>, CronpilotError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .iter()
            .rev()
            .filter(|e| e.automation_id == automation_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Execution>, CronpilotError> {
        let store = self.store.lock().unwrap();
        Ok(store.iter().rev().take(limit).cloned().collect())
    }
}

/// Scripted behaviour of [`FakeProvider`].
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(ProviderError),
}

pub struct FakeProvider {
    reply: Reply,
    available: bool,
    delay: Option<Duration>,
    prompts: Mutex<Vec<(String, CompletionOptions)>>,
}

impl FakeProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Text(text.to_string()),
            available: true,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            reply: Reply::Fail(err),
            ..Self::replying("")
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::replying("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<(String, CompletionOptions)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl AiProvider for FakeProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Text(text) => Ok(Completion {
                text: text.clone(),
                model: options.model.clone(),
            }),
            Reply::Fail(err) => Err(err.clone()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryInbox {
    chats: Mutex<Vec<InboxChat>>,
    messages: Mutex<Vec<InboxMessage>>,
    fail: bool,
}

impl InMemoryInbox {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn chats(&self) -> Vec<InboxChat> {
        self.chats.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<InboxMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl InboxSink for InMemoryInbox {
    async fn create_entry(&self, entry: InboxEntry) -> Result<ChatId, CronpilotError> {
        if self.fail {
            return Err(CronpilotError::Storage("inbox unavailable".into()));
        }
        let (chat, message) = entry.into_records();
        let id = chat.id;
        self.chats.lock().unwrap().push(chat);
        self.messages.lock().unwrap().push(message);
        Ok(id)
    }
}

impl InboxRepository for InMemoryInbox {
    async fn list_chats(&self, limit: usize) -> Result<Vec<InboxChat>, CronpilotError> {
        Ok(self.chats().into_iter().rev().take(limit).collect())
    }

    async fn get_chat(&self, id: ChatId) -> Result<Option<InboxChat>, CronpilotError> {
        Ok(self.chats().into_iter().find(|c| c.id == id))
    }

    async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<InboxMessage>, CronpilotError> {
        Ok(self
            .messages()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .collect())
    }
}

/// [`FireHandler`] that only records what it was asked to run.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<(AutomationId, TriggerContext)>>,
    error: Option<String>,
}

impl RecordingHandler {
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(AutomationId, TriggerContext)> {
        self.calls.lock().unwrap().clone()
    }
}

impl FireHandler for RecordingHandler {
    fn fire(
        &self,
        automation_id: AutomationId,
        context: TriggerContext,
    ) -> BoxFuture<'_, Result<ExecutionId, CronpilotError>> {
        self.calls.lock().unwrap().push((automation_id, context));
        let result = match &self.error {
            Some(message) => Err(ProviderError::RateLimited(message.clone()).into()),
            None => Ok(ExecutionId::new()),
        };
        Box::pin(async move { result })
    }
}
