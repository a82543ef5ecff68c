//! Inbox service: read side of the conversations created by automations.

use std::sync::Arc;

use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::id::ChatId;
use cronpilot_domain::inbox::{InboxChat, InboxMessage};

use super::execution_service::clamp_limit;
use crate::ports::InboxRepository;

/// Application service for reading the inbox.
pub struct InboxService<R> {
    repo: Arc<R>,
}

impl<R: InboxRepository> InboxService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Most recent chats, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_chats(&self, limit: Option<usize>) -> Result<Vec<InboxChat>, CronpilotError> {
        self.repo.list_chats(clamp_limit(limit)).await
    }

    /// Messages of one chat, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CronpilotError::NotFound`] when the chat does not exist, or a
    /// storage error from the repository.
    pub async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<InboxMessage>, CronpilotError> {
        if self.repo.get_chat(chat_id).await?.is_none() {
            return Err(chat_id.not_found().into());
        }
        self.repo.get_messages(chat_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InboxSink;
    use crate::testing::InMemoryInbox;
    use cronpilot_domain::id::{AutomationId, ExecutionId};
    use cronpilot_domain::inbox::InboxEntry;

    #[tokio::test]
    async fn should_return_messages_of_existing_chat() {
        let inbox = Arc::new(InMemoryInbox::default());
        let chat_id = inbox
            .create_entry(InboxEntry {
                title: "Digest".to_string(),
                text: "Hello".to_string(),
                automation_id: AutomationId::new(),
                execution_id: ExecutionId::new(),
            })
            .await
            .unwrap();
        let svc = InboxService::new(Arc::clone(&inbox));

        let messages = svc.get_messages(chat_id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(svc.list_chats(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_chat() {
        let svc = InboxService::new(Arc::new(InMemoryInbox::default()));
        let result = svc.get_messages(ChatId::new()).await;
        assert!(matches!(result, Err(CronpilotError::NotFound(_))));
    }
}
