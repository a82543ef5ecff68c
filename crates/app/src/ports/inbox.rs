//! Inbox ports: the action sink that receives AI results, and its read side.

use std::future::Future;

use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::id::ChatId;
use cronpilot_domain::inbox::{InboxChat, InboxEntry, InboxMessage};

/// Creates inbox conversations from AI results.
pub trait InboxSink {
    /// Create a chat tagged with the inbox destination, holding one assistant
    /// message with `entry.text`. Returns the new chat id.
    fn create_entry(
        &self,
        entry: InboxEntry,
    ) -> impl Future<Output = Result<ChatId, CronpilotError>> + Send;
}

/// Read access to the inbox.
pub trait InboxRepository {
    /// Most recent inbox chats, newest first.
    fn list_chats(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<InboxChat>, CronpilotError>> + Send;

    /// Get a chat by its unique identifier.
    fn get_chat(
        &self,
        id: ChatId,
    ) -> impl Future<Output = Result<Option<InboxChat>, CronpilotError>> + Send;

    /// Messages of one chat, oldest first.
    fn get_messages(
        &self,
        chat_id: ChatId,
    ) -> impl Future<Output = Result<Vec<InboxMessage>, CronpilotError>> + Send;
}
