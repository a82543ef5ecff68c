//! Inbox: conversations created by automations for the user to read.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{AutomationId, ChatId, ExecutionId, MessageId};
use crate::time::{self, Timestamp};

/// Well-known destination every automation-created chat belongs to.
pub const INBOX_DESTINATION: &str = "inbox";

/// Author of an inbox message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

/// Request to post one AI result into the inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxEntry {
    pub title: String,
    pub text: String,
    pub automation_id: AutomationId,
    pub execution_id: ExecutionId,
}

/// A conversation container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxChat {
    pub id: ChatId,
    pub title: String,
    pub destination: String,
    pub automation_id: Option<AutomationId>,
    pub execution_id: Option<ExecutionId>,
    pub created_at: Timestamp,
}

/// One message inside an [`InboxChat`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: Timestamp,
}

impl InboxEntry {
    /// Split the entry into the chat and its single assistant message.
    #[must_use]
    pub fn into_records(self) -> (InboxChat, InboxMessage) {
        let now = time::now();
        let chat = InboxChat {
            id: ChatId::new(),
            title: self.title,
            destination: INBOX_DESTINATION.to_string(),
            automation_id: Some(self.automation_id),
            execution_id: Some(self.execution_id),
            created_at: now,
        };
        let message = InboxMessage {
            id: MessageId::new(),
            chat_id: chat.id,
            role: MessageRole::Assistant,
            content: self.text,
            created_at: now,
        };
        (chat, message)
    }
}
