//! Action: the side effect performed after a successful completion.

use serde::{Deserialize, Serialize};

/// A follow-up step run against the AI result of an execution.
///
/// Unsupported `type`s deserialize to [`Action::Unknown`] and are skipped,
/// so automations written by a newer version still run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Post the AI result as a new conversation in the inbox.
    Inbox {
        /// Conversation title; defaults to the automation name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// An action type this version does not know about.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Discriminator of [`Action::Inbox`].
    pub const INBOX: &'static str = "inbox";

    /// Shorthand for an inbox action with the default title.
    #[must_use]
    pub fn inbox() -> Self {
        Self::Inbox { title: None }
    }

    /// The `type` discriminator, used to look up a handler.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inbox { .. } => Self::INBOX,
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbox { title: Some(title) } => write!(f, "inbox({title})"),
            Self::Inbox { title: None } => f.write_str("inbox"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
