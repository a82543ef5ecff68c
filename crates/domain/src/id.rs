//! Identifiers of the records cronpilot stores.
//!
//! Every identifier is a random v4 UUID. The text form is the lowercase
//! hyphenated UUID, which is also how the identifiers are stored and how they
//! appear in URLs. Parsing tolerates surrounding whitespace and reports a
//! [`ValidationError::InvalidId`] carrying the rejected input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NotFoundError, ValidationError};

macro_rules! record_ids {
    ($($(#[doc = $doc:expr])* $name:ident => $kind:literal;)+) => {$(
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Record kind, as used in lookup errors.
            pub const KIND: &'static str = $kind;

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The error reported when nothing is stored under this id.
            #[must_use]
            pub fn not_found(self) -> NotFoundError {
                NotFoundError {
                    entity: Self::KIND,
                    id: self.to_string(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidId(s.to_string()))
            }
        }
    )+};
}

record_ids! {
    /// Identifies an [`Automation`](crate::automation::Automation).
    AutomationId => "automation";
    /// Identifies an [`Execution`](crate::execution::Execution).
    ExecutionId => "execution";
    /// Identifies an [`InboxChat`](crate::inbox::InboxChat).
    ChatId => "chat";
    /// Identifies an [`InboxMessage`](crate::inbox::InboxMessage).
    MessageId => "message";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_as_lowercase_hyphenated_uuid() {
        let text = ExecutionId::new().to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text.matches('-').count(), 4);
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn should_parse_stored_text_back_to_same_id() {
        let id = AutomationId::new();
        assert_eq!(id.to_string().parse::<AutomationId>().unwrap(), id);
    }

    #[test]
    fn should_normalize_uppercase_and_padded_input() {
        let parsed: ChatId = "  67E55044-10B1-426F-9247-BB680E5FE0C8 \n".parse().unwrap();
        assert_eq!(parsed.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn should_report_rejected_input_when_parse_fails() {
        let err = "42".parse::<ExecutionId>().unwrap_err();
        assert_eq!(err, ValidationError::InvalidId("42".to_string()));
        assert_eq!(err.to_string(), "invalid identifier `42`");
    }

    #[test]
    fn should_name_record_kind_in_not_found_error() {
        let id = MessageId::new();
        let err = id.not_found();
        assert_eq!(err.entity, "message");
        assert_eq!(err.to_string(), format!("message {id} not found"));
        assert_eq!(ChatId::KIND, "chat");
    }

    #[test]
    fn should_serialize_as_bare_string() {
        let id = AutomationId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
        assert_eq!(serde_json::from_value::<AutomationId>(json).unwrap(), id);
    }
}
