//! Trigger: the condition that makes an automation fire.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::schedule::CronSchedule;

/// Describes when an automation should fire.
///
/// Only cron triggers are implemented. Any other `type` found in stored data
/// deserializes to [`Trigger::Unknown`] and is ignored by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires on a 5-field cron expression (e.g. `"0 8 * * *"`).
    Cron {
        expression: String,
        /// Strict triggers are never backfilled after a restart.
        #[serde(default)]
        strict: bool,
    },
    /// A trigger type this version does not know about.
    #[serde(other)]
    Unknown,
}

impl Trigger {
    /// Shorthand for a non-strict cron trigger.
    #[must_use]
    pub fn cron(expression: impl Into<String>) -> Self {
        Self::Cron {
            expression: expression.into(),
            strict: false,
        }
    }

    /// Shorthand for a strict cron trigger.
    #[must_use]
    pub fn strict_cron(expression: impl Into<String>) -> Self {
        Self::Cron {
            expression: expression.into(),
            strict: true,
        }
    }

    /// The `type` discriminator.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cron { .. } => "cron",
            Self::Unknown => "unknown",
        }
    }

    /// Check that the trigger definition is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCron`] for an unparsable cron expression.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Cron { expression, .. } => CronSchedule::parse(expression).map(|_| ()),
            Self::Unknown => Ok(()),
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cron {
                expression,
                strict: true,
            } => write!(f, "cron({expression}, strict)"),
            Self::Cron { expression, .. } => write!(f, "cron({expression})"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_strict_to_false_when_missing() {
        let trigger: Trigger =
            serde_json::from_str(r#"{"type":"cron","expression":"0 * * * *"}"#).unwrap();
        assert_eq!(trigger, Trigger::cron("0 * * * *"));
    }

    #[test]
    fn should_parse_strict_cron_trigger() {
        let trigger: Trigger =
            serde_json::from_str(r#"{"type":"cron","expression":"0 8 * * *","strict":true}"#)
                .unwrap();
        assert_eq!(trigger, Trigger::strict_cron("0 8 * * *"));
    }

    #[test]
    fn should_fall_back_to_unknown_for_unsupported_type() {
        let trigger: Trigger =
            serde_json::from_str(r#"{"type":"webhook","url":"https://example.com"}"#).unwrap();
        assert_eq!(trigger, Trigger::Unknown);
        assert_eq!(trigger.kind(), "unknown");
    }

    #[test]
    fn should_validate_cron_expression() {
        assert!(Trigger::cron("0 8 * * *").validate().is_ok());
        assert!(matches!(
            Trigger::cron("every day").validate(),
            Err(ValidationError::InvalidCron { .. })
        ));
    }

    #[test]
    fn should_accept_unknown_trigger_during_validation() {
        assert!(Trigger::Unknown.validate().is_ok());
    }

    #[test]
    fn should_display_trigger_variants() {
        assert_eq!(Trigger::cron("0 8 * * *").to_string(), "cron(0 8 * * *)");
        assert_eq!(
            Trigger::strict_cron("0 8 * * *").to_string(),
            "cron(0 8 * * *, strict)"
        );
        assert_eq!(Trigger::Unknown.to_string(), "unknown");
    }
}
