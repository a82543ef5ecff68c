//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod executions;
#[allow(clippy::missing_errors_doc)]
pub mod inbox;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};
use serde::Deserialize;

use cronpilot_app::ports::{AiProvider, AutomationRepository, ExecutionRepository, InboxRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// `?limit=` query accepted by the history endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Parse an identifier path segment.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid_id(raw))
}

/// Build the `/api` sub-router.
pub fn routes<AR, ER, AI, IR>() -> Router<AppState<AR, ER, AI, IR>>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<AR, ER, AI, IR>).post(automations::create::<AR, ER, AI, IR>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<AR, ER, AI, IR>)
                .put(automations::update::<AR, ER, AI, IR>)
                .delete(automations::delete::<AR, ER, AI, IR>),
        )
        .route(
            "/automations/{id}/execute",
            post(automations::execute::<AR, ER, AI, IR>),
        )
        .route(
            "/automations/{id}/executions",
            get(automations::executions::<AR, ER, AI, IR>),
        )
        // Executions
        .route("/executions", get(executions::list::<AR, ER, AI, IR>))
        .route("/executions/{id}", get(executions::get::<AR, ER, AI, IR>))
        // Inbox
        .route("/inbox", get(inbox::list::<AR, ER, AI, IR>))
        .route(
            "/inbox/{chat_id}/messages",
            get(inbox::messages::<AR, ER, AI, IR>),
        )
}
