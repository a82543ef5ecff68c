//! JSON REST handlers for execution history.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};

use cronpilot_app::ports::{AiProvider, AutomationRepository, ExecutionRepository, InboxRepository};
use cronpilot_domain::execution::Execution;
use cronpilot_domain::id::ExecutionId;

use super::{LimitQuery, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Execution>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Execution>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/executions?limit=`: most recent executions across automations.
pub async fn list<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Query(query): Query<LimitQuery>,
) -> Result<ListResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let executions = state.execution_service.list_recent(query.limit).await?;
    Ok(ListResponse::Ok(Json(executions)))
}

/// `GET /api/executions/{id}`: get one execution.
pub async fn get<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let execution_id: ExecutionId = parse_id(&id)?;
    let execution = state.execution_service.get_execution(execution_id).await?;
    Ok(GetResponse::Ok(Json(execution)))
}
