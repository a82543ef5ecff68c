//! JSON REST handlers for automations.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use cronpilot_app::ports::{AiProvider, AutomationRepository, ExecutionRepository, InboxRepository};
use cronpilot_domain::automation::{Action, AgentSettings, Automation, Trigger};
use cronpilot_domain::error::CronpilotError;
use cronpilot_domain::execution::{Execution, ExecutionStatus, TriggerContext};
use cronpilot_domain::id::{AutomationId, ExecutionId};

use super::{LimitQuery, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing an automation.
#[derive(Debug, Deserialize)]
pub struct AutomationRequest {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `true` on create and to the stored value on update.
    pub enabled: Option<bool>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub agent_prompt: String,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl AutomationRequest {
    fn into_automation(
        self,
        id: Option<AutomationId>,
        enabled: bool,
    ) -> Result<Automation, CronpilotError> {
        let mut builder = Automation::builder()
            .name(self.name)
            .enabled(self.enabled.unwrap_or(enabled))
            .agent_prompt(self.agent_prompt)
            .agent(self.agent);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        for trigger in self.triggers {
            builder = builder.trigger(trigger);
        }
        for action in self.actions {
            builder = builder.action(action);
        }
        builder.build()
    }
}

/// Outcome of a manual run.
#[derive(Debug, Serialize)]
pub struct ExecuteResult {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution: Execution,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Automation>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Automation>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Automation>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the execute endpoint.
///
/// A failed run is still `200 OK`: the request itself succeeded and the body
/// carries the failed execution.
pub enum ExecuteResponse {
    Ok(Json<ExecuteResult>),
}

impl IntoResponse for ExecuteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the history endpoint.
pub enum HistoryResponse {
    Ok(Json<Vec<Execution>>),
}

impl IntoResponse for HistoryResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/automations`: list all automations.
pub async fn list<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
) -> Result<ListResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let automations = state.automation_service.list_automations().await?;
    Ok(ListResponse::Ok(Json(automations)))
}

/// `GET /api/automations/{id}`: get automation by id.
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
    let automation_id: AutomationId = parse_id(&id)?;
    let automation = state
        .automation_service
        .get_automation(automation_id)
        .await?;
    Ok(GetResponse::Ok(Json(automation)))
}

/// `POST /api/automations`: create and schedule a new automation.
pub async fn create<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Json(req): Json<AutomationRequest>,
) -> Result<CreateResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let automation = req.into_automation(None, true)?;
    let created = state
        .automation_service
        .create_automation(automation)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/automations/{id}`: replace an automation and reschedule it.
pub async fn update<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Path(id): Path<String>,
    Json(req): Json<AutomationRequest>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let automation_id: AutomationId = parse_id(&id)?;
    let existing = state
        .automation_service
        .get_automation(automation_id)
        .await?;

    let automation = req.into_automation(Some(automation_id), existing.enabled)?;
    let updated = state
        .automation_service
        .update_automation(automation)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/automations/{id}`: delete an automation and stop its timers.
pub async fn delete<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let automation_id: AutomationId = parse_id(&id)?;
    state
        .automation_service
        .delete_automation(automation_id)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/automations/{id}/execute`: run an automation now.
///
/// The optional JSON body is stored as the execution's trigger data.
pub async fn execute<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Path(id): Path<String>,
    body: Option<Json<serde_json::Value>>,
) -> Result<ExecuteResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let automation_id: AutomationId = parse_id(&id)?;
    // Unknown ids are a 404, not a failed execution.
    state
        .automation_service
        .get_automation(automation_id)
        .await?;

    let data = body.map_or_else(|| serde_json::json!({}), |Json(data)| data);
    let outcome = state
        .orchestrator
        .execute(automation_id, TriggerContext::manual(data))
        .await?;
    let execution = state
        .execution_service
        .get_execution(outcome.execution_id)
        .await?;

    Ok(ExecuteResponse::Ok(Json(ExecuteResult {
        execution_id: execution.id,
        status: execution.status,
        error: outcome.error.map(|err| err.to_string()),
        execution,
    })))
}

/// `GET /api/automations/{id}/executions?limit=`: execution history, newest
/// first.
pub async fn executions<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<HistoryResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let automation_id: AutomationId = parse_id(&id)?;
    let executions = state
        .execution_service
        .list_for_automation(automation_id, query.limit)
        .await?;
    Ok(HistoryResponse::Ok(Json(executions)))
}
