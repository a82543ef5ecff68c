//! JSON REST handlers for the inbox.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};

use cronpilot_app::ports::{AiProvider, AutomationRepository, ExecutionRepository, InboxRepository};
use cronpilot_domain::id::ChatId;
use cronpilot_domain::inbox::{InboxChat, InboxMessage};

use super::{LimitQuery, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the chat list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<InboxChat>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the messages endpoint.
pub enum MessagesResponse {
    Ok(Json<Vec<InboxMessage>>),
}

impl IntoResponse for MessagesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/inbox?limit=`: most recent inbox chats.
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
    let chats = state.inbox_service.list_chats(query.limit).await?;
    Ok(ListResponse::Ok(Json(chats)))
}

/// `GET /api/inbox/{chat_id}/messages`: messages of one chat, oldest first.
pub async fn messages<AR, ER, AI, IR>(
    State(state): State<AppState<AR, ER, AI, IR>>,
    Path(chat_id): Path<String>,
) -> Result<MessagesResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    ER: ExecutionRepository + Send + Sync + 'static,
    AI: AiProvider + Send + Sync + 'static,
    IR: InboxRepository + Send + Sync + 'static,
{
    let chat_id: ChatId = parse_id(&chat_id)?;
    let messages = state.inbox_service.get_messages(chat_id).await?;
    Ok(MessagesResponse::Ok(Json(messages)))
}
