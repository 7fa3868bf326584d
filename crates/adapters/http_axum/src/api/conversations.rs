//! Conversational endpoint for chat front-ends.
//!
//! A transport (Telegram bot, CLI, ...) forwards each user input here and
//! renders the returned text, step and reminder page.

use axum::Json;
use axum::extract::{Path, State};

use glowminder_app::ports::{Clock, ReminderRepository, TaskQueue};
use glowminder_app::services::conversation_service::ConversationReply;
use glowminder_domain::conversation::{ConversationInput, ConversationStep};
use glowminder_domain::id::OwnerId;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/conversations/{owner_id}`
pub async fn handle<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Path(owner_id): Path<i64>,
    Json(input): Json<ConversationInput>,
) -> Result<Json<ConversationReply>, ApiError>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    let reply = state
        .conversation_service
        .handle(OwnerId::new(owner_id), input)
        .await?;
    Ok(Json(reply))
}

/// `GET /api/conversations/{owner_id}` — where the owner is in the flow, so a
/// restarted front-end can pick up where it left off.
pub async fn step<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Path(owner_id): Path<i64>,
) -> Json<ConversationStep>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    Json(state.conversation_service.step(OwnerId::new(owner_id)).await)
}
