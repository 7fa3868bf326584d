//! JSON REST handlers for reminders.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use glowminder_app::ports::{Clock, ReminderRepository, TaskQueue};
use glowminder_domain::error::ValidationError;
use glowminder_domain::glow::{Colour, Mode};
use glowminder_domain::id::{OwnerId, ReminderId};
use glowminder_domain::reminder::{Reminder, ReminderFilter, ReminderPatch};
use glowminder_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a reminder.
#[derive(Deserialize)]
pub struct CreateReminderRequest {
    pub owner_id: OwnerId,
    pub message: String,
    pub colour: Colour,
    pub mode: Mode,
    pub scheduled_at: Timestamp,
}

/// Request body for a partial update. Absent fields are left untouched.
#[derive(Deserialize)]
pub struct UpdateReminderRequest {
    pub colour: Option<Colour>,
    pub mode: Option<Mode>,
    pub scheduled_at: Option<Timestamp>,
}

pub enum ListResponse {
    Ok(Json<Vec<Reminder>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Response of the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Reminder>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum CreateResponse {
    Created(Json<Reminder>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

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

fn parse_id(id: &str) -> Result<ReminderId, ApiError> {
    ReminderId::from_str(id)
        .map_err(|_| ApiError::from(ValidationError::InvalidIdentifier(id.to_string())))
}

/// `GET /api/reminders?owner_id=&limit=&offset=`
pub async fn list<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Query(filter): Query<ReminderFilter>,
) -> Result<ListResponse, ApiError>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    let reminders = state.reminder_service.list_reminders(filter).await?;
    Ok(ListResponse::Ok(Json(reminders)))
}

/// `GET /api/reminders/{id}`
pub async fn get<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    let reminder = state.reminder_service.get_reminder(parse_id(&id)?).await?;
    Ok(GetResponse::Ok(Json(reminder)))
}

/// `POST /api/reminders`
pub async fn create<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Json(req): Json<CreateReminderRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    let reminder = Reminder::builder()
        .owner_id(req.owner_id)
        .message(req.message)
        .colour(req.colour)
        .mode(req.mode)
        .scheduled_at(req.scheduled_at)
        .created_at(state.clock.now_utc())
        .build()?;
    let created = state.reminder_service.create_reminder(reminder).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PATCH /api/reminders/{id}`
pub async fn update<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReminderRequest>,
) -> Result<GetResponse, ApiError>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    let mut patch = ReminderPatch::new(parse_id(&id)?, state.clock.now_utc());
    patch.colour = req.colour;
    patch.mode = req.mode;
    patch.scheduled_at = req.scheduled_at;
    let updated = state.reminder_service.update_reminder(patch).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/reminders/{id}`
pub async fn delete<R, Q, C>(
    State(state): State<AppState<R, Q, C>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    state.reminder_service.delete_reminder(parse_id(&id)?).await?;
    Ok(DeleteResponse::NoContent)
}
