use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::filter::{EventQuery, ListEventsParams};
use crate::models::EventInput;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::utils::response::{created, no_content, ok};

pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(input): AppJson<EventInput>,
) -> AppResult<Response> {
    input.validate()?;

    let event = state.store.create_event(user.id, input).await?;
    tracing::info!(event_id = %event.id, user_id = %user.id, "Created event");

    Ok(created(event))
}

pub async fn list_events(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListEventsParams>,
) -> AppResult<Response> {
    let query = EventQuery::from_params(&params, Utc::now())?;
    let events = state.store.list_events(&query).await?;

    tracing::debug!(?query, count = events.len(), "Listed events");
    Ok(ok(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let event = state
        .store
        .find_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id {} not found", id)))?;

    Ok(ok(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<EventInput>,
) -> AppResult<Response> {
    input.validate()?;

    let event = state.store.update_event(user.id, id, input).await?;
    tracing::info!(event_id = %event.id, user_id = %user.id, "Updated event");

    Ok(ok(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    state.store.delete_event(user.id, id).await?;
    tracing::info!(event_id = %id, user_id = %user.id, "Deleted event");

    Ok(no_content())
}
