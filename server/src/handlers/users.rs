use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::auth::{AccessToken, AuthUser};
use crate::filter::EventQuery;
use crate::models::{NewUser, User};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::AppJson;
use crate::utils::response::{created, ok};

#[derive(Serialize)]
struct Registration {
    user: User,
    #[serde(flatten)]
    token: AccessToken,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(new_user): AppJson<NewUser>,
) -> AppResult<Response> {
    let user = state.store.create_user(new_user.normalized()?).await?;
    let token = state.auth.issue(user.id)?;

    tracing::info!(user_id = %user.id, "Registered user");
    Ok(created(Registration { user, token }))
}

pub async fn me(AuthUser(user): AuthUser) -> Response {
    ok(user)
}

pub async fn my_events(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Response> {
    let events = state.store.list_events(&EventQuery::owned_by(user.id)).await?;
    Ok(ok(events))
}
