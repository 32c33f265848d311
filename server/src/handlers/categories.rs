use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::AppPath;
use crate::utils::response::ok;

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Response> {
    let categories = state.store.list_categories().await?;
    Ok(ok(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Response> {
    let category = state
        .store
        .find_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;

    Ok(ok(category))
}
