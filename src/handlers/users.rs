// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, middleware::session::RequireAdmin,
    models::auth::CreateUserPayload,
};

pub async fn create_user(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let user = app_state.auth_service.create_user(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let users = app_state.user_repo.list(&pool).await?;
    Ok(Json(users))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    if !app_state.user_repo.delete(&pool, user_id).await? {
        return Err(AppError::NotFound("Usuário não encontrado.".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
