// src/handlers/settings.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{CurrentUser, RequireAdmin},
    models::settings::PutSettingsPayload,
};

pub async fn get_settings(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let settings = app_state.settings_repo.list(&pool).await?;
    Ok(Json(settings))
}

pub async fn put_settings(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(payload): Json<PutSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;

    let mut tx = pool.begin().await?;
    for (key, value) in &payload.settings {
        app_state.settings_repo.upsert(&mut *tx, key, value).await?;
    }
    tx.commit().await?;

    Ok(Json(json!({ "updated": payload.settings.len() })))
}
