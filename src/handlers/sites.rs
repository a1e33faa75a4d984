// src/handlers/sites.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, middleware::session::RequireSuperAdmin,
    models::site::CreateSitePayload,
};

/// Listagem pública (a tela de login precisa dela antes de haver sessão).
pub async fn list_sites(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sites = app_state.site_service.list_sites().await?;
    Ok(Json(sites))
}

pub async fn create_site(
    State(app_state): State<AppState>,
    _guard: RequireSuperAdmin,
    Json(payload): Json<CreateSitePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let site = app_state.site_service.create_site(&payload.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(site)))
}

pub async fn delete_site(
    State(app_state): State<AppState>,
    _guard: RequireSuperAdmin,
    Path(site_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.site_service.delete_site(&site_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
