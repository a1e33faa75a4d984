// src/handlers/certificates.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{CurrentUser, RequireAdmin},
    models::certificate::{CreateSignatoryPayload, RecognitionPayload},
};

pub async fn my_certificates(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let certificates = app_state
        .certificate_service
        .list_for_user(&pool, session.user.id)
        .await?;
    Ok(Json(certificates))
}

pub async fn course_certificates(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let certificates = app_state
        .certificate_service
        .list_for_course(&pool, course_id)
        .await?;
    Ok(Json(certificates))
}

/// Signatários de um certificado já emitido: a fotografia, não a lista
/// atual do curso.
pub async fn certificate_signatories(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(certificate_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let signatories = app_state
        .certificate_service
        .signatories_of(&pool, certificate_id)
        .await?;
    Ok(Json(signatories))
}

pub async fn issue_recognition(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(payload): Json<RecognitionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;

    if app_state.user_repo.find_by_id(&pool, payload.user_id).await?.is_none() {
        return Err(AppError::NotFound("Usuário não encontrado.".into()));
    }
    let certificate = app_state
        .certificate_service
        .issue_recognition(&pool, payload.user_id, payload.reason.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

pub async fn create_signatory(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(payload): Json<CreateSignatoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let signatory = app_state
        .signatory_repo
        .create(&pool, &payload.name, &payload.position, payload.signature_image_path.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(signatory)))
}

pub async fn list_signatories(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let signatories = app_state.signatory_repo.list(&pool).await?;
    Ok(Json(signatories))
}

pub async fn delete_signatory(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(signatory_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    if !app_state.signatory_repo.delete(&pool, signatory_id).await? {
        return Err(AppError::NotFound("Signatário não encontrado.".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
