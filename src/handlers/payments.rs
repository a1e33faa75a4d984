// src/handlers/payments.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{CurrentUser, RequireAdmin},
    models::payment::{CheckoutPayload, DecisionPayload, GatewayConfirmQuery},
};

pub async fn checkout(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let transaction = app_state
        .payment_service
        .checkout(&pool, session.user.id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn decide(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let transaction = app_state
        .payment_service
        .decide(
            &pool,
            transaction_id,
            payload.decision,
            payload.rejection_reason.as_deref(),
        )
        .await?;
    Ok(Json(transaction))
}

/// URL de retorno do gateway, sem sessão (quem chega aqui é o
/// redirecionamento do checkout externo). Os metadados da sessão do
/// gateway dizem quem é o aluno e o curso.
pub async fn confirm(
    State(app_state): State<AppState>,
    Query(query): Query<GatewayConfirmQuery>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = app_state.payment_service.confirm_from_gateway(&query.session_id).await?;
    Ok(Json(transaction))
}

pub async fn list_transactions(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let transactions = app_state.payment_service.list(&pool).await?;
    Ok(Json(transactions))
}
