// src/handlers/assessments.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::CurrentUser,
    models::assessment::SubmitAnswersPayload,
};

pub async fn get_pre_test(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let questions = app_state
        .assessment_service
        .pre_test_for_student(&pool, &session, course_id)
        .await?;
    Ok(Json(questions))
}

pub async fn submit_pre_test(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<SubmitAnswersPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let grade = app_state
        .assessment_service
        .submit_pre_test(&pool, &session, course_id, &payload.answers)
        .await?;
    Ok(Json(grade))
}

pub async fn get_final_assessment(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let questions = app_state
        .assessment_service
        .final_assessment_for_student(&pool, &session, course_id)
        .await?;
    Ok(Json(questions))
}

pub async fn submit_final_assessment(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<SubmitAnswersPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let grade = app_state
        .assessment_service
        .submit_final_assessment(&pool, &session, course_id, &payload.answers)
        .await?;
    Ok(Json(grade))
}

pub async fn submit_quiz(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmitAnswersPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let grade = app_state
        .assessment_service
        .submit_quiz(&pool, &session, course_id, lesson_id, &payload.answers)
        .await?;
    Ok(Json(grade))
}
