// src/handlers/courses.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{CurrentUser, RequireAdmin},
    models::{
        certificate::AssignSignatoriesPayload,
        course::{
            CreateCoursePayload, CreateLessonPayload, CreateModulePayload, strip_lesson_answer_key,
        },
        progress::RetrainPayload,
    },
};

pub async fn create_course(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let course = app_state.course_repo.create(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_courses(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let courses = app_state.course_repo.list(&pool).await?;
    Ok(Json(courses))
}

/// Detalhe do curso: módulos, aulas e signatários. Conteúdo com gabarito
/// (avaliações do curso e aulas de quiz) só aparece para admins; alunos
/// recebem tudo já filtrado.
pub async fn get_course(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let course = app_state
        .course_repo
        .find_by_id(&pool, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Curso não encontrado.".into()))?;

    let modules = app_state.course_repo.list_modules(&pool, course_id).await?;
    let mut lessons = app_state.course_repo.list_lessons(&pool, course_id).await?;
    if !session.is_admin() {
        lessons = lessons.into_iter().map(strip_lesson_answer_key).collect();
    }
    let signatories = app_state.signatory_repo.list_for_course(&pool, course_id).await?;

    let pre_test = course.pre_test_content.clone();
    let final_assessment = course.final_assessment_content.clone();

    let mut body = json!({
        "course": course,
        "modules": modules,
        "lessons": lessons,
        "signatories": signatories,
    });
    if session.is_admin() {
        body["preTestContent"] = json!(pre_test);
        body["finalAssessmentContent"] = json!(final_assessment);
    }
    Ok(Json(body))
}

pub async fn update_course(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let course = app_state
        .course_repo
        .update(&pool, course_id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Curso não encontrado.".into()))?;
    Ok(Json(course))
}

pub async fn create_module(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateModulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;

    if app_state.course_repo.find_by_id(&pool, course_id).await?.is_none() {
        return Err(AppError::NotFound("Curso não encontrado.".into()));
    }
    let module = app_state
        .course_repo
        .create_module(&pool, course_id, &payload.title, payload.order)
        .await?;
    Ok((StatusCode::CREATED, Json(module)))
}

pub async fn create_lesson(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(payload): Json<CreateLessonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let lesson = app_state
        .course_repo
        .create_lesson(
            &pool,
            payload.module_id,
            &payload.title,
            payload.order,
            payload.lesson_type,
            payload.content.as_ref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Substitui o conjunto de signatários do curso. Certificados já emitidos
/// guardam a fotografia antiga e não mudam.
pub async fn assign_signatories(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<AssignSignatoriesPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;

    if app_state.course_repo.find_by_id(&pool, course_id).await?.is_none() {
        return Err(AppError::NotFound("Curso não encontrado.".into()));
    }

    let mut tx = pool.begin().await?;
    app_state.signatory_repo.clear_course_assignments(&mut *tx, course_id).await?;
    if !payload.signatory_ids.is_empty() {
        app_state
            .signatory_repo
            .assign_to_course(&mut *tx, course_id, &payload.signatory_ids)
            .await?;
    }
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Reinício de treinamento: com `userId` reseta um aluno; sem ele, a
/// coorte de certificados inteira. Nunca apaga certificados.
pub async fn retrain(
    State(app_state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<RetrainPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;

    if app_state.course_repo.find_by_id(&pool, course_id).await?.is_none() {
        return Err(AppError::NotFound("Curso não encontrado.".into()));
    }

    let reset = match payload.user_id {
        Some(user_id) => {
            app_state.progress_service.retrain_user(&pool, user_id, course_id).await?
        }
        None => app_state.progress_service.retrain_cohort(&pool, course_id).await?,
    };
    Ok(Json(json!({ "progressRowsRemoved": reset })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollPayload {
    pub user_id: Option<Uuid>,
}

/// Matrícula direta: um admin matricula qualquer aluno; um aluno só a si
/// mesmo, e apenas em curso público gratuito (curso pago passa pelo
/// checkout).
pub async fn enroll(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<EnrollPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let course = app_state
        .course_repo
        .find_by_id(&pool, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Curso não encontrado.".into()))?;

    let target = match payload.user_id {
        Some(target) if target != session.user.id => {
            if !session.is_admin() {
                return Err(AppError::Forbidden);
            }
            target
        }
        _ => {
            if !session.is_admin() && (!course.is_public || course.price > Decimal::ZERO) {
                return Err(AppError::Forbidden);
            }
            session.user.id
        }
    };

    app_state.transaction_repo.enroll(&pool, target, course_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn my_courses(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;
    let ids = app_state
        .transaction_repo
        .enrolled_course_ids(&pool, session.user.id)
        .await?;

    let mut courses = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(course) = app_state.course_repo.find_by_id(&pool, id).await? {
            courses.push(course);
        }
    }
    Ok(Json(courses))
}
