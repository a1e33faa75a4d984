// src/handlers/progress.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::CurrentUser,
    models::progress::CompleteLessonPayload,
};

/// Conclusão de aula. Resposta: `{nextLessonId, certificateId}`, ambos
/// nulos quando o curso não tem aulas ou a última aula já estava feita.
pub async fn complete_lesson(
    State(app_state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(payload): Json<CompleteLessonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pool = app_state.stores.open(Some(&session.site_id)).await?;

    // Só quem está matriculado (ou um admin) avança progresso.
    if !session.is_admin()
        && !app_state
            .transaction_repo
            .is_enrolled(&pool, session.user.id, payload.course_id)
            .await?
    {
        return Err(AppError::Forbidden);
    }

    let advance = app_state
        .progress_service
        .complete_lesson(&pool, session.user.id, payload.course_id, payload.lesson_id)
        .await?;
    Ok(Json(advance))
}
