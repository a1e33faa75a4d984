// src/db/assessment_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::assessment::{AssessmentAttempt, GradeResult, QuizAttempt},
};

// Registros de tentativas: pré-teste, avaliação final e quizzes de aula.
// Todos append-only.
#[derive(Clone)]
pub struct AssessmentRepository;

impl AssessmentRepository {
    pub async fn has_pre_test_attempt<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pre_test_attempts WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn count_final_attempts<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM final_assessment_attempts WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn insert_pre_test_attempt<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
        grade: GradeResult,
    ) -> Result<AssessmentAttempt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AssessmentAttempt>(
            r#"
            INSERT INTO pre_test_attempts (user_id, course_id, score, total, passed)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(grade.score)
        .bind(grade.total)
        .bind(grade.passed)
        .fetch_one(executor)
        .await
        // O índice único (user, course) pega a corrida entre a checagem
        // "já tentou?" e a gravação.
        .map_err(|e| AppError::conflict_on_unique(e, "O pré-teste só pode ser feito uma vez."))
    }

    pub async fn insert_final_attempt<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
        grade: GradeResult,
    ) -> Result<AssessmentAttempt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let attempt = sqlx::query_as::<_, AssessmentAttempt>(
            r#"
            INSERT INTO final_assessment_attempts (user_id, course_id, score, total, passed)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(grade.score)
        .bind(grade.total)
        .bind(grade.passed)
        .fetch_one(executor)
        .await?;
        Ok(attempt)
    }

    pub async fn insert_quiz_attempt<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lesson_id: Uuid,
        grade: GradeResult,
    ) -> Result<QuizAttempt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, lesson_id, score, total, passed)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(grade.score)
        .bind(grade.total)
        .bind(grade.passed)
        .fetch_one(executor)
        .await?;
        Ok(attempt)
    }
}
