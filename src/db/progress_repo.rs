// src/db/progress_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct ProgressRepository;

impl ProgressRepository {
    /// A aula já estava marcada como concluída para este usuário?
    /// Consultado ANTES do upsert para manter a conclusão idempotente.
    pub async fn is_completed<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let completed = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_progress
                WHERE user_id = $1 AND lesson_id = $2 AND completed = TRUE
            )
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(executor)
        .await?;
        Ok(completed)
    }

    pub async fn mark_completed<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_progress (user_id, lesson_id, completed)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_id, lesson_id)
            DO UPDATE SET completed = TRUE, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Aulas do curso já concluídas por este usuário.
    pub async fn count_completed_in_course<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_progress up
            JOIN lessons l ON l.id = up.lesson_id
            JOIN modules m ON m.id = l.module_id
            WHERE up.user_id = $1 AND m.course_id = $2 AND up.completed = TRUE
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Reset de retreinamento para um aluno. Certificados NUNCA são
    /// apagados, só o progresso.
    pub async fn delete_for_user_in_course<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM user_progress
            WHERE user_id = $1
              AND lesson_id IN (
                  SELECT l.id FROM lessons l
                  JOIN modules m ON m.id = l.module_id
                  WHERE m.course_id = $2
              )
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Reset de coorte: apaga o progresso do curso para todos os alunos
    /// que já possuem certificado de conclusão dele.
    pub async fn delete_for_certified_cohort<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM user_progress
            WHERE lesson_id IN (
                  SELECT l.id FROM lessons l
                  JOIN modules m ON m.id = l.module_id
                  WHERE m.course_id = $1
              )
              AND user_id IN (
                  SELECT DISTINCT user_id FROM certificates
                  WHERE course_id = $1 AND certificate_type = 'completion'
              )
            "#,
        )
        .bind(course_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
