// src/db/signatory_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::certificate::Signatory};

#[derive(Clone)]
pub struct SignatoryRepository;

impl SignatoryRepository {
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        position: &str,
        signature_image_path: Option<&str>,
    ) -> Result<Signatory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatory = sqlx::query_as::<_, Signatory>(
            r#"
            INSERT INTO signatories (name, position, signature_image_path)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(position)
        .bind(signature_image_path)
        .fetch_one(executor)
        .await?;
        Ok(signatory)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Signatory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatories =
            sqlx::query_as::<_, Signatory>("SELECT * FROM signatories ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(signatories)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM signatories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_course_assignments<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM course_signatories WHERE course_id = $1")
            .bind(course_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Inserção em lote, parametrizada com unnest. Nada de montar listas
    /// de placeholders na mão.
    pub async fn assign_to_course<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        signatory_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO course_signatories (course_id, signatory_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(signatory_ids)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_for_course<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Vec<Signatory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatories = sqlx::query_as::<_, Signatory>(
            r#"
            SELECT s.*
            FROM signatories s
            JOIN course_signatories cs ON cs.signatory_id = s.id
            WHERE cs.course_id = $1
            ORDER BY s.name ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(executor)
        .await?;
        Ok(signatories)
    }

    /// Copia, num único INSERT .. SELECT, os signatários ATUAIS do curso
    /// para o certificado. Mudanças futuras no curso não afetam
    /// certificados já emitidos.
    pub async fn snapshot_to_certificate<'e, E>(
        &self,
        executor: E,
        certificate_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO certificate_signatories (certificate_id, signatory_id)
            SELECT $1, signatory_id FROM course_signatories WHERE course_id = $2
            "#,
        )
        .bind(certificate_id)
        .bind(course_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_for_certificate<'e, E>(
        &self,
        executor: E,
        certificate_id: Uuid,
    ) -> Result<Vec<Signatory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatories = sqlx::query_as::<_, Signatory>(
            r#"
            SELECT s.*
            FROM signatories s
            JOIN certificate_signatories cs ON cs.signatory_id = s.id
            WHERE cs.certificate_id = $1
            ORDER BY s.name ASC
            "#,
        )
        .bind(certificate_id)
        .fetch_all(executor)
        .await?;
        Ok(signatories)
    }
}
