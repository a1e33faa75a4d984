// src/db/certificate_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::certificate::{Certificate, CertificateType},
};

#[derive(Clone)]
pub struct CertificateRepository;

impl CertificateRepository {
    /// Próximo número de sequência do dia. O UPDATE da linha do contador
    /// serializa emissões concorrentes pelo lock de linha do Postgres:
    /// duas requisições no mesmo dia nunca recebem a mesma sequência.
    pub async fn next_daily_sequence<'e, E>(
        &self,
        executor: E,
        day: NaiveDate,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let seq = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO certificate_counters (day, last_seq)
            VALUES ($1, 1)
            ON CONFLICT (day)
            DO UPDATE SET last_seq = certificate_counters.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(day)
        .fetch_one(executor)
        .await?;
        Ok(seq)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Option<Uuid>,
        certificate_number: &str,
        certificate_type: CertificateType,
        reason: Option<&str>,
    ) -> Result<Certificate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (user_id, course_id, certificate_number, certificate_type, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(certificate_number)
        .bind(certificate_type)
        .bind(reason)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Número de certificado já emitido."))
    }

    pub async fn list_by_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<Certificate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE user_id = $1 ORDER BY completion_date DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(certificates)
    }

    pub async fn list_by_course<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Vec<Certificate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE course_id = $1 ORDER BY completion_date DESC",
        )
        .bind(course_id)
        .fetch_all(executor)
        .await?;
        Ok(certificates)
    }
}
