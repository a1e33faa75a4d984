// src/services/certificate_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CertificateRepository, SignatoryRepository},
    models::certificate::{Certificate, CertificateType, Signatory},
};

/// Formato do número: `{ORG_PREFIX}-{YYYYMMDD}-{seq de 4 dígitos}`.
/// A sequência reinicia por dia e vem do contador serializado por lock de
/// linha, nunca do padrão "conta e soma 1", que corre sob concorrência.
pub fn format_certificate_number(prefix: &str, day: NaiveDate, seq: i32) -> String {
    format!("{}-{}-{:04}", prefix, day.format("%Y%m%d"), seq)
}

#[derive(Clone)]
pub struct CertificateService {
    certificate_repo: CertificateRepository,
    signatory_repo: SignatoryRepository,
    org_prefix: String,
}

impl CertificateService {
    pub fn new(
        certificate_repo: CertificateRepository,
        signatory_repo: SignatoryRepository,
        org_prefix: String,
    ) -> Self {
        Self { certificate_repo, signatory_repo, org_prefix }
    }

    /// Emite um certificado DENTRO da transação do chamador: número,
    /// linha do certificado e a fotografia dos signatários do curso saem
    /// como uma unidade atômica.
    pub async fn issue(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        course_id: Option<Uuid>,
        certificate_type: CertificateType,
        reason: Option<&str>,
    ) -> Result<Certificate, AppError> {
        let today = Utc::now().date_naive();
        let seq = self.certificate_repo.next_daily_sequence(&mut *conn, today).await?;
        let number = format_certificate_number(&self.org_prefix, today, seq);

        let certificate = self
            .certificate_repo
            .insert(&mut *conn, user_id, course_id, &number, certificate_type, reason)
            .await?;

        if let Some(course_id) = course_id {
            self.signatory_repo
                .snapshot_to_certificate(&mut *conn, certificate.id, course_id)
                .await?;
        }

        Ok(certificate)
    }

    /// Certificado de reconhecimento: ad hoc, sem curso, mesmo esquema de
    /// numeração.
    pub async fn issue_recognition(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        reason: &str,
    ) -> Result<Certificate, AppError> {
        let mut tx = pool.begin().await?;
        let certificate = self
            .issue(&mut *tx, user_id, None, CertificateType::Recognition, Some(reason))
            .await?;
        tx.commit().await?;
        Ok(certificate)
    }

    pub async fn list_for_user(
        &self,
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Certificate>, AppError> {
        self.certificate_repo.list_by_user(pool, user_id).await
    }

    pub async fn list_for_course(
        &self,
        pool: &PgPool,
        course_id: Uuid,
    ) -> Result<Vec<Certificate>, AppError> {
        self.certificate_repo.list_by_course(pool, course_id).await
    }

    pub async fn signatories_of(
        &self,
        pool: &PgPool,
        certificate_id: Uuid,
    ) -> Result<Vec<Signatory>, AppError> {
        self.signatory_repo.list_for_certificate(pool, certificate_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numero_segue_o_formato_prefixo_data_sequencia() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(format_certificate_number("LMS", day, 7), "LMS-20260824-0007");
    }

    #[test]
    fn sequencia_acima_de_quatro_digitos_nao_e_truncada() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(format_certificate_number("ACME", day, 12345), "ACME-20260102-12345");
    }

    #[test]
    fn sequencias_do_mesmo_dia_geram_numeros_distintos() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let a = format_certificate_number("LMS", day, 1);
        let b = format_certificate_number("LMS", day, 2);
        assert_ne!(a, b);
    }
}
