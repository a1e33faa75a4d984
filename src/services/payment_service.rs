// src/services/payment_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CourseRepository, SiteStores, TransactionRepository},
    models::{
        payment::{
            CheckoutPayload, GatewaySession, PaymentDecision, Transaction, TransactionStatus,
        },
        site::EXTERNAL_SITE_ID,
    },
};

/// Cliente do gateway de pagamento (GET /checkout_sessions/{id},
/// autenticação básica com a chave secreta).
#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PaymentGateway {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    pub async fn fetch_session(&self, session_id: &str) -> Result<GatewaySession, AppError> {
        let url = format!("{}/checkout_sessions/{}", self.base_url, session_id);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Falha na chamada ao gateway: {e}"))?;

        if !response.status().is_success() {
            return Err(AppError::BadRequest("Sessão de pagamento não encontrada no gateway.".into()));
        }

        let session = response
            .json::<GatewaySession>()
            .await
            .map_err(|e| anyhow::anyhow!("Resposta do gateway malformada: {e}"))?;
        Ok(session)
    }
}

#[derive(Clone)]
pub struct PaymentService {
    stores: Arc<SiteStores>,
    gateway: PaymentGateway,
    transaction_repo: TransactionRepository,
    course_repo: CourseRepository,
}

impl PaymentService {
    pub fn new(
        stores: Arc<SiteStores>,
        gateway: PaymentGateway,
        transaction_repo: TransactionRepository,
        course_repo: CourseRepository,
    ) -> Self {
        Self { stores, gateway, transaction_repo, course_repo }
    }

    /// Intenção de compra: cria a transação pendente e JÁ matricula o
    /// aluno (matrícula otimista), na mesma transação de banco. O aluno
    /// começa o conteúdo enquanto o pagamento é revisado.
    pub async fn checkout(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        payload: &CheckoutPayload,
    ) -> Result<Transaction, AppError> {
        let course = self
            .course_repo
            .find_by_id(pool, payload.course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Curso não encontrado.".into()))?;

        if !course.is_public || course.price <= Decimal::ZERO {
            return Err(AppError::BadRequest("Este curso não está à venda.".into()));
        }

        let mut tx = pool.begin().await?;

        if self
            .transaction_repo
            .find_non_failed(&mut *tx, user_id, payload.course_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Já existe uma compra registrada para este curso.".into(),
            ));
        }

        let transaction = self
            .transaction_repo
            .insert_pending(
                &mut *tx,
                user_id,
                payload.course_id,
                course.price,
                payload.gateway.as_deref(),
                payload.proof_image_path.as_deref(),
            )
            .await?;

        self.transaction_repo.enroll(&mut *tx, user_id, payload.course_id).await?;

        tx.commit().await?;
        Ok(transaction)
    }

    /// Decisão do admin sobre um pagamento pendente. A linha é trancada
    /// (FOR UPDATE) antes de qualquer mudança; estados terminais nunca
    /// transitam de novo.
    pub async fn decide(
        &self,
        pool: &PgPool,
        transaction_id: Uuid,
        decision: PaymentDecision,
        rejection_reason: Option<&str>,
    ) -> Result<Transaction, AppError> {
        let mut tx = pool.begin().await?;

        let transaction = self
            .transaction_repo
            .find_for_update(&mut *tx, transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transação não encontrada.".into()))?;

        let updated = match decision {
            PaymentDecision::Complete => {
                self.transition(&mut tx, &transaction, TransactionStatus::Completed, None, None)
                    .await?
                // A matrícula já existe desde o checkout; fica como está.
            }
            PaymentDecision::Reject => {
                let reason = rejection_reason
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        AppError::BadRequest("Informe o motivo da rejeição.".into())
                    })?;
                let updated = self
                    .transition(
                        &mut tx,
                        &transaction,
                        TransactionStatus::Rejected,
                        Some(reason),
                        None,
                    )
                    .await?;
                // Rejeição revoga o acesso: a matrícula otimista cai junto.
                self.transaction_repo
                    .unenroll(&mut *tx, transaction.user_id, transaction.course_id)
                    .await?;
                updated
            }
        };

        tx.commit().await?;
        Ok(updated)
    }

    /// Confirmação vinda do gateway (URL de retorno). Idempotente: se a
    /// transação já está concluída e o aluno matriculado, só reafirma.
    /// Exige metadados apontando para o site externo.
    pub async fn confirm_from_gateway(
        &self,
        session_id: &str,
    ) -> Result<Transaction, AppError> {
        let session = self.gateway.fetch_session(session_id).await?;

        let metadata = session
            .data
            .attributes
            .metadata
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Metadados do gateway ausentes.".into()))?;

        if metadata.site_id != EXTERNAL_SITE_ID {
            return Err(AppError::BadRequest("Metadados do gateway inválidos.".into()));
        }

        // Sem pagamento `paid`, ainda não há o que confirmar: 402. Se o
        // gateway já deu o pagamento como falhado/expirado, a transação
        // pendente vira `failed` antes disso, liberando uma nova compra
        // (e revogando a matrícula otimista, como na rejeição).
        if !session.has_paid_payment() {
            if session.has_failed_payment() {
                self.fail_pending(metadata.user_id, metadata.course_id, session_id).await?;
            }
            return Err(AppError::PaymentRequired);
        }

        let pool = self.stores.open(Some(EXTERNAL_SITE_ID)).await?;
        let mut tx = pool.begin().await?;

        let pending = self
            .transaction_repo
            .find_pending_for_update(&mut *tx, metadata.user_id, metadata.course_id)
            .await?;

        let transaction = match pending {
            Some(pending) => {
                let updated = self
                    .transition(
                        &mut tx,
                        &pending,
                        TransactionStatus::Completed,
                        None,
                        Some(session_id),
                    )
                    .await?;
                // Garante a matrícula sem erro de duplicata.
                self.transaction_repo
                    .enroll(&mut *tx, metadata.user_id, metadata.course_id)
                    .await?;
                updated
            }
            None => {
                // Reentrega do callback: a transação já deve estar
                // concluída. Qualquer outra coisa é um callback órfão.
                let existing = self
                    .transaction_repo
                    .find_non_failed(&mut *tx, metadata.user_id, metadata.course_id)
                    .await?
                    .filter(|t| t.status == TransactionStatus::Completed)
                    .ok_or_else(|| {
                        AppError::NotFound("Transação não encontrada para esta sessão.".into())
                    })?;
                self.transaction_repo
                    .enroll(&mut *tx, metadata.user_id, metadata.course_id)
                    .await?;
                existing
            }
        };

        tx.commit().await?;
        Ok(transaction)
    }

    /// Marca a transação pendente do par como falhada, se houver uma.
    /// Callback reentregue depois da falha não encontra pendente e não
    /// faz nada.
    async fn fail_pending(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        session_id: &str,
    ) -> Result<(), AppError> {
        let pool = self.stores.open(Some(EXTERNAL_SITE_ID)).await?;
        let mut tx = pool.begin().await?;

        if let Some(pending) = self
            .transaction_repo
            .find_pending_for_update(&mut *tx, user_id, course_id)
            .await?
        {
            self.transition(&mut tx, &pending, TransactionStatus::Failed, None, Some(session_id))
                .await?;
            self.transaction_repo.unenroll(&mut *tx, user_id, course_id).await?;
            tracing::info!(
                transaction = %pending.id,
                "Pagamento falhou no gateway; transação marcada como failed"
            );
        }

        tx.commit().await?;
        Ok(())
    }

    async fn transition(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        current: &Transaction,
        next: TransactionStatus,
        rejection_reason: Option<&str>,
        gateway_transaction_id: Option<&str>,
    ) -> Result<Transaction, AppError> {
        if !current.status.can_transition_to(next) {
            return Err(AppError::Conflict("Esta transação já foi processada.".into()));
        }
        self.transaction_repo
            .set_status(&mut **tx, current.id, next, rejection_reason, gateway_transaction_id)
            .await
    }

    pub async fn list(&self, pool: &PgPool) -> Result<Vec<Transaction>, AppError> {
        self.transaction_repo.list(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::GatewaySession;

    #[test]
    fn pendente_transita_para_qualquer_terminal() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Failed));
    }

    #[test]
    fn estados_terminais_nao_transitam() {
        use TransactionStatus::*;
        for terminal in [Completed, Rejected, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Completed, Rejected, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn sessao_com_pagamento_paid_e_reconhecida() {
        let session: GatewaySession = serde_json::from_value(serde_json::json!({
            "data": { "attributes": {
                "payments": [
                    { "attributes": { "status": "failed" } },
                    { "attributes": { "status": "paid" } }
                ],
                "metadata": {
                    "userId": "7b0fdf2f-6a0f-4a3b-9c8e-2f1f3f7a1234",
                    "courseId": "52c1e2cb-4ef0-4b64-8c3e-aaaa0c0de999",
                    "siteId": "external"
                }
            } }
        }))
        .unwrap();
        assert!(session.has_paid_payment());
        assert_eq!(session.data.attributes.metadata.unwrap().site_id, "external");
    }

    #[test]
    fn sessao_sem_pagamento_paid_nao_confirma() {
        let session: GatewaySession = serde_json::from_value(serde_json::json!({
            "data": { "attributes": {
                "payments": [ { "attributes": { "status": "pending" } } ]
            } }
        }))
        .unwrap();
        assert!(!session.has_paid_payment());
        assert!(!session.has_failed_payment());
        assert!(session.data.attributes.metadata.is_none());
    }

    #[test]
    fn pagamento_falhado_no_gateway_e_reconhecido() {
        let session: GatewaySession = serde_json::from_value(serde_json::json!({
            "data": { "attributes": {
                "payments": [
                    { "attributes": { "status": "failed" } },
                    { "attributes": { "status": "expired" } }
                ]
            } }
        }))
        .unwrap();
        assert!(!session.has_paid_payment());
        assert!(session.has_failed_payment());
        // A transição pendente -> failed é válida na máquina de estados.
        assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Failed));
    }

    #[test]
    fn pagamento_paid_prevalece_sobre_tentativas_falhadas() {
        let session: GatewaySession = serde_json::from_value(serde_json::json!({
            "data": { "attributes": {
                "payments": [
                    { "attributes": { "status": "failed" } },
                    { "attributes": { "status": "paid" } }
                ]
            } }
        }))
        .unwrap();
        // Com um pagamento pago, a sessão confirma; as tentativas
        // anteriores falhadas não derrubam a transação.
        assert!(session.has_paid_payment());
    }
}
