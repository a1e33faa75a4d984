// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
    Failed,
}

impl TransactionStatus {
    /// Estados terminais nunca transitam novamente.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Máquina de estados do fluxo de pagamento:
    /// pending -> completed | rejected (admin) ou completed | failed (gateway).
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        self == TransactionStatus::Pending && next != TransactionStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub gateway: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub proof_image_path: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Intenção de compra. O comprovante (imagem) já foi gravado pelo upload;
// aqui só chega o caminho, que é armazenado como veio.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub course_id: Uuid,
    pub gateway: Option<String>,
    pub proof_image_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDecision {
    Complete,
    Reject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub decision: PaymentDecision,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfirmQuery {
    pub session_id: String,
}

// ---
// Formato da resposta do gateway (GET /checkout_sessions/{id}).
// Só projetamos os campos de que o fluxo precisa.
// ---

#[derive(Debug, Deserialize)]
pub struct GatewaySession {
    pub data: GatewayData,
}

#[derive(Debug, Deserialize)]
pub struct GatewayData {
    pub attributes: GatewayAttributes,
}

#[derive(Debug, Deserialize)]
pub struct GatewayAttributes {
    #[serde(default)]
    pub payments: Vec<GatewayPayment>,
    pub metadata: Option<GatewayMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayPayment {
    pub attributes: GatewayPaymentAttributes,
}

#[derive(Debug, Deserialize)]
pub struct GatewayPaymentAttributes {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayMetadata {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub site_id: String,
}

impl GatewaySession {
    /// O gateway considera a sessão paga se houver ao menos um pagamento
    /// com status `paid`. A ausência vira 402 para o chamador.
    pub fn has_paid_payment(&self) -> bool {
        self.data
            .attributes
            .payments
            .iter()
            .any(|p| p.attributes.status == "paid")
    }

    /// Algum pagamento da sessão falhou ou expirou no gateway. Sem nenhum
    /// `paid`, isso marca a transação pendente como `failed` e libera uma
    /// nova compra.
    pub fn has_failed_payment(&self) -> bool {
        self.data
            .attributes
            .payments
            .iter()
            .any(|p| matches!(p.attributes.status.as_str(), "failed" | "expired"))
    }
}
