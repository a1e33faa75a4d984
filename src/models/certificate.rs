// src/models/certificate.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "certificate_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CertificateType {
    Completion,
    Recognition,
}

// Certificados são um livro-razão append-only: nunca são apagados, nem
// quando o progresso do curso é resetado para retreinamento.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Option<Uuid>,
    pub certificate_number: String,
    pub certificate_type: CertificateType,
    pub reason: Option<String>,
    pub completion_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Signatory {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub signature_image_path: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSignatoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    pub position: String,
    pub signature_image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignSignatoriesPayload {
    pub signatory_ids: Vec<Uuid>,
}

// Certificado de reconhecimento: emitido ad hoc por um admin, sem curso.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    pub reason: String,
}
