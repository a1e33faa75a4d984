// src/models/site.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Id do site administrativo (matriz). Os super admins moram aqui.
pub const ADMIN_SITE_ID: &str = "main";
/// Id do site de alunos externos (auto-registro / cursos pagos).
pub const EXTERNAL_SITE_ID: &str = "external";

// Um site (tenant/filial). Os dois sites reservados nunca aparecem no
// catálogo; eles são mesclados na listagem pelo serviço.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
}

impl Site {
    pub fn reserved() -> Vec<Site> {
        vec![
            Site { id: ADMIN_SITE_ID.to_string(), name: "Main Office".to_string() },
            Site { id: EXTERNAL_SITE_ID.to_string(), name: "External Learners".to_string() },
        ]
    }

    pub fn is_reserved(id: &str) -> bool {
        id == ADMIN_SITE_ID || id == EXTERNAL_SITE_ID
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSitePayload {
    #[validate(length(min = 2, max = 32, message = "O id deve ter entre 2 e 32 caracteres."))]
    pub id: String,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
}
