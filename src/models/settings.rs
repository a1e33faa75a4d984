// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

// Configurações por site: nome da empresa, logos, QR de pagamento manual.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppSetting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PutSettingsPayload {
    #[validate(length(min = 1, message = "Informe ao menos uma configuração."))]
    pub settings: HashMap<String, String>,
}
