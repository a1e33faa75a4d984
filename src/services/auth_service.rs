// src/services/auth_service.rs

use bcrypt::{hash, verify};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{SiteStores, UserRepository},
    models::{
        auth::{CreateUserPayload, RegisterPayload, Role, User, UserType},
        site::EXTERNAL_SITE_ID,
    },
};

#[derive(Clone)]
pub struct AuthService {
    stores: Arc<SiteStores>,
    user_repo: UserRepository,
}

impl AuthService {
    pub fn new(stores: Arc<SiteStores>, user_repo: UserRepository) -> Self {
        Self { stores, user_repo }
    }

    /// Autentica um usuário contra o banco do site informado. O site já
    /// deve ter sido validado contra o diretório pelo handler.
    pub async fn login(
        &self,
        site_id: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let pool = self.stores.open(Some(site_id)).await?;
        let user = self
            .user_repo
            .find_by_username(&pool, username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // bcrypt é caro de propósito: roda fora do executor async.
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Auto-registro de alunos externos: sempre no site `external`, sempre
    /// sem privilégios.
    pub async fn register_external(&self, payload: &RegisterPayload) -> Result<User, AppError> {
        let pool = self.stores.open(Some(EXTERNAL_SITE_ID)).await?;
        let password_hash = Self::hash_password(&payload.password).await?;

        self.user_repo
            .create(
                &pool,
                &payload.username,
                &password_hash,
                &payload.full_name,
                None,
                None,
                Role::Employee,
                UserType::External,
            )
            .await
    }

    /// Criação de usuário por um admin, no site da sessão dele.
    pub async fn create_user(
        &self,
        pool: &PgPool,
        payload: &CreateUserPayload,
    ) -> Result<User, AppError> {
        let password_hash = Self::hash_password(&payload.password).await?;
        self.user_repo
            .create(
                pool,
                &payload.username,
                &password_hash,
                &payload.full_name,
                payload.department.as_deref(),
                payload.position.as_deref(),
                payload.role,
                payload.user_type,
            )
            .await
    }

    pub async fn hash_password(password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))??;
        Ok(hashed)
    }
}
