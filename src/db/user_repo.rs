// src/db/user_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User, UserType},
};

// O repositório de usuários de UM site (o executor decide qual banco).
#[derive(Clone)]
pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// Busca usada pelo fallback de super admin: o id só conta se a linha
    /// no banco administrativo tiver papel de admin.
    pub async fn find_admin_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND role = 'admin'")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(user)
    }

    // Username é único por site, sem diferenciar maiúsculas/minúsculas.
    pub async fn find_by_username<'e, E>(
        &self,
        executor: E,
        username: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
                .bind(username)
                .fetch_optional(executor)
                .await?;
        Ok(user)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        full_name: &str,
        department: Option<&str>,
        position: Option<&str>,
        role: Role,
        user_type: UserType,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, department, position, role, user_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(department)
        .bind(position)
        .bind(role)
        .bind(user_type)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Este nome de usuário já está em uso."))
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY full_name ASC")
            .fetch_all(executor)
            .await?;
        Ok(users)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
