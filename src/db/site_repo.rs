// src/db/site_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::site::Site};

// Catálogo de filiais criadas por admins. Só existe de fato no banco
// administrativo; os dois sites reservados nunca entram aqui.
#[derive(Clone)]
pub struct SiteRepository;

impl SiteRepository {
    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Site>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sites = sqlx::query_as::<_, Site>("SELECT id, name FROM sites ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(sites)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: &str) -> Result<Option<Site>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let site = sqlx::query_as::<_, Site>("SELECT id, name FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(site)
    }

    pub async fn name_exists<'e, E>(&self, executor: E, name: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sites WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn insert<'e, E>(&self, executor: E, id: &str, name: &str) -> Result<Site, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Site>(
            "INSERT INTO sites (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Já existe uma filial com este id ou nome."))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
