// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::settings::AppSetting};

#[derive(Clone)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<AppSetting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings =
            sqlx::query_as::<_, AppSetting>("SELECT * FROM app_settings ORDER BY key ASC")
                .fetch_all(executor)
                .await?;
        Ok(settings)
    }

    pub async fn upsert<'e, E>(&self, executor: E, key: &str, value: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO app_settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(executor)
        .await?;
        Ok(())
    }
}
