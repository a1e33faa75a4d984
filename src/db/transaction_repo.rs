// src/db/transaction_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{Transaction, TransactionStatus},
};

#[derive(Clone)]
pub struct TransactionRepository;

impl TransactionRepository {
    /// Transação não-falhada (pendente, concluída ou rejeitada) do par
    /// usuário/curso, se houver. O checkout devolve 409 enquanto uma
    /// existir; só `failed` libera uma nova compra.
    pub async fn find_non_failed<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1 AND course_id = $2 AND status <> 'failed'
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(executor)
        .await?;
        Ok(transaction)
    }

    pub async fn insert_pending<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
        amount: Decimal,
        gateway: Option<&str>,
        proof_image_path: Option<&str>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, course_id, amount, gateway, proof_image_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(amount)
        .bind(gateway)
        .bind(proof_image_path)
        .fetch_one(executor)
        .await
        // O índice único parcial pega duas compras simultâneas que passaram
        // juntas pela checagem prévia.
        .map_err(|e| {
            AppError::conflict_on_unique(e, "Já existe uma compra registrada para este curso.")
        })
    }

    /// Tranca a linha da transação (FOR UPDATE) antes de qualquer mudança
    /// de status, impedindo que duas ações de admin processem o mesmo
    /// pagamento pendente ao mesmo tempo.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(transaction)
    }

    /// Mesmo lock, mas endereçado pelo par usuário/curso, usado pela
    /// confirmação vinda do gateway, que não conhece o nosso id.
    pub async fn find_pending_for_update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1 AND course_id = $2 AND status = 'pending'
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(executor)
        .await?;
        Ok(transaction)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: TransactionStatus,
        rejection_reason: Option<&str>,
        gateway_transaction_id: Option<&str>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2,
                rejection_reason = COALESCE($3, rejection_reason),
                gateway_transaction_id = COALESCE($4, gateway_transaction_id),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .bind(gateway_transaction_id)
        .fetch_one(executor)
        .await?;
        Ok(transaction)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions ORDER BY created_at DESC")
                .fetch_all(executor)
                .await?;
        Ok(transactions)
    }

    // ---
    // Matrículas. Presença da linha = matriculado; não há campo de status.
    // ---

    pub async fn is_enrolled<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrolled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(enrolled)
    }

    /// Idempotente: matricular quem já está matriculado não é erro (o
    /// caminho de confirmação do gateway depende disso).
    pub async fn enroll<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn unenroll<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn enrolled_course_ids<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT course_id FROM enrollments WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }
}
