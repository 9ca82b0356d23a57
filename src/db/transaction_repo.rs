// src/db/transaction_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::page_bounds, error::AppError},
    models::transaction::{NewTransaction, Transaction, TransactionFilter},
};

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewTransaction) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                transaction_type, created_by, from_store_id, to_store_id,
                photo_proof_url, transfer_proof_url, amount, note, is_finished
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(new.transaction_type)
            .bind(new.created_by)
            .bind(new.from_store_id)
            .bind(new.to_store_id)
            .bind(&new.photo_proof_url)
            .bind(&new.transfer_proof_url)
            .bind(new.amount)
            .bind(&new.note)
            .bind(new.is_finished)
            .fetch_one(executor)
            .await?;
        Ok(tx)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let tx = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tx)
    }

    /// Lê a linha com lock (FOR UPDATE). Deve rodar dentro de uma transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(tx)
    }

    /// Grava a próxima versão da linha somente se ela ainda estiver como
    /// `current` (aberta e com o mesmo aprovador). `None` = alguém chegou antes.
    pub async fn update_guarded<'e, E>(
        &self,
        executor: E,
        current: &Transaction,
        next: &Transaction,
    ) -> Result<Option<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET approved_by        = $2,
                photo_proof_url    = $3,
                transfer_proof_url = $4,
                is_finished        = $5,
                updated_at         = NOW()
            WHERE id = $1
              AND is_finished = FALSE
              AND approved_by IS NOT DISTINCT FROM $6
            RETURNING *
            "#,
        )
            .bind(current.id)
            .bind(next.approved_by)
            .bind(&next.photo_proof_url)
            .bind(&next.transfer_proof_url)
            .bind(next.is_finished)
            .bind(current.approved_by)
            .fetch_optional(executor)
            .await?;
        Ok(tx)
    }

    /// Transações do tenant: vendas de quem é da equipe, transferências das lojas do tenant.
    pub async fn list_for_tenant(
        &self,
        owner_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let (limit, offset) = page_bounds(filter.limit, filter.offset);

        let txs = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.*
            FROM transactions t
            LEFT JOIN users u ON u.id = t.created_by
            LEFT JOIN stores s ON s.id = t.from_store_id
            WHERE (
                    (t.transaction_type = 'SALE' AND (u.id = $1 OR u.owner_id = $1))
                 OR (t.transaction_type = 'TRANSFER' AND s.owner_id = $1 AND s.deleted_at IS NULL)
                  )
              AND ($2::transaction_type IS NULL OR t.transaction_type = $2)
            ORDER BY t.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
            .bind(owner_id)
            .bind(filter.transaction_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(txs)
    }
}
