// src/db/product_check_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product_check::{CheckResolution, NewProductCheck, ProductCheck},
};

#[derive(Clone)]
pub struct ProductCheckRepository {
    pool: PgPool,
}

impl ProductCheckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewProductCheck) -> Result<ProductCheck, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let check = sqlx::query_as::<_, ProductCheck>(
            r#"
            INSERT INTO product_checks (product_id, store_id, checked_by, expected_quantity, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(new.product_id)
            .bind(new.store_id)
            .bind(new.checked_by)
            .bind(new.expected_quantity)
            .bind(&new.note)
            .fetch_one(executor)
            .await?;
        Ok(check)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductCheck>, AppError> {
        let check = sqlx::query_as::<_, ProductCheck>("SELECT * FROM product_checks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(check)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ProductCheck>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let check = sqlx::query_as::<_, ProductCheck>("SELECT * FROM product_checks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(check)
    }

    /// Fecha a conferência apenas se ela ainda estiver PENDING.
    pub async fn resolve_guarded<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        resolution: &CheckResolution,
    ) -> Result<Option<ProductCheck>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let check = sqlx::query_as::<_, ProductCheck>(
            r#"
            UPDATE product_checks
            SET status = $2, counted_quantity = $3, note = $4, resolved_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(resolution.status)
            .bind(resolution.counted_quantity)
            .bind(&resolution.note)
            .fetch_optional(executor)
            .await?;
        Ok(check)
    }

    // Histórico de conferências do produto, mais recentes primeiro
    pub async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<ProductCheck>, AppError> {
        let checks = sqlx::query_as::<_, ProductCheck>(
            "SELECT * FROM product_checks WHERE product_id = $1 ORDER BY checked_at DESC",
        )
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(checks)
    }
}
