// src/db/store_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::store::{NewStore, Store, StoreChanges},
};

#[derive(Clone)]
pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE id = $1 AND deleted_at IS NULL",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE owner_id = $1 AND deleted_at IS NULL ORDER BY name ASC",
        )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    /// Cria a loja já vinculada ao tenant de quem criou.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        created_by: Uuid,
        new: &NewStore,
    ) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (
                owner_id, name, code, address, city, state, postal_code, phone,
                opens_at, closes_at, timezone, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 'UTC'), $12)
            RETURNING *
            "#,
        )
            .bind(owner_id)
            .bind(&new.name)
            .bind(&new.code)
            .bind(&new.address)
            .bind(&new.city)
            .bind(&new.state)
            .bind(&new.postal_code)
            .bind(&new.phone)
            .bind(new.opens_at)
            .bind(new.closes_at)
            .bind(&new.timezone)
            .bind(created_by)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                map_unique_violation(e, |_| {
                    AppError::UniqueConstraintViolation(format!("Já existe uma loja com o código '{}'.", new.code))
                })
            })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &StoreChanges,
    ) -> Result<Option<Store>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let store = sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores
            SET name        = COALESCE($2, name),
                address     = COALESCE($3, address),
                city        = COALESCE($4, city),
                state       = COALESCE($5, state),
                postal_code = COALESCE($6, postal_code),
                phone       = COALESCE($7, phone),
                opens_at    = COALESCE($8, opens_at),
                closes_at   = COALESCE($9, closes_at),
                timezone    = COALESCE($10, timezone),
                is_active   = COALESCE($11, is_active),
                updated_at  = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.address)
            .bind(&changes.city)
            .bind(&changes.state)
            .bind(&changes.postal_code)
            .bind(&changes.phone)
            .bind(changes.opens_at)
            .bind(changes.closes_at)
            .bind(&changes.timezone)
            .bind(changes.is_active)
            .fetch_optional(executor)
            .await?;
        Ok(store)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE stores SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
