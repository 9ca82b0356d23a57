// src/db/ownership_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    access::ownership::{owner_root, ChainLink, ChainSource, OwnerChain},
    common::error::AppError,
    models::{
        auth::User,
        catalog::{Category, Product},
        product_check::ProductCheck,
        store::Store,
        transaction::Transaction,
    },
};

// Implementação Postgres da cadeia de posse.
// Cada elo é uma leitura simples por chave primária.
#[derive(Clone)]
pub struct OwnershipRepository {
    pool: PgPool,
}

impl OwnershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch<T>(&self, sql: &str, id: Uuid) -> Result<Option<T>, AppError>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let row = sqlx::query_as::<_, T>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ChainSource for OwnershipRepository {
    async fn parent_of(&self, link: ChainLink) -> Result<Option<ChainLink>, AppError> {
        match link {
            ChainLink::Tenant(_) => Ok(Some(link)),
            ChainLink::Owner(id) => self
                .fetch::<User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL", id)
                .await?
                .as_ref()
                .map(owner_root)
                .transpose(),
            ChainLink::User(id) => self
                .fetch::<User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL", id)
                .await?
                .map(|u| u.parent_link())
                .transpose(),
            ChainLink::Store(id) => self
                .fetch::<Store>("SELECT * FROM stores WHERE id = $1 AND deleted_at IS NULL", id)
                .await?
                .map(|s| s.parent_link())
                .transpose(),
            ChainLink::Category(id) => self
                .fetch::<Category>("SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL", id)
                .await?
                .map(|c| c.parent_link())
                .transpose(),
            ChainLink::Product(id) => self
                .fetch::<Product>("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL", id)
                .await?
                .map(|p| p.parent_link())
                .transpose(),
            ChainLink::Transaction(id) => self
                .fetch::<Transaction>("SELECT * FROM transactions WHERE id = $1", id)
                .await?
                .map(|t| t.parent_link())
                .transpose(),
            ChainLink::ProductCheck(id) => self
                .fetch::<ProductCheck>("SELECT * FROM product_checks WHERE id = $1", id)
                .await?
                .map(|c| c.parent_link())
                .transpose(),
        }
    }
}
