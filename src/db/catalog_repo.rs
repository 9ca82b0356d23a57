// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::catalog::{Category, NewProduct, Product, ProductChanges},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(&self, store_id: Uuid) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE store_id = $1 AND deleted_at IS NULL ORDER BY name ASC",
        )
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (store_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(store_id)
            .bind(name)
            .bind(description)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                map_unique_violation(e, |_| {
                    AppError::UniqueConstraintViolation(format!("Já existe a categoria '{}' nesta loja.", name))
                })
            })
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self, store_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE store_id = $1 AND deleted_at IS NULL ORDER BY name ASC",
        )
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        new: &NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                store_id, category_id, sku, name, description,
                quantity, purchase_price, sale_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(store_id)
            .bind(new.category_id)
            .bind(&new.sku)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.quantity)
            .bind(new.purchase_price)
            .bind(new.sale_price)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                map_unique_violation(e, |_| {
                    AppError::UniqueConstraintViolation(format!("O SKU '{}' já existe nesta loja.", new.sku))
                })
            })
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id    = COALESCE($2, category_id),
                name           = COALESCE($3, name),
                description    = COALESCE($4, description),
                quantity       = COALESCE($5, quantity),
                purchase_price = COALESCE($6, purchase_price),
                sale_price     = COALESCE($7, sale_price),
                updated_at     = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(changes.category_id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(changes.quantity)
            .bind(changes.purchase_price)
            .bind(changes.sale_price)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn soft_delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
