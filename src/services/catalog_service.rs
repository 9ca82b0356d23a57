// src/services/catalog_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    access::{
        ownership::ChainLink,
        policy::{ensure, Action},
    },
    common::error::AppError,
    db::{CatalogRepository, OwnershipRepository},
    models::{
        auth::Principal,
        catalog::{Category, NewProduct, Product, ProductChanges},
    },
};

// Categorias e produtos de uma loja
#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    ownership: OwnershipRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, ownership: OwnershipRepository, pool: PgPool) -> Self {
        Self { catalog_repo, ownership, pool }
    }

    // ---
    // Categorias
    // ---

    pub async fn create_category(
        &self,
        principal: &Principal,
        store_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        ensure(&self.ownership, principal, Action::WriteCatalog, ChainLink::Store(store_id)).await?;

        let mut tx = self.pool.begin().await?;
        let category = self
            .catalog_repo
            .create_category(&mut *tx, store_id, name, description)
            .await?;
        tx.commit().await?;

        Ok(category)
    }

    pub async fn list_categories(&self, principal: &Principal, store_id: Uuid) -> Result<Vec<Category>, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::Store(store_id)).await?;
        self.catalog_repo.list_categories(store_id).await
    }

    // ---
    // Produtos
    // ---

    pub async fn create_product(
        &self,
        principal: &Principal,
        store_id: Uuid,
        new: NewProduct,
    ) -> Result<Product, AppError> {
        ensure(&self.ownership, principal, Action::WriteCatalog, ChainLink::Store(store_id)).await?;
        check_amounts(Some(new.quantity), Some(new.purchase_price), Some(new.sale_price))?;

        let mut tx = self.pool.begin().await?;
        if let Some(category_id) = new.category_id {
            self.ensure_category_in_store(&mut tx, category_id, store_id).await?;
        }
        let product = self.catalog_repo.create_product(&mut *tx, store_id, &new).await?;
        tx.commit().await?;

        tracing::info!(product_id = %product.id, store_id = %store_id, "Produto criado");
        Ok(product)
    }

    pub async fn list_products(&self, principal: &Principal, store_id: Uuid) -> Result<Vec<Product>, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::Store(store_id)).await?;
        self.catalog_repo.list_products(store_id).await
    }

    pub async fn get_product(&self, principal: &Principal, product_id: Uuid) -> Result<Product, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::Product(product_id)).await?;

        self.catalog_repo
            .find_product(&self.pool, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn update_product(
        &self,
        principal: &Principal,
        product_id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, AppError> {
        ensure(&self.ownership, principal, Action::WriteCatalog, ChainLink::Product(product_id)).await?;
        check_amounts(changes.quantity, changes.purchase_price, changes.sale_price)?;

        let mut tx = self.pool.begin().await?;
        if let Some(category_id) = changes.category_id {
            let current = self
                .catalog_repo
                .find_product(&mut *tx, product_id)
                .await?
                .ok_or(AppError::NotFound("Produto"))?;
            self.ensure_category_in_store(&mut tx, category_id, current.store_id).await?;
        }
        let product = self
            .catalog_repo
            .update_product(&mut *tx, product_id, &changes)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;
        tx.commit().await?;

        Ok(product)
    }

    pub async fn delete_product(&self, principal: &Principal, product_id: Uuid) -> Result<(), AppError> {
        ensure(&self.ownership, principal, Action::DeleteCatalog, ChainLink::Product(product_id)).await?;

        let mut tx = self.pool.begin().await?;
        if !self.catalog_repo.soft_delete_product(&mut *tx, product_id).await? {
            return Err(AppError::NotFound("Produto"));
        }
        tx.commit().await?;

        tracing::info!(product_id = %product_id, deleted_by = %principal.user_id, "Produto removido");
        Ok(())
    }

    // Categoria de outra loja (mesmo que do mesmo tenant) não pode ser usada
    async fn ensure_category_in_store(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category_id: Uuid,
        store_id: Uuid,
    ) -> Result<(), AppError> {
        let category = self
            .catalog_repo
            .find_category(&mut **tx, category_id)
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;

        if category.store_id != store_id {
            return Err(AppError::Validation(
                "a categoria pertence a outra loja".into(),
            ));
        }
        Ok(())
    }
}

fn check_amounts(
    quantity: Option<i32>,
    purchase_price: Option<rust_decimal::Decimal>,
    sale_price: Option<rust_decimal::Decimal>,
) -> Result<(), AppError> {
    if quantity.is_some_and(|q| q < 0) {
        return Err(AppError::Validation("a quantidade não pode ser negativa".into()));
    }
    if purchase_price.is_some_and(|p| p.is_sign_negative()) || sale_price.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::Validation("preços não podem ser negativos".into()));
    }
    Ok(())
}
