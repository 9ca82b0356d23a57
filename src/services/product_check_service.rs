// src/services/product_check_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    access::{
        ownership::ChainLink,
        policy::{ensure, Action},
    },
    common::error::AppError,
    db::{CatalogRepository, OwnershipRepository, ProductCheckRepository},
    models::{
        auth::Principal,
        product_check::{CheckStatus, ProductCheck},
    },
    workflows::product_check as workflow,
};

#[derive(Clone)]
pub struct ProductCheckService {
    check_repo: ProductCheckRepository,
    catalog_repo: CatalogRepository,
    ownership: OwnershipRepository,
    pool: PgPool,
}

impl ProductCheckService {
    pub fn new(
        check_repo: ProductCheckRepository,
        catalog_repo: CatalogRepository,
        ownership: OwnershipRepository,
        pool: PgPool,
    ) -> Self {
        Self { check_repo, catalog_repo, ownership, pool }
    }

    /// Abre uma conferência PENDING com o saldo atual do produto.
    pub async fn create_check(
        &self,
        principal: &Principal,
        product_id: Uuid,
        note: Option<String>,
    ) -> Result<ProductCheck, AppError> {
        ensure(&self.ownership, principal, Action::CreateProductCheck, ChainLink::Product(product_id)).await?;

        let mut tx = self.pool.begin().await?;
        // Snapshot do saldo lido na mesma transação do INSERT
        let product = self
            .catalog_repo
            .find_product(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        let new = workflow::open_check(principal, &product, note)?;
        let check = self.check_repo.insert(&mut *tx, &new).await?;
        tx.commit().await?;

        tracing::info!(check_id = %check.id, product_id = %product_id, expected = check.expected_quantity, "Conferência aberta");
        Ok(check)
    }

    pub async fn resolve_check(
        &self,
        principal: &Principal,
        check_id: Uuid,
        status: Option<CheckStatus>,
        counted_quantity: Option<i32>,
        note: Option<String>,
    ) -> Result<ProductCheck, AppError> {
        ensure(&self.ownership, principal, Action::ResolveProductCheck, ChainLink::ProductCheck(check_id)).await?;

        let mut tx = self.pool.begin().await?;
        let current = self
            .check_repo
            .find_for_update(&mut *tx, check_id)
            .await?
            .ok_or(AppError::NotFound("Conferência"))?;

        let resolution = workflow::resolve(&current, status, counted_quantity, note)?;

        let resolved = self
            .check_repo
            .resolve_guarded(&mut *tx, check_id, &resolution)
            .await?
            .ok_or_else(|| AppError::InvalidState(format!("a conferência {} já foi resolvida", check_id)))?;
        tx.commit().await?;

        tracing::info!(check_id = %check_id, status = ?resolved.status, resolved_by = %principal.user_id, "Conferência resolvida");
        Ok(resolved)
    }

    pub async fn get_check(&self, principal: &Principal, check_id: Uuid) -> Result<ProductCheck, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::ProductCheck(check_id)).await?;

        self.check_repo
            .find_by_id(check_id)
            .await?
            .ok_or(AppError::NotFound("Conferência"))
    }

    pub async fn list_checks(&self, principal: &Principal, product_id: Uuid) -> Result<Vec<ProductCheck>, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::Product(product_id)).await?;
        self.check_repo.list_for_product(product_id).await
    }
}
