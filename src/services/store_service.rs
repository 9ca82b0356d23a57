// src/services/store_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    access::{
        ownership::{resolve_tenant, ChainLink},
        policy::{ensure, Action},
    },
    common::error::AppError,
    db::{OwnershipRepository, StoreRepository},
    models::{
        auth::Principal,
        store::{NewStore, Store, StoreChanges},
    },
};

#[derive(Clone)]
pub struct StoreService {
    store_repo: StoreRepository,
    ownership: OwnershipRepository,
    pool: PgPool,
}

impl StoreService {
    pub fn new(store_repo: StoreRepository, ownership: OwnershipRepository, pool: PgPool) -> Self {
        Self { store_repo, ownership, pool }
    }

    /// A loja nasce no tenant de quem cria, nunca em outro.
    pub async fn create_store(&self, principal: &Principal, new: NewStore) -> Result<Store, AppError> {
        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::CreateStore, ChainLink::Tenant(tenant)).await?;

        let mut tx = self.pool.begin().await?;
        let store = self
            .store_repo
            .create(&mut *tx, tenant, principal.user_id, &new)
            .await?;
        tx.commit().await?;

        tracing::info!(store_id = %store.id, owner_id = %tenant, "Loja criada");
        Ok(store)
    }

    pub async fn list_stores(&self, principal: &Principal) -> Result<Vec<Store>, AppError> {
        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::Read, ChainLink::Tenant(tenant)).await?;

        self.store_repo.list_by_owner(tenant).await
    }

    pub async fn get_store(&self, principal: &Principal, store_id: Uuid) -> Result<Store, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::Store(store_id)).await?;

        self.store_repo
            .find_by_id(store_id)
            .await?
            .ok_or(AppError::NotFound("Loja"))
    }

    pub async fn update_store(
        &self,
        principal: &Principal,
        store_id: Uuid,
        changes: StoreChanges,
    ) -> Result<Store, AppError> {
        ensure(&self.ownership, principal, Action::UpdateStore, ChainLink::Store(store_id)).await?;

        let mut tx = self.pool.begin().await?;
        let store = self
            .store_repo
            .update(&mut *tx, store_id, &changes)
            .await?
            .ok_or(AppError::NotFound("Loja"))?;
        tx.commit().await?;

        Ok(store)
    }

    pub async fn delete_store(&self, principal: &Principal, store_id: Uuid) -> Result<(), AppError> {
        ensure(&self.ownership, principal, Action::DeleteStore, ChainLink::Store(store_id)).await?;

        let mut tx = self.pool.begin().await?;
        if !self.store_repo.soft_delete(&mut *tx, store_id).await? {
            return Err(AppError::NotFound("Loja"));
        }
        tx.commit().await?;

        tracing::info!(store_id = %store_id, deleted_by = %principal.user_id, "Loja removida");
        Ok(())
    }
}
