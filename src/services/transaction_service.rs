// src/services/transaction_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    access::{
        ownership::{resolve_tenant, ChainLink},
        policy::{ensure, Action},
    },
    common::error::AppError,
    db::{OwnershipRepository, TransactionRepository},
    models::{
        auth::Principal,
        transaction::{Transaction, TransactionFilter},
    },
    workflows::transaction::{self as workflow, SaleInput, TransferInput},
};

// Orquestra o fluxo de Transaction:
// autoriza → abre transação → lê com lock → transição pura → UPDATE guardado → commit.
#[derive(Clone)]
pub struct TransactionService {
    tx_repo: TransactionRepository,
    ownership: OwnershipRepository,
    pool: PgPool,
}

impl TransactionService {
    pub fn new(tx_repo: TransactionRepository, ownership: OwnershipRepository, pool: PgPool) -> Self {
        Self { tx_repo, ownership, pool }
    }

    pub async fn create_sale(&self, principal: &Principal, input: SaleInput) -> Result<Transaction, AppError> {
        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::CreateSale, ChainLink::Tenant(tenant)).await?;

        let new = workflow::plan_sale(principal, input)?;

        let mut tx = self.pool.begin().await?;
        let sale = self.tx_repo.insert(&mut *tx, &new).await?;
        tx.commit().await?;

        tracing::info!(transaction_id = %sale.id, created_by = %principal.user_id, amount = %sale.amount, "Venda registrada");
        Ok(sale)
    }

    pub async fn create_transfer(&self, principal: &Principal, input: TransferInput) -> Result<Transaction, AppError> {
        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::CreateTransfer, ChainLink::Tenant(tenant)).await?;

        // Cada loja é autorizada individualmente: as duas precisam estar no tenant
        for store_id in [input.from_store_id, input.to_store_id].into_iter().flatten() {
            ensure(&self.ownership, principal, Action::CreateTransfer, ChainLink::Store(store_id)).await?;
        }

        let new = workflow::plan_transfer(principal, input)?;

        let mut tx = self.pool.begin().await?;
        let transfer = self.tx_repo.insert(&mut *tx, &new).await?;
        tx.commit().await?;

        tracing::info!(
            transaction_id = %transfer.id,
            from_store_id = ?transfer.from_store_id,
            to_store_id = ?transfer.to_store_id,
            state = transfer.state().as_str(),
            "Transferência criada"
        );
        Ok(transfer)
    }

    pub async fn get_transaction(&self, principal: &Principal, id: Uuid) -> Result<Transaction, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::Transaction(id)).await?;

        self.tx_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Transação"))
    }

    pub async fn list_transactions(
        &self,
        principal: &Principal,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::Read, ChainLink::Tenant(tenant)).await?;

        self.tx_repo.list_for_tenant(tenant, filter).await
    }

    pub async fn submit_proof(
        &self,
        principal: &Principal,
        id: Uuid,
        photo_proof_url: Option<String>,
        transfer_proof_url: Option<String>,
    ) -> Result<Transaction, AppError> {
        ensure(&self.ownership, principal, Action::SubmitTransferProof, ChainLink::Transaction(id)).await?;

        self.transition(id, "comprovante anexado", |current| {
            workflow::submit_proof(current, photo_proof_url, transfer_proof_url)
        })
        .await
    }

    pub async fn approve(&self, principal: &Principal, id: Uuid) -> Result<Transaction, AppError> {
        ensure(&self.ownership, principal, Action::ApproveTransfer, ChainLink::Transaction(id)).await?;

        self.transition(id, "transferência aprovada", |current| workflow::approve(current, principal))
            .await
    }

    pub async fn finish(&self, principal: &Principal, id: Uuid) -> Result<Transaction, AppError> {
        ensure(&self.ownership, principal, Action::FinishTransfer, ChainLink::Transaction(id)).await?;

        self.transition(id, "transferência finalizada", workflow::finish).await
    }

    /// Read-modify-write sob lock. Se o UPDATE guardado não achar a linha no
    /// estado lido, outra requisição venceu a corrida.
    async fn transition<F>(&self, id: Uuid, label: &'static str, step: F) -> Result<Transaction, AppError>
    where
        F: FnOnce(&Transaction) -> Result<Transaction, AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let current = self
            .tx_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Transação"))?;

        let next = step(&current)?;

        let saved = self
            .tx_repo
            .update_guarded(&mut *tx, &current, &next)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "a transação {} foi alterada por outra operação",
                    id
                ))
            })?;
        tx.commit().await?;

        tracing::info!(
            transaction_id = %id,
            from = current.state().as_str(),
            to = saved.state().as_str(),
            "{}",
            label
        );
        Ok(saved)
    }
}
