// src/workflows/transaction.rs

//! Máquina de estados de Transaction.
//!
//! SALE:     nasce FINISHED (não há movimentação entre lojas).
//! TRANSFER: DRAFT → AWAITING_APPROVAL → APPROVED → FINISHED.
//!
//! As funções daqui são puras: recebem a linha atual e devolvem a próxima
//! versão dela. Quem chama (TransactionService) garante que a linha foi lida
//! com lock dentro da mesma transação de banco que grava o resultado.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    access::policy::Action,
    common::error::{AppError, DenyReason},
    models::{
        auth::Principal,
        transaction::{NewTransaction, Transaction, TransactionState, TransactionType},
    },
};

impl Transaction {
    /// Estado derivado das flags persistidas.
    pub fn state(&self) -> TransactionState {
        if self.is_finished {
            return TransactionState::Finished;
        }
        match self.transaction_type {
            // Venda nunca fica aberta; se ficou, é um rascunho
            TransactionType::Sale => TransactionState::Draft,
            TransactionType::Transfer if self.approved_by.is_some() => TransactionState::Approved,
            TransactionType::Transfer if self.photo_proof_url.is_some() || self.transfer_proof_url.is_some() => {
                TransactionState::AwaitingApproval
            }
            TransactionType::Transfer => TransactionState::Draft,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaleInput {
    pub amount: Decimal,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub photo_proof_url: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransferInput {
    pub amount: Decimal,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub photo_proof_url: Option<String>,
    pub transfer_proof_url: Option<String>,
    pub note: Option<String>,
}

// URL em branco conta como ausente
fn non_blank(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

fn ensure_amount(amount: Decimal) -> Result<(), AppError> {
    if amount.is_sign_negative() {
        return Err(AppError::Validation("o valor não pode ser negativo".into()));
    }
    Ok(())
}

fn illegal(tx: &Transaction, action: &str) -> AppError {
    AppError::InvalidState(format!(
        "não é possível {} a transação {} no estado {}",
        action,
        tx.id,
        tx.state().as_str()
    ))
}

/// Venda: finalizada no ato, sem lojas envolvidas.
pub fn plan_sale(principal: &Principal, input: SaleInput) -> Result<NewTransaction, AppError> {
    ensure_amount(input.amount)?;
    if input.from_store_id.is_some() || input.to_store_id.is_some() {
        return Err(AppError::Validation("vendas não referenciam lojas de origem/destino".into()));
    }

    Ok(NewTransaction {
        transaction_type: TransactionType::Sale,
        created_by: principal.user_id,
        from_store_id: None,
        to_store_id: None,
        photo_proof_url: non_blank(input.photo_proof_url),
        transfer_proof_url: None,
        amount: input.amount,
        note: input.note,
        is_finished: true,
    })
}

/// Transferência: exige duas lojas distintas. O tenant das lojas é
/// verificado pelo serviço (autorização em cada uma delas).
pub fn plan_transfer(principal: &Principal, input: TransferInput) -> Result<NewTransaction, AppError> {
    ensure_amount(input.amount)?;
    let (from, to) = match (input.from_store_id, input.to_store_id) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(AppError::Validation(
                "transferências exigem loja de origem e de destino".into(),
            ));
        }
    };
    if from == to {
        return Err(AppError::Validation("origem e destino devem ser lojas diferentes".into()));
    }

    Ok(NewTransaction {
        transaction_type: TransactionType::Transfer,
        created_by: principal.user_id,
        from_store_id: Some(from),
        to_store_id: Some(to),
        photo_proof_url: non_blank(input.photo_proof_url),
        transfer_proof_url: non_blank(input.transfer_proof_url),
        amount: input.amount,
        note: input.note,
        is_finished: false,
    })
}

/// Anexa comprovantes a uma transferência ainda não aprovada.
pub fn submit_proof(
    tx: &Transaction,
    photo_proof_url: Option<String>,
    transfer_proof_url: Option<String>,
) -> Result<Transaction, AppError> {
    if tx.transaction_type != TransactionType::Transfer {
        return Err(illegal(tx, "anexar comprovante a"));
    }
    match tx.state() {
        TransactionState::Draft | TransactionState::AwaitingApproval => {}
        _ => return Err(illegal(tx, "anexar comprovante a")),
    }

    let photo = non_blank(photo_proof_url);
    let transfer_proof = non_blank(transfer_proof_url);
    if photo.is_none() && transfer_proof.is_none() {
        return Err(AppError::Validation("informe ao menos um comprovante".into()));
    }

    let mut next = tx.clone();
    if photo.is_some() {
        next.photo_proof_url = photo;
    }
    if transfer_proof.is_some() {
        next.transfer_proof_url = transfer_proof;
    }
    Ok(next)
}

/// Aprovação: só TRANSFER ainda não aprovada, com comprovante de transferência.
/// Sem o comprovante (inclusive em DRAFT) o erro é de validação.
pub fn approve(tx: &Transaction, approver: &Principal) -> Result<Transaction, AppError> {
    if tx.transaction_type != TransactionType::Transfer
        || matches!(tx.state(), TransactionState::Approved | TransactionState::Finished)
    {
        return Err(illegal(tx, "aprovar"));
    }
    if tx.transfer_proof_url.is_none() {
        return Err(AppError::Validation(
            "a aprovação exige o comprovante de transferência".into(),
        ));
    }
    if !approver.role.at_least(Action::ApproveTransfer.minimum_role()) {
        return Err(AppError::Forbidden(DenyReason::InsufficientRole));
    }

    let mut next = tx.clone();
    next.approved_by = Some(approver.user_id);
    Ok(next)
}

/// Finalização: só a partir de APPROVED. Depois disso a linha é imutável.
pub fn finish(tx: &Transaction) -> Result<Transaction, AppError> {
    if tx.transaction_type != TransactionType::Transfer || tx.state() != TransactionState::Approved {
        return Err(illegal(tx, "finalizar"));
    }

    let mut next = tx.clone();
    next.is_finished = true;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::{
            fixtures::Fixture,
            ownership::ChainLink,
            policy::{ensure, Action},
        },
        models::auth::Role,
    };
    use chrono::Utc;

    fn principal(role: Role) -> Principal {
        Principal { user_id: Uuid::new_v4(), role, owner_id: Some(Uuid::new_v4()) }
    }

    fn stored(new: NewTransaction) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            transaction_type: new.transaction_type,
            created_by: new.created_by,
            approved_by: None,
            from_store_id: new.from_store_id,
            to_store_id: new.to_store_id,
            photo_proof_url: new.photo_proof_url,
            transfer_proof_url: new.transfer_proof_url,
            amount: new.amount,
            note: new.note,
            is_finished: new.is_finished,
            created_at: now,
            updated_at: now,
        }
    }

    fn transfer_input() -> TransferInput {
        TransferInput {
            amount: Decimal::new(5000, 2),
            from_store_id: Some(Uuid::new_v4()),
            to_store_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    #[test]
    fn sale_is_finished_at_creation_without_stores() {
        let cashier = principal(Role::Cashier);
        let sale = plan_sale(&cashier, SaleInput { amount: Decimal::new(1990, 2), ..Default::default() }).unwrap();

        assert!(sale.is_finished);
        assert_eq!(sale.from_store_id, None);
        assert_eq!(sale.to_store_id, None);
        assert_eq!(stored(sale).state(), TransactionState::Finished);
    }

    #[test]
    fn sale_rejects_store_references_and_negative_amount() {
        let cashier = principal(Role::Cashier);
        let with_store = SaleInput { from_store_id: Some(Uuid::new_v4()), ..Default::default() };
        assert!(matches!(plan_sale(&cashier, with_store), Err(AppError::Validation(_))));

        let negative = SaleInput { amount: Decimal::new(-1, 0), ..Default::default() };
        assert!(matches!(plan_sale(&cashier, negative), Err(AppError::Validation(_))));
    }

    #[test]
    fn transfer_requires_two_distinct_stores() {
        let staff = principal(Role::Staff);

        let missing = TransferInput { to_store_id: None, ..transfer_input() };
        assert!(matches!(plan_transfer(&staff, missing), Err(AppError::Validation(_))));

        let store = Uuid::new_v4();
        let same = TransferInput { from_store_id: Some(store), to_store_id: Some(store), ..transfer_input() };
        assert!(matches!(plan_transfer(&staff, same), Err(AppError::Validation(_))));
    }

    #[test]
    fn initial_transfer_state_depends_on_proof() {
        let staff = principal(Role::Staff);

        let bare = stored(plan_transfer(&staff, transfer_input()).unwrap());
        assert_eq!(bare.state(), TransactionState::Draft);

        let blank = TransferInput { photo_proof_url: Some("  ".into()), ..transfer_input() };
        assert_eq!(stored(plan_transfer(&staff, blank).unwrap()).state(), TransactionState::Draft);

        let with_photo = TransferInput { photo_proof_url: Some("https://x/foto.jpg".into()), ..transfer_input() };
        assert_eq!(
            stored(plan_transfer(&staff, with_photo).unwrap()).state(),
            TransactionState::AwaitingApproval
        );
    }

    #[test]
    fn approving_without_transfer_proof_is_a_validation_error() {
        let admin = principal(Role::Admin);
        let input = TransferInput { photo_proof_url: Some("https://x/foto.jpg".into()), ..transfer_input() };
        let tx = stored(plan_transfer(&admin, input).unwrap());

        assert!(matches!(approve(&tx, &admin), Err(AppError::Validation(_))));
    }

    #[test]
    fn approving_a_draft_transfer_asks_for_the_proof() {
        let admin = principal(Role::Admin);
        let tx = stored(plan_transfer(&admin, transfer_input()).unwrap());
        assert_eq!(tx.state(), TransactionState::Draft);
        assert!(matches!(approve(&tx, &admin), Err(AppError::Validation(_))));
    }

    #[test]
    fn approval_requires_admin() {
        let staff = principal(Role::Staff);
        let input = TransferInput { transfer_proof_url: Some("https://x/nf.pdf".into()), ..transfer_input() };
        let tx = stored(plan_transfer(&staff, input).unwrap());

        assert!(matches!(
            approve(&tx, &staff),
            Err(AppError::Forbidden(DenyReason::InsufficientRole))
        ));
    }

    #[test]
    fn unapproved_transfer_cannot_finish() {
        let staff = principal(Role::Staff);
        let draft = stored(plan_transfer(&staff, transfer_input()).unwrap());
        assert!(matches!(finish(&draft), Err(AppError::InvalidState(_))));

        let awaiting = submit_proof(&draft, None, Some("https://x/nf.pdf".into())).unwrap();
        assert_eq!(awaiting.state(), TransactionState::AwaitingApproval);
        assert!(matches!(finish(&awaiting), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn finished_transactions_are_immutable() {
        let admin = principal(Role::Admin);
        let input = TransferInput { transfer_proof_url: Some("https://x/nf.pdf".into()), ..transfer_input() };
        let tx = stored(plan_transfer(&admin, input).unwrap());

        let approved = approve(&tx, &admin).unwrap();
        assert_eq!(approved.state(), TransactionState::Approved);
        // Segunda aprovação antes de finalizar também é ilegal
        assert!(matches!(approve(&approved, &admin), Err(AppError::InvalidState(_))));

        let finished = finish(&approved).unwrap();
        assert_eq!(finished.state(), TransactionState::Finished);
        assert!(matches!(approve(&finished, &admin), Err(AppError::InvalidState(_))));
        assert!(matches!(finish(&finished), Err(AppError::InvalidState(_))));
        assert!(matches!(
            submit_proof(&finished, Some("https://x/y.jpg".into()), None),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn sales_have_no_approval_step() {
        let admin = principal(Role::Admin);
        let sale = stored(plan_sale(&admin, SaleInput::default()).unwrap());

        assert!(matches!(approve(&sale, &admin), Err(AppError::InvalidState(_))));
        assert!(matches!(finish(&sale), Err(AppError::InvalidState(_))));
        assert!(matches!(
            submit_proof(&sale, None, Some("https://x/nf.pdf".into())),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn submit_proof_requires_some_url() {
        let staff = principal(Role::Staff);
        let tx = stored(plan_transfer(&staff, transfer_input()).unwrap());
        assert!(matches!(submit_proof(&tx, None, Some(" ".into())), Err(AppError::Validation(_))));
    }

    // Cenário completo: dono, equipe, lojas, venda e transferência aprovada.
    #[tokio::test]
    async fn owner_staff_sale_and_approved_transfer() {
        let mut fx = Fixture::default();
        let owner = fx.owner();
        let staff = fx.member(owner, Role::Staff);
        let admin = fx.member(owner, Role::Admin);
        let t1 = fx.store(owner);
        let t2 = fx.store(owner);

        // STAFF registra uma venda sem lojas: finalizada na hora
        let s = fx.principal(staff);
        ensure(&fx, &s, Action::CreateSale, ChainLink::Tenant(owner)).await.unwrap();
        let sale = stored(plan_sale(&s, SaleInput { amount: Decimal::new(1250, 2), ..Default::default() }).unwrap());
        assert!(sale.is_finished);
        fx.transactions.insert(sale.id, sale.clone());
        ensure(&fx, &s, Action::Read, ChainLink::Transaction(sale.id)).await.unwrap();

        // ADMIN cria a transferência T1 → T2 só com a foto
        let a = fx.principal(admin);
        ensure(&fx, &a, Action::CreateTransfer, ChainLink::Store(t1)).await.unwrap();
        ensure(&fx, &a, Action::CreateTransfer, ChainLink::Store(t2)).await.unwrap();
        let input = TransferInput {
            amount: Decimal::new(30000, 2),
            from_store_id: Some(t1),
            to_store_id: Some(t2),
            photo_proof_url: Some("https://x/foto.jpg".into()),
            ..Default::default()
        };
        let tx = stored(plan_transfer(&a, input).unwrap());
        assert_eq!(tx.state(), TransactionState::AwaitingApproval);
        fx.transactions.insert(tx.id, tx.clone());

        // Comprovante + aprovação
        ensure(&fx, &a, Action::SubmitTransferProof, ChainLink::Transaction(tx.id)).await.unwrap();
        let tx = submit_proof(&tx, None, Some("https://x/nf.pdf".into())).unwrap();
        ensure(&fx, &a, Action::ApproveTransfer, ChainLink::Transaction(tx.id)).await.unwrap();
        let tx = approve(&tx, &a).unwrap();
        assert_eq!(tx.state(), TransactionState::Approved);
        assert_eq!(tx.approved_by, Some(admin));

        // Finalização
        ensure(&fx, &a, Action::FinishTransfer, ChainLink::Transaction(tx.id)).await.unwrap();
        let tx = finish(&tx).unwrap();
        assert_eq!(tx.state(), TransactionState::Finished);

        // STAFF não aprova
        assert!(matches!(
            ensure(&fx, &s, Action::ApproveTransfer, ChainLink::Transaction(tx.id)).await,
            Err(AppError::Forbidden(DenyReason::InsufficientRole))
        ));
    }

    #[tokio::test]
    async fn transfer_stores_must_belong_to_the_principal_tenant() {
        let mut fx = Fixture::default();
        let o1 = fx.owner();
        let o2 = fx.owner();
        let cashier = fx.member(o1, Role::Cashier);
        let own = fx.store(o1);
        let foreign = fx.store(o2);
        let closed = fx.store(o1);
        fx.delete_store(closed);

        let c = fx.principal(cashier);
        ensure(&fx, &c, Action::CreateTransfer, ChainLink::Tenant(o1)).await.unwrap();
        ensure(&fx, &c, Action::CreateTransfer, ChainLink::Store(own)).await.unwrap();

        assert!(matches!(
            ensure(&fx, &c, Action::CreateTransfer, ChainLink::Store(foreign)).await,
            Err(AppError::Forbidden(DenyReason::CrossTenant))
        ));
        assert!(matches!(
            ensure(&fx, &c, Action::CreateTransfer, ChainLink::Store(closed)).await,
            Err(AppError::NotFound("Loja"))
        ));
    }

    #[tokio::test]
    async fn foreign_staff_approving_gets_cross_tenant_before_role() {
        let mut fx = Fixture::default();
        let o1 = fx.owner();
        let o2 = fx.owner();
        let staff_o1 = fx.member(o1, Role::Staff);
        let admin_o2 = fx.member(o2, Role::Admin);
        let t1 = fx.store(o2);
        let t2 = fx.store(o2);
        let transfer = fx.transfer(admin_o2, t1, t2);

        let s = fx.principal(staff_o1);
        assert!(matches!(
            ensure(&fx, &s, Action::ApproveTransfer, ChainLink::Transaction(transfer)).await,
            Err(AppError::Forbidden(DenyReason::CrossTenant))
        ));
        assert!(matches!(
            ensure(&fx, &s, Action::ApproveTransfer, ChainLink::Transaction(Uuid::new_v4())).await,
            Err(AppError::NotFound(_))
        ));
    }
}
