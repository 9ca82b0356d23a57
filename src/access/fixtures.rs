// src/access/fixtures.rs
//
// ChainSource em memória para os testes (sem banco de dados).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    access::ownership::{owner_root, ChainLink, ChainSource, OwnerChain},
    common::error::AppError,
    models::{
        auth::{Principal, Role, User},
        catalog::{Category, Product},
        product_check::{CheckStatus, ProductCheck},
        store::Store,
        transaction::{Transaction, TransactionType},
    },
};

#[derive(Debug, Default)]
pub struct Fixture {
    pub users: HashMap<Uuid, User>,
    pub stores: HashMap<Uuid, Store>,
    pub categories: HashMap<Uuid, Category>,
    pub products: HashMap<Uuid, Product>,
    pub transactions: HashMap<Uuid, Transaction>,
    pub checks: HashMap<Uuid, ProductCheck>,
}

impl Fixture {
    fn insert_user(&mut self, role: Role, owner_id: Option<Uuid>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.users.insert(
            id,
            User {
                id,
                username: format!("user-{id}"),
                password_hash: String::new(),
                name: role.as_str().to_lowercase(),
                role,
                owner_id,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        id
    }

    pub fn owner(&mut self) -> Uuid {
        self.insert_user(Role::Owner, None)
    }

    pub fn member(&mut self, owner: Uuid, role: Role) -> Uuid {
        self.insert_user(role, Some(owner))
    }

    pub fn principal(&self, user_id: Uuid) -> Principal {
        Principal::from_user(&self.users[&user_id]).expect("usuário íntegro")
    }

    pub fn store(&mut self, owner: Uuid) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.stores.insert(
            id,
            Store {
                id,
                owner_id: owner,
                name: format!("Loja {id}"),
                code: id.simple().to_string()[..6].to_uppercase(),
                address: None,
                city: None,
                state: None,
                postal_code: None,
                phone: None,
                opens_at: None,
                closes_at: None,
                timezone: "UTC".into(),
                is_active: true,
                created_by: owner,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        id
    }

    pub fn category(&mut self, store: Uuid) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.categories.insert(
            id,
            Category {
                id,
                store_id: store,
                name: "Bebidas".into(),
                description: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        id
    }

    pub fn product(&mut self, store: Uuid) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.products.insert(
            id,
            Product {
                id,
                store_id: store,
                category_id: None,
                sku: format!("SKU-{}", &id.simple().to_string()[..6]),
                name: "Refrigerante".into(),
                description: None,
                quantity: 10,
                purchase_price: Decimal::new(210, 2),
                sale_price: Decimal::new(450, 2),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        id
    }

    pub fn check(&mut self, product: Uuid, checked_by: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let p = &self.products[&product];
        self.checks.insert(
            id,
            ProductCheck {
                id,
                product_id: product,
                store_id: p.store_id,
                checked_by,
                status: CheckStatus::Pending,
                expected_quantity: p.quantity,
                counted_quantity: None,
                note: None,
                checked_at: Utc::now(),
                resolved_at: None,
            },
        );
        id
    }

    fn insert_transaction(
        &mut self,
        transaction_type: TransactionType,
        created_by: Uuid,
        stores: Option<(Uuid, Uuid)>,
    ) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.transactions.insert(
            id,
            Transaction {
                id,
                transaction_type,
                created_by,
                approved_by: None,
                from_store_id: stores.map(|s| s.0),
                to_store_id: stores.map(|s| s.1),
                photo_proof_url: None,
                transfer_proof_url: None,
                amount: Decimal::new(1000, 2),
                note: None,
                is_finished: transaction_type == TransactionType::Sale,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn sale(&mut self, created_by: Uuid) -> Uuid {
        self.insert_transaction(TransactionType::Sale, created_by, None)
    }

    pub fn transfer(&mut self, created_by: Uuid, from: Uuid, to: Uuid) -> Uuid {
        self.insert_transaction(TransactionType::Transfer, created_by, Some((from, to)))
    }

    pub fn delete_store(&mut self, store: Uuid) {
        if let Some(s) = self.stores.get_mut(&store) {
            s.deleted_at = Some(Utc::now());
        }
    }

    pub fn delete_user(&mut self, user: Uuid) {
        if let Some(u) = self.users.get_mut(&user) {
            u.deleted_at = Some(Utc::now());
        }
    }
}

#[async_trait]
impl ChainSource for Fixture {
    async fn parent_of(&self, link: ChainLink) -> Result<Option<ChainLink>, AppError> {
        match link {
            ChainLink::Tenant(_) => Ok(Some(link)),
            ChainLink::Owner(id) => self
                .users
                .get(&id)
                .filter(|u| u.deleted_at.is_none())
                .map(owner_root)
                .transpose(),
            ChainLink::User(id) => self
                .users
                .get(&id)
                .filter(|u| u.deleted_at.is_none())
                .map(OwnerChain::parent_link)
                .transpose(),
            ChainLink::Store(id) => self
                .stores
                .get(&id)
                .filter(|s| s.deleted_at.is_none())
                .map(OwnerChain::parent_link)
                .transpose(),
            ChainLink::Category(id) => self
                .categories
                .get(&id)
                .filter(|c| c.deleted_at.is_none())
                .map(OwnerChain::parent_link)
                .transpose(),
            ChainLink::Product(id) => self
                .products
                .get(&id)
                .filter(|p| p.deleted_at.is_none())
                .map(OwnerChain::parent_link)
                .transpose(),
            ChainLink::Transaction(id) => self.transactions.get(&id).map(OwnerChain::parent_link).transpose(),
            ChainLink::ProductCheck(id) => self.checks.get(&id).map(OwnerChain::parent_link).transpose(),
        }
    }
}
