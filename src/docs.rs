// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::delete_user,

        // --- Stores ---
        handlers::stores::create_store,
        handlers::stores::list_stores,
        handlers::stores::get_store,
        handlers::stores::update_store,
        handlers::stores::delete_store,

        // --- Catalog ---
        handlers::catalog::create_category,
        handlers::catalog::list_categories,
        handlers::catalog::create_product,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,

        // --- Transactions ---
        handlers::transactions::create_sale,
        handlers::transactions::create_transfer,
        handlers::transactions::list_transactions,
        handlers::transactions::get_transaction,
        handlers::transactions::submit_proof,
        handlers::transactions::approve_transaction,
        handlers::transactions::finish_transaction,

        // --- Product Checks ---
        handlers::product_checks::create_check,
        handlers::product_checks::list_checks,
        handlers::product_checks::get_check,
        handlers::product_checks::resolve_check,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,

            // --- Stores / Catalog ---
            models::store::Store,
            models::catalog::Category,
            models::catalog::Product,
            handlers::stores::CreateStorePayload,
            handlers::stores::UpdateStorePayload,
            handlers::catalog::CreateCategoryPayload,
            handlers::catalog::CreateProductPayload,
            handlers::catalog::UpdateProductPayload,

            // --- Transactions ---
            models::transaction::TransactionType,
            models::transaction::TransactionState,
            models::transaction::Transaction,
            models::transaction::TransactionView,
            handlers::transactions::CreateSalePayload,
            handlers::transactions::CreateTransferPayload,
            handlers::transactions::SubmitProofPayload,

            // --- Product Checks ---
            models::product_check::CheckStatus,
            models::product_check::ProductCheck,
            handlers::product_checks::CreateCheckPayload,
            handlers::product_checks::ResolveCheckPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Equipe do negócio e perfil"),
        (name = "Stores", description = "Lojas do negócio"),
        (name = "Catalog", description = "Categorias e Produtos por loja"),
        (name = "Transactions", description = "Vendas e Transferências entre lojas"),
        (name = "Product Checks", description = "Conferência de estoque")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
