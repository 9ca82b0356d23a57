//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod access;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod workflows;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::users::get_me).patch(handlers::users::update_me))
        .route("/", post(handlers::users::create_user).get(handlers::users::list_users))
        .route("/{id}", get(handlers::users::get_user).delete(handlers::users::delete_user));

    let store_routes = Router::new()
        .route("/", post(handlers::stores::create_store).get(handlers::stores::list_stores))
        .route(
            "/{id}",
            get(handlers::stores::get_store)
                .patch(handlers::stores::update_store)
                .delete(handlers::stores::delete_store),
        )
        .route(
            "/{id}/categories",
            post(handlers::catalog::create_category).get(handlers::catalog::list_categories),
        )
        .route(
            "/{id}/products",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        );

    let product_routes = Router::new()
        .route(
            "/{id}",
            get(handlers::catalog::get_product)
                .patch(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        )
        .route(
            "/{id}/checks",
            post(handlers::product_checks::create_check).get(handlers::product_checks::list_checks),
        );

    let transaction_routes = Router::new()
        .route("/", get(handlers::transactions::list_transactions))
        .route("/sales", post(handlers::transactions::create_sale))
        .route("/transfers", post(handlers::transactions::create_transfer))
        .route("/{id}", get(handlers::transactions::get_transaction))
        .route("/{id}/proof", post(handlers::transactions::submit_proof))
        .route("/{id}/approve", post(handlers::transactions::approve_transaction))
        .route("/{id}/finish", post(handlers::transactions::finish_transaction));

    let check_routes = Router::new()
        .route("/{id}", get(handlers::product_checks::get_check))
        .route("/{id}/resolve", post(handlers::product_checks::resolve_check));

    // Tudo abaixo exige token válido
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/stores", store_routes)
        .nest("/products", product_routes)
        .nest("/transactions", transaction_routes)
        .nest("/product-checks", check_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let bind_addr = app_state.bind_addr.clone();

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
