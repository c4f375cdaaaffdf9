//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

#[cfg(test)]
mod test_utils;

use crate::config::{AppState, Config};
use crate::middleware::telegram_secret::telegram_secret_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração válida a aplicação não deve iniciar
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    app_state.admin_service.seed_super_admin().await?;

    let telegram_routes = Router::new()
        .route("/telegram", post(handlers::telegram::telegram_webhook))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            telegram_secret_guard,
        ));

    let bitrix_routes = Router::new().route(
        "/bitrix",
        get(handlers::bitrix::bitrix_webhook).post(handlers::bitrix::bitrix_webhook),
    );

    let app = Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/webhook", telegram_routes.merge(bitrix_routes))
        .with_state(app_state);

    let addr = format!("0.0.0.0:{}", config.web_server_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
