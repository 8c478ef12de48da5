use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use favorites_api::data::sqlite::SqliteRepository;
use favorites_api::infrastructure::config::Config;
use favorites_api::infrastructure::logging::init_logging;
use favorites_api::presentation::handlers::AppState;
use favorites_api::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use favorites_api::presentation::routes::{self, ENDPOINTS};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        database_url = %config.database_url,
        current_user_id = config.current_user_id,
        "Configuration loaded"
    );

    let repository = SqliteRepository::open(&config.database_url, config.max_connections).await?;
    info!("Database ready");

    let state = web::Data::new(AppState::new(
        Arc::new(repository),
        config.current_user_id,
    ));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(routes::configure)
    });

    let bind_addr = config.bind_address();
    let server = server
        .bind(&bind_addr)
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    let routes: Vec<String> = ENDPOINTS
        .iter()
        .map(|(method, path)| format!("{method} {path}"))
        .collect();
    info!(address = %bind_addr, routes = %routes.join(", "), "Starting HTTP server");

    server.run().await.context("server terminated with an error")
}
