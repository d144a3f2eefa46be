//! tutor-scheduler - HTTP server binary.
//!
//! Loads configuration, connects to PostgreSQL, optionally applies
//! migrations, and serves the scheduling API.

use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tutor_scheduler::adapters::http::api_router;
use tutor_scheduler::adapters::postgres::{
    PostgresScheduleReader, PostgresSchedulingStore, MIGRATOR,
};
use tutor_scheduler::adapters::SystemClock;
use tutor_scheduler::application::SchedulingEngine;
use tutor_scheduler::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let engine = SchedulingEngine::new(
        Arc::new(PostgresSchedulingStore::new(pool.clone())),
        Arc::new(PostgresScheduleReader::new(pool)),
        Arc::new(SystemClock),
        config.scheduling.policy(),
    );

    let app = api_router(Arc::new(engine))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "tutor-scheduler listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
