use std::net::SocketAddr;

use axum::{http::HeaderValue, Router};
use configs::{AppConfig, CorsConfig};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::routes::{self, ServerState};

/// CORS for the configured browser origins; an empty list is permissive.
pub fn build_cors(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Open the pool and bring the schema up to date when `auto_migrate` is set.
pub async fn connect_database(cfg: &configs::DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut db_cfg = models::db::DatabaseConfig::from(cfg);
    if db_cfg.url.contains(":memory:") {
        db_cfg = models::db::DatabaseConfig { url: db_cfg.url, ..models::db::DatabaseConfig::in_memory_sqlite() };
    }
    let db = models::db::connect_with_config(&db_cfg).await?;
    models::db::test_connection(&db).await?;
    if cfg.auto_migrate {
        Migrator::up(&db, None).await?;
        info!("migrations applied");
    }
    Ok(db)
}

pub fn bind_addr(cfg: &configs::ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.host, cfg.port).parse()?)
}

/// Assemble the application over an existing connection.
pub fn build_app(db: DatabaseConnection, cors: &CorsConfig) -> Router {
    routes::build_router(ServerState::new(db), build_cors(cors))
}

/// Public entry: connect, build the app and serve until the task is dropped.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = connect_database(&cfg.database).await?;
    let app = build_app(db, &cfg.cors);

    let addr = bind_addr(&cfg.server)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "student records server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
