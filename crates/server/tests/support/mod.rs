use std::net::SocketAddr;

use migration::{Migrator, MigratorTrait};
use tokio::net::TcpListener;

pub struct TestApp {
    pub base_url: String,
}

/// Serve the full router over a fresh migrated in-memory SQLite database.
pub async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::in_memory_sqlite()).await?;
    Migrator::up(&db, None).await?;

    let app = server::startup::build_app(db, &configs::CorsConfig::default());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}
