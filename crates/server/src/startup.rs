use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use service::auth::{repo::seaorm::SeaOrmUserRepository, repository::UserRepository, AccountService, TokenService};
use tracing::info;

use crate::cors::AllowedOrigins;
use crate::errors::StartupError;
use crate::routes::{self, account::ServerState};

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Assemble the router from an already-built persistence provider.
pub fn build_app(cfg: &AppConfig, repo: Arc<dyn UserRepository>) -> Result<Router, StartupError> {
    let tokens = TokenService::from_config(&cfg.auth).map_err(|e| StartupError::TokenKeys(e.to_string()))?;
    info!(lifetime_secs = tokens.lifetime().as_secs(), "token service ready");
    let state = ServerState::new(AccountService::new(repo, Arc::new(tokens)));
    let origins = AllowedOrigins::from_config(&cfg.cors)?;
    info!(allowed_origins = cfg.cors.allowed_origins.len(), "cors allow-list loaded");
    Ok(routes::build_router(state, origins))
}

/// Connect, migrate when enabled, and serve `cfg` until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let repo: Arc<dyn UserRepository> = Arc::new(SeaOrmUserRepository { db });
    let app = build_app(&cfg, repo)?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting account server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
