use custody_ledger::{ api, AppError, Config, LedgerEngine, Result };
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "custody_ledger=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting custody-ledger with pool size {} and lock timeout {:?}",
        config.db_max_connections,
        config.db_lock_timeout
    );

    let db = sea_orm::Database::connect(config.connect_options()).await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations completed successfully");

    let engine = LedgerEngine::new(db, config.bootstrap.clone()).with_lock_timeout(
        config.db_lock_timeout
    );
    let app = api::router(api::AppState::new(Arc::new(engine)));

    let addr = config.listen_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
