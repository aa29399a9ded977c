mod api;
mod middleware;

use std::collections::HashSet;
use std::sync::Arc;

use cheapo_engine::{Controller, EngineConfig};
use cheapo_search::SearchClient;
use cheapo_telegram::TelegramClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AccessPolicy, AppState},
    middleware::WebhookAuth,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = cheapo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = cheapo_db::PoolConfig::from_app_config(&config);
    let pool = cheapo_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = cheapo_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations checked");

    let catalog = cheapo_core::load_catalog(config.catalog_path.as_deref())?;
    let engine_config = EngineConfig::from_app_config(&config, catalog);
    let search = SearchClient::from_app_config(&config)?;
    let telegram = TelegramClient::from_app_config(&config)?;
    let store = cheapo_db::PgStateStore::new(pool.clone());

    let controller = Controller::new(
        engine_config,
        Arc::new(search),
        Arc::new(store),
        Arc::new(telegram.clone()),
    );
    let access = AccessPolicy {
        approved_users: config.approved_users.iter().copied().collect::<HashSet<_>>(),
        bot_user_id: config.bot_user_id,
    };
    if access.approved_users.is_empty() {
        tracing::warn!("CHEAPO_APPROVED_USERS is empty; only \"get id\" requests will be answered");
    }

    let auth = WebhookAuth::from_app_config(&config);
    let app = build_app(
        AppState {
            pool,
            controller: Arc::new(controller),
            telegram,
            access: Arc::new(access),
        },
        auth,
    );

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "cheapo server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
