use std::sync::Arc;

use parley::{
    config::AppConfig,
    db,
    users::{PgUserStore, UserService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "parley=debug,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let users = UserService::with_argon2(Arc::new(PgUserStore::new(pool.clone())));
    let probe = users.find_by_email("nobody@localhost.invalid").await?;
    tracing::debug!(found = probe.is_some(), "user store reachable");

    tracing::info!(max_connections = config.max_connections, "users schema ready");
    Ok(())
}
