mod app;
mod auth;
mod config;
mod error;
mod github;
mod policy;
mod posts;
mod profiles;
mod state;
mod store;
mod validation;

use anyhow::Context;

use crate::state::AppState;

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "devconnect=debug,axum=info,tower_http=info".to_string());
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
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let (app_state, pg) = AppState::init().await?;
    tracing::info!(
        jwt = ?app_state.config.jwt,
        github = ?app_state.config.github,
        db_timeout_secs = app_state.config.db_timeout_secs,
        "configuration loaded"
    );

    sqlx::migrate!("./migrations")
        .run(pg.pool())
        .await
        .context("run migrations")?;
    tracing::info!("migrations applied");

    let app = app::build_app(app_state);
    app::serve(app).await
}
