mod app;
mod auth;
mod config;
mod error;
mod expenses;
mod extract;
mod health;
mod middleware;
mod response;
mod state;
mod store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "expense_tracker=debug,axum=info,tower_http=info".to_string());
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

    let state = state::AppState::init().await?;

    let stats = state.store.health().await;
    if stats.get("status").map(String::as_str) == Some("up") {
        tracing::info!("database connected");
    } else {
        tracing::warn!(?stats, "database health check failed at startup");
    }

    let config = state.config.clone();
    app::serve(app::build_app(state), &config).await
}
