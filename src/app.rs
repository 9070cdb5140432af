use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::ConnectInfo,
    middleware,
    routing::any,
    Router,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{auth, config::AppConfig, expenses, health, middleware::cors, state::AppState};

/// Layering, outermost first: CORS, timeout, router. Register, login and the
/// expense routes are additionally wrapped in request logging; auth runs as
/// an extractor inside the handler.
pub fn build_app(state: AppState) -> Router {
    let docs = ServeDir::new(&state.config.docs_dir);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let logged = auth::router().merge(expenses::router()).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let remote = req
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!(
                    "http_request",
                    %remote,
                    %method,
                    uri = %uri,
                    status = tracing::field::Empty
                )
            })
            .on_request(|_req: &axum::http::Request<_>, _span: &tracing::Span| {
                tracing::info!("request");
            })
            .on_response(
                |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, ?latency, "response");
                    } else {
                        tracing::info!(%status, ?latency, "response");
                    }
                },
            ),
    );

    Router::new()
        .route("/health", any(health::health))
        .merge(logged)
        .fallback_service(docs)
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
