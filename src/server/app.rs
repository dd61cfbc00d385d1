//! Application setup and server configuration.

use axum::{
    Router,
    extract::Request,
    http::{
        HeaderName, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::Result;
use crate::models::ServerConfig;
use crate::pipeline::ScrapePipeline;
use crate::server::routes::{health_handler, index_handler, scrape_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ScrapePipeline,
}

impl AppState {
    pub fn new(pipeline: ScrapePipeline) -> Self {
        Self { pipeline }
    }
}

/// Log every inbound request with its origin.
async fn log_requests(request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    log::info!("{} {} - Origin: {}", request.method(), request.uri(), origin);

    next.run(request).await
}

/// CORS policy: mirror the caller's origin and allow credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Build the Axum application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/scrape", get(scrape_handler))
        .route("/api/scrape", get(scrape_handler))
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer())
        .with_state(state)
}

/// Bind the listener and serve until Ctrl+C.
pub async fn serve(config: &ServerConfig, pipeline: ScrapePipeline) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Server running on {}", addr);
    log::info!(
        "Test with: http://localhost:{}/api/scrape?keyword=smartphone",
        config.port
    );

    axum::serve(listener, build_router(AppState::new(pipeline)))
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Shutdown signal received"),
                Err(e) => {
                    log::error!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}
