//! Route handlers and JSON error responses.

use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::{ScrapeReport, now_iso};
use crate::server::app::AppState;

const EXAMPLE_PATH: &str = "/api/scrape?keyword=smartphone";
const BLOCKING_HINT: &str = "The upstream site may be blocking automated requests";

/// First `keyword` value in a raw query string.
///
/// Repeated keys are not an error; later values are ignored.
pub fn keyword_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "keyword")
        .map(|(_, value)| value.into_owned())
}

/// Scrape the search page for `keyword` and return its listings.
pub async fn scrape_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<ScrapeReport>, ApiErrorResponse> {
    let keyword = keyword_param(query.as_deref()).unwrap_or_default();
    let report = state.pipeline.run(&keyword).await?;
    Ok(Json(report))
}

/// Describe the available endpoints.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Product scraper API is running",
        "endpoints": {
            "scrape": "/api/scrape?keyword=your_search_term",
            "health": "/health",
        },
        "example": EXAMPLE_PATH,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": now_iso(),
        "runtime": "rust",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Error response wrapper
#[derive(Debug)]
pub struct ApiErrorResponse(pub AppError);

impl From<AppError> for ApiErrorResponse {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl ApiErrorResponse {
    fn body(&self) -> Value {
        match &self.0 {
            AppError::MissingKeyword => json!({
                "success": false,
                "error": self.0.to_string(),
                "example": EXAMPLE_PATH,
            }),
            AppError::Timeout { .. } => json!({
                "success": false,
                "error": "Request timeout",
                "message": "The upstream site took too long to respond",
            }),
            other => json!({
                "success": false,
                "error": "Internal server error",
                "message": other.to_string(),
                "hint": BLOCKING_HINT,
            }),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}
