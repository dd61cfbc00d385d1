//! HTTP front door.
//!
//! - `GET /scrape?keyword=` and `GET /api/scrape?keyword=`: run one scrape
//! - `GET /`: endpoint overview
//! - `GET /health`: liveness payload

pub mod app;
pub mod routes;

pub use app::{AppState, build_router, serve};
