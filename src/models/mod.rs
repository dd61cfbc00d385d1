// src/models/mod.rs

//! Domain models for the scraper service.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod listing;
mod selectors;

// Re-export all public types
pub use config::{Config, PORT_ENV, ScraperConfig, ServerConfig};
pub use listing::{Listing, ScrapeReport, now_iso};
pub use selectors::SelectorConfig;

/// Summary of one extraction pass over a result page.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub listings: Vec<Listing>,

    /// Selector that located the containers, if any did
    pub container_selector: Option<String>,
    pub container_total: usize,

    /// Containers skipped because processing them failed
    pub failures: usize,
}
