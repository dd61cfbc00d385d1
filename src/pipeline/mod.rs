//! Pipeline entry points for scraper operations.
//!
//! - `ScrapePipeline::run`: fetch a search page and extract its listings

pub mod scrape;

pub use scrape::ScrapePipeline;
