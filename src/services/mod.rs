//! Service layer for the scraper application.
//!
//! This module contains the business logic for:
//! - Selector fallback chains (`SelectorChain`)
//! - Listing extraction from result pages (`ListingExtractor`)

mod extractor;
mod selectors;

pub use extractor::ListingExtractor;
pub use selectors::SelectorChain;
