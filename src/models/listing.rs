//! Listing and report data structures.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A product listing extracted from a search result page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Product title, never empty
    pub title: String,

    /// Star rating, conventionally 0.0 to 5.0
    pub rating: Option<f64>,

    /// Number of customer reviews
    pub review_count: Option<u64>,

    /// Absolute URL of the product image
    pub image_url: Option<String>,
}

impl Listing {
    /// Create a listing with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rating: None,
            review_count: None,
            image_url: None,
        }
    }
}

/// Successful scrape response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReport {
    pub success: bool,
    pub keyword: String,

    /// Number of listings extracted before truncation
    pub total_products: usize,
    pub search_url: String,
    pub products: Vec<Listing>,

    /// ISO 8601 UTC timestamp with millisecond precision
    pub timestamp: String,
}

impl ScrapeReport {
    /// Build a report, keeping at most `limit` listings.
    pub fn new(
        keyword: impl Into<String>,
        search_url: impl Into<String>,
        mut listings: Vec<Listing>,
        limit: Option<usize>,
    ) -> Self {
        let total_products = listings.len();
        if let Some(limit) = limit {
            listings.truncate(limit);
        }

        Self {
            success: true,
            keyword: keyword.into(),
            total_products,
            search_url: search_url.into(),
            products: listings,
            timestamp: now_iso(),
        }
    }
}

/// Current time formatted like `2025-01-01T12:00:00.000Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listings(count: usize) -> Vec<Listing> {
        (0..count)
            .map(|i| Listing::titled(format!("Wireless Headphones #{i}")))
            .collect()
    }

    #[test]
    fn test_listing_serializes_camel_case_with_nulls() {
        let json = serde_json::to_value(Listing::titled("Noise Cancelling Headphones")).unwrap();
        assert_eq!(json["title"], "Noise Cancelling Headphones");
        assert!(json["rating"].is_null());
        assert!(json["reviewCount"].is_null());
        assert!(json["imageUrl"].is_null());
    }

    #[test]
    fn test_report_truncates_but_counts_all() {
        let report = ScrapeReport::new(
            "headphones",
            "https://example.com/s?k=headphones",
            sample_listings(20),
            Some(16),
        );
        assert_eq!(report.total_products, 20);
        assert_eq!(report.products.len(), 16);
        assert_eq!(report.products[15].title, "Wireless Headphones #15");
    }

    #[test]
    fn test_report_without_limit_keeps_everything() {
        let report =
            ScrapeReport::new("headphones", "https://example.com/s", sample_listings(20), None);
        assert_eq!(report.products.len(), 20);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ScrapeReport::new("mouse", "https://example.com/s?k=mouse", vec![], Some(16));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["totalProducts"], 0);
        assert_eq!(json["searchUrl"], "https://example.com/s?k=mouse");
        assert!(json["products"].as_array().unwrap().is_empty());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
