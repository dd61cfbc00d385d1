// src/models/selectors.rs

//! CSS selector chains for scraping a search result page.
//!
//! Every chain is tried in order and the first selector that produces a
//! usable value wins. Update the defaults here when the storefront markup
//! changes.

use serde::{Deserialize, Serialize};

/// Ordered selector candidates for each extracted field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Candidates for the per-product container element
    #[serde(default = "defaults::containers")]
    pub containers: Vec<String>,

    /// Candidates for the product title, relative to a container
    #[serde(default = "defaults::titles")]
    pub titles: Vec<String>,

    /// Candidates for the star rating, relative to a container
    #[serde(default = "defaults::ratings")]
    pub ratings: Vec<String>,

    /// Candidates for the review count, relative to a container
    #[serde(default = "defaults::review_counts")]
    pub review_counts: Vec<String>,

    /// Candidates for the product image, relative to a container
    #[serde(default = "defaults::images")]
    pub images: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            containers: defaults::containers(),
            titles: defaults::titles(),
            ratings: defaults::ratings(),
            review_counts: defaults::review_counts(),
            images: defaults::images(),
        }
    }
}

impl SelectorConfig {
    /// Named view over every chain, used for validation and logging.
    pub fn chains(&self) -> [(&'static str, &[String]); 5] {
        [
            ("containers", &self.containers),
            ("titles", &self.titles),
            ("ratings", &self.ratings),
            ("review_counts", &self.review_counts),
            ("images", &self.images),
        ]
    }
}

mod defaults {
    fn owned(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    pub fn containers() -> Vec<String> {
        owned(&[
            r#"[data-component-type="s-search-result"]"#,
            r#".s-result-item[data-component-type="s-search-result"]"#,
            ".s-card-container",
        ])
    }

    pub fn titles() -> Vec<String> {
        owned(&[
            // Full title carried in the accessibility label
            "h2[aria-label]",
            "a h2[aria-label]",
            // Title text inside the product link
            "h2 a span",
            "a.a-link-normal h2 span",
            ".a-link-normal h2 span",
            "h2 .a-text-normal span",
            ".s-size-mini .s-link-style a span",
            // Broad fallbacks
            "h2 span",
            ".a-text-normal",
            "h2",
        ])
    }

    pub fn ratings() -> Vec<String> {
        owned(&[".a-icon-alt", r#"[aria-label*="stars"]"#, ".a-icon-star span"])
    }

    pub fn review_counts() -> Vec<String> {
        owned(&[
            ".a-size-base",
            r##"a[href*="#customerReviews"] span"##,
            ".a-link-normal span",
        ])
    }

    pub fn images() -> Vec<String> {
        owned(&[
            ".s-image",
            "img[data-image-latency]",
            ".a-dynamic-image",
            "img",
        ])
    }
}
