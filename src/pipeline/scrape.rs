// src/pipeline/scrape.rs

//! Search scraping pipeline: fetch one result page and extract its listings.

use std::sync::Arc;

use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, ScrapeReport, ScraperConfig};
use crate::services::ListingExtractor;
use crate::utils::http::{HttpFetcher, PageFetcher};

/// Everything a scrape needs, shared read-only across requests.
#[derive(Clone)]
pub struct ScrapePipeline {
    config: ScraperConfig,
    extractor: Arc<ListingExtractor>,
    fetcher: Arc<dyn PageFetcher>,
}

impl ScrapePipeline {
    /// Build a pipeline that fetches over HTTP.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.scraper)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Build a pipeline around a custom page source.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            config: config.scraper.clone(),
            extractor: Arc::new(ListingExtractor::new(&config.selectors)?),
            fetcher,
        })
    }

    /// Maximum listings included in a report.
    pub fn max_results(&self) -> usize {
        self.config.max_results
    }

    /// Run one scrape, truncating the listings to `max_results`.
    pub async fn run(&self, keyword: &str) -> Result<ScrapeReport> {
        self.run_with_limit(keyword, Some(self.config.max_results)).await
    }

    /// Run one scrape with an explicit listing limit (`None` keeps all).
    pub async fn run_with_limit(
        &self,
        keyword: &str,
        limit: Option<usize>,
    ) -> Result<ScrapeReport> {
        if keyword.is_empty() {
            return Err(AppError::MissingKeyword);
        }

        log::info!("Starting scraping for: {}", keyword);
        let search_url = self.config.search_url_for(keyword);

        let html = self.fetcher.fetch(&search_url).await.inspect_err(|e| {
            log::error!("Scraping error for '{}': {}", keyword, e);
        })?;
        log::info!("Page loaded ({} bytes), starting parsing...", html.len());

        Ok(self.build_report(keyword, search_url, &html, limit))
    }

    fn build_report(
        &self,
        keyword: &str,
        search_url: String,
        html: &str,
        limit: Option<usize>,
    ) -> ScrapeReport {
        let document = Html::parse_document(html);
        let base_url = Url::parse(&search_url).ok();
        let outcome = self.extractor.extract(&document, base_url.as_ref());

        log::info!(
            "Extracted {} products ({} containers, {} failed)",
            outcome.listings.len(),
            outcome.container_total,
            outcome.failures
        );

        ScrapeReport::new(keyword, search_url, outcome.listings, limit)
    }
}
