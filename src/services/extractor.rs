// src/services/extractor.rs

//! Listing extraction service.
//!
//! Walks a search result page with the configured selector chains and turns
//! each product container into a [`Listing`].

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ExtractionOutcome, Listing, SelectorConfig};
use crate::services::SelectorChain;
use crate::utils::resolve_url;

/// Titles must be longer than this many UTF-16 code units to be accepted.
const MIN_TITLE_UNITS: usize = 10;

const RATING_PATTERN: &str = r"(?i)([0-9]+\.?[0-9]*)\s*out\s*of\s*5|([0-9]+\.?[0-9]*)\s*stars?";
const REVIEW_COUNT_PATTERN: &str = r"^([0-9,]+)$";

/// Service for extracting listings from a parsed result page.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    containers: SelectorChain,
    titles: SelectorChain,
    ratings: SelectorChain,
    review_counts: SelectorChain,
    images: SelectorChain,
    rating_re: Regex,
    review_count_re: Regex,
}

impl ListingExtractor {
    /// Compile the selector chains from configuration.
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            containers: SelectorChain::compile("containers", &selectors.containers)?,
            titles: SelectorChain::compile("titles", &selectors.titles)?,
            ratings: SelectorChain::compile("ratings", &selectors.ratings)?,
            review_counts: SelectorChain::compile("review_counts", &selectors.review_counts)?,
            images: SelectorChain::compile("images", &selectors.images)?,
            rating_re: Self::compile_pattern(RATING_PATTERN)?,
            review_count_re: Self::compile_pattern(REVIEW_COUNT_PATTERN)?,
        })
    }

    /// Extract every listing from a document.
    ///
    /// Containers are processed in document order. A container that fails is
    /// logged and skipped; the rest of the page is still processed.
    pub fn extract(&self, document: &Html, base_url: Option<&Url>) -> ExtractionOutcome {
        self.extract_with(document, |container| self.extract_listing(container, base_url))
    }

    /// Run `parse` over every container found in the document.
    ///
    /// `Ok(None)` skips the container; `Err` is counted as a failure and
    /// does not stop the batch.
    pub fn extract_with<'a>(
        &self,
        document: &'a Html,
        mut parse: impl FnMut(ElementRef<'a>) -> Result<Option<Listing>>,
    ) -> ExtractionOutcome {
        let Some((selector, containers)) = self.containers.first_in_document(document) else {
            log::info!("Found 0 products");
            return ExtractionOutcome::default();
        };

        log::info!("Found {} products using '{}'", containers.len(), selector);

        let mut outcome = ExtractionOutcome {
            container_selector: Some(selector.to_string()),
            container_total: containers.len(),
            ..ExtractionOutcome::default()
        };

        for (index, container) in containers.into_iter().enumerate() {
            match parse(container) {
                Ok(Some(listing)) => outcome.listings.push(listing),
                Ok(None) => log::debug!("Skipping product {index}: no title found"),
                Err(error) => {
                    outcome.failures += 1;
                    log::warn!("Error processing product {index}: {error}");
                }
            }
        }

        outcome
    }

    /// Extract a single listing from its container.
    ///
    /// Returns `Ok(None)` when no title qualifies.
    pub fn extract_listing(
        &self,
        container: ElementRef<'_>,
        base_url: Option<&Url>,
    ) -> Result<Option<Listing>> {
        let Some(title) = self.title(container) else {
            return Ok(None);
        };

        Ok(Some(Listing {
            title,
            rating: self.rating(container)?,
            review_count: self.review_count(container),
            image_url: self.image_url(container, base_url),
        }))
    }

    fn title(&self, container: ElementRef<'_>) -> Option<String> {
        self.titles.find_first(container, |element| {
            let from_label = element
                .value()
                .attr("aria-label")
                .map(str::trim)
                .filter(|label| is_meaningful_title(label));

            from_label.map(str::to_string).or_else(|| {
                let text = element_text(element);
                let text = text.trim();
                is_meaningful_title(text).then(|| text.to_string())
            })
        })
    }

    fn rating(&self, container: ElementRef<'_>) -> Result<Option<f64>> {
        let captured = self.ratings.find_first(container, |element| {
            let mut text = element_text(element);
            if text.is_empty() {
                text = element.value().attr("aria-label").unwrap_or_default().to_string();
            }

            let caps = self.rating_re.captures(&text)?;
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        });

        captured.map(|number| number.parse::<f64>()).transpose().map_err(AppError::from)
    }

    fn review_count(&self, container: ElementRef<'_>) -> Option<u64> {
        self.review_counts
            .find_any(container, |element| {
                let text = element_text(element);
                let caps = self.review_count_re.captures(text.trim())?;

                let digits: String = caps[1].chars().filter(|c| *c != ',').collect();
                if digits.is_empty() {
                    // Separators only: the search still ends here, without a count.
                    return Some(None);
                }
                // Only overflow can fail here; clamp instead of dropping the listing.
                Some(Some(digits.parse::<u64>().unwrap_or(u64::MAX)))
            })
            .flatten()
    }

    fn image_url(&self, container: ElementRef<'_>, base_url: Option<&Url>) -> Option<String> {
        self.images.find_first(container, |element| {
            let src = element.value().attr("src").filter(|src| !src.is_empty())?;
            Some(match base_url {
                Some(base) => resolve_url(base, src),
                None => src.to_string(),
            })
        })
    }

    fn compile_pattern(pattern: &str) -> Result<Regex> {
        Regex::new(pattern)
            .map_err(|e| AppError::config(format!("invalid pattern {pattern}: {e}")))
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn is_meaningful_title(text: &str) -> bool {
    text.encode_utf16().count() > MIN_TITLE_UNITS
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use super::*;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&SelectorConfig::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://www.amazon.com/s?k=headphones").unwrap()
    }

    fn result(inner: &str) -> String {
        format!(r#"<div data-component-type="s-search-result">{inner}</div>"#)
    }

    fn page(results: &[String]) -> Html {
        Html::parse_document(&format!(
            "<html><body><div class=\"s-main-slot\">{}</div></body></html>",
            results.concat()
        ))
    }

    fn extract(results: &[String]) -> ExtractionOutcome {
        extractor().extract(&page(results), Some(&base()))
    }

    const FULL_RESULT: &str = r#"
        <h2 aria-label="Sony WH-1000XM5 Wireless Noise Canceling Headphones">
            <a class="a-link-normal" href="/dp/B09XS7JWHH"><span>Sony WH-1000XM5</span></a>
        </h2>
        <i class="a-icon a-icon-star-small"><span class="a-icon-alt">4.6 out of 5 stars</span></i>
        <a href="/product-reviews/B09XS7JWHH#customerReviews"><span class="a-size-base s-underline-text">12,345</span></a>
        <img class="s-image" src="https://m.media-amazon.com/images/I/51aXvjzcukL._AC_UL320_.jpg">
    "#;

    #[test]
    fn test_extracts_all_fields() {
        let outcome = extract(&[result(FULL_RESULT)]);
        assert_eq!(outcome.container_total, 1);
        assert_eq!(outcome.failures, 0);
        assert_eq!(
            outcome.listings,
            vec![Listing {
                title: "Sony WH-1000XM5 Wireless Noise Canceling Headphones".to_string(),
                rating: Some(4.6),
                review_count: Some(12345),
                image_url: Some(
                    "https://m.media-amazon.com/images/I/51aXvjzcukL._AC_UL320_.jpg".to_string()
                ),
            }]
        );
    }

    #[test]
    fn test_no_containers_yields_empty_outcome() {
        let document = Html::parse_document("<html><body><p>No results</p></body></html>");
        let outcome = extractor().extract(&document, None);
        assert!(outcome.listings.is_empty());
        assert_eq!(outcome.container_total, 0);
        assert!(outcome.container_selector.is_none());
    }

    #[test]
    fn test_falls_back_to_card_container() {
        let html = Html::parse_document(
            r#"<div class="s-card-container"><h2><span>Logitech MX Master 3S Mouse</span></h2></div>"#,
        );
        let outcome = extractor().extract(&html, None);
        assert_eq!(outcome.container_selector.as_deref(), Some(".s-card-container"));
        assert_eq!(outcome.listings[0].title, "Logitech MX Master 3S Mouse");
    }

    #[test]
    fn test_short_titles_are_dropped() {
        let outcome = extract(&[
            result(r#"<h2 aria-label="Apple"><span>Apple</span></h2>"#),
            result(r#"<h2><span>  0123456789  </span></h2>"#),
        ]);
        assert_eq!(outcome.container_total, 2);
        assert!(outcome.listings.is_empty());
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn test_short_label_falls_back_to_text() {
        let outcome = extract(&[result(
            r#"<h2 aria-label="Apple">Apple AirPods Pro (2nd Generation)</h2>"#,
        )]);
        assert_eq!(outcome.listings[0].title, "Apple AirPods Pro (2nd Generation)");
    }

    #[test]
    fn test_title_only_listing_has_null_fields() {
        let outcome = extract(&[result(r#"<h2><span>Anker USB-C Charging Cable</span></h2>"#)]);
        assert_eq!(outcome.listings, vec![Listing::titled("Anker USB-C Charging Cable")]);
    }

    #[test]
    fn test_rating_from_stars_phrase_and_label() {
        let outcome = extract(&[
            result(
                r#"<h2>Kindle Paperwhite 16GB</h2><span aria-label="4.5 stars rating"></span>"#,
            ),
            result(r#"<h2>Kindle Paperwhite 32GB</h2><span class="a-icon-alt">3 STAR</span>"#),
            result(r#"<h2>Kindle Paperwhite Kids</h2><span class="a-icon-alt">Great deal</span>"#),
        ]);
        let ratings: Vec<_> = outcome.listings.iter().map(|l| l.rating).collect();
        assert_eq!(ratings, vec![Some(4.5), Some(3.0), None]);
    }

    #[test]
    fn test_review_count_requires_whole_string_number() {
        let outcome = extract(&[
            result(r#"<h2>Instant Pot Duo 7-in-1</h2><span class="a-size-base">1,234 reviews</span>"#),
            result(
                r#"<h2>Instant Pot Duo Plus</h2>
                   <span class="a-size-base">1,234 reviews</span>
                   <span class="a-size-base"> 1,234 </span>"#,
            ),
        ]);
        assert_eq!(outcome.listings[0].review_count, None);
        assert_eq!(outcome.listings[1].review_count, Some(1234));
    }

    #[test]
    fn test_review_count_checks_later_selectors() {
        let outcome = extract(&[result(
            r#"<h2>Ninja Air Fryer Max XL</h2><a class="a-link-normal"><span>987</span></a>"#,
        )]);
        assert_eq!(outcome.listings[0].review_count, Some(987));
    }

    #[test]
    fn test_relative_image_is_resolved() {
        let outcome = extract(&[result(
            r#"<h2>Hydro Flask Water Bottle</h2><img data-image-latency="s-product-image" src="/images/bottle.jpg">"#,
        )]);
        assert_eq!(
            outcome.listings[0].image_url.as_deref(),
            Some("https://www.amazon.com/images/bottle.jpg")
        );
    }

    #[test]
    fn test_empty_image_src_is_skipped() {
        let outcome = extract(&[result(
            r#"<h2>Hydro Flask Water Bottle</h2><img class="s-image" src=""><img class="a-dynamic-image" src="https://img.example.com/b.jpg">"#,
        )]);
        assert_eq!(
            outcome.listings[0].image_url.as_deref(),
            Some("https://img.example.com/b.jpg")
        );
    }

    #[test]
    fn test_oversized_review_count_keeps_listing() {
        let outcome = extract(&[result(
            r#"<h2>Perfectly Valid Title Here</h2><span class="a-size-base">99999999999999999999</span>"#,
        )]);
        assert_eq!(outcome.failures, 0);
        assert_eq!(outcome.listings.len(), 1);
        assert_eq!(outcome.listings[0].title, "Perfectly Valid Title Here");
        assert_eq!(outcome.listings[0].review_count, Some(u64::MAX));
    }

    #[test]
    fn test_separator_only_review_count_is_null() {
        let outcome = extract(&[result(
            r#"<h2>Instant Pot Duo Mini</h2><span class="a-size-base">,</span><span class="a-size-base">42</span>"#,
        )]);
        assert_eq!(outcome.listings[0].review_count, None);
    }

    #[test]
    fn test_failed_container_does_not_stop_the_batch() {
        let extractor = extractor();
        let document = page(&[
            result(r#"<h2>First Working Product Title</h2>"#),
            result(r#"<h2 class="broken">Broken Product Title Here</h2>"#),
            result(r#"<h2>Third Working Product Title</h2>"#),
        ]);
        let broken = Selector::parse("h2.broken").unwrap();

        let outcome = extractor.extract_with(&document, |container| {
            if container.select(&broken).next().is_some() {
                return Err(AppError::validation("malformed container"));
            }
            extractor.extract_listing(container, None)
        });

        assert_eq!(outcome.container_total, 3);
        assert_eq!(outcome.failures, 1);
        let titles: Vec<_> = outcome.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["First Working Product Title", "Third Working Product Title"]);
    }

    #[test]
    fn test_title_length_counts_utf16_units() {
        // Five astral emoji are ten UTF-16 units; one more character crosses the cutoff.
        let outcome = extract(&[
            result("<h2>\u{1F3A7}\u{1F3A7}\u{1F3A7}\u{1F3A7}\u{1F3A7}</h2>"),
            result("<h2>\u{1F3A7}\u{1F3A7}\u{1F3A7}\u{1F3A7}\u{1F3A7}x</h2>"),
        ]);
        let titles: Vec<_> = outcome.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["\u{1F3A7}\u{1F3A7}\u{1F3A7}\u{1F3A7}\u{1F3A7}x"]);
    }

    #[test]
    fn test_document_order_is_preserved() {
        let results: Vec<String> = (0..20)
            .map(|i| result(&format!("<h2>Product number {i:02} title</h2>")))
            .collect();
        let outcome = extract(&results);
        assert_eq!(outcome.listings.len(), 20);
        assert_eq!(outcome.listings[0].title, "Product number 00 title");
        assert_eq!(outcome.listings[19].title, "Product number 19 title");
    }
}
