//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SelectorConfig;

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listening socket settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound request settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Selector chains used by the extractor
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_port_override(std::env::var(PORT_ENV).ok());
    }

    fn apply_port_override(&mut self, value: Option<String>) {
        let Some(raw) = value else {
            return;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.server.port = port,
            Err(e) => log::warn!(
                "Ignoring {}={:?}: {}. Keeping port {}.",
                PORT_ENV,
                raw,
                e,
                self.server.port
            ),
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_results == 0 {
            return Err(AppError::validation("scraper.max_results must be > 0"));
        }
        if self.scraper.query_param.trim().is_empty() {
            return Err(AppError::validation("scraper.query_param is empty"));
        }
        url::Url::parse(&self.scraper.search_url).map_err(|e| {
            AppError::validation(format!(
                "scraper.search_url '{}' is not a valid URL: {}",
                self.scraper.search_url, e
            ))
        })?;

        for (name, chain) in self.selectors.chains() {
            if chain.is_empty() {
                return Err(AppError::validation(format!("selectors.{name} is empty")));
            }
            for selector in chain {
                Selector::parse(selector)
                    .map_err(|e| AppError::selector(selector.as_str(), format!("{e:?}")))?;
            }
        }
        Ok(())
    }
}

/// Listening socket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "defaults::host")]
    pub host: String,

    /// TCP port to bind
    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound search request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Search endpoint the keyword is appended to
    #[serde(default = "defaults::search_url")]
    pub search_url: String,

    /// Query parameter carrying the keyword
    #[serde(default = "defaults::query_param")]
    pub query_param: String,

    /// User-Agent header for outbound requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum listings returned per response
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Additional headers sent with every outbound request
    #[serde(default = "defaults::headers")]
    pub headers: BTreeMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::search_url(),
            query_param: defaults::query_param(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_results: defaults::max_results(),
            headers: defaults::headers(),
        }
    }
}

impl ScraperConfig {
    /// Build the search URL for a keyword.
    ///
    /// The keyword is percent-encoded the way browsers encode a URI
    /// component, so spaces become `%20` and `!'()*` stay literal.
    pub fn search_url_for(&self, keyword: &str) -> String {
        let separator = if self.search_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.search_url,
            separator,
            self.query_param,
            encode_uri_component(keyword)
        )
    }
}

/// Characters a URI component keeps unescaped besides ASCII alphanumerics.
const URI_COMPONENT_MARKS: &str = "-_.!~*'()";

fn encode_uri_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || URI_COMPONENT_MARKS.contains(c) {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    encoded
}

mod defaults {
    use std::collections::BTreeMap;

    // Server defaults
    pub fn host() -> String {
        "0.0.0.0".into()
    }
    pub fn port() -> u16 {
        3000
    }

    // Scraper defaults
    pub fn search_url() -> String {
        "https://www.amazon.com/s".into()
    }
    pub fn query_param() -> String {
        "k".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_results() -> usize {
        16
    }
    pub fn headers() -> BTreeMap<String, String> {
        [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Accept-Encoding", "gzip, deflate, br"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}
