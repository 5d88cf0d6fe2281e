//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and traversal behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Per-cluster evidence accumulation limits
    #[serde(default)]
    pub evidence: EvidenceConfig,

    /// Token-diet (compression) settings
    #[serde(default)]
    pub diet: DietConfig,

    /// Analyzer hand-off settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
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

    /// Validate configuration values for basic sanity.
    ///
    /// Runs before any rendering begins; a failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::config("crawler.max_pages must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::config("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.page_timeout_ms == 0 {
            return Err(AppError::config("crawler.page_timeout_ms must be > 0"));
        }
        if self.evidence.exchange_cap == 0 {
            return Err(AppError::config("evidence.exchange_cap must be > 0"));
        }
        if self.diet.text_budget == 0 {
            return Err(AppError::config("diet.text_budget must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and traversal behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-page render timeout in milliseconds
    #[serde(default = "defaults::page_timeout")]
    pub page_timeout_ms: u64,

    /// Maximum number of pages dispatched for rendering
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed page
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Maximum concurrent page renders
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Delay between dispatched renders in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            page_timeout_ms: defaults::page_timeout(),
            max_pages: defaults::max_pages(),
            max_depth: defaults::max_depth(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Evidence accumulation limits per cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Maximum network exchanges retained per cluster
    #[serde(default = "defaults::exchange_cap")]
    pub exchange_cap: usize,

    /// Maximum sample URLs retained per cluster
    #[serde(default = "defaults::sample_url_cap")]
    pub sample_url_cap: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            exchange_cap: defaults::exchange_cap(),
            sample_url_cap: defaults::sample_url_cap(),
        }
    }
}

/// Token-diet settings for the analyzer-facing page reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietConfig {
    /// Character budget per text node before truncation
    #[serde(default = "defaults::text_budget")]
    pub text_budget: usize,
}

impl Default for DietConfig {
    fn default() -> Self {
        Self {
            text_budget: defaults::text_budget(),
        }
    }
}

/// Analyzer hand-off settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyzerConfig {
    /// Hand new clusters to the injected analyzer
    #[serde(default)]
    pub enabled: bool,
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; siteprint/0.1)".into()
    }
    pub fn page_timeout() -> u64 {
        30_000
    }
    pub fn max_pages() -> usize {
        100
    }
    pub fn max_depth() -> usize {
        3
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn request_delay() -> u64 {
        0
    }

    // Evidence defaults
    pub fn exchange_cap() -> usize {
        10
    }
    pub fn sample_url_cap() -> usize {
        5
    }

    // Diet defaults
    pub fn text_budget() -> usize {
        100
    }
}
