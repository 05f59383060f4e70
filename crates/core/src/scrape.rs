//! Paragraph scraping for reference material.
//!
//! A reference page is fetched once and reduced to the text of its `<p>`
//! elements: each one trimmed and followed by a newline, in document order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::outcome::{Failure, OperationResult};
use crate::{NewsletterError, Result};

/// Message carried by scrape failures.
pub const SCRAPE_FAILED: &str = "Reference not scraped";

/// HTTP client configuration for fetching reference pages.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("newsletter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Anything that can turn a URL into reference text for the model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_reference(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP and keeps their paragraph text.
#[derive(Debug, Clone)]
pub struct PageScraper {
    client: Client,
    config: ScrapeConfig,
}

impl PageScraper {
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// GETs `url` and extracts its paragraphs.
    ///
    /// A non-2xx status is an error; the error page body is never parsed.
    pub async fn scrape(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "fetching reference page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.classify(e))?;
        let body = response.text().await.map_err(|e| self.classify(e))?;
        let text = extract_paragraphs(&body)?;

        tracing::debug!(url, bytes = body.len(), chars = text.len(), "extracted paragraphs");
        Ok(text)
    }

    fn classify(&self, err: reqwest::Error) -> NewsletterError {
        if err.is_timeout() {
            NewsletterError::Timeout { timeout: self.config.timeout_secs }
        } else {
            NewsletterError::Http(err)
        }
    }
}

#[async_trait]
impl ReferenceSource for PageScraper {
    async fn fetch_reference(&self, url: &str) -> Result<String> {
        self.scrape(url).await
    }
}

/// Concatenates the trimmed text of every `<p>` element, one per line.
pub fn extract_paragraphs(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("p").map_err(|e| NewsletterError::HtmlParse(format!("Invalid selector: {}", e)))?;

    Ok(document.select(&selector).fold(String::new(), |mut out, el| {
        out.push_str(el.text().collect::<String>().trim());
        out.push('\n');
        out
    }))
}

/// Scrapes `url` with the default configuration.
pub async fn scrape(url: &str) -> OperationResult<String> {
    let result = async { PageScraper::new(ScrapeConfig::default())?.scrape(url).await }.await;

    result.map_err(|e| {
        tracing::warn!(url, error = %e, "scrape failed");
        Failure::from_error(SCRAPE_FAILED, &e)
    })
}

/// The sentinel string older callers expect in place of reference text.
pub fn legacy_error_text(failure: &Failure) -> String {
    format!("An error occurred: {}", failure.reason)
}
