//! Configuration for newsletter generation.
//!
//! Each component owns its settings ([`ScrapeConfig`], [`ModelConfig`],
//! [`SmtpConfig`](crate::email::SmtpConfig)); [`GeneratorConfig`] bundles
//! the ones content generation needs.
//!
//! # Example
//!
//! ```rust
//! use newsletter_core::{GeneratorConfig, ScrapeFailurePolicy};
//!
//! let config = GeneratorConfig::builder()
//!     .scrape_timeout(10)
//!     .model("gemini-1.5-pro")
//!     .on_scrape_failure(ScrapeFailurePolicy::PassThrough)
//!     .build();
//! assert_eq!(config.model.model, "gemini-1.5-pro");
//! ```

use crate::model::ModelConfig;
use crate::scrape::ScrapeConfig;

/// What to do when the reference page cannot be scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrapeFailurePolicy {
    /// Fail the generation without calling the model.
    #[default]
    Abort,
    /// Hand the model an `"An error occurred: …"` line as its reference text.
    PassThrough,
}

/// Settings for [`ContentGenerator`](crate::ContentGenerator).
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub scrape: ScrapeConfig,
    pub model: ModelConfig,
    pub on_scrape_failure: ScrapeFailurePolicy,
}

impl GeneratorConfig {
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }
}

/// Fluent builder for [`GeneratorConfig`].
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    pub fn new() -> Self {
        Self { config: GeneratorConfig::default() }
    }

    /// Sets the reference fetch timeout in seconds.
    pub fn scrape_timeout(mut self, secs: u64) -> Self {
        self.config.scrape.timeout_secs = secs;
        self
    }

    /// Sets the User-Agent used for reference fetches.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.scrape.user_agent = value.into();
        self
    }

    /// Sets the model identifier.
    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.config.model.model = value.into();
        self
    }

    /// Sets the API base URL.
    pub fn api_base(mut self, value: impl Into<String>) -> Self {
        self.config.model.api_base = value.into();
        self
    }

    pub fn max_output_tokens(mut self, value: u32) -> Self {
        self.config.model.max_output_tokens = value;
        self
    }

    pub fn temperature(mut self, value: f32) -> Self {
        self.config.model.temperature = value;
        self
    }

    pub fn on_scrape_failure(mut self, policy: ScrapeFailurePolicy) -> Self {
        self.config.on_scrape_failure = policy;
        self
    }

    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.on_scrape_failure, ScrapeFailurePolicy::Abort);
        assert_eq!(config.scrape.timeout_secs, 30);
        assert_eq!(config.model.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_builder_overrides() {
        let config = GeneratorConfig::builder()
            .scrape_timeout(5)
            .user_agent("test-agent")
            .api_base("http://localhost:8080")
            .max_output_tokens(256)
            .temperature(0.0)
            .on_scrape_failure(ScrapeFailurePolicy::PassThrough)
            .build();

        assert_eq!(config.scrape.timeout_secs, 5);
        assert_eq!(config.scrape.user_agent, "test-agent");
        assert_eq!(config.model.api_base, "http://localhost:8080");
        assert_eq!(config.model.max_output_tokens, 256);
        assert_eq!(config.model.temperature, 0.0);
        assert_eq!(config.on_scrape_failure, ScrapeFailurePolicy::PassThrough);
    }
}
