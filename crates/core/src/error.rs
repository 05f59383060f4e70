//! Error types for newsletter operations.
//!
//! [`NewsletterError`] is what the components use internally. It never
//! crosses the public boundary on its own: each boundary operation folds it
//! into a [`Failure`](crate::Failure) with the component's fixed message and
//! the error text as the reason.
//!
//! # Example
//!
//! ```rust
//! use newsletter_core::{NewsletterError, Result};
//!
//! fn require_html(body: &str) -> Result<&str> {
//!     if body.is_empty() {
//!         return Err(NewsletterError::HtmlParse("empty body".to_string()));
//!     }
//!     Ok(body)
//! }
//! # assert!(require_html("").is_err());
//! ```

use thiserror::Error;

/// Main error type for scraping, generation and delivery.
#[derive(Error, Debug)]
pub enum NewsletterError {
    /// HTTP request errors from reqwest.
    ///
    /// Covers DNS failures, refused connections, TLS problems and bodies
    /// that could not be decoded.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// HTML could not be processed.
    #[error("Failed to parse HTML: {0}")]
    HtmlParse(String),

    /// The generative model rejected the request or answered with nothing usable.
    #[error("Model error: {0}")]
    Model(String),

    /// A mailbox string could not be parsed.
    #[error("Invalid email address: {0}")]
    Address(String),

    /// The email message could not be assembled.
    #[error("Failed to build email message: {0}")]
    Message(String),

    /// SMTP connection, authentication or delivery errors.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Email template rendering errors.
    #[error("Failed to render template: {0}")]
    Template(#[from] askama::Error),

    /// Domain type outside of `local` / `live`.
    #[error("Domain type not specified")]
    InvalidDomainType(String),
}

impl From<lettre::address::AddressError> for NewsletterError {
    fn from(err: lettre::address::AddressError) -> Self {
        NewsletterError::Address(err.to_string())
    }
}

impl From<lettre::error::Error> for NewsletterError {
    fn from(err: lettre::error::Error) -> Self {
        NewsletterError::Message(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NewsletterError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NewsletterError::Smtp(err.to_string())
    }
}

/// Result type alias for NewsletterError.
pub type Result<T> = std::result::Result<T, NewsletterError>;
