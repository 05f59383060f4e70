//! The uniform result shape returned by every boundary operation.
//!
//! Success payloads are ordinary types; failures are a [`Failure`] carrying
//! a non-success status code, a fixed human message and the underlying
//! reason. Both serialize to the flat JSON objects callers branch on:
//!
//! ```json
//! { "status": 200, "message": "Link generated", "link": "http://..." }
//! { "status": 203, "message": "Error generating link", "reason": "Domain type not specified" }
//! ```

use serde::{Deserialize, Serialize};

use crate::NewsletterError;

/// Status code carried by successful operations.
pub const STATUS_OK: u16 = 200;

/// Status code carried by failed operations.
pub const STATUS_FAILED: u16 = 203;

/// Result of a boundary operation.
pub type OperationResult<T> = std::result::Result<T, Failure>;

/// A failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}: {reason}")]
pub struct Failure {
    /// Always [`STATUS_FAILED`] for failures produced by this crate.
    pub status: u16,
    /// Fixed, component-specific description of what did not happen.
    pub message: String,
    /// The underlying error text.
    pub reason: String,
}

impl Failure {
    pub fn new(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { status: STATUS_FAILED, message: message.into(), reason: reason.into() }
    }

    /// Wraps an internal error under `message`.
    pub fn from_error(message: impl Into<String>, err: &NewsletterError) -> Self {
        Self::new(message, err.to_string())
    }
}

/// Successful email delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub status: u16,
    pub message: String,
}

impl Delivery {
    pub(crate) fn sent() -> Self {
        Self { status: STATUS_OK, message: "Email sent successfully".to_string() }
    }
}

/// A generated shareable link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogLink {
    pub status: u16,
    pub message: String,
    pub link: String,
}

impl BlogLink {
    pub(crate) fn generated(link: String) -> Self {
        Self { status: STATUS_OK, message: "Link generated".to_string(), link }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_flat() {
        let failure = Failure::new("Error generating link", "Domain type not specified");
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["status"], 203);
        assert_eq!(json["message"], "Error generating link");
        assert_eq!(json["reason"], "Domain type not specified");
    }

    #[test]
    fn test_failure_from_error() {
        let err = NewsletterError::Smtp("connection refused".to_string());
        let failure = Failure::from_error("Error in sending mail", &err);

        assert_eq!(failure.status, STATUS_FAILED);
        assert_eq!(failure.reason, "SMTP error: connection refused");
        assert_eq!(failure.to_string(), "Error in sending mail: SMTP error: connection refused");
    }

    #[test]
    fn test_success_payloads_carry_ok_status() {
        assert_eq!(Delivery::sent().status, STATUS_OK);

        let link = BlogLink::generated("https://example.com/?title=A".to_string());
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["status"], 200);
        assert_eq!(json["message"], "Link generated");
        assert_eq!(json["link"], "https://example.com/?title=A");
    }
}
