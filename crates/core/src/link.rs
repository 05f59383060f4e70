//! Shareable blog page links.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::NewsletterError;
use crate::outcome::{BlogLink, Failure, OperationResult};

/// Message carried by link failures.
pub const LINK_FAILED: &str = "Error generating link";

/// Where the blog page is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainType {
    /// Development host, served over `http`.
    Local,
    /// Public host, served over `https`.
    Live,
}

impl DomainType {
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Local => "http",
            Self::Live => "https",
        }
    }
}

impl FromStr for DomainType {
    type Err = NewsletterError;

    /// Exact match only: `"Local"` or `" live"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "live" => Ok(Self::Live),
            _ => Err(NewsletterError::InvalidDomainType(s.to_string())),
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// `scheme://domain/?title=...` with the title form-encoded.
pub fn blog_url(title: &str, domain_type: DomainType, domain_name: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new()).append_pair("title", title).finish();
    format!("{}://{}/?{}", domain_type.scheme(), domain_name, query)
}

/// Builds the blog page link for `title` on `domain_name`.
pub fn build_link(title: &str, domain_type: &str, domain_name: &str) -> OperationResult<BlogLink> {
    match domain_type.parse::<DomainType>() {
        Ok(kind) => {
            let link = blog_url(title, kind, domain_name);
            tracing::debug!(%link, "link generated");
            Ok(BlogLink::generated(link))
        }
        Err(e) => {
            tracing::warn!(domain_type, "unknown domain type");
            Err(Failure::from_error(LINK_FAILED, &e))
        }
    }
}

/// Alias of [`build_link`] under the name callers of the blog page API use.
pub fn create_blog_page(title: &str, domain_type: &str, domain_name: &str) -> OperationResult<BlogLink> {
    build_link(title, domain_type, domain_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{STATUS_FAILED, STATUS_OK};
    use rstest::rstest;

    #[test]
    fn test_local_link() {
        let link = build_link("Hello World", "local", "example.com").unwrap();
        assert_eq!(link.status, STATUS_OK);
        assert_eq!(link.message, "Link generated");
        assert_eq!(link.link, "http://example.com/?title=Hello+World");
    }

    #[test]
    fn test_live_link() {
        let link = build_link("Hello World", "live", "news.example.com").unwrap();
        assert_eq!(link.link, "https://news.example.com/?title=Hello+World");
    }

    #[test]
    fn test_title_is_form_encoded() {
        let link = build_link("Rust & C++: 100% safe?", "live", "example.com").unwrap();
        assert_eq!(link.link, "https://example.com/?title=Rust+%26+C%2B%2B%3A+100%25+safe%3F");
    }

    #[test]
    fn test_port_in_domain_name_is_kept() {
        let link = build_link("A", "local", "localhost:3000").unwrap();
        assert_eq!(link.link, "http://localhost:3000/?title=A");
    }

    #[rstest]
    #[case("staging")]
    #[case("")]
    #[case("Local")]
    #[case("LIVE")]
    #[case(" live")]
    fn test_unknown_domain_type(#[case] domain_type: &str) {
        let failure = build_link("X", domain_type, "example.com").unwrap_err();
        assert_eq!(failure.status, STATUS_FAILED);
        assert_eq!(failure.message, LINK_FAILED);
        assert_eq!(failure.reason, "Domain type not specified");
    }

    #[test]
    fn test_domain_type_round_trip_display() {
        assert_eq!(DomainType::Local.to_string(), "local");
        assert_eq!("live".parse::<DomainType>().unwrap(), DomainType::Live);
    }

    #[test]
    fn test_create_blog_page_matches_build_link() {
        assert_eq!(
            create_blog_page("Hello World", "local", "example.com"),
            build_link("Hello World", "local", "example.com")
        );
    }
}
