//! Newsletter draft produced by content generation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One subtitle with its paragraph, in the order the model wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub subtitle: String,
    pub paragraph: String,
}

/// Structured newsletter ready for link building and mailing.
///
/// Serializes as `{ title, tag, category, date, content }` with the date in
/// `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterDraft {
    pub title: String,
    /// Comma-separated tags exactly as the model wrote them.
    pub tag: String,
    pub category: String,
    pub date: NaiveDate,
    pub content: Vec<Section>,
}

impl NewsletterDraft {
    /// Splits [`tag`](Self::tag) on commas, trimming and dropping empty entries.
    pub fn tags(&self) -> Vec<&str> {
        self.tag.split(',').map(str::trim).filter(|t| !t.is_empty()).collect()
    }
}
