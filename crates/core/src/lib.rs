pub mod config;
pub mod draft;
pub mod email;
pub mod error;
pub mod generate;
pub mod link;
pub mod markup;
pub mod model;
pub mod outcome;
pub mod scrape;

pub use config::{GeneratorConfig, GeneratorConfigBuilder, ScrapeFailurePolicy};
pub use draft::{NewsletterDraft, Section};
pub use email::{EmailMessage, EmailRequest, Emailer, MailTransport, SmtpConfig, SmtpMailer, render_email, send_email};
pub use error::{NewsletterError, Result};
pub use generate::{ContentGenerator, generate_content, generate_content_with_config};
pub use link::{DomainType, build_link, create_blog_page};
pub use markup::{parse_content, parse_content_on};
pub use model::{GeminiModel, GenerationRequest, ModelConfig, TextModel};
pub use outcome::{BlogLink, Delivery, Failure, OperationResult};
pub use scrape::{PageScraper, ReferenceSource, ScrapeConfig, extract_paragraphs, scrape};
