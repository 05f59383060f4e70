//! Newsletter delivery over SMTP.
//!
//! One call renders the notification template, opens one STARTTLS session
//! with the sender's app password, sends one message and drops the
//! transport. Nothing is pooled or queued.

use std::fmt;

use askama::Template;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::outcome::{Delivery, Failure, OperationResult};
use crate::Result;

/// Default SMTP submission host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Message carried by delivery failures.
pub const EMAIL_FAILED: &str = "Error in sending mail";

/// SMTP server location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self { host: DEFAULT_SMTP_HOST.to_string(), port: DEFAULT_SMTP_PORT }
    }
}

/// A fully rendered message, built once per send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// What the caller wants announced, and to whom.
#[derive(Debug, Clone, Copy)]
pub struct EmailRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub subject: &'a str,
    pub link: &'a str,
    pub title: &'a str,
    pub description: &'a str,
}

impl EmailRequest<'_> {
    pub fn to_message(&self) -> Result<EmailMessage> {
        Ok(EmailMessage {
            from: self.from.to_string(),
            to: self.to.to_string(),
            subject: self.subject.to_string(),
            html_body: render_email(self.link, self.title, self.description)?,
        })
    }
}

#[derive(Template)]
#[template(path = "newsletter_email.html")]
struct NewsletterEmail<'a> {
    link: &'a str,
    title: &'a str,
    description: &'a str,
}

/// Renders the notification card. Every value is HTML-escaped.
pub fn render_email(link: &str, title: &str, description: &str) -> Result<String> {
    Ok(NewsletterEmail { link, title, description }.render()?)
}

/// Delivers one message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// STARTTLS submission with username/password auth.
pub struct SmtpMailer {
    config: SmtpConfig,
    username: String,
    password: String,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { config, username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("config", &self.config)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let from: Mailbox = message.from.parse()?;
        let to: Mailbox = message.to.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())?;

        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                .port(self.config.port)
                .credentials(credentials)
                .build();

        tracing::debug!(host = %self.config.host, port = self.config.port, "opening SMTP session");
        mailer.send(email).await?;
        Ok(())
    }
}

/// Renders and sends newsletter notifications through a [`MailTransport`].
pub struct Emailer<T> {
    transport: T,
}

impl<T: MailTransport> Emailer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn send(&self, request: &EmailRequest<'_>) -> OperationResult<Delivery> {
        let result = async {
            let message = request.to_message()?;
            self.transport.send(&message).await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(to = request.to, subject = request.subject, "email sent");
                Ok(Delivery::sent())
            }
            Err(e) => {
                tracing::warn!(to = request.to, error = %e, "email not sent");
                Err(Failure::from_error(EMAIL_FAILED, &e))
            }
        }
    }
}

/// Sends one notification through the default SMTP host as `sender_email`.
#[allow(clippy::too_many_arguments)]
pub async fn send_email(
    receiver_email: &str,
    sender_email: &str,
    app_password: &str,
    link: &str,
    title: &str,
    description: &str,
    subject: &str,
) -> OperationResult<Delivery> {
    let mailer = SmtpMailer::new(SmtpConfig::default(), sender_email, app_password);
    let request = EmailRequest { to: receiver_email, from: sender_email, subject, link, title, description };
    Emailer::new(mailer).send(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewsletterError;
    use crate::outcome::{STATUS_FAILED, STATUS_OK};

    fn request() -> EmailRequest<'static> {
        EmailRequest {
            to: "reader@example.com",
            from: "editor@example.com",
            subject: "This week in Rust",
            link: "https://example.com/?title=Rust+Weekly",
            title: "Rust Weekly",
            description: "Everything that shipped.",
        }
    }

    #[test]
    fn test_smtp_config_default() {
        let config = SmtpConfig::default();
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 587);
    }

    #[test]
    fn test_render_email_substitutes_values() {
        let html = render_email("https://example.com/post", "Rust Weekly", "Everything that shipped.").unwrap();
        assert!(html.contains(r#"<a href="https:"#));
        assert!(html.contains("example.com"));
        assert!(html.contains(">Rust Weekly</h3>"));
        assert!(html.contains("Everything that shipped."));
        assert!(html.contains("NewsletterAI"));
    }

    #[test]
    fn test_render_email_escapes_user_text() {
        let html = render_email("https://x.test/?a=1&b=2", "<script>alert(1)</script>", r#"Fish & "Chips""#).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Fish &amp; "));
        assert!(!html.contains(r#""Chips""#));
        assert!(html.contains("a=1&amp;b=2"));
    }

    #[test]
    fn test_smtp_mailer_debug_redacts_password() {
        let mailer = SmtpMailer::new(SmtpConfig::default(), "editor@example.com", "abcd efgh ijkl mnop");
        let debug = format!("{:?}", mailer);
        assert!(!debug.contains("abcd efgh"));
        assert!(debug.contains("editor@example.com"));
    }

    #[tokio::test]
    async fn test_send_success() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|message| {
                message.to == "reader@example.com"
                    && message.from == "editor@example.com"
                    && message.subject == "This week in Rust"
                    && message.html_body.contains("Rust Weekly")
            })
            .times(1)
            .returning(|_| Ok(()));

        let delivery = Emailer::new(transport).send(&request()).await.unwrap();
        assert_eq!(delivery.status, STATUS_OK);
        assert_eq!(delivery.message, "Email sent successfully");
    }

    #[tokio::test]
    async fn test_send_auth_failure_becomes_failure() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(NewsletterError::Smtp("535 5.7.8 Username and Password not accepted".to_string())));

        let failure = Emailer::new(transport).send(&request()).await.unwrap_err();
        assert_eq!(failure.status, STATUS_FAILED);
        assert_eq!(failure.message, EMAIL_FAILED);
        assert!(failure.reason.contains("535 5.7.8 Username and Password not accepted"));
    }

    #[tokio::test]
    async fn test_invalid_sender_fails_before_connecting() {
        let failure = send_email(
            "reader@example.com",
            "not an address",
            "app-password",
            "https://example.com",
            "Title",
            "Description",
            "Subject",
        )
        .await
        .unwrap_err();

        assert_eq!(failure.message, EMAIL_FAILED);
        assert!(failure.reason.starts_with("Invalid email address"));
    }
}
