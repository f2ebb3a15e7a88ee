//! OTP delivery.
//!
//! [`SmtpMailer`] sends a multipart email (plain text + HTML, rendered from
//! Askama templates) over STARTTLS. [`LogNotifier`] is the development
//! stand-in used when SMTP is not configured: it logs that a code was issued
//! but never the code itself.

use askama::Template;
use async_trait::async_trait;
use lettre::message::{header::ContentType, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, Error as SmtpError};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;

const OTP_SUBJECT: &str = "Your Stockbook login code";

#[derive(Template)]
#[template(path = "email/otp_code.html")]
struct OtpCodeEmailHtml<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/otp_code.txt")]
struct OtpCodeEmailText<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Delivers login codes to account holders.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), EmailError>;
}

/// SMTP delivery.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Builds the transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(SmtpMailer {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    async fn send_multipart(
        &self,
        to: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        self.transport.send(email).await?;

        info!(to = %to, "OTP email sent");
        Ok(())
    }
}

#[async_trait]
impl OtpNotifier for SmtpMailer {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), EmailError> {
        let (text, html) = render_otp_email(code, ttl_minutes)?;
        self.send_multipart(to, OTP_SUBJECT, text, html).await
    }
}

/// Development delivery: logs the recipient only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn send_otp(&self, to: &str, _code: &str, ttl_minutes: i64) -> Result<(), EmailError> {
        info!(to = %to, ttl_minutes, "SMTP not configured, OTP email not delivered");
        Ok(())
    }
}

/// Renders the (text, html) bodies of the OTP email.
fn render_otp_email(code: &str, ttl_minutes: i64) -> Result<(String, String), EmailError> {
    let text = OtpCodeEmailText { code, ttl_minutes }.render()?;
    let html = OtpCodeEmailHtml { code, ttl_minutes }.render()?;
    Ok((text, html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bodies_contain_code_and_ttl() {
        let (text, html) = render_otp_email("482913", 5).unwrap();
        assert!(text.contains("482913"));
        assert!(text.contains("valid for 5 minutes"));
        assert!(html.contains("482913"));
        assert!(html.contains("valid for 5 minutes"));
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        assert!(LogNotifier.send_otp("a@shop.pk", "482913", 5).await.is_ok());
    }
}
