//! SMTP implementation of the [`MailTransport`] contract.
//!
//! Port 587 negotiates STARTTLS before authenticating; any other port is used
//! as configured without encryption negotiation. Credentials are sent only when
//! both user and password are set.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Code;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};
use upsum_core::config::SmtpSettings;
use upsum_core::contract::{MailMessage, MailTransport};
use upsum_core::error::TransportError;

pub const SUBMISSION_PORT: u16 = 587;

/// Reply codes that mean the server rejected our credentials.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings, timeout: Duration) -> Result<Self, TransportError> {
        let builder = if settings.port == SUBMISSION_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host).map_err(|e| {
                error!(error = ?e, host = %settings.host, "Failed to configure STARTTLS relay");
                TransportError::Transport(e.to_string())
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let mut builder = builder.port(settings.port).timeout(Some(timeout));
        if settings.has_credentials() {
            builder = builder.credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ));
        }

        info!(
            host = %settings.host,
            port = settings.port,
            starttls = settings.port == SUBMISSION_PORT,
            authenticated = settings.has_credentials(),
            "Initialized SMTP transport"
        );
        Ok(Self {
            transport: builder.build(),
            timeout,
        })
    }
}

/// Turn a [`MailMessage`] into a `multipart/alternative` email.
pub fn to_email(message: &MailMessage) -> Result<Message, TransportError> {
    let from: Mailbox = message.from.parse().map_err(|e| {
        TransportError::Transport(format!("invalid From address '{}': {e}", message.from))
    })?;
    let to: Mailbox = message.to.parse().map_err(|e| {
        TransportError::Transport(format!("invalid To address '{}': {e}", message.to))
    })?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            message.plain_body.clone(),
            message.html_body.clone(),
        ))
        .map_err(|e| TransportError::Transport(format!("failed to build message: {e}")))
}

fn is_auth_failure(code: Option<Code>) -> bool {
    code.map(|c| AUTH_FAILURE_CODES.contains(&c.to_string().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let email = to_email(message)?;
        match self.transport.send(email).await {
            Ok(response) => {
                info!(code = %response.code(), to = %message.to, "SMTP server accepted message");
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                error!(error = ?e, timeout = ?self.timeout, "SMTP server did not answer in time");
                Err(TransportError::TimedOut(self.timeout))
            }
            Err(e) if is_auth_failure(e.status()) => {
                error!(error = ?e, "SMTP authentication failed");
                Err(TransportError::Authentication(e.to_string()))
            }
            Err(e) => {
                error!(error = ?e, "SMTP transport error");
                Err(TransportError::Transport(e.to_string()))
            }
        }
    }
}
