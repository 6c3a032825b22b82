//! Delivery Adapter: render the report and hand it to the [`MailTransport`].

use pulldown_cmark::{html, Options, Parser};
use tracing::{debug, error, info};

use crate::compose::Report;
use crate::config::SmtpSettings;
use crate::contract::{MailMessage, MailTransport};
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    /// Dry run: the report was produced but not sent.
    Skipped,
}

/// Markdown to HTML. Tables and strikethrough are enabled since model output
/// uses them freely.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Assemble the plain + HTML message for a report.
pub fn build_message(report: &Report, smtp: &SmtpSettings) -> MailMessage {
    let html_body = render_html(&report.body);
    debug!(html_len = html_body.len(), "Rendered report body to HTML");
    MailMessage {
        from: smtp.sender().to_string(),
        to: smtp.to.clone(),
        subject: report.subject.clone(),
        plain_body: report.body.clone(),
        html_body,
    }
}

pub async fn deliver<T>(
    report: &Report,
    smtp: &SmtpSettings,
    transport: &T,
    dry_run: bool,
) -> Result<DeliveryStatus, PipelineError>
where
    T: MailTransport + ?Sized,
{
    if dry_run {
        info!("Dry run enabled, skipping delivery");
        return Ok(DeliveryStatus::Skipped);
    }

    let message = build_message(report, smtp);
    info!(to = %message.to, from = %message.from, "Sending report email");
    match transport.send(&message).await {
        Ok(()) => {
            info!(to = %message.to, "Report email sent");
            Ok(DeliveryStatus::Delivered)
        }
        Err(e) => {
            error!(error = ?e, to = %message.to, "Report email delivery failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_lists() {
        let html = render_html("**Reboot:** yes\n\n- openssl: 1.0 -> 1.1\n");
        assert!(html.contains("<strong>Reboot:</strong>"));
        assert!(html.contains("<li>openssl: 1.0 -&gt; 1.1</li>"));
    }

    #[test]
    fn message_uses_placeholder_sender_when_unset() {
        let smtp = SmtpSettings {
            host: "localhost".into(),
            port: 25,
            user: String::new(),
            password: String::new(),
            from: String::new(),
            to: "ops@example.com".into(),
        };
        let report = Report {
            subject: "s".into(),
            body: "# Title".into(),
        };
        let message = build_message(&report, &smtp);
        assert_eq!(message.from, crate::config::DEFAULT_MAIL_FROM);
        assert_eq!(message.plain_body, "# Title");
        assert!(message.html_body.contains("<h1>Title</h1>"));
    }
}
