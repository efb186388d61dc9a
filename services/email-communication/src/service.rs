//! Email Service
//!
//! Sends the match report for one gazette edition.

use gazette_models::{MatchResult, Page};
use gazette_utils::{EmailConfig, GazetteResult};
use tracing::{error, info, warn};

use crate::smtp_client::{OutgoingEmail, SmtpClient};
use crate::template_engine::TemplateEngine;

/// What happened to a notification. Delivery problems never propagate as
/// errors; the caller only gets to see the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent { recipients: usize, attachments: usize },
    /// No recipients configured.
    Skipped,
    Failed(String),
}

/// Email service
pub struct EmailService {
    smtp_client: SmtpClient,
    template_engine: TemplateEngine,
    recipients: Vec<String>,
    phrase: String,
}

impl EmailService {
    pub fn new(config: &EmailConfig, phrase: impl Into<String>) -> GazetteResult<Self> {
        Ok(Self {
            smtp_client: SmtpClient::new(config.clone()),
            template_engine: TemplateEngine::new()?,
            recipients: config.recipient_list(),
            phrase: phrase.into(),
        })
    }

    /// Render the report and pair it with the pages to attach.
    pub fn compose(&self, date_label: &str, attachments: &[&Page], matches: &MatchResult) -> GazetteResult<OutgoingEmail> {
        let rendered = self.template_engine.render(date_label, &self.phrase, matches)?;

        Ok(OutgoingEmail {
            subject: rendered.subject,
            body_text: rendered.body_text,
            body_html: rendered.body_html,
            attachments: attachments.iter().map(|page| page.path.clone()).collect(),
        })
    }

    /// Send the report for `date_label`.
    pub async fn notify(&self, date_label: &str, attachments: &[&Page], matches: &MatchResult) -> DeliveryOutcome {
        if self.recipients.is_empty() {
            warn!("No recipients configured, skipping email");
            return DeliveryOutcome::Skipped;
        }

        let email = match self.compose(date_label, attachments, matches) {
            Ok(email) => email,
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Failed to compose email");
                return DeliveryOutcome::Failed(e.to_string());
            }
        };

        info!(
            recipients = self.recipients.len(),
            attachments = email.attachments.len(),
            subject = %email.subject,
            "Sending email"
        );

        match self.smtp_client.send(&email, &self.recipients).await {
            Ok(response) => {
                info!(response = %response, "Email sent");
                DeliveryOutcome::Sent {
                    recipients: self.recipients.len(),
                    attachments: email.attachments.len(),
                }
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Failed to send email");
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}
