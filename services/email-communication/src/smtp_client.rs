//! SMTP Client
//!
//! Builds the report message and sends it via SMTP using lettre.

use gazette_models::file_name_of;
use gazette_utils::{EmailConfig, GazetteError, GazetteResult, SmtpSecurity};
use lettre::address::{Address, Envelope};
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};
use std::path::PathBuf;

/// A message ready to be addressed and sent.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    pub attachments: Vec<PathBuf>,
}

/// SMTP client for sending emails
pub struct SmtpClient {
    config: EmailConfig,
}

impl SmtpClient {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn sender(&self) -> GazetteResult<Mailbox> {
        let address: Address = self.config.sender.trim().parse()?;
        let name = Some(self.config.sender_name.clone()).filter(|n| !n.is_empty());
        Ok(Mailbox::new(name, address))
    }

    /// Build the MIME message and its SMTP envelope.
    ///
    /// The envelope always carries every recipient. With `blind_copy` the
    /// visible `To` header only names the sender.
    pub fn build(&self, email: &OutgoingEmail, recipients: &[String]) -> GazetteResult<(Message, Envelope)> {
        let from = self.sender()?;
        let to: Vec<Mailbox> = recipients
            .iter()
            .map(|r| r.trim().parse::<Mailbox>())
            .collect::<Result<_, _>>()?;

        let mut builder = Message::builder()
            .from(from.clone())
            .subject(email.subject.clone());

        if self.config.blind_copy {
            builder = builder.to(from.clone());
        } else {
            for mailbox in &to {
                builder = builder.to(mailbox.clone());
            }
        }

        let mut body = MultiPart::mixed().multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.body_text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.body_html.clone()),
                ),
        );

        let pdf = ContentType::parse("application/pdf")
            .map_err(|e| GazetteError::email(format!("invalid attachment content type: {}", e)))?;

        for path in &email.attachments {
            let bytes = std::fs::read(path).map_err(|e| GazetteError::io(path, e))?;
            body = body.singlepart(Attachment::new(file_name_of(path)).body(bytes, pdf.clone()));
        }

        let message = builder.multipart(body)?;
        let envelope = Envelope::new(
            Some(from.email),
            to.into_iter().map(|mailbox| mailbox.email).collect(),
        )?;

        Ok((message, envelope))
    }

    fn transport(&self) -> GazetteResult<AsyncSmtpTransport<Tokio1Executor>> {
        let host = self.config.smtp_host.as_str();
        let builder = match self.config.security {
            SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            SmtpSecurity::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let mut builder = builder
            .port(self.config.smtp_port)
            .timeout(Some(self.config.timeout()));

        if !self.config.password.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.sender.trim().to_string(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    /// Send email, returning the server's final response text.
    pub async fn send(&self, email: &OutgoingEmail, recipients: &[String]) -> GazetteResult<String> {
        let (message, envelope) = self.build(email, recipients)?;
        let mailer = self.transport()?;

        let response = mailer.send_raw(&envelope, &message.formatted()).await?;

        Ok(response.message().collect::<Vec<_>>().join("\n"))
    }
}
