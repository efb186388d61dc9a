//! Email Communication
//!
//! Renders the gazette match report and delivers it with the matching
//! pages attached.

pub mod service;
pub mod smtp_client;
pub mod template_engine;

pub use service::{DeliveryOutcome, EmailService};
pub use smtp_client::{OutgoingEmail, SmtpClient};
pub use template_engine::{RenderedEmail, TemplateEngine};
