use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub use gazette_models::ScanMode;

use crate::error::{GazetteError, GazetteResult};
use crate::validation::{validate_base_url, validate_email_address};

/// Variable names used by earlier deployments.
const LEGACY_SENDER_VAR: &str = "REMETENTE";
const LEGACY_PASSWORD_VAR: &str = "SENHA_APP";
const LEGACY_RECIPIENTS_VAR: &str = "DESTINATARIOS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub search: SearchConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

/// Where the gazette lives and how pages are pulled from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub file_prefix: String,
    pub max_pages: u32,
    pub min_page_bytes: u64,
    pub request_timeout_seconds: u64,
    pub search_window_days: u32,
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub phrase: String,
    pub delimiter: String,
    pub section_header: String,
    pub cutoff_markers: Vec<String>,
    pub mode: ScanMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    #[default]
    Starttls,
    Tls,
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub security: SmtpSecurity,
    pub sender: String,
    pub sender_name: String,
    pub password: String,
    /// Comma-separated list; see [`EmailConfig::recipient_list`].
    pub recipients: String,
    pub blind_copy: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("GAZETTE_ENVIRONMENT").unwrap_or_else(|_| "production".into())
                ))
                .required(false),
            )
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("GAZETTE").separator("__"));

        let mut app: AppConfig = config.build()?.try_deserialize()?;
        app.apply_legacy_env(|key| env::var(key).ok());
        Ok(app)
    }

    /// Fills empty credentials from the legacy variable names.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut String, key: &str| {
            if slot.trim().is_empty() {
                if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                    *slot = value;
                }
            }
        };

        fill(&mut self.email.sender, LEGACY_SENDER_VAR);
        fill(&mut self.email.password, LEGACY_PASSWORD_VAR);
        fill(&mut self.email.recipients, LEGACY_RECIPIENTS_VAR);
    }

    /// Checks everything the run needs before touching the network.
    ///
    /// Missing credentials are reported as [`GazetteError::Configuration`];
    /// present-but-unusable values as [`GazetteError::Validation`].
    pub fn validate(&self) -> GazetteResult<()> {
        let mut missing = Vec::new();
        if self.email.sender.trim().is_empty() {
            missing.push("email.sender");
        }
        if self.email.password.is_empty() {
            missing.push("email.password");
        }
        if self.email.recipient_list().is_empty() {
            missing.push("email.recipients");
        }
        if !missing.is_empty() {
            return Err(GazetteError::configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        validate_email_address(self.email.sender.trim())?;
        for recipient in self.email.recipient_list() {
            validate_email_address(&recipient)?;
        }

        validate_base_url(&self.source.base_url)?;

        if self.search.phrase.trim().is_empty() {
            return Err(GazetteError::validation("search.phrase", "must not be empty"));
        }
        if self.search.delimiter.is_empty() {
            return Err(GazetteError::validation("search.delimiter", "must not be empty"));
        }
        if self.source.max_pages == 0 {
            return Err(GazetteError::validation("source.max_pages", "must be at least 1"));
        }
        if self.source.search_window_days == 0 {
            return Err(GazetteError::validation(
                "source.search_window_days",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl EmailConfig {
    /// Splits the comma-separated recipient setting, dropping blanks.
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://imagens.seplag.ce.gov.br/pdf".to_string(),
            file_prefix: "do".to_string(),
            max_pages: 200,
            min_page_bytes: 10 * 1024, // 10KB
            request_timeout_seconds: 15,
            search_window_days: 15,
            download_dir: PathBuf::from("diarios_pdf"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            phrase: "Assembleia Legislativa do Estado do Ceará".to_string(),
            delimiter: "*** *** ***".to_string(),
            section_header: "PODER LEGISLATIVO".to_string(),
            cutoff_markers: vec![
                "TRIBUNAL DE CONTAS DO ESTADO".to_string(),
                "OUTROS".to_string(),
            ],
            mode: ScanMode::default(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            security: SmtpSecurity::default(),
            sender: String::new(),
            sender_name: "Robô do Diário Oficial".to_string(),
            password: String::new(),
            recipients: String::new(),
            blind_copy: false,
            timeout_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.email.sender = "robo@example.com".to_string();
        config.email.password = "app-password".to_string();
        config.email.recipients = "a@example.com, b@example.com".to_string();
        config
    }

    #[test]
    fn test_defaults_match_gazette_source() {
        let config = AppConfig::default();
        assert_eq!(config.source.max_pages, 200);
        assert_eq!(config.source.min_page_bytes, 10_240);
        assert_eq!(config.source.search_window_days, 15);
        assert_eq!(config.search.delimiter, "*** *** ***");
        assert_eq!(config.search.mode, ScanMode::Classified);
        assert_eq!(config.email.smtp_port, 587);
    }

    #[test]
    fn test_recipient_list_splits_and_trims() {
        let mut email = EmailConfig::default();
        email.recipients = " a@example.com,b@example.com ,, ".to_string();
        assert_eq!(email.recipient_list(), vec!["a@example.com", "b@example.com"]);

        email.recipients = "solo@example.com".to_string();
        assert_eq!(email.recipient_list(), vec!["solo@example.com"]);
    }

    #[test]
    fn test_missing_credentials_are_configuration_errors() {
        let error = AppConfig::default().validate().unwrap_err();
        assert_eq!(error.error_code(), "CONFIGURATION_ERROR");
        let message = error.to_string();
        assert!(message.contains("email.sender"));
        assert!(message.contains("email.password"));
        assert!(message.contains("email.recipients"));
    }

    #[test]
    fn test_complete_config_validates() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_bad_recipient_is_validation_error() {
        let mut config = configured();
        config.email.recipients = "a@example.com, not-an-address".to_string();
        let error = config.validate().unwrap_err();
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let mut config = configured();
        config.search.delimiter = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_legacy_env_fills_only_empty_slots() {
        let vars: HashMap<&str, &str> = [
            ("REMETENTE", "legacy@example.com"),
            ("SENHA_APP", "legacy-pass"),
            ("DESTINATARIOS", "x@example.com,y@example.com"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.email.sender = "explicit@example.com".to_string();
        config.apply_legacy_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.email.sender, "explicit@example.com");
        assert_eq!(config.email.password, "legacy-pass");
        assert_eq!(config.email.recipient_list().len(), 2);
    }

    #[test]
    fn test_scan_mode_deserializes_snake_case() {
        let mode: ScanMode = serde_json::from_str("\"section_only\"").unwrap();
        assert_eq!(mode, ScanMode::SectionOnly);
    }
}
