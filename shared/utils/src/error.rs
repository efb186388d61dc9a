use thiserror::Error;

#[derive(Error, Debug)]
pub enum GazetteError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("HTTP error: {url} - {message}")]
    Http { url: String, message: String },

    #[error("I/O error: {path} - {message}")]
    Io { path: String, message: String },

    #[error("PDF extraction error: {file} - {message}")]
    PdfExtraction { file: String, message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Email error: {message}")]
    Email { message: String },
}

impl GazetteError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }

    pub fn pdf_extraction(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PdfExtraction {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::PdfExtraction { .. } => "PDF_EXTRACTION_ERROR",
            Self::Template { .. } => "TEMPLATE_ERROR",
            Self::Email { .. } => "EMAIL_ERROR",
        }
    }
}

pub type GazetteResult<T> = Result<T, GazetteError>;

// Conversion from common error types
impl From<std::io::Error> for GazetteError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            path: String::new(),
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for GazetteError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        Self::http(url, error.to_string())
    }
}

impl From<config::ConfigError> for GazetteError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<handlebars::RenderError> for GazetteError {
    fn from(error: handlebars::RenderError) -> Self {
        Self::template(error.to_string())
    }
}

impl From<handlebars::TemplateError> for GazetteError {
    fn from(error: handlebars::TemplateError) -> Self {
        Self::template(error.to_string())
    }
}

impl From<lettre::error::Error> for GazetteError {
    fn from(error: lettre::error::Error) -> Self {
        Self::email(error.to_string())
    }
}

impl From<lettre::address::AddressError> for GazetteError {
    fn from(error: lettre::address::AddressError) -> Self {
        Self::validation("email", error.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for GazetteError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        Self::email(error.to_string())
    }
}
