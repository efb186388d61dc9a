use crate::error::{GazetteError, GazetteResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email pattern is a valid regex")
    })
}

pub fn validate_email_address(email: &str) -> GazetteResult<()> {
    if !email_regex().is_match(email) {
        return Err(GazetteError::validation(
            "email",
            format!("Invalid email address format: '{}'", email),
        ));
    }

    Ok(())
}

pub fn validate_base_url(base_url: &str) -> GazetteResult<()> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| GazetteError::validation("source.base_url", e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GazetteError::validation(
            "source.base_url",
            format!("Unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(())
}
