//! Gazette Watch
//!
//! Looks up the latest state gazette edition, searches it for publications
//! mentioning the configured phrase and emails the results.

use anyhow::Result;
use chrono::Local;
use gazette_models::GazetteDate;
use gazette_utils::{init_logging_or_console, AppConfig, LoggingConfig};
use gazette_workflow::{GazetteWorkflow, RunOutcome};
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let loaded = AppConfig::load();

    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    match init_logging_or_console(&logging) {
        Ok(None) => {}
        Ok(Some(e)) => warn!(error = %e, "Log file unavailable, logging to the console only"),
        Err(e) => eprintln!("Cannot install logger: {:#}", e),
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration, nothing to do");
            return Ok(());
        }
    };

    info!("Starting gazette watch");

    let workflow = GazetteWorkflow::new(config);
    let outcome = workflow.run(GazetteDate::from(Local::now().date_naive())).await;

    match &outcome {
        RunOutcome::MisconfiguredAbort(reason) => {
            error!(reason = %reason, "Run aborted: missing or invalid settings");
        }
        RunOutcome::NoGazette => info!("Run finished: no gazette in the search window"),
        RunOutcome::NoMatches { date, pages } => {
            info!(date = %date, pages, "Run finished: no relevant publications");
        }
        RunOutcome::Notified {
            date,
            files,
            publications,
            attachments,
            delivery,
        } => {
            info!(
                date = %date,
                files,
                publications,
                attachments = attachments.len(),
                delivery = ?delivery,
                "Run finished"
            );
        }
    }

    Ok(())
}
