//! Workflow Service
//!
//! One end-to-end run: find the latest edition, search it, mail the
//! results and clean up.

use gazette_document_processing::DocumentExtractor;
use gazette_email_communication::{DeliveryOutcome, EmailService};
use gazette_models::GazetteDate;
use gazette_retrieval::{DateScanner, DownloadCleanup, PageFetcher};
use gazette_utils::{AppConfig, GazetteResult};
use tracing::{error, info, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Required settings are missing or invalid; nothing was fetched.
    MisconfiguredAbort(String),
    /// No edition in the search window.
    NoGazette,
    NoMatches {
        date: GazetteDate,
        pages: usize,
    },
    Notified {
        date: GazetteDate,
        files: usize,
        publications: usize,
        /// File names of the pages sent along, in page order.
        attachments: Vec<String>,
        delivery: DeliveryOutcome,
    },
}

struct Components {
    fetcher: PageFetcher,
    scanner: DateScanner,
    extractor: DocumentExtractor,
    notifier: EmailService,
}

/// Gazette workflow
pub struct GazetteWorkflow {
    config: AppConfig,
}

impl GazetteWorkflow {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn components(&self) -> GazetteResult<Components> {
        self.config.validate()?;

        Ok(Components {
            fetcher: PageFetcher::new(&self.config.source)?,
            scanner: DateScanner::new(self.config.source.search_window_days),
            extractor: DocumentExtractor::new(&self.config.search)?,
            notifier: EmailService::new(&self.config.email, self.config.search.phrase.clone())?,
        })
    }

    /// Run once for `today`. Never fails; every problem ends up in the
    /// outcome or the log.
    pub async fn run(&self, today: GazetteDate) -> RunOutcome {
        let components = match self.components() {
            Ok(components) => components,
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Invalid configuration, aborting");
                return RunOutcome::MisconfiguredAbort(e.to_string());
            }
        };

        info!(
            today = %today,
            window_days = self.config.source.search_window_days,
            mode = ?self.config.search.mode,
            "Starting gazette search"
        );

        // Created before scanning so a directory made for a day that turns
        // out empty is removed as well.
        let mut cleanup = DownloadCleanup::new(components.fetcher.download_dir());

        let Some(hit) = components.scanner.scan(&components.fetcher, today).await else {
            warn!("No gazette found, nothing to search");
            cleanup.run();
            return RunOutcome::NoGazette;
        };

        for page in &hit.pages {
            cleanup.track(&page.path);
        }

        let matches = components.extractor.search_pages(&hit.pages);

        let outcome = if matches.is_empty() {
            info!(date = %hit.date, "No relevant publications found, no email will be sent");
            RunOutcome::NoMatches {
                date: hit.date,
                pages: hit.pages.len(),
            }
        } else {
            let attachments = matches.attachments(&hit.pages);
            info!(
                date = %hit.date,
                files = matches.len(),
                publications = matches.total_segments(),
                "Relevant publications found"
            );

            let delivery = components
                .notifier
                .notify(&hit.date.label(), &attachments, &matches)
                .await;

            RunOutcome::Notified {
                date: hit.date,
                files: matches.len(),
                publications: matches.total_segments(),
                attachments: attachments.iter().map(|page| page.file_name()).collect(),
                delivery,
            }
        };

        let report = cleanup.run();
        info!(
            removed = report.removed,
            failed = report.failed,
            dir_removed = report.dir_removed,
            "Cleanup finished"
        );

        outcome
    }
}
