//! Date Scanner
//!
//! Walks back from today until an edition with downloadable pages turns up.

use gazette_models::{GazetteDate, Page};
use tracing::info;

use crate::client::PageFetcher;

/// The edition selected by a scan.
#[derive(Debug, Clone)]
pub struct ScanHit {
    pub date: GazetteDate,
    pub pages: Vec<Page>,
}

pub struct DateScanner {
    window_days: u32,
}

impl DateScanner {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    /// First date, from `today` backwards, with at least one valid page.
    /// `None` when the whole window is empty, which is normal around
    /// weekends and holidays.
    pub async fn scan(&self, fetcher: &PageFetcher, today: GazetteDate) -> Option<ScanHit> {
        for date in today.window_back(self.window_days) {
            info!(date = %date, "Trying date");

            let pages = fetcher.fetch_day(&date).await;
            if !pages.is_empty() {
                info!(date = %date, pages = pages.len(), "Gazette found");
                return Some(ScanHit { date, pages });
            }

            info!(date = %date, "No valid gazette for this date, trying the previous day");
        }

        info!(window_days = self.window_days, "No gazette found in the search window");
        None
    }
}
