use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Publication date of one gazette edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GazetteDate(NaiveDate);

impl GazetteDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Key used in the remote path and page file names, e.g. `20250102`.
    pub fn url_key(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// Human-readable label used in logs and the email, e.g. `02/01/2025`.
    pub fn label(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }

    pub fn days_before(&self, days: u32) -> Self {
        Self(self.0 - Duration::days(i64::from(days)))
    }

    /// `today`, `today - 1`, ... for `window` days.
    pub fn window_back(self, window: u32) -> impl Iterator<Item = GazetteDate> {
        (0..window).map(move |offset| self.days_before(offset))
    }
}

impl From<NaiveDate> for GazetteDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for GazetteDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A downloaded gazette page kept on local disk until cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page index within the edition.
    pub number: u32,
    pub size: u64,
    pub path: PathBuf,
}

impl Page {
    pub fn new(number: u32, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            number,
            size,
            path: path.into(),
        }
    }

    /// Base name of the local file, used as the match key and attachment name.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    pub fn is_valid(&self, min_page_bytes: u64) -> bool {
        self.size >= min_page_bytes
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Remote file name of a page: `{prefix}{date}p{page:02}.pdf`.
pub fn page_file_name(prefix: &str, date: &GazetteDate, number: u32) -> String {
    format!("{}{}p{:02}.pdf", prefix, date.url_key(), number)
}
