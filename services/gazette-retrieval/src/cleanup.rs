//! Download Cleanup
//!
//! Removes downloaded pages and the download directory once a run is over.

use gazette_models::Page;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
    pub dir_removed: bool,
}

/// Deletes every tracked file and then the directory if it is left empty.
///
/// Runs at the latest when dropped, so early returns, errors and panics in
/// the code holding the guard still clean up.
#[derive(Debug)]
pub struct DownloadCleanup {
    dir: PathBuf,
    files: Vec<PathBuf>,
    finished: bool,
}

impl DownloadCleanup {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            finished: false,
        }
    }

    pub fn for_pages(dir: impl Into<PathBuf>, pages: &[Page]) -> Self {
        let mut cleanup = Self::new(dir);
        for page in pages {
            cleanup.track(&page.path);
        }
        cleanup
    }

    pub fn track(&mut self, path: impl AsRef<Path>) {
        self.files.push(path.as_ref().to_path_buf());
        self.finished = false;
    }

    /// Delete now. Failures are logged one by one and never stop the rest.
    /// Safe to call more than once.
    pub fn run(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();

        if !self.files.is_empty() {
            info!(files = self.files.len(), "Cleaning up downloaded files");
        }

        for file in self.files.drain(..) {
            match std::fs::remove_file(&file) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(file = %file.display(), "Already removed");
                }
                Err(e) => {
                    error!(file = %file.display(), error = %e, "Failed to remove file");
                    report.failed += 1;
                }
            }
        }

        report.dir_removed = self.remove_dir_if_empty();
        self.finished = true;
        report
    }

    fn remove_dir_if_empty(&self) -> bool {
        let mut entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                error!(dir = %self.dir.display(), error = %e, "Failed to inspect download directory");
                return false;
            }
        };

        if entries.next().is_some() {
            return false;
        }

        match std::fs::remove_dir(&self.dir) {
            Ok(()) => true,
            Err(e) => {
                error!(dir = %self.dir.display(), error = %e, "Failed to remove download directory");
                false
            }
        }
    }
}

impl Drop for DownloadCleanup {
    fn drop(&mut self) {
        if !self.finished {
            self.run();
        }
    }
}
