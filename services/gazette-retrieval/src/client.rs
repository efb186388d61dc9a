//! Gazette Page Client
//!
//! Downloads the per-page PDFs of one gazette edition.

use gazette_models::{page_file_name, GazetteDate, Page};
use gazette_utils::{GazetteError, GazetteResult, SourceConfig};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Result of requesting a single page.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Saved to disk and at least the minimum size.
    Found(Page),
    /// Downloaded but too small; already removed from disk.
    Undersized { size: u64 },
    /// The edition has no page with this number.
    NotFound,
    Failed(GazetteError),
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(file = %path.display(), error = %e, "Failed to remove page file"),
    }
}

/// Gazette page client
pub struct PageFetcher {
    client: Client,
    base_url: String,
    file_prefix: String,
    max_pages: u32,
    min_page_bytes: u64,
    download_dir: PathBuf,
}

impl PageFetcher {
    pub fn new(source: &SourceConfig) -> GazetteResult<Self> {
        let client = Client::builder()
            .timeout(source.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: source.base_url.trim_end_matches('/').to_string(),
            file_prefix: source.file_prefix.clone(),
            max_pages: source.max_pages,
            min_page_bytes: source.min_page_bytes,
            download_dir: source.download_dir.clone(),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// `{base_url}/{date}/{prefix}{date}p{page:02}.pdf`
    pub fn page_url(&self, date: &GazetteDate, number: u32) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            date.url_key(),
            page_file_name(&self.file_prefix, date, number)
        )
    }

    /// Request one page and keep it on disk if it is big enough.
    pub async fn fetch_page(&self, date: &GazetteDate, number: u32) -> FetchOutcome {
        let url = self.page_url(date, number);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(e.into()),
        };

        if response.status() == StatusCode::NOT_FOUND {
            return FetchOutcome::NotFound;
        }

        let body = match response.error_for_status() {
            Ok(response) => match response.bytes().await {
                Ok(body) => body,
                Err(e) => return FetchOutcome::Failed(e.into()),
            },
            Err(e) => return FetchOutcome::Failed(e.into()),
        };

        let path = self
            .download_dir
            .join(page_file_name(&self.file_prefix, date, number));

        if let Err(e) = tokio::fs::write(&path, &body).await {
            // Nothing tracks a partial file, so drop it here.
            discard(&path).await;
            return FetchOutcome::Failed(GazetteError::io(&path, e));
        }

        let page = Page::new(number, body.len() as u64, path);
        if page.is_valid(self.min_page_bytes) {
            return FetchOutcome::Found(page);
        }

        discard(&page.path).await;
        FetchOutcome::Undersized { size: page.size }
    }

    /// Download pages 1, 2, ... of an edition until the first missing,
    /// undersized or failed page. Pages saved before a failure are kept.
    pub async fn fetch_day(&self, date: &GazetteDate) -> Vec<Page> {
        info!(date = %date.url_key(), "Fetching gazette pages");

        if let Err(e) = self.ensure_download_dir().await {
            error!(error = %e, "Cannot create download directory");
            return Vec::new();
        }

        let mut pages = Vec::new();
        for number in 1..=self.max_pages {
            match self.fetch_page(date, number).await {
                FetchOutcome::Found(page) => {
                    info!(
                        file = %page.file_name(),
                        kb = %format!("{:.2}", page.size as f64 / 1024.0),
                        "Page downloaded"
                    );
                    pages.push(page);
                }
                FetchOutcome::NotFound => {
                    info!(page = number, "Page not found, end of edition");
                    break;
                }
                FetchOutcome::Undersized { size } => {
                    // Assumes no valid page ever follows a placeholder page.
                    info!(page = number, bytes = size, "Page too small, assuming no more valid pages");
                    break;
                }
                FetchOutcome::Failed(e) => {
                    error!(url = %self.page_url(date, number), error = %e, "Page download failed");
                    break;
                }
            }
        }

        info!(date = %date.url_key(), valid_pages = pages.len(), "Finished fetching");
        pages
    }

    async fn ensure_download_dir(&self) -> GazetteResult<()> {
        if tokio::fs::metadata(&self.download_dir).await.is_err() {
            tokio::fs::create_dir_all(&self.download_dir)
                .await
                .map_err(|e| GazetteError::io(&self.download_dir, e))?;
            info!(dir = %self.download_dir.display(), "Download directory created");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gazette_date, spawn_gazette, source_config, FakeEdition};

    #[test]
    fn test_page_url_shape() {
        let mut source = SourceConfig::default();
        source.base_url = "http://imagens.seplag.ce.gov.br/pdf/".to_string();
        let fetcher = PageFetcher::new(&source).unwrap();
        assert_eq!(
            fetcher.page_url(&gazette_date(2025, 1, 2), 7),
            "http://imagens.seplag.ce.gov.br/pdf/20250102/do20250102p07.pdf"
        );
    }

    #[tokio::test]
    async fn test_missing_first_page_yields_nothing() {
        let server = spawn_gazette(FakeEdition::new()).await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = PageFetcher::new(&source_config(&server, dir.path())).unwrap();

        let pages = fetcher.fetch_day(&gazette_date(2025, 1, 2)).await;
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_fetches_until_not_found() {
        let date = gazette_date(2025, 1, 2);
        let edition = FakeEdition::new().valid_pages(&date, 3);
        let server = spawn_gazette(edition).await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = PageFetcher::new(&source_config(&server, dir.path())).unwrap();

        let pages = fetcher.fetch_day(&date).await;
        let numbers: Vec<u32> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        for page in &pages {
            assert!(page.path.exists());
            assert_eq!(page.size, 2048);
        }
        assert_eq!(pages[0].file_name(), "do20250102p01.pdf");
    }

    #[tokio::test]
    async fn test_undersized_page_is_removed_and_stops_fetching() {
        let date = gazette_date(2025, 1, 2);
        let edition = FakeEdition::new()
            .valid_pages(&date, 2)
            .page(&date, 3, vec![b'x'; 10])
            .page(&date, 4, vec![b'x'; 4096]);
        let server = spawn_gazette(edition).await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = PageFetcher::new(&source_config(&server, dir.path())).unwrap();

        let pages = fetcher.fetch_day(&date).await;
        assert_eq!(pages.len(), 2);
        assert!(!dir.path().join("do20250102p03.pdf").exists());
        assert!(!dir.path().join("do20250102p04.pdf").exists());
    }

    #[tokio::test]
    async fn test_server_error_keeps_earlier_pages() {
        let date = gazette_date(2025, 1, 2);
        let edition = FakeEdition::new().valid_pages(&date, 1).failing(&date, 2);
        let server = spawn_gazette(edition).await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = PageFetcher::new(&source_config(&server, dir.path())).unwrap();

        let outcome = fetcher.fetch_page(&date, 2).await;
        assert!(matches!(outcome, FetchOutcome::Failed(_)));

        let pages = fetcher.fetch_day(&date).await;
        assert_eq!(pages.len(), 1);
        assert!(pages[0].path.exists());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing listens on port 1.
        let fetcher = PageFetcher::new(&source_config("http://127.0.0.1:1", dir.path())).unwrap();
        let outcome = fetcher.fetch_page(&gazette_date(2025, 1, 2), 1).await;
        assert!(matches!(outcome, FetchOutcome::Failed(GazetteError::Http { .. })));
    }

    #[tokio::test]
    async fn test_unwritable_page_is_failed_outcome() {
        let date = gazette_date(2025, 1, 2);
        let server = spawn_gazette(FakeEdition::new().valid_pages(&date, 2)).await;
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the page's file name makes the write fail.
        std::fs::create_dir(dir.path().join("do20250102p02.pdf")).unwrap();
        let fetcher = PageFetcher::new(&source_config(&server, dir.path())).unwrap();

        let outcome = fetcher.fetch_page(&date, 2).await;
        assert!(matches!(outcome, FetchOutcome::Failed(GazetteError::Io { .. })));

        let pages = fetcher.fetch_day(&date).await;
        assert_eq!(pages.len(), 1);
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(dir.path().join("do20250102p02.pdf").is_dir());
    }

    #[tokio::test]
    async fn test_max_pages_bounds_the_loop() {
        let date = gazette_date(2025, 1, 2);
        let server = spawn_gazette(FakeEdition::new().valid_pages(&date, 10)).await;
        let dir = tempfile::tempdir().unwrap();
        let mut source = source_config(&server, dir.path());
        source.max_pages = 4;
        let fetcher = PageFetcher::new(&source).unwrap();

        assert_eq!(fetcher.fetch_day(&date).await.len(), 4);
    }

    #[tokio::test]
    async fn test_creates_download_dir_on_first_use() {
        let date = gazette_date(2025, 1, 2);
        let server = spawn_gazette(FakeEdition::new().valid_pages(&date, 1)).await;
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("diarios_pdf");
        let fetcher = PageFetcher::new(&source_config(&server, &nested)).unwrap();

        assert_eq!(fetcher.fetch_day(&date).await.len(), 1);
        assert!(nested.join("do20250102p01.pdf").exists());
    }
}
