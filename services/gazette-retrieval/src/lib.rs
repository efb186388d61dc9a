//! Gazette Retrieval
//!
//! Finds the latest published edition, downloads its pages, and removes
//! them again when the run is over.

pub mod cleanup;
pub mod client;
pub mod scanner;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cleanup::{CleanupReport, DownloadCleanup};
pub use client::{FetchOutcome, PageFetcher};
pub use scanner::{DateScanner, ScanHit};
