//! Document Extraction
//!
//! Runs every downloaded page through the PDF processor and the segmenter
//! and collects the matches.

use gazette_models::{MatchResult, Page};
use gazette_utils::{GazetteResult, SearchConfig};
use tracing::{error, info};

use crate::pdf_processor::PdfProcessor;
use crate::segmenter::PublicationSegmenter;

/// Document extractor
pub struct DocumentExtractor {
    pdf_processor: PdfProcessor,
    segmenter: PublicationSegmenter,
    phrase: String,
}

impl DocumentExtractor {
    pub fn new(search: &SearchConfig) -> GazetteResult<Self> {
        Ok(Self {
            pdf_processor: PdfProcessor::new(),
            segmenter: PublicationSegmenter::new(search)?,
            phrase: search.phrase.clone(),
        })
    }

    /// Search all pages. A page that cannot be read or parsed is logged and
    /// left out; the remaining pages are still searched.
    pub fn search_pages(&self, pages: &[Page]) -> MatchResult {
        info!(phrase = %self.phrase, pages = pages.len(), "Starting publication search");

        let texts = pages.iter().filter_map(|page| {
            let file_name = page.file_name();
            match self.pdf_processor.extract_file(&page.path) {
                Ok(content) => {
                    tracing::debug!(
                        file = %file_name,
                        pdf_pages = content.metadata.page_count,
                        encrypted = content.metadata.encrypted,
                        chars = content.text.len(),
                        "Extracted page text"
                    );
                    Some((file_name, content.text))
                }
                Err(e) => {
                    error!(file = %file_name, error = %e, "Failed to read PDF");
                    None
                }
            }
        });

        let results = self.search_texts(texts);
        info!(files = results.len(), "Publication search finished");
        results
    }

    /// Segment already-extracted texts, keyed by file name.
    pub fn search_texts<I, S>(&self, texts: I) -> MatchResult
    where
        I: IntoIterator<Item = (String, S)>,
        S: AsRef<str>,
    {
        let mut results = MatchResult::new();
        for (file_name, text) in texts {
            let segments = self.segmenter.segment(&file_name, text.as_ref());
            if !segments.is_empty() {
                info!(file = %file_name, count = segments.len(), "Found relevant publications");
            }
            results.insert(file_name, segments);
        }
        results
    }
}
