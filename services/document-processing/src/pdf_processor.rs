//! PDF Processor
//!
//! Extracts the text of a gazette page file.

use gazette_utils::{GazetteError, GazetteResult};
use lopdf::Document;
use pdf_extract::{OutputError, PlainTextOutput};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// PDF processing result
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Non-empty page texts, each followed by a newline.
    pub text: String,
    pub pages: Vec<PageContent>,
    pub metadata: PdfMetadata,
}

/// Single page content
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub text: String,
}

/// PDF metadata
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    pub encrypted: bool,
    pub page_count: usize,
}

/// PDF processor
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Read and extract a page file from disk.
    pub fn extract_file(&self, path: &Path) -> GazetteResult<PdfContent> {
        let data = std::fs::read(path).map_err(|e| GazetteError::io(path, e))?;
        let file = gazette_models::file_name_of(path);
        self.extract(&file, &data)
    }

    /// Extract content from PDF bytes
    pub fn extract(&self, file: &str, data: &[u8]) -> GazetteResult<PdfContent> {
        let (doc, encrypted) = self.load(file, data)?;

        let pages: Vec<PageContent> = extract_pages(file, &doc)?
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageContent {
                page_number: i + 1,
                text,
            })
            .collect();

        let text = concatenate(&pages);

        Ok(PdfContent {
            text,
            metadata: PdfMetadata {
                encrypted,
                page_count: pages.len(),
            },
            pages,
        })
    }

    /// Parses the file once and unlocks it in place. Gazette pages are
    /// often locked with an empty user password; any other password makes
    /// the file unreadable.
    fn load(&self, file: &str, data: &[u8]) -> GazetteResult<(Document, bool)> {
        let mut doc = Document::load_mem(data)
            .map_err(|e| GazetteError::pdf_extraction(file, e.to_string()))?;

        let encrypted = doc.is_encrypted();
        if encrypted {
            tracing::debug!(file, "PDF is encrypted, trying empty password");
            doc.decrypt("").map_err(|e| {
                GazetteError::pdf_extraction(file, format!("cannot unlock with an empty password: {}", e))
            })?;
        }

        Ok((doc, encrypted))
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// One string per page, in document order. `pdf_extract` panics on some
/// malformed input, so panics are turned into errors here.
fn extract_pages(file: &str, doc: &Document) -> GazetteResult<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        doc.get_pages()
            .into_keys()
            .map(|number| -> Result<String, OutputError> {
                let mut text = String::new();
                {
                    let mut output = PlainTextOutput::new(&mut text);
                    pdf_extract::output_doc_page(doc, &mut output, number)?;
                }
                Ok(text)
            })
            .collect::<Result<Vec<_>, OutputError>>()
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(GazetteError::pdf_extraction(file, e.to_string())),
        Err(_) => Err(GazetteError::pdf_extraction(
            file,
            "PDF extraction panicked (malformed document)",
        )),
    }
}

/// Pages without text contribute nothing.
fn concatenate(pages: &[PageContent]) -> String {
    let mut text = String::new();
    for page in pages.iter().filter(|p| !p.text.is_empty()) {
        text.push_str(&page.text);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::text_pdf;

    #[test]
    fn test_extracts_pages_in_order() {
        let data = text_pdf(&["Primeira pagina", "Segunda pagina"]);
        let content = PdfProcessor::new().extract("do20250102p01.pdf", &data).unwrap();

        assert_eq!(content.metadata.page_count, 2);
        assert!(!content.metadata.encrypted);
        assert_eq!(content.pages.len(), 2);
        let first = content.text.find("Primeira").unwrap();
        let second = content.text.find("Segunda").unwrap();
        assert!(first < second);
        assert!(content.text.ends_with('\n'));
    }

    #[test]
    fn test_empty_password_pdf_is_unlocked() {
        let data = include_bytes!("../fixtures/empty_password.pdf");
        let content = PdfProcessor::new().extract("do20250102p05.pdf", data).unwrap();

        assert!(content.metadata.encrypted);
        assert_eq!(content.metadata.page_count, 1);
        assert!(content.text.contains("Mesa da Assembleia Legislativa"));
        assert!(content.text.contains("Portaria 7"));
    }

    #[test]
    fn test_malformed_data_returns_error() {
        let error = PdfProcessor::new()
            .extract("broken.pdf", b"not a pdf at all")
            .unwrap_err();
        assert_eq!(error.error_code(), "PDF_EXTRACTION_ERROR");
        assert!(error.to_string().contains("broken.pdf"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let error = PdfProcessor::new()
            .extract_file(Path::new("/nonexistent/do20250102p01.pdf"))
            .unwrap_err();
        assert_eq!(error.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_concatenate_skips_empty_pages() {
        let pages = vec![
            PageContent { page_number: 1, text: "um".to_string() },
            PageContent { page_number: 2, text: String::new() },
            PageContent { page_number: 3, text: "tres".to_string() },
        ];
        assert_eq!(concatenate(&pages), "um\ntres\n");
    }
}
