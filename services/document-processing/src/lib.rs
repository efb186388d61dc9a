//! Gazette Document Processing
//!
//! Text extraction from downloaded gazette pages and publication matching.

pub mod extraction;
pub mod pdf_processor;
pub mod segmenter;

pub use extraction::DocumentExtractor;
pub use pdf_processor::{PdfContent, PdfProcessor};
pub use segmenter::{locate_section, split_spans, CutoffMarkers, PublicationSegmenter};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
