//! Publication Segmenter
//!
//! Cuts a page's extracted text into publications on the delimiter, keeps
//! the ones mentioning the phrase, and tags or restricts them by section.

use gazette_models::{PublicationSegment, ScanMode, SectionPlacement};
use gazette_utils::{GazetteError, GazetteResult, SearchConfig};
use regex::Regex;
use std::ops::Range;

/// Byte ranges of the pieces between delimiter occurrences.
///
/// Joining `text[span]` for every span with `delimiter` reproduces `text`.
/// An empty delimiter yields one span over the whole text.
pub fn split_spans(text: &str, delimiter: &str) -> Vec<Range<usize>> {
    if delimiter.is_empty() {
        return vec![0..text.len()];
    }

    let mut spans = Vec::new();
    let mut start = 0;
    for (offset, _) in text.match_indices(delimiter) {
        spans.push(start..offset);
        start = offset + delimiter.len();
    }
    spans.push(start..text.len());
    spans
}

/// Span from the first occurrence of `header` to the end of `text`.
pub fn locate_section(text: &str, header: &str) -> Option<Range<usize>> {
    if header.is_empty() {
        return None;
    }
    text.find(header).map(|start| start..text.len())
}

fn placement_of(span: &Range<usize>, section: Option<&Range<usize>>) -> SectionPlacement {
    match section {
        Some(section) if section.contains(&span.start) => SectionPlacement::WithinSection,
        _ => SectionPlacement::Elsewhere,
    }
}

/// Keyword sequences that open unrelated trailing text inside the last
/// matching publication. Matching is case-sensitive; any run of whitespace
/// may separate the words.
#[derive(Debug, Clone)]
pub struct CutoffMarkers {
    patterns: Vec<Regex>,
}

impl CutoffMarkers {
    pub fn new<S: AsRef<str>>(markers: &[S]) -> GazetteResult<Self> {
        let patterns = markers
            .iter()
            .map(|m| m.as_ref().split_whitespace().map(regex::escape).collect::<Vec<_>>())
            .filter(|words| !words.is_empty())
            .map(|words| {
                Regex::new(&words.join(r"\s+"))
                    .map_err(|e| GazetteError::validation("search.cutoff_markers", e.to_string()))
            })
            .collect::<GazetteResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Earliest start offset of any marker.
    pub fn earliest(&self, text: &str) -> Option<usize> {
        self.patterns
            .iter()
            .filter_map(|p| p.find(text).map(|m| m.start()))
            .min()
    }

    /// Truncates at the earliest marker and trims; unchanged without one.
    pub fn apply(&self, text: &str) -> String {
        match self.earliest(text) {
            Some(cut) => {
                tracing::debug!(offset = cut, "Cutoff marker found, trimming last publication");
                text[..cut].trim().to_string()
            }
            None => text.to_string(),
        }
    }
}

/// Splits and filters one file's text according to the configured [`ScanMode`].
#[derive(Debug, Clone)]
pub struct PublicationSegmenter {
    phrase_lower: String,
    delimiter: String,
    section_header: String,
    mode: ScanMode,
    cutoffs: CutoffMarkers,
}

impl PublicationSegmenter {
    pub fn new(search: &SearchConfig) -> GazetteResult<Self> {
        Ok(Self {
            phrase_lower: search.phrase.to_lowercase(),
            delimiter: search.delimiter.clone(),
            section_header: search.section_header.clone(),
            mode: search.mode,
            cutoffs: CutoffMarkers::new(&search.cutoff_markers)?,
        })
    }

    fn mentions_phrase(&self, piece: &str) -> bool {
        piece.to_lowercase().contains(&self.phrase_lower)
    }

    /// Matching publications of `text`, in text order.
    pub fn segment(&self, file_name: &str, text: &str) -> Vec<PublicationSegment> {
        let section = locate_section(text, &self.section_header);

        let (scope_start, classify) = match self.mode {
            ScanMode::WholeDocument => (0, false),
            ScanMode::Classified => (0, true),
            ScanMode::SectionOnly => match &section {
                Some(section) => (section.start, false),
                None => {
                    tracing::debug!(file = file_name, "Section header not found, skipping file");
                    return Vec::new();
                }
            },
        };

        let scope = &text[scope_start..];
        let mut segments: Vec<PublicationSegment> = split_spans(scope, &self.delimiter)
            .into_iter()
            .map(|span| (span.start + scope_start)..(span.end + scope_start))
            .filter(|span| self.mentions_phrase(&text[span.clone()]))
            .map(|span| PublicationSegment {
                text: text[span.clone()].trim().to_string(),
                placement: classify.then(|| placement_of(&span, section.as_ref())),
                span,
                source_file: file_name.to_string(),
            })
            .collect();

        if let Some(last) = segments.last_mut() {
            last.text = self.cutoffs.apply(&last.text);
        }

        segments
    }
}
