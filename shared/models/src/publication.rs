use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::gazette::Page;

/// Which part of a page's text is searched for the phrase, and whether
/// matches are tagged with their position relative to the section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Search the entire text, no section tagging.
    WholeDocument,
    /// Search only from the section header to the end of the text.
    /// Files without the header contribute nothing.
    SectionOnly,
    /// Search the entire text and tag each match as inside or outside the
    /// section.
    #[default]
    Classified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionPlacement {
    WithinSection,
    Elsewhere,
}

/// One publication cut out of a page's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationSegment {
    /// Byte range of the raw slice in the page text, delimiters excluded.
    pub span: Range<usize>,
    /// Trimmed text, after any trailing boilerplate cut.
    pub text: String,
    pub placement: Option<SectionPlacement>,
    pub source_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatches {
    pub file_name: String,
    pub segments: Vec<PublicationSegment>,
}

impl FileMatches {
    pub fn in_placement(&self, placement: SectionPlacement) -> Vec<&PublicationSegment> {
        self.segments
            .iter()
            .filter(|s| s.placement == Some(placement))
            .collect()
    }
}

/// Matching publications per source file, in page order.
///
/// Only files with at least one match are present, so the key set doubles as
/// the set of pages to attach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    entries: Vec<FileMatches>,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the matches for a file. Empty match lists are dropped and a
    /// repeated file name replaces the earlier entry.
    pub fn insert(&mut self, file_name: impl Into<String>, segments: Vec<PublicationSegment>) {
        let file_name = file_name.into();
        self.entries.retain(|e| e.file_name != file_name);
        if segments.is_empty() {
            return;
        }
        self.entries.push(FileMatches {
            file_name,
            segments,
        });
    }

    pub fn get(&self, file_name: &str) -> Option<&FileMatches> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.get(file_name).is_some()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.file_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileMatches> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_segments(&self) -> usize {
        self.entries.iter().map(|e| e.segments.len()).sum()
    }

    /// Pages whose file name is a key of this result, in page order.
    pub fn attachments<'a>(&self, pages: &'a [Page]) -> Vec<&'a Page> {
        pages
            .iter()
            .filter(|p| self.contains(&p.file_name()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a MatchResult {
    type Item = &'a FileMatches;
    type IntoIter = std::slice::Iter<'a, FileMatches>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(file: &str, text: &str, placement: Option<SectionPlacement>) -> PublicationSegment {
        PublicationSegment {
            span: 0..text.len(),
            text: text.to_string(),
            placement,
            source_file: file.to_string(),
        }
    }

    #[test]
    fn test_empty_matches_are_not_keys() {
        let mut result = MatchResult::new();
        result.insert("do20250102p01.pdf", Vec::new());
        assert!(result.is_empty());
        assert!(!result.contains("do20250102p01.pdf"));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut result = MatchResult::new();
        result.insert("do20250102p99.pdf", vec![segment("do20250102p99.pdf", "a", None)]);
        result.insert("do20250102p100.pdf", vec![segment("do20250102p100.pdf", "b", None)]);
        let names: Vec<&str> = result.file_names().collect();
        assert_eq!(names, vec!["do20250102p99.pdf", "do20250102p100.pdf"]);
    }

    #[test]
    fn test_attachments_are_exactly_the_keys() {
        let pages = vec![
            Page::new(1, 20_000, "dir/do20250102p01.pdf"),
            Page::new(2, 20_000, "dir/do20250102p02.pdf"),
            Page::new(3, 20_000, "dir/do20250102p03.pdf"),
        ];
        let mut result = MatchResult::new();
        result.insert("do20250102p03.pdf", vec![segment("do20250102p03.pdf", "x", None)]);
        result.insert("do20250102p01.pdf", vec![segment("do20250102p01.pdf", "y", None)]);

        let attached: Vec<u32> = result.attachments(&pages).iter().map(|p| p.number).collect();
        assert_eq!(attached, vec![1, 3]);
    }

    #[test]
    fn test_placement_filter() {
        let mut result = MatchResult::new();
        result.insert(
            "f.pdf",
            vec![
                segment("f.pdf", "in", Some(SectionPlacement::WithinSection)),
                segment("f.pdf", "out", Some(SectionPlacement::Elsewhere)),
                segment("f.pdf", "in2", Some(SectionPlacement::WithinSection)),
            ],
        );
        let file = result.get("f.pdf").unwrap();
        assert_eq!(file.in_placement(SectionPlacement::WithinSection).len(), 2);
        assert_eq!(file.in_placement(SectionPlacement::Elsewhere).len(), 1);
        assert_eq!(result.total_segments(), 3);
        assert_eq!(file.segments[0].placement, Some(SectionPlacement::WithinSection));
    }
}
