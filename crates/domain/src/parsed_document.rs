//! Extracted document content, independent of the source file format.

use serde::{Deserialize, Serialize};

/// A hyperlink annotation recovered from a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// Anchor text, when the extractor could associate one.
    pub text: Option<String>,
    /// Target URL.
    pub url: String,
}

/// One page of extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPage {
    /// 1-indexed page number.
    pub page_number: u32,
    /// Reading-order text for the page.
    pub text: String,
    /// Links found on the page.
    #[serde(default)]
    pub links: Vec<PageLink>,
}

/// How a document's content was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    /// Text was read directly from the document's content stream.
    DirectText,
    /// Text was recovered via optical character recognition.
    Ocr,
}

/// The complete extracted content of an uploaded document, independent of
/// its original file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Original file type, e.g. `"pdf"`, `"docx"`, `"png"`.
    pub file_type: String,
    /// When extraction completed.
    pub processed_at: chrono::DateTime<chrono::Utc>,
    /// Which extraction path produced this content, when known.
    pub processing_method: Option<ProcessingMethod>,
    /// Extracted pages, in document order.
    pub pages: Vec<ParsedPage>,
}

impl ParsedDocument {
    /// Concatenate every page's text, separated by blank lines, in page
    /// order. This is the text handed to the content structurer.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Every link found across every page, in document order.
    #[must_use]
    pub fn all_links(&self) -> Vec<&PageLink> {
        self.pages.iter().flat_map(|page| &page.links).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn full_text_joins_pages_in_order() {
        let document = ParsedDocument {
            file_type: "pdf".to_string(),
            processed_at: chrono::Utc.timestamp_opt(0, 0).single().expect("valid timestamp"),
            processing_method: Some(ProcessingMethod::DirectText),
            pages: vec![
                ParsedPage {
                    page_number: 1,
                    text: "first page".to_string(),
                    links: vec![],
                },
                ParsedPage {
                    page_number: 2,
                    text: "second page".to_string(),
                    links: vec![PageLink {
                        text: Some("GitHub".to_string()),
                        url: "https://github.com/example".to_string(),
                    }],
                },
            ],
        };

        assert_eq!(document.full_text(), "first page\n\nsecond page");
        assert_eq!(document.all_links().len(), 1);
    }
}
