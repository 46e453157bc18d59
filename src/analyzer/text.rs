//! Text extraction, language mix, suspicious terms, stylometric outliers

use std::collections::BTreeMap;
use std::sync::Arc;

use lopdf::Document;
use tracing::{debug, instrument};

use crate::analyzer::stylometry;
use crate::capability::Capabilities;
use crate::config::VerifierConfig;
use crate::container::{package::Package, pdf};
use crate::error::Result;
use crate::types::{DocumentHandle, DocumentType, TextFindings};

pub struct TextAnalyzer {
    config: Arc<VerifierConfig>,
    capabilities: Arc<Capabilities>,
}

impl TextAnalyzer {
    pub fn new(config: Arc<VerifierConfig>, capabilities: Arc<Capabilities>) -> Self {
        Self {
            config,
            capabilities,
        }
    }

    /// Analyzes page-segmented text.
    ///
    /// `ocr_pages` is the visual stage's output when present, avoiding a
    /// second extraction pass. Whole-document extraction failure is
    /// recorded once and yields an otherwise-empty report.
    #[instrument(skip(self, handle, ocr_pages), fields(doc_type = ?handle.doc_type))]
    pub async fn analyze(
        &self,
        handle: &DocumentHandle,
        ocr_pages: Option<&BTreeMap<usize, String>>,
    ) -> Result<TextFindings> {
        let mut findings = TextFindings::default();

        let pages = match self.extract_pages(handle, ocr_pages) {
            Ok(pages) => pages,
            Err(detail) => {
                findings.errors.push(format!("text extraction failed: {detail}"));
                return Ok(findings);
            }
        };
        debug!(pages = pages.len(), "text extracted");

        self.detect_languages(&pages, &mut findings);
        self.scan_suspicious_terms(&pages, &mut findings);
        self.measure_stylometry(&pages, &mut findings);

        Ok(findings)
    }

    fn extract_pages(
        &self,
        handle: &DocumentHandle,
        ocr_pages: Option<&BTreeMap<usize, String>>,
    ) -> std::result::Result<Vec<String>, String> {
        if let Some(ocr) = ocr_pages {
            // BTreeMap iteration keeps original page order
            return Ok(ocr.values().cloned().collect());
        }

        match handle.doc_type {
            DocumentType::Pdf => {
                let doc = Document::load(&handle.path).map_err(|e| e.to_string())?;
                let pages = doc.get_pages();
                Ok(pages
                    .keys()
                    .map(|number| pdf::page_text(&doc, *number).unwrap_or_default())
                    .collect())
            }
            DocumentType::WordPackage => {
                let mut package = Package::open(&handle.path).map_err(|e| e.to_string())?;
                // the package has no page geometry; the whole body is one
                // logical page
                Ok(vec![package.document_text()?])
            }
            DocumentType::Unknown => Err("unsupported document type".into()),
        }
    }

    /// One language per page from a short leading sample; more than one
    /// distinct language across pages is a copy/paste indicator, recorded
    /// as an observation rather than hard evidence
    fn detect_languages(&self, pages: &[String], findings: &mut TextFindings) {
        let classifier = match &self.capabilities.language {
            Some(classifier) => classifier,
            None => {
                findings
                    .errors
                    .push("language classifier unavailable; language mix unknown".into());
                return;
            }
        };

        for page in pages {
            let trimmed = page.trim();
            if trimmed.is_empty() {
                continue;
            }
            let sample: String = trimmed
                .chars()
                .take(self.config.text.language_sample_chars)
                .collect();
            let language = classifier
                .classify(&sample)
                .unwrap_or_else(|| "unknown".to_string());
            findings.languages.insert(language);
        }

        if findings.languages.len() > 1 {
            let list = findings
                .languages
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            findings
                .errors
                .push(format!("multiple languages detected: {list}"));
        }
    }

    fn scan_suspicious_terms(&self, pages: &[String], findings: &mut TextFindings) {
        let haystack = pages.join("\n").to_lowercase();
        let mut hits: Vec<String> = self
            .config
            .text
            .suspicious_terms
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .cloned()
            .collect();
        hits.sort();
        hits.dedup();
        findings.suspicious_terms = hits;
    }

    fn measure_stylometry(&self, pages: &[String], findings: &mut TextFindings) {
        let mut readability = Vec::new();
        for (i, page) in pages.iter().enumerate() {
            let index = i + 1;
            let cleaned = stylometry::clean_text(page);
            // short pages are statistically unreliable
            if cleaned.chars().count() < self.config.text.min_page_chars {
                continue;
            }
            let profile = stylometry::profile(&cleaned);
            readability.push((index, profile.readability_grade));
            findings.stylometry.insert(index, profile);
        }

        findings.outlier_pages =
            stylometry::outlier_pages(&readability, self.config.text.style_z_threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn analyzer(capabilities: Capabilities) -> TextAnalyzer {
        TextAnalyzer::new(Arc::new(VerifierConfig::new()), Arc::new(capabilities))
    }

    fn unknown_handle() -> DocumentHandle {
        DocumentHandle {
            path: PathBuf::from("/nonexistent/input.bin"),
            byte_len: 0,
            sha256: String::new(),
            sha512: String::new(),
            doc_type: DocumentType::Unknown,
            page_count: None,
            text_native: None,
        }
    }

    fn ocr(pages: &[&str]) -> BTreeMap<usize, String> {
        pages
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1, p.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn extraction_failure_yields_single_error() {
        let findings = analyzer(Capabilities::none())
            .analyze(&unknown_handle(), None)
            .await
            .unwrap();
        assert_eq!(findings.errors.len(), 1);
        assert!(findings.suspicious_terms.is_empty());
        assert!(findings.stylometry.is_empty());
    }

    #[tokio::test]
    async fn suspicious_terms_found_case_insensitively() {
        let pages = ocr(&["This scan was edited in PHOTOSHOP yesterday."]);
        let findings = analyzer(Capabilities::none())
            .analyze(&unknown_handle(), Some(&pages))
            .await
            .unwrap();
        assert_eq!(findings.suspicious_terms, vec!["photoshop".to_string()]);
    }

    #[tokio::test]
    async fn clean_text_has_no_suspicious_terms() {
        let pages = ocr(&["An entirely ordinary report about quarterly results."]);
        let findings = analyzer(Capabilities::none())
            .analyze(&unknown_handle(), Some(&pages))
            .await
            .unwrap();
        assert!(findings.suspicious_terms.is_empty());
    }

    #[tokio::test]
    async fn missing_language_capability_degrades_only_languages() {
        let pages = ocr(&["Plenty of text on this page for scanning purposes."]);
        let findings = analyzer(Capabilities::none())
            .analyze(&unknown_handle(), Some(&pages))
            .await
            .unwrap();
        assert!(findings.languages.is_empty());
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("language classifier unavailable")));
    }

    #[tokio::test]
    async fn short_pages_skip_stylometry() {
        let pages = ocr(&["too short", "also short"]);
        let findings = analyzer(Capabilities::none())
            .analyze(&unknown_handle(), Some(&pages))
            .await
            .unwrap();
        assert!(findings.stylometry.is_empty());
        assert!(findings.outlier_pages.is_empty());
    }
}
