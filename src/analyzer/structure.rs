//! Container framing and metadata inspection

use std::sync::Arc;

use chrono::DateTime;
use lopdf::Document;
use tracing::{debug, instrument};

use crate::config::VerifierConfig;
use crate::container::{package::Package, pdf};
use crate::error::{Result, StructureError};
use crate::types::{DocumentHandle, DocumentType, StructuralFindings};

pub struct StructureAnalyzer {
    config: Arc<VerifierConfig>,
}

impl StructureAnalyzer {
    pub fn new(config: Arc<VerifierConfig>) -> Self {
        Self { config }
    }

    /// Inspects container framing for signs of post-hoc editing.
    ///
    /// Absence of a parsable container is a hard failure for that file
    /// type; malformed optional sub-parts degrade their field instead.
    #[instrument(skip(self, handle), fields(doc_type = ?handle.doc_type))]
    pub async fn analyze(&self, handle: &DocumentHandle) -> Result<StructuralFindings> {
        match handle.doc_type {
            DocumentType::Pdf => self.analyze_pdf(handle).await,
            DocumentType::WordPackage => self.analyze_package(handle),
            DocumentType::Unknown => Ok(StructuralFindings::default()),
        }
    }

    async fn analyze_pdf(&self, handle: &DocumentHandle) -> Result<StructuralFindings> {
        let bytes = tokio::fs::read(&handle.path).await?;

        let eof_markers = pdf::count_eof_markers(&bytes);
        // more than one marker means at least one append-only revision is
        // layered over the original body
        let incremental_updates = eof_markers > 1;

        let doc = Document::load_mem(&bytes)
            .map_err(|e| StructureError::ContainerParse(e.to_string()))?;

        let (creation_date, mod_date) = pdf::trailer_dates(&doc);
        let mod_after_creation = match (creation_date.as_deref(), mod_date.as_deref()) {
            (Some(creation), Some(modification)) => pdf::mod_after_creation(creation, modification),
            _ => None,
        };

        let active_keys = pdf::active_content_keys(&doc, &self.config.structure.risky_keys);
        let mut suspicious_objects: Vec<String> = active_keys
            .iter()
            .map(|key| format!("active content key /{key}"))
            .collect();

        let dangling = pdf::dangling_reference_count(&doc);
        if dangling > 0 {
            suspicious_objects.push(format!("{dangling} references to free or missing objects"));
        }

        debug!(eof_markers, dangling, active = active_keys.len(), "pdf structure scanned");

        Ok(StructuralFindings {
            incremental_updates,
            eof_markers,
            creation_date,
            mod_date,
            mod_after_creation,
            active_content: !active_keys.is_empty(),
            suspicious_objects,
            track_changes: None,
            errors: Vec::new(),
        })
    }

    fn analyze_package(&self, handle: &DocumentHandle) -> Result<StructuralFindings> {
        let mut package = Package::open(&handle.path)?;
        let mut errors = Vec::new();

        let has_macros = package.has_macro_project();
        let mut suspicious_objects = Vec::new();
        if has_macros {
            suspicious_objects.push("macro project resource present".to_string());
        }

        let (creation_date, mod_date) = match package.core_properties() {
            Ok(props) => (props.created, props.modified),
            Err(detail) => {
                errors.push(format!("core properties unreadable: {detail}"));
                (None, None)
            }
        };

        // package timestamps are parsed to real datetimes before comparing;
        // the fixed-width shortcut only holds for PDF date strings
        let mod_after_creation = match (creation_date.as_deref(), mod_date.as_deref()) {
            (Some(creation), Some(modification)) => {
                match (
                    DateTime::parse_from_rfc3339(creation),
                    DateTime::parse_from_rfc3339(modification),
                ) {
                    (Ok(created), Ok(modified)) => Some(modified > created),
                    _ => {
                        errors.push("package timestamps not comparable".to_string());
                        None
                    }
                }
            }
            _ => None,
        };

        let track_changes = match package.track_changes() {
            Ok(flag) => Some(flag),
            Err(detail) => {
                errors.push(format!("settings unreadable: {detail}"));
                None
            }
        };

        Ok(StructuralFindings {
            incremental_updates: false,
            eof_markers: 0,
            creation_date,
            mod_date,
            mod_after_creation,
            active_content: has_macros,
            suspicious_objects,
            track_changes,
            errors,
        })
    }
}
