//! Pipeline orchestration and the verdict combinator
//!
//! Stages run in a fixed order: preprocess, hash/signature, structure,
//! visual (gated on the raster probe), text (reusing the visual stage's
//! OCR output). A failing analyzer is recorded on its findings and never
//! stops the remaining stages; only an unopenable input aborts the run.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::analyzer::{HashSignatureAnalyzer, StructureAnalyzer, TextAnalyzer, VisualAnalyzer};
use crate::capability::Capabilities;
use crate::config::VerifierConfig;
use crate::error::Result;
use crate::preprocess;
use crate::types::{
    SignatureRecord, SignatureStatus, StructuralFindings, TextFindings, VerdictClass,
    VerificationVerdict, VisualFindings,
};

pub struct Pipeline {
    config: Arc<VerifierConfig>,
    capabilities: Arc<Capabilities>,
}

impl Pipeline {
    pub fn new(config: VerifierConfig, capabilities: Capabilities) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            capabilities: Arc::new(capabilities),
        })
    }

    /// Pipeline with every capability the environment can provide
    pub fn with_detected_capabilities(config: VerifierConfig) -> Result<Self> {
        let capabilities = Capabilities::detect(&config);
        Self::new(config, capabilities)
    }

    /// Runs the full verification pipeline over one document
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn run(&self, path: &Path) -> Result<VerificationVerdict> {
        // FATAL tier: a missing or unreadable input aborts the run
        let handle = preprocess::inspect(path, &self.config)?;
        info!(doc_type = ?handle.doc_type, pages = ?handle.page_count, "preprocess complete");

        let signatures = match HashSignatureAnalyzer::new(self.capabilities.clone())
            .analyze(&handle)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!("signature analysis failed: {e}");
                vec![SignatureRecord {
                    signer: None,
                    signing_time: None,
                    status: SignatureStatus::Error,
                    detail: format!("signature analysis failed: {e}"),
                }]
            }
        };

        let structure = match StructureAnalyzer::new(self.config.clone())
            .analyze(&handle)
            .await
        {
            Ok(findings) => findings,
            Err(e) => {
                warn!("structure analysis failed: {e}");
                StructuralFindings {
                    errors: vec![format!("structure analysis failed: {e}")],
                    ..Default::default()
                }
            }
        };

        // the visual stage runs only for raster-origin documents
        let (visual, ocr_pages) = if handle.text_native == Some(false) {
            match VisualAnalyzer::new(self.config.clone(), self.capabilities.clone())
                .analyze(&handle)
                .await
            {
                Ok(outcome) => (Some(outcome.findings), outcome.ocr_pages),
                Err(e) => {
                    warn!("visual analysis failed: {e}");
                    let findings = VisualFindings {
                        errors: vec![format!("visual analysis failed: {e}")],
                        ..Default::default()
                    };
                    (Some(findings), None)
                }
            }
        } else {
            (None, None)
        };

        let text = match TextAnalyzer::new(self.config.clone(), self.capabilities.clone())
            .analyze(&handle, ocr_pages.as_ref())
            .await
        {
            Ok(findings) => findings,
            Err(e) => {
                warn!("text analysis failed: {e}");
                TextFindings {
                    errors: vec![format!("text analysis failed: {e}")],
                    ..Default::default()
                }
            }
        };

        let classification = classify(&signatures, &structure, visual.as_ref(), &text);
        info!(?classification, "verdict computed");

        Ok(VerificationVerdict {
            document: handle,
            signatures,
            structure,
            visual,
            text,
            classification,
        })
    }
}

/// Deliberately disjunctive and one-directional: any layer may escalate to
/// SUSPECT, none may downgrade.
fn classify(
    signatures: &[SignatureRecord],
    structure: &StructuralFindings,
    visual: Option<&VisualFindings>,
    text: &TextFindings,
) -> VerdictClass {
    let signature_escalates = signatures.first().map_or(false, |primary| {
        !matches!(
            primary.status,
            SignatureStatus::Valid | SignatureStatus::UnverifiedHybrid
        )
    });
    let structure_escalates = structure.incremental_updates && structure.active_content;
    let visual_escalates = visual.map_or(false, |findings| findings.copy_move);
    let text_escalates = !text.suspicious_terms.is_empty();

    if signature_escalates || structure_escalates || visual_escalates || text_escalates {
        VerdictClass::Suspect
    } else {
        VerdictClass::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: SignatureStatus) -> SignatureRecord {
        SignatureRecord {
            signer: None,
            signing_time: None,
            status,
            detail: String::new(),
        }
    }

    fn clean_inputs() -> (Vec<SignatureRecord>, StructuralFindings, TextFindings) {
        (
            vec![record(SignatureStatus::Valid)],
            StructuralFindings::default(),
            TextFindings::default(),
        )
    }

    #[test]
    fn clean_document_is_ok() {
        let (sigs, structure, text) = clean_inputs();
        assert_eq!(classify(&sigs, &structure, None, &text), VerdictClass::Ok);
    }

    #[test]
    fn one_suspicious_term_escalates() {
        let (sigs, structure, mut text) = clean_inputs();
        text.suspicious_terms.push("photoshop".into());
        assert_eq!(classify(&sigs, &structure, None, &text), VerdictClass::Suspect);
    }

    #[test]
    fn invalid_primary_signature_escalates() {
        let (_, structure, text) = clean_inputs();
        let sigs = vec![record(SignatureStatus::Invalid)];
        assert_eq!(classify(&sigs, &structure, None, &text), VerdictClass::Suspect);
    }

    #[test]
    fn hybrid_signature_does_not_escalate() {
        let (_, structure, text) = clean_inputs();
        let sigs = vec![record(SignatureStatus::UnverifiedHybrid)];
        assert_eq!(classify(&sigs, &structure, None, &text), VerdictClass::Ok);
    }

    #[test]
    fn unsigned_document_does_not_escalate() {
        let (_, structure, text) = clean_inputs();
        assert_eq!(classify(&[], &structure, None, &text), VerdictClass::Ok);
    }

    #[test]
    fn incremental_update_alone_is_ok() {
        let (sigs, mut structure, text) = clean_inputs();
        structure.incremental_updates = true;
        structure.eof_markers = 3;
        assert_eq!(classify(&sigs, &structure, None, &text), VerdictClass::Ok);
    }

    #[test]
    fn incremental_update_with_active_content_escalates() {
        let (sigs, mut structure, text) = clean_inputs();
        structure.incremental_updates = true;
        structure.eof_markers = 2;
        structure.active_content = true;
        assert_eq!(classify(&sigs, &structure, None, &text), VerdictClass::Suspect);
    }

    #[test]
    fn copy_move_escalates() {
        let (sigs, structure, text) = clean_inputs();
        let visual = VisualFindings {
            copy_move: true,
            ..Default::default()
        };
        assert_eq!(
            classify(&sigs, &structure, Some(&visual), &text),
            VerdictClass::Suspect
        );
    }

    #[test]
    fn degraded_visual_fields_do_not_escalate() {
        let (sigs, structure, text) = clean_inputs();
        let visual = VisualFindings {
            noise_consistent: None,
            ocr_density: None,
            errors: vec!["OCR engine unavailable; word density unknown".into()],
            ..Default::default()
        };
        assert_eq!(
            classify(&sigs, &structure, Some(&visual), &text),
            VerdictClass::Ok
        );
    }
}
