//! Signature enumeration and classification
//!
//! Content digests already live on the handle (computed once at
//! preprocess); this analyzer owns the signature side: enumeration through
//! the container parser and classification through the injected validator.

use std::sync::Arc;

use lopdf::Document;
use tracing::{debug, instrument};

use crate::capability::{Capabilities, ValidationError};
use crate::container::{package::Package, pdf};
use crate::error::{Result, SignatureError};
use crate::types::{DocumentHandle, DocumentType, SignatureRecord, SignatureStatus};

pub struct HashSignatureAnalyzer {
    capabilities: Arc<Capabilities>,
}

impl HashSignatureAnalyzer {
    pub fn new(capabilities: Arc<Capabilities>) -> Self {
        Self { capabilities }
    }

    /// Classifies embedded signatures; zero-to-many records per document
    #[instrument(skip(self, handle), fields(doc_type = ?handle.doc_type))]
    pub async fn analyze(&self, handle: &DocumentHandle) -> Result<Vec<SignatureRecord>> {
        match handle.doc_type {
            DocumentType::Pdf => self.analyze_pdf(handle).await,
            DocumentType::WordPackage => self.analyze_package(handle),
            DocumentType::Unknown => Ok(Vec::new()),
        }
    }

    async fn analyze_pdf(&self, handle: &DocumentHandle) -> Result<Vec<SignatureRecord>> {
        let bytes = tokio::fs::read(&handle.path).await?;
        let doc = Document::load_mem(&bytes)
            .map_err(|e| SignatureError::Enumeration(e.to_string()))?;

        let signatures = pdf::embedded_signatures(&doc);
        if signatures.is_empty() {
            debug!("no embedded signatures");
            return Ok(Vec::new());
        }

        let validator = match &self.capabilities.signature_validator {
            Some(validator) => validator,
            None => {
                return Ok(vec![SignatureRecord {
                    signer: None,
                    signing_time: None,
                    status: SignatureStatus::Unavailable,
                    detail: "signature validator not available".into(),
                }])
            }
        };

        let mut records = Vec::with_capacity(signatures.len());
        for signature in &signatures {
            let record = match validator.verify(&bytes, signature) {
                Ok(outcome) => {
                    let status = if outcome.trusted && outcome.intact {
                        SignatureStatus::Valid
                    } else {
                        SignatureStatus::Invalid
                    };
                    SignatureRecord {
                        signer: outcome.signer.or_else(|| signature.signer.clone()),
                        signing_time: signature.signing_time.clone(),
                        status,
                        detail: outcome.detail,
                    }
                }
                Err(ValidationError::ByteRangeUnverifiable) => SignatureRecord {
                    signer: signature.signer.clone(),
                    signing_time: signature.signing_time.clone(),
                    status: SignatureStatus::UnverifiedHybrid,
                    detail: "signature present but the document layout prevents byte-range verification"
                        .into(),
                },
                Err(ValidationError::Machinery(detail)) => SignatureRecord {
                    signer: signature.signer.clone(),
                    signing_time: signature.signing_time.clone(),
                    status: SignatureStatus::Error,
                    detail,
                },
            };
            records.push(record);
        }
        Ok(records)
    }

    /// Package signatures get a presence check only
    fn analyze_package(&self, handle: &DocumentHandle) -> Result<Vec<SignatureRecord>> {
        let package = Package::open(&handle.path)
            .map_err(|e| SignatureError::Enumeration(e.to_string()))?;
        Ok(package
            .signature_entries()
            .into_iter()
            .map(|entry| SignatureRecord {
                signer: None,
                signing_time: None,
                status: SignatureStatus::Present,
                detail: format!("signature artifact at {entry} (presence check only)"),
            })
            .collect())
    }
}
