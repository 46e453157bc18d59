//! Document tampering triage library
//!
//! Runs four independent analyzers over a PDF or word-processing package
//! (byte structure, rendered appearance, text content, embedded
//! signatures) and combines their findings into one `OK`/`SUSPECT`
//! verdict. Every detector is a heuristic signal; the verdict is a triage
//! flag for a human reviewer, not a forensic conclusion.

// Configuration and core pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Preprocessing and shared hashing
pub mod hash;
pub mod preprocess;

// Container collaborators
pub mod container;

// Injected external capabilities
pub mod capability;

// The four analyzers
pub mod analyzer;

// Report generation
pub mod report;

// Re-exports for crate consumers
pub use analyzer::{HashSignatureAnalyzer, StructureAnalyzer, TextAnalyzer, VisualAnalyzer};
pub use capability::Capabilities;
pub use config::VerifierConfig;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use report::ReportFormat;
pub use types::{
    DocumentHandle, DocumentType, SignatureRecord, SignatureStatus, StructuralFindings,
    StylometricProfile, TextFindings, VerdictClass, VerificationVerdict, VisualFindings,
};
