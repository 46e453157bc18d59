//! Report rendering for a completed verdict

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{VerdictClass, VerificationVerdict};

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Json,
    PlainText,
}

/// Serializes the verdict with stable field names, nested per component
pub fn to_json(verdict: &VerificationVerdict) -> Result<String> {
    serde_json::to_string_pretty(verdict).map_err(|e| Error::Report(e.to_string()))
}

/// Human-readable summary for terminal output
pub fn render_summary(verdict: &VerificationVerdict) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Document : {}", verdict.document.path.display()));
    lines.push(format!("SHA-256  : {}", verdict.document.sha256));
    lines.push(format!("SHA-512  : {}", verdict.document.sha512));

    if verdict.signatures.is_empty() {
        lines.push("Signatures: none detected".to_string());
    } else {
        for (i, signature) in verdict.signatures.iter().enumerate() {
            let signer = signature.signer.as_deref().unwrap_or("unknown signer");
            lines.push(format!(
                "Signature {}: {:?} ({signer})",
                i + 1,
                signature.status
            ));
        }
    }

    lines.push(format!(
        "Structure : eof_markers={} incremental_updates={} active_content={}",
        verdict.structure.eof_markers,
        verdict.structure.incremental_updates,
        verdict.structure.active_content,
    ));

    if let Some(visual) = &verdict.visual {
        lines.push(format!(
            "Visual    : pages={} copy_move={} noise_consistent={:?}",
            visual.pages, visual.copy_move, visual.noise_consistent,
        ));
    }

    if !verdict.text.suspicious_terms.is_empty() {
        lines.push(format!(
            "Terms     : {}",
            verdict.text.suspicious_terms.join(", ")
        ));
    }
    if !verdict.text.outlier_pages.is_empty() {
        lines.push(format!(
            "Style     : outlier pages {:?}",
            verdict.text.outlier_pages
        ));
    }

    let verdict_label = match verdict.classification {
        VerdictClass::Ok => "OK",
        VerdictClass::Suspect => "SUSPECT",
    };
    lines.push(format!("Verdict   : {verdict_label}"));
    lines.join("\n")
}

/// Writes the report to disk in the requested format
pub fn write_report(
    verdict: &VerificationVerdict,
    path: &Path,
    format: ReportFormat,
) -> Result<()> {
    let content = match format {
        ReportFormat::Json => to_json(verdict)?,
        ReportFormat::PlainText => render_summary(verdict),
    };
    std::fs::write(path, content)?;
    Ok(())
}
