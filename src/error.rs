//! Error types and handling for the document verification pipeline

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for verification operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for verification operations
///
/// Only FATAL conditions travel through this type. Degraded capabilities and
/// recorded anomalies attach to the owning findings record instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document not found or unreadable: {0}")]
    DocumentUnavailable(String),

    #[error("Preprocess error: {0}")]
    Preprocess(String),

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Visual analysis error: {0}")]
    Visual(#[from] VisualError),

    #[error("Text analysis error: {0}")]
    Text(#[from] TextError),

    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StructureError {
    #[error("Container parse failed: {0}")]
    ContainerParse(String),

    #[error("Package read failed: {0}")]
    PackageRead(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SignatureError {
    #[error("Signature enumeration failed: {0}")]
    Enumeration(String),

    #[error("Validator failure: {0}")]
    Validator(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VisualError {
    #[error("Document could not be rendered: {0}")]
    RenderFailed(String),

    #[error("Page image unreadable: {0}")]
    PageUnreadable(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TextError {
    #[error("Text extraction failed: {0}")]
    Extraction(String),
}
