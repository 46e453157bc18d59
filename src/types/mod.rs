//! Type definitions for the document verification pipeline

pub mod document;
pub mod findings;

pub use document::*;
pub use findings::*;
