//! Thin wrappers over the container collaborators
//!
//! `pdf` wraps byte scanning and `lopdf` traversal; `package` wraps the
//! word-processing zip container and its XML sub-parts.

pub mod package;
pub mod pdf;
