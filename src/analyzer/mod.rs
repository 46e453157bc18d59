//! The four independent analyzers
//!
//! Each consumes the preprocessed document handle and produces exactly one
//! findings record per run. None of them mutate shared state; the
//! orchestrator owns sequencing and the final merge.

pub mod hash_signature;
pub mod structure;
pub mod stylometry;
pub mod text;
pub mod visual;

pub use hash_signature::HashSignatureAnalyzer;
pub use structure::StructureAnalyzer;
pub use text::TextAnalyzer;
pub use visual::{VisualAnalyzer, VisualOutcome};
