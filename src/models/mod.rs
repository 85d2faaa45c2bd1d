//! Data models for the copy screen.

pub mod document;
pub mod outcome;
pub mod sources;

pub use document::{Document, ElementKind};
pub use outcome::{CopyError, CopyOutcome};
pub use sources::{combine_sources, SourceKind};
