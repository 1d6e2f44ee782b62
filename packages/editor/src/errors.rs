//! Error types for the editor

use crate::store::StoreError;
use mailforge_compiler_html::CompileError;
use mailforge_model::NormalizeError;
use thiserror::Error;

/// Operation-level failures. Nothing is changed when one of these is returned.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Change batch not found: {0}")]
    BatchNotFound(String),

    #[error("Change record not found: {0}")]
    RecordNotFound(String),

    #[error("Template {template_id} already has a pending batch ({batch_id})")]
    BatchPending { template_id: String, batch_id: String },

    #[error("Template {0} has no pending batch")]
    NoPendingBatch(String),

    #[error("Change record {id} is already {status}")]
    RecordAlreadyResolved { id: String, status: &'static str },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Per-record failures during apply or revert.
///
/// These never abort a batch; the record is skipped and reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Revert wanted to restore into a section that no longer exists
    #[error("Section {0} no longer exists")]
    SectionMissing(String),

    /// Apply wanted to place into a section that does not exist
    #[error("Target section {0} does not exist")]
    TargetSectionMissing(String),

    #[error("Element {0} not found")]
    ElementNotFound(String),
}
