use thiserror::Error;

/// Errors raised while turning wire-shaped input into the typed document model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Element is missing its {0}")]
    MissingIdentity(&'static str),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    #[error("Duplicate element id: {0}")]
    DuplicateElementId(String),

    #[error("Invalid properties for element '{element_id}': {message}")]
    InvalidProperties { element_id: String, message: String },
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;
