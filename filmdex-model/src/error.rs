use thiserror::Error;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid site: {0}")]
    InvalidSite(String),

    #[error("classification node {child} references missing parent {parent}")]
    DanglingClassificationParent { child: i64, parent: i64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
