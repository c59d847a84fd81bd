use cosmwasm_std::StdError;
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("{kind} with id {id} not found")]
    NotFound { kind: String, id: String },

    #[error("Cannot decode {kind} with id {id}: {reason}")]
    Corrupt {
        kind: String,
        id: String,
        reason: String,
    },

    #[error("Bucket {bucket} has no index named {index}")]
    UnknownIndex { bucket: String, index: String },
}

impl From<ValidationErrors> for StoreError {
    fn from(errs: ValidationErrors) -> Self {
        StoreError::ValidationFailed(errs)
    }
}
