use cosmwasm_std::StdError;
use record_store::{StoreError, ValidationErrors};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Validation failed: {errors}")]
    ValidationFailed { errors: ValidationErrors },

    #[error("{kind} with id {id} not found")]
    NotFound { kind: String, id: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Scheduling failed: {reason}")]
    SchedulingFailed { reason: String },

    #[error("Malformed {kind} {id}: {reason}")]
    MalformedContent {
        kind: String,
        id: String,
        reason: String,
    },

    #[error("Reveal interval must be greater than zero")]
    InvalidConfig {},

    #[error("Unknown index {index} on {bucket}")]
    UnknownIndex { bucket: String, index: String },
}

impl From<ValidationErrors> for ContractError {
    fn from(errors: ValidationErrors) -> Self {
        ContractError::ValidationFailed { errors }
    }
}

impl From<StoreError> for ContractError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Std(err) => ContractError::Std(err),
            StoreError::ValidationFailed(errors) => ContractError::ValidationFailed { errors },
            StoreError::NotFound { kind, id } => ContractError::NotFound { kind, id },
            StoreError::Corrupt { kind, id, reason } => {
                ContractError::MalformedContent { kind, id, reason }
            }
            StoreError::UnknownIndex { bucket, index } => {
                ContractError::UnknownIndex { bucket, index }
            }
        }
    }
}
