// Record storage shared by the ledger contracts: sequential ids, secondary
// indexes and per-field validation errors on top of cosmwasm `Storage`.

mod bucket;
mod error;
pub mod validation;

pub use bucket::{Bucket, Index, Indexer, Model};
pub use error::StoreError;
pub use validation::{
    validate_identifier, validate_timestamp, FieldError, ValidationErrors, Violation,
};
