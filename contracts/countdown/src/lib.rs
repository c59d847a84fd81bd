pub mod contract;
mod error;
pub mod msg;
pub mod scheduler;
pub mod state;
pub mod validation;

pub use crate::error::ContractError;
