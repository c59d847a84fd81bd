use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;

/// Length in bytes of a generated record identifier.
pub const ID_LENGTH: usize = 8;

/// 9999-12-31T23:59:59Z, the last second a timestamp may name.
pub const MAX_UNIX_SECONDS: u64 = 253_402_300_799;

/// Kind of rule a single field broke.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Violation {
    /// Required value is absent or zero
    MissingValue,
    /// Value has the wrong shape or length
    MalformedInput,
    /// Value fails a content rule
    InvalidModel,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Violation::MissingValue => "missing value",
            Violation::MalformedInput => "malformed input",
            Violation::InvalidModel => "invalid model",
        };
        f.write_str(text)
    }
}

#[cw_serde]
#[derive(Eq)]
pub struct FieldError {
    pub field: String,
    pub violation: Violation,
}

/// Every field violation found while validating one value.
#[cw_serde]
#[derive(Eq, Default)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `outcome` under `field` when it is a violation.
    pub fn append(&mut self, field: impl Into<String>, outcome: Result<(), Violation>) {
        if let Err(violation) = outcome {
            self.errors.push(FieldError {
                field: field.into(),
                violation,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violation recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<Violation> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.violation)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.violation)?;
        }
        Ok(())
    }
}

/// Checks that `id` is a generated 8 byte identifier. Empty passes only
/// when `allow_empty` is set.
pub fn validate_identifier(id: &Binary, allow_empty: bool) -> Result<(), Violation> {
    if id.is_empty() {
        return if allow_empty {
            Ok(())
        } else {
            Err(Violation::MissingValue)
        };
    }
    if id.len() != ID_LENGTH {
        return Err(Violation::MalformedInput);
    }
    Ok(())
}

/// Checks a unix timestamp in seconds.
pub fn validate_timestamp(seconds: u64, required: bool) -> Result<(), Violation> {
    if seconds > MAX_UNIX_SECONDS {
        return Err(Violation::MalformedInput);
    }
    if seconds == 0 && required {
        return Err(Violation::MissingValue);
    }
    Ok(())
}
