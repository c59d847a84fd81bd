use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};
use cw_storage_plus::Item;
use record_store::{
    validate_identifier, validate_timestamp, Bucket, Index, Model, ValidationErrors, Violation,
};

use crate::error::ContractError;
use crate::validation::{validate_content, validate_title, validate_username};

/// Seconds between two reveals unless configured otherwise
pub const DEFAULT_REVEAL_INTERVAL: u64 = 24 * 60 * 60;

pub const ACCOUNT_KIND: &str = "account";
pub const COUNTDOWN_KIND: &str = "countdown";

/// Name of the countdown index keyed by owner address
pub const OWNER_INDEX: &str = "owner";

pub const COUNTDOWN_NAMESPACE: &str = "countdowns";

#[cw_serde]
pub struct Config {
    /// Delay between two reveals, in seconds
    pub reveal_interval: u64,
}

/// Configuration storage
pub const CONFIG: Item<Config> = Item::new("config");

#[cw_serde]
pub struct Account {
    /// Sequence id, empty until stored
    pub id: Binary,
    pub username: String,
    /// Registration time (unix seconds)
    pub registered_at: u64,
}

impl Model for Account {
    fn id(&self) -> &Binary {
        &self.id
    }

    fn set_id(&mut self, id: Binary) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        errs.append("id", validate_identifier(&self.id, false));
        errs.append("username", validate_username(&self.username));
        errs.append("registered_at", validate_timestamp(self.registered_at, true));
        errs.into_result()
    }
}

#[cw_serde]
pub enum Stage {
    /// Nothing revealed yet
    Created,
    /// Some lines revealed, next reveal scheduled
    Revealing,
    /// Every line revealed; terminal
    Completed,
}

/// Outcome of one scheduled advance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Line `index` was revealed and more remain.
    Revealed { index: usize },
    /// Line `index` was the last one; the countdown is now complete.
    Completed { index: usize },
    /// Nothing left to reveal. `stamped` is set when `completed_at` had to
    /// be filled in by this call.
    AlreadyCompleted { stamped: bool },
}

impl Transition {
    /// Whether the countdown needs another advance after this one.
    pub fn reschedule(&self) -> bool {
        matches!(self, Transition::Revealed { .. })
    }

    /// Whether the record changed and must be written back.
    pub fn modified(&self) -> bool {
        !matches!(self, Transition::AlreadyCompleted { stamped: false })
    }
}

#[cw_serde]
pub struct Countdown {
    /// Sequence id, empty until stored
    pub id: Binary,
    /// Signer that created the countdown
    pub owner: Addr,
    pub title: String,
    /// Every line, fixed at creation
    pub full_content: Vec<String>,
    /// Lines revealed so far, always a prefix of `full_content`
    pub revealed_content: Vec<String>,
    /// Creation time (unix seconds)
    pub created_at: u64,
    /// Set once the last line is revealed
    pub completed_at: Option<u64>,
}

impl Countdown {
    pub fn stage(&self) -> Stage {
        if self.completed_at.is_some() {
            Stage::Completed
        } else if self.revealed_content.is_empty() {
            Stage::Created
        } else {
            Stage::Revealing
        }
    }

    pub fn remaining(&self) -> usize {
        self.full_content
            .len()
            .saturating_sub(self.revealed_content.len())
    }

    fn check_content(&self) -> Result<(), ContractError> {
        let revealed = self.revealed_content.len();
        if revealed > self.full_content.len() {
            return Err(self.malformed("more lines revealed than written"));
        }
        if self.full_content[..revealed] != self.revealed_content[..] {
            return Err(self.malformed("revealed lines diverge from content"));
        }
        Ok(())
    }

    fn malformed(&self, reason: &str) -> ContractError {
        ContractError::MalformedContent {
            kind: COUNTDOWN_KIND.to_string(),
            id: hex::encode(self.id.as_slice()),
            reason: reason.to_string(),
        }
    }

    /// Reveals the next line at time `now`.
    ///
    /// Revealing the last line completes the countdown in the same step.
    /// Once complete the record never changes again; a late or duplicate
    /// call only fills in `completed_at` if it is somehow missing.
    pub fn advance(&mut self, now: u64) -> Result<Transition, ContractError> {
        self.check_content()?;

        let index = self.revealed_content.len();
        if index == self.full_content.len() {
            let stamped = self.completed_at.is_none();
            if stamped {
                self.completed_at = Some(now);
            }
            return Ok(Transition::AlreadyCompleted { stamped });
        }

        self.revealed_content.push(self.full_content[index].clone());
        if self.remaining() == 0 {
            self.completed_at = Some(now);
            Ok(Transition::Completed { index })
        } else {
            Ok(Transition::Revealed { index })
        }
    }
}

impl Model for Countdown {
    fn id(&self) -> &Binary {
        &self.id
    }

    fn set_id(&mut self, id: Binary) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        errs.append("id", validate_identifier(&self.id, false));
        if self.owner.as_str().is_empty() {
            errs.append("owner", Err(Violation::MissingValue));
        }
        errs.append("title", validate_title(&self.title));
        validate_content("full_content", &self.full_content, &mut errs);

        let revealed = self.revealed_content.len();
        if revealed > self.full_content.len()
            || self.full_content[..revealed] != self.revealed_content[..]
        {
            errs.append("revealed_content", Err(Violation::InvalidModel));
        }

        errs.append("created_at", validate_timestamp(self.created_at, true));
        let complete = !self.full_content.is_empty() && revealed == self.full_content.len();
        match self.completed_at {
            Some(at) => {
                errs.append("completed_at", validate_timestamp(at, true));
                if !complete {
                    errs.append("completed_at", Err(Violation::InvalidModel));
                }
            }
            None if complete => errs.append("completed_at", Err(Violation::MissingValue)),
            None => {}
        }

        errs.into_result()
    }
}

pub fn accounts<'a>() -> Bucket<'a, Account> {
    Bucket::new(ACCOUNT_KIND, "accounts", "accounts_seq")
}

fn owner_index(countdown: Option<&Countdown>) -> Option<Vec<u8>> {
    let owner = countdown?.owner.as_str();
    if owner.is_empty() {
        return None;
    }
    Some(owner.as_bytes().to_vec())
}

/// Countdowns, indexed by owner
pub fn countdowns<'a>() -> Bucket<'a, Countdown> {
    Bucket::new(COUNTDOWN_KIND, COUNTDOWN_NAMESPACE, "countdowns_seq").with_index(Index::new(
        OWNER_INDEX,
        "countdowns_owner",
        owner_index,
    ))
}
