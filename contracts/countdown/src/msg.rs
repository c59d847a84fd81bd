use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary};

use crate::state::{Account, Countdown, Stage};

pub const CREATE_ACCOUNT_PATH: &str = "countdown/create_account";
pub const CREATE_COUNTDOWN_PATH: &str = "countdown/create_countdown";
pub const DELETE_COUNTDOWN_PATH: &str = "countdown/delete_countdown";

#[cw_serde]
pub struct InstantiateMsg {
    /// Seconds between reveals, defaults to one day
    pub reveal_interval: Option<u64>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Register an account
    CreateAccount { username: String },
    /// Create a countdown owned by the sender; its first line is revealed
    /// one interval later
    CreateCountdown {
        title: String,
        full_content: Vec<String>,
    },
    /// Delete a countdown (owner only)
    DeleteCountdown { id: Binary },
}

impl ExecuteMsg {
    /// Routing path of the command.
    pub fn path(&self) -> &'static str {
        match self {
            ExecuteMsg::CreateAccount { .. } => CREATE_ACCOUNT_PATH,
            ExecuteMsg::CreateCountdown { .. } => CREATE_COUNTDOWN_PATH,
            ExecuteMsg::DeleteCountdown { .. } => DELETE_COUNTDOWN_PATH,
        }
    }
}

/// Messages the chain's scheduler delivers back to the contract.
#[cw_serde]
pub enum SudoMsg {
    /// Reveal the next line of a countdown
    Advance { countdown_id: Binary, owner: Addr },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    /// Get account by ID
    #[returns(AccountResponse)]
    Account { id: Binary },

    /// Get countdown by ID
    #[returns(CountdownResponse)]
    Countdown { id: Binary },

    /// Get countdowns by owner
    #[returns(CountdownsResponse)]
    CountdownsByOwner {
        owner: String,
        start_after: Option<Binary>,
        limit: Option<u32>,
    },

    /// Validate a command without executing it and return its cost
    #[returns(EstimateCostResponse)]
    EstimateCost {
        signer: Option<String>,
        msg: ExecuteMsg,
    },
}

// Response types

#[cw_serde]
pub struct ConfigResponse {
    pub reveal_interval: u64,
}

#[cw_serde]
pub struct AccountResponse {
    pub id: Binary,
    pub username: String,
    pub registered_at: u64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            username: account.username,
            registered_at: account.registered_at,
        }
    }
}

/// Public view of a countdown. Lines not yet revealed are withheld.
#[cw_serde]
pub struct CountdownResponse {
    pub id: Binary,
    pub owner: Addr,
    pub title: String,
    pub revealed_content: Vec<String>,
    pub total_lines: u64,
    pub created_at: u64,
    pub completed_at: Option<u64>,
    pub stage: Stage,
}

impl From<Countdown> for CountdownResponse {
    fn from(countdown: Countdown) -> Self {
        let stage = countdown.stage();
        CountdownResponse {
            id: countdown.id,
            owner: countdown.owner,
            title: countdown.title,
            total_lines: countdown.full_content.len() as u64,
            revealed_content: countdown.revealed_content,
            created_at: countdown.created_at,
            completed_at: countdown.completed_at,
            stage,
        }
    }
}

#[cw_serde]
pub struct CountdownsResponse {
    pub countdowns: Vec<CountdownResponse>,
}

#[cw_serde]
pub struct EstimateCostResponse {
    pub path: String,
    pub cost: u64,
}
