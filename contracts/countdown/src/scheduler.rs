use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Addr, Binary, CosmosMsg, CustomMsg};

use crate::error::ContractError;
use crate::msg::SudoMsg;

/// Custom message understood by the chain's scheduler module.
///
/// The scheduler stores `msg` and hands it to this contract's `sudo` entry
/// point once block time reaches `due_at`.
#[cw_serde]
pub enum SchedulerMsg {
    Schedule {
        /// Handle identifying the task, unique per countdown and due time
        task_id: String,
        /// Unix seconds
        due_at: u64,
        /// JSON encoded [`SudoMsg`]
        msg: Binary,
    },
}

impl CustomMsg for SchedulerMsg {}

/// A future advance of one countdown.
#[cw_serde]
pub struct ScheduledTask {
    pub countdown_id: Binary,
    pub owner: Addr,
    pub due_at: u64,
}

impl ScheduledTask {
    /// Task due `interval` seconds after `now`.
    pub fn after(
        countdown_id: Binary,
        owner: Addr,
        now: u64,
        interval: u64,
    ) -> Result<Self, ContractError> {
        let due_at = now
            .checked_add(interval)
            .filter(|due_at| *due_at > now)
            .ok_or_else(|| ContractError::SchedulingFailed {
                reason: format!("no valid due time {interval}s after {now}"),
            })?;

        Ok(ScheduledTask {
            countdown_id,
            owner,
            due_at,
        })
    }

    pub fn task_id(&self) -> String {
        format!("{}@{}", hex::encode(self.countdown_id.as_slice()), self.due_at)
    }

    /// Message delivered back when the task fires.
    pub fn payload(&self) -> SudoMsg {
        SudoMsg::Advance {
            countdown_id: self.countdown_id.clone(),
            owner: self.owner.clone(),
        }
    }
}

/// Enqueues `task` with the chain scheduler.
pub fn schedule(task: &ScheduledTask) -> Result<CosmosMsg<SchedulerMsg>, ContractError> {
    let msg = to_json_binary(&task.payload()).map_err(|err| ContractError::SchedulingFailed {
        reason: err.to_string(),
    })?;

    Ok(CosmosMsg::Custom(SchedulerMsg::Schedule {
        task_id: task.task_id(),
        due_at: task.due_at,
        msg,
    }))
}
