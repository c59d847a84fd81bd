use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, Event, MessageInfo, Response,
    StdError, StdResult, Storage,
};
use cw2::set_contract_version;
use record_store::{validate_identifier, validate_timestamp, ValidationErrors, Violation};

use crate::error::ContractError;
use crate::msg::{
    AccountResponse, ConfigResponse, CountdownResponse, CountdownsResponse, EstimateCostResponse,
    ExecuteMsg, InstantiateMsg, QueryMsg, SudoMsg,
};
use crate::scheduler::{schedule, ScheduledTask, SchedulerMsg};
use crate::state::{
    accounts, countdowns, Account, Config, Countdown, Transition, CONFIG,
    DEFAULT_REVEAL_INTERVAL, OWNER_INDEX,
};
use crate::validation::{validate_content, validate_title, validate_username};

const CONTRACT_NAME: &str = "crates.io:countdown";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CREATE_ACCOUNT_COST: u64 = 1;
pub const CREATE_COUNTDOWN_COST: u64 = 10;
// deleting is free of charge
pub const DELETE_COUNTDOWN_COST: u64 = 0;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response<SchedulerMsg>, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let reveal_interval = msg.reveal_interval.unwrap_or(DEFAULT_REVEAL_INTERVAL);
    if reveal_interval == 0 {
        return Err(ContractError::InvalidConfig {});
    }
    CONFIG.save(deps.storage, &Config { reveal_interval })?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("reveal_interval", reveal_interval.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response<SchedulerMsg>, ContractError> {
    match msg {
        ExecuteMsg::CreateAccount { username } => execute_create_account(deps, env, username),
        ExecuteMsg::CreateCountdown {
            title,
            full_content,
        } => execute_create_countdown(deps, env, info, title, full_content),
        ExecuteMsg::DeleteCountdown { id } => execute_delete_countdown(deps, info, id),
    }
}

/// Cost-estimation phase: runs the same checks as `execute` without
/// touching state and returns the cost of committing `msg`.
pub fn check(
    deps: Deps,
    env: &Env,
    signer: Option<&Addr>,
    msg: &ExecuteMsg,
) -> Result<u64, ContractError> {
    match msg {
        ExecuteMsg::CreateAccount { username } => {
            prepare_account(env, username)?;
            Ok(CREATE_ACCOUNT_COST)
        }
        ExecuteMsg::CreateCountdown {
            title,
            full_content,
        } => {
            prepare_countdown(env, signer, title, full_content)?;
            Ok(CREATE_COUNTDOWN_COST)
        }
        ExecuteMsg::DeleteCountdown { id } => {
            load_owned_countdown(deps.storage, signer, id)?;
            Ok(DELETE_COUNTDOWN_COST)
        }
    }
}

fn prepare_account(env: &Env, username: &str) -> Result<Account, ContractError> {
    let now = env.block.time.seconds();

    let mut errs = ValidationErrors::new();
    errs.append("username", validate_username(username));
    errs.append("registered_at", validate_timestamp(now, true));
    errs.into_result()?;

    Ok(Account {
        id: Binary::default(),
        username: username.to_string(),
        registered_at: now,
    })
}

fn prepare_countdown(
    env: &Env,
    signer: Option<&Addr>,
    title: &str,
    full_content: &[String],
) -> Result<Countdown, ContractError> {
    let owner = signer.ok_or_else(|| ContractError::Unauthorized {
        reason: "countdown requires a signer".to_string(),
    })?;
    let now = env.block.time.seconds();

    let mut errs = ValidationErrors::new();
    errs.append("title", validate_title(title));
    validate_content("full_content", full_content, &mut errs);
    errs.append("created_at", validate_timestamp(now, true));
    errs.into_result()?;

    Ok(Countdown {
        id: Binary::default(),
        owner: owner.clone(),
        title: title.to_string(),
        full_content: full_content.to_vec(),
        revealed_content: vec![],
        created_at: now,
        completed_at: None,
    })
}

fn load_owned_countdown(
    storage: &dyn Storage,
    signer: Option<&Addr>,
    id: &Binary,
) -> Result<Countdown, ContractError> {
    let mut errs = ValidationErrors::new();
    errs.append("id", validate_identifier(id, false));
    errs.into_result()?;

    let countdown = countdowns().get(storage, id)?;
    match signer {
        Some(signer) if *signer == countdown.owner => Ok(countdown),
        Some(signer) => Err(ContractError::Unauthorized {
            reason: format!(
                "signer {} cannot delete countdown {}",
                signer,
                hex::encode(id.as_slice())
            ),
        }),
        None => Err(ContractError::Unauthorized {
            reason: "delete requires a signer".to_string(),
        }),
    }
}

pub fn execute_create_account(
    deps: DepsMut,
    env: Env,
    username: String,
) -> Result<Response<SchedulerMsg>, ContractError> {
    let mut account = prepare_account(&env, &username)?;
    let id = accounts().put(deps.storage, &mut account)?;

    Ok(Response::new()
        .set_data(id.clone())
        .add_attribute("method", "create_account")
        .add_attribute("account_id", hex::encode(id.as_slice()))
        .add_attribute("username", username))
}

pub fn execute_create_countdown(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    title: String,
    full_content: Vec<String>,
) -> Result<Response<SchedulerMsg>, ContractError> {
    let mut countdown = prepare_countdown(&env, Some(&info.sender), &title, &full_content)?;
    let id = countdowns().put(deps.storage, &mut countdown)?;

    // schedule the first reveal; if this fails the whole call is reverted,
    // record included
    let config = CONFIG.load(deps.storage)?;
    let task = ScheduledTask::after(
        id.clone(),
        countdown.owner.clone(),
        countdown.created_at,
        config.reveal_interval,
    )?;
    let msg = schedule(&task)?;

    Ok(Response::new()
        .add_message(msg)
        .set_data(id.clone())
        .add_attribute("method", "create_countdown")
        .add_attribute("countdown_id", hex::encode(id.as_slice()))
        .add_attribute("owner", countdown.owner)
        .add_attribute("lines", countdown.full_content.len().to_string())
        .add_attribute("due_at", task.due_at.to_string()))
}

pub fn execute_delete_countdown(
    deps: DepsMut,
    info: MessageInfo,
    id: Binary,
) -> Result<Response<SchedulerMsg>, ContractError> {
    load_owned_countdown(deps.storage, Some(&info.sender), &id)?;
    // a pending advance for this id finds nothing and drops itself
    countdowns().delete(deps.storage, &id)?;

    Ok(Response::new()
        .add_attribute("method", "delete_countdown")
        .add_attribute("countdown_id", hex::encode(id.as_slice()))
        .add_attribute("owner", info.sender))
}

/// Entry point for the chain scheduler. Never reachable by a signed
/// transaction.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(
    deps: DepsMut,
    env: Env,
    msg: SudoMsg,
) -> Result<Response<SchedulerMsg>, ContractError> {
    match msg {
        SudoMsg::Advance {
            countdown_id,
            owner,
        } => sudo_advance(deps, env, countdown_id, owner),
    }
}

pub fn sudo_advance(
    deps: DepsMut,
    env: Env,
    countdown_id: Binary,
    owner: Addr,
) -> Result<Response<SchedulerMsg>, ContractError> {
    let mut errs = ValidationErrors::new();
    errs.append("countdown_id", validate_identifier(&countdown_id, false));
    // the owner travels with every rescheduled task
    if owner.as_str().is_empty() {
        errs.append("owner", Err(Violation::MissingValue));
    }
    errs.into_result()?;

    let id_hex = hex::encode(countdown_id.as_slice());
    let now = env.block.time.seconds();
    let bucket = countdowns();

    let loaded = bucket
        .may_get(deps.storage, &countdown_id)
        .map_err(ContractError::from);
    let mut countdown = match loaded {
        Ok(Some(countdown)) => countdown,
        Ok(None) => {
            deps.api
                .debug(&format!("countdown {id_hex}: record gone, advance dropped"));
            return Ok(Response::new()
                .add_attribute("method", "advance")
                .add_attribute("countdown_id", id_hex)
                .add_attribute("result", "noop"));
        }
        Err(err) => {
            deps.api
                .debug(&format!("countdown {id_hex}: advance aborted: {err}"));
            return Err(err);
        }
    };

    let transition = match countdown.advance(now) {
        Ok(transition) => transition,
        Err(err) => {
            deps.api
                .debug(&format!("countdown {id_hex}: advance aborted: {err}"));
            return Err(err);
        }
    };
    if transition.modified() {
        bucket.put(deps.storage, &mut countdown)?;
    }

    let res = Response::new()
        .add_attribute("method", "advance")
        .add_attribute("countdown_id", id_hex.clone())
        .add_attribute("owner", owner.as_str())
        .add_attribute("revealed", countdown.revealed_content.len().to_string())
        .add_attribute("remaining", countdown.remaining().to_string());

    match transition {
        Transition::Revealed { index } => {
            let config = CONFIG.load(deps.storage)?;
            let task = ScheduledTask::after(countdown_id, owner, now, config.reveal_interval)?;
            let msg = schedule(&task)?;

            Ok(res
                .add_message(msg)
                .add_attribute("result", "revealed")
                .add_attribute("due_at", task.due_at.to_string())
                .add_event(
                    Event::new("countdown_advanced")
                        .add_attribute("countdown_id", id_hex)
                        .add_attribute("line", index.to_string()),
                ))
        }
        Transition::Completed { index } => Ok(res
            .add_attribute("result", "completed")
            .add_event(
                Event::new("countdown_completed")
                    .add_attribute("countdown_id", id_hex)
                    .add_attribute("line", index.to_string())
                    .add_attribute("completed_at", now.to_string()),
            )),
        Transition::AlreadyCompleted { .. } => {
            Ok(res.add_attribute("result", "already_completed"))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Account { id } => to_json_binary(&query_account(deps, id)?),
        QueryMsg::Countdown { id } => to_json_binary(&query_countdown(deps, id)?),
        QueryMsg::CountdownsByOwner {
            owner,
            start_after,
            limit,
        } => to_json_binary(&query_countdowns_by_owner(
            deps,
            owner,
            start_after,
            limit,
        )?),
        QueryMsg::EstimateCost { signer, msg } => {
            to_json_binary(&query_estimate_cost(deps, env, signer, msg)?)
        }
    }
}

fn query_error(err: impl Into<ContractError>) -> StdError {
    match err.into() {
        ContractError::Std(err) => err,
        other => StdError::generic_err(other.to_string()),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        reveal_interval: config.reveal_interval,
    })
}

fn query_account(deps: Deps, id: Binary) -> StdResult<AccountResponse> {
    let account = accounts().get(deps.storage, &id).map_err(query_error)?;
    Ok(account.into())
}

fn query_countdown(deps: Deps, id: Binary) -> StdResult<CountdownResponse> {
    let countdown = countdowns().get(deps.storage, &id).map_err(query_error)?;
    Ok(countdown.into())
}

fn query_countdowns_by_owner(
    deps: Deps,
    owner: String,
    start_after: Option<Binary>,
    limit: Option<u32>,
) -> StdResult<CountdownsResponse> {
    let owner_addr = deps.api.addr_validate(&owner)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;

    let bucket = countdowns();
    let ids = bucket
        .page_by_index(
            deps.storage,
            OWNER_INDEX,
            owner_addr.as_bytes(),
            start_after.as_ref(),
            limit,
        )
        .map_err(query_error)?;

    let countdowns = ids
        .iter()
        .map(|id| {
            bucket
                .get(deps.storage, id)
                .map(CountdownResponse::from)
                .map_err(query_error)
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(CountdownsResponse { countdowns })
}

fn query_estimate_cost(
    deps: Deps,
    env: Env,
    signer: Option<String>,
    msg: ExecuteMsg,
) -> StdResult<EstimateCostResponse> {
    let signer = signer
        .map(|signer| deps.api.addr_validate(&signer))
        .transpose()?;
    let cost = check(deps, &env, signer.as_ref(), &msg).map_err(query_error)?;

    Ok(EstimateCostResponse {
        path: msg.path().to_string(),
        cost,
    })
}
