use cosmwasm_std::testing::{MockApi, MockStorage};
use cosmwasm_std::{from_json, Addr, Binary, Empty, Timestamp};
use cw_multi_test::custom_handler::{CachingCustomHandler, CachingCustomHandlerState};
use cw_multi_test::{App, BankKeeper, BasicAppBuilder, ContractWrapper, Executor, WasmKeeper};

use countdown::contract::{execute, instantiate, query, sudo};
use countdown::msg::{
    CountdownResponse, CountdownsResponse, EstimateCostResponse, ExecuteMsg, InstantiateMsg,
    QueryMsg, SudoMsg,
};
use countdown::scheduler::SchedulerMsg;
use countdown::state::Stage;

const DAY: u64 = 24 * 60 * 60;

type CountdownApp = App<
    BankKeeper,
    MockApi,
    MockStorage,
    CachingCustomHandler<SchedulerMsg, Empty>,
    WasmKeeper<SchedulerMsg, Empty>,
>;

struct Chain {
    app: CountdownApp,
    scheduler: CachingCustomHandlerState<SchedulerMsg, Empty>,
    contract: Addr,
}

impl Chain {
    fn new() -> Self {
        let handler = CachingCustomHandler::<SchedulerMsg, Empty>::new();
        let scheduler = handler.state();
        let mut app = BasicAppBuilder::<SchedulerMsg, Empty>::new_custom()
            .with_custom(handler)
            .build(|_, _, _| {});

        let code = ContractWrapper::new(execute, instantiate, query).with_sudo(sudo);
        let code_id = app.store_code(Box::new(code));
        let contract = app
            .instantiate_contract(
                code_id,
                Addr::unchecked("creator"),
                &InstantiateMsg {
                    reveal_interval: None,
                },
                &[],
                "countdown",
                None,
            )
            .unwrap();

        Chain {
            app,
            scheduler,
            contract,
        }
    }

    fn now(&self) -> u64 {
        self.app.block_info().time.seconds()
    }

    fn exec(&mut self, sender: &str, msg: &ExecuteMsg) -> anyhow::Result<Option<Binary>> {
        self.app
            .execute_contract(Addr::unchecked(sender), self.contract.clone(), msg, &[])
            .map(|res| res.data)
    }

    fn countdown(&self, id: &Binary) -> CountdownResponse {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::Countdown { id: id.clone() })
            .unwrap()
    }

    /// Drains the scheduler queue, returning `(due_at, payload)` pairs.
    fn take_scheduled(&mut self) -> Vec<(u64, SudoMsg)> {
        let tasks = self
            .scheduler
            .execs()
            .iter()
            .map(|msg| match msg {
                SchedulerMsg::Schedule { due_at, msg, .. } => (*due_at, from_json(msg).unwrap()),
            })
            .collect();
        self.scheduler.reset();
        tasks
    }

    /// Moves block time to `due_at` and delivers `payload` like the chain
    /// scheduler would.
    fn fire(&mut self, due_at: u64, payload: &SudoMsg) {
        self.app
            .update_block(|block| block.time = Timestamp::from_seconds(due_at));
        self.app.wasm_sudo(self.contract.clone(), payload).unwrap();
    }
}

fn seq(n: u64) -> Binary {
    Binary::from(n.to_be_bytes().to_vec())
}

#[test]
fn reveals_daily_until_complete() {
    let mut chain = Chain::new();

    let account = ExecuteMsg::CreateAccount {
        username: "enigma".to_string(),
    };
    assert_eq!(chain.exec("alice", &account).unwrap(), Some(seq(1)));

    let create = ExecuteMsg::CreateCountdown {
        title: "final countdown".to_string(),
        full_content: vec![
            "We're leaving together".to_string(),
            "But still it's farewell".to_string(),
            "It's the final countdown".to_string(),
        ],
    };
    let created_at = chain.now();
    assert_eq!(chain.exec("alice", &create).unwrap(), Some(seq(1)));
    assert_eq!(chain.countdown(&seq(1)).stage, Stage::Created);

    let mut due = chain.take_scheduled();
    let mut expected_due = created_at + DAY;
    let mut revealed = 0;
    while let Some((due_at, payload)) = due.pop() {
        assert!(due.is_empty());
        assert_eq!(due_at, expected_due);
        chain.fire(due_at, &payload);
        revealed += 1;

        let view = chain.countdown(&seq(1));
        assert_eq!(view.revealed_content.len(), revealed);
        due = chain.take_scheduled();
        expected_due += DAY;
    }

    let view = chain.countdown(&seq(1));
    assert_eq!(revealed, 3);
    assert_eq!(view.stage, Stage::Completed);
    assert_eq!(view.completed_at, Some(created_at + 3 * DAY));
    assert_eq!(view.revealed_content[2], "It's the final countdown");
}

#[test]
fn deleted_countdown_drops_pending_reveal() {
    let mut chain = Chain::new();
    let create = ExecuteMsg::CreateCountdown {
        title: "short countdown".to_string(),
        full_content: vec!["first line".to_string(), "second line".to_string()],
    };
    chain.exec("alice", &create).unwrap();
    chain.exec("alice", &create).unwrap();
    let pending = chain.take_scheduled();
    assert_eq!(pending.len(), 2);

    let delete = ExecuteMsg::DeleteCountdown { id: seq(1) };
    let err = chain.exec("bob", &delete).unwrap_err();
    assert!(err.root_cause().to_string().contains("Unauthorized"));
    chain.exec("alice", &delete).unwrap();

    // the first task now targets a missing record and must not reschedule
    let (due_at, payload) = &pending[0];
    chain.fire(*due_at, payload);
    assert!(chain.take_scheduled().is_empty());

    let (due_at, payload) = &pending[1];
    chain.fire(*due_at, payload);
    assert_eq!(chain.take_scheduled().len(), 1);

    let page: CountdownsResponse = chain
        .app
        .wrap()
        .query_wasm_smart(
            chain.contract.clone(),
            &QueryMsg::CountdownsByOwner {
                owner: "alice".to_string(),
                start_after: None,
                limit: None,
            },
        )
        .unwrap();
    assert_eq!(page.countdowns.len(), 1);
    assert_eq!(page.countdowns[0].id, seq(2));
    assert_eq!(page.countdowns[0].revealed_content, vec!["first line"]);
}

#[test]
fn estimate_matches_commit() {
    let mut chain = Chain::new();
    let bad = ExecuteMsg::CreateCountdown {
        title: "ok title".to_string(),
        full_content: vec!["no".to_string()],
    };

    let estimate: Result<EstimateCostResponse, _> = chain.app.wrap().query_wasm_smart(
        chain.contract.clone(),
        &QueryMsg::EstimateCost {
            signer: Some("alice".to_string()),
            msg: bad.clone(),
        },
    );
    let estimate_err = estimate.unwrap_err().to_string();
    let commit_err = chain.exec("alice", &bad).unwrap_err().root_cause().to_string();

    assert!(estimate_err.contains("full_content[0]: invalid model"));
    assert!(commit_err.contains("full_content[0]: invalid model"));
    assert!(chain.take_scheduled().is_empty());
}
