use async_trait::async_trait;
use parity_scale_codec::Encode;

use farm_admin_sdk::chain::{
    CallRequest, ContractChain, DryRunOutcome, DryRunRequest, InstantiateRequest, Receipt, Weight,
};
use farm_admin_sdk::contract::{Operator, ValueTransfer};
use farm_admin_sdk::dispatch::{Command, Config, Dispatcher, Report, TESTNET_WRAPPED_AZERO};
use farm_admin_sdk::gateway::{ChainProperties, Endpoint};
use farm_admin_sdk::metadata::MetadataPaths;
use farm_admin_sdk::{AdminError, ChainAddress, SigningIdentity};

const TYPES: &str = r#"[
    {"id": 0, "type": {"path": ["ink_primitives", "types", "AccountId"],
        "def": {"composite": {"fields": [{"type": 1, "typeName": "[u8; 32]"}]}}}},
    {"id": 1, "type": {"def": {"array": {"len": 32, "type": 2}}}},
    {"id": 2, "type": {"def": {"primitive": "u8"}}},
    {"id": 3, "type": {"def": {"primitive": "u64"}}},
    {"id": 4, "type": {"def": {"primitive": "u128"}}},
    {"id": 5, "type": {"def": {"sequence": {"type": 0}}}},
    {"id": 6, "type": {"def": {"sequence": {"type": 4}}}},
    {"id": 7, "type": {"path": ["farm", "FarmDetails"],
        "def": {"composite": {"fields": [
            {"name": "pool_id", "type": 0},
            {"name": "start", "type": 3},
            {"name": "end", "type": 3},
            {"name": "reward_tokens", "type": 5},
            {"name": "reward_rates", "type": 6}]}}}},
    {"id": 8, "type": {"path": ["ink_primitives", "LangError"],
        "def": {"variant": {"variants": [{"name": "CouldNotReadInput", "index": 1}]}}}},
    {"id": 9, "type": {"path": ["Result"],
        "def": {"variant": {"variants": [
            {"name": "Ok", "fields": [{"type": 7}], "index": 0},
            {"name": "Err", "fields": [{"type": 8}], "index": 1}]}}}},
    {"id": 10, "type": {"def": {"tuple": []}}},
    {"id": 11, "type": {"path": ["Result"],
        "def": {"variant": {"variants": [
            {"name": "Ok", "fields": [{"type": 10}], "index": 0},
            {"name": "Err", "fields": [{"type": 8}], "index": 1}]}}}}
]"#;

fn farm_json() -> String {
    format!(
        r#"{{
        "source": {{"hash": "0x{}"}},
        "contract": {{"name": "farm_contract"}},
        "spec": {{
            "constructors": [
                {{"label": "new", "selector": "0x9bae9d5e",
                  "args": [{{"label": "pool_id", "type": {{"type": 0}}}},
                           {{"label": "reward_tokens", "type": {{"type": 5}}}}]}}
            ],
            "messages": [
                {{"label": "owner_start_new_farm", "selector": "0x11223344", "mutates": true,
                  "args": [{{"label": "start", "type": {{"type": 3}}}},
                           {{"label": "end", "type": {{"type": 3}}}},
                           {{"label": "rewards", "type": {{"type": 6}}}}],
                  "returnType": {{"type": 11}}}},
                {{"label": "owner_stop_farm", "selector": "0x22334455", "mutates": true, "args": [],
                  "returnType": {{"type": 11}}}},
                {{"label": "view_farm_details", "selector": "0x55667788", "args": [],
                  "returnType": {{"type": 9}}}}
            ]
        }},
        "types": {TYPES},
        "version": "4"
    }}"#,
        "11".repeat(32)
    )
}

fn psp22_json() -> String {
    format!(
        r#"{{
        "source": {{"hash": "0x{}"}},
        "contract": {{"name": "psp22"}},
        "spec": {{
            "constructors": [],
            "messages": [
                {{"label": "PSP22::increase_allowance", "selector": "0x96d6b57a", "mutates": true,
                  "args": [{{"label": "spender", "type": {{"type": 0}}}},
                           {{"label": "delta_value", "type": {{"type": 4}}}}],
                  "returnType": {{"type": 11}}}}
            ]
        }},
        "types": {TYPES},
        "version": 5
    }}"#,
        "22".repeat(32)
    )
}

fn wrapped_json() -> String {
    format!(
        r#"{{
        "source": {{"hash": "0x{}"}},
        "contract": {{"name": "wrapped_azero"}},
        "spec": {{
            "constructors": [],
            "messages": [
                {{"label": "deposit", "selector": "0x2d10c9bd", "mutates": true, "payable": true,
                  "args": [], "returnType": {{"type": 11}}}}
            ]
        }},
        "types": {TYPES},
        "version": "4"
    }}"#,
        "33".repeat(32)
    )
}

/// A node that remembers the last farm schedule it was asked to start.
#[derive(Default)]
struct FakeNode {
    properties: ChainProperties,
    deployed: Option<(ChainAddress, ChainAddress, Vec<ChainAddress>)>,
    schedule: Option<(u64, u64)>,
    log: Vec<String>,
}

#[async_trait]
impl ContractChain for FakeNode {
    fn properties(&self) -> &ChainProperties {
        &self.properties
    }

    async fn instantiate(
        &mut self,
        req: InstantiateRequest<'_>,
    ) -> farm_admin_sdk::AdminResult<ChainAddress> {
        let address = ChainAddress::from_account_id([0xfa; 32], self.properties.ss58_format);
        let args = req.call.args();
        let pool = match &args[0].1 {
            farm_admin_sdk::call::Arg::Account(a) => a.clone(),
            other => panic!("unexpected pool arg {other:?}"),
        };
        let tokens = match &args[1].1 {
            farm_admin_sdk::call::Arg::Accounts(a) => a.clone(),
            other => panic!("unexpected tokens arg {other:?}"),
        };
        assert_eq!(req.code_hash, [0x11; 32]);
        self.deployed = Some((address.clone(), pool, tokens));
        self.log.push(format!("instantiate {}", req.call.label()));
        Ok(address)
    }

    async fn call(&mut self, req: CallRequest<'_>) -> farm_admin_sdk::AdminResult<Receipt> {
        if let farm_admin_sdk::call::Call::FarmStart { start, end, .. } = req.call {
            self.schedule = Some((*start, *end));
        }
        self.log
            .push(format!("call {} {} value={}", req.contract, req.call.label(), req.value));
        Ok(Receipt {
            extrinsic: format!("0x{:064x}", self.log.len()),
            block: format!("0x{}", "bb".repeat(32)),
            contract: req.contract.clone(),
            method: req.call.label(),
        })
    }

    async fn dry_run(&mut self, req: DryRunRequest<'_>) -> farm_admin_sdk::AdminResult<DryRunOutcome> {
        assert_eq!(req.input, &[0x55, 0x66, 0x77, 0x88]);
        let (_, pool, tokens) = self.deployed.clone().expect("farm not deployed");
        let (start, end) = self.schedule.unwrap_or_default();

        let mut data = vec![0u8];
        pool.account_id().encode_to(&mut data);
        start.encode_to(&mut data);
        end.encode_to(&mut data);
        tokens
            .iter()
            .map(|t| *t.account_id())
            .collect::<Vec<_>>()
            .encode_to(&mut data);
        vec![7u128; tokens.len()].encode_to(&mut data);

        Ok(DryRunOutcome {
            data: Some(data),
            reverted: false,
            error: None,
            gas_required: Weight {
                ref_time: 0,
                proof_size: 0,
            },
        })
    }
}

struct Typed(&'static str, Vec<ValueTransfer>);

impl Operator for Typed {
    fn confirm(&mut self, transfer: &ValueTransfer) -> bool {
        self.1.push(transfer.clone());
        self.0 == "y"
    }
}

fn address(b: u8) -> String {
    ChainAddress::from_account_id([b; 32], 42).to_string()
}

fn config(dir: &tempfile::TempDir, chain: &str) -> Config {
    let write = |name: &str, body: String| {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    };
    Config {
        endpoint: Endpoint::resolve(chain).unwrap(),
        metadata: MetadataPaths {
            farm: write("farm_contract.json", farm_json()),
            psp22: write("psp22.json", psp22_json()),
            wrapped: write("wrapped_azero.json", wrapped_json()),
        },
    }
}

#[tokio::test]
async fn farm_lifecycle() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&tmp, "local");
    let mut dispatcher = Dispatcher::new(&config);
    let mut node = FakeNode::default();
    let mut op = Typed("y", vec![]);
    let alice = SigningIdentity::from_phrase("//Alice").unwrap();

    // ── 1. Deploy ──────────────────────────────────────────────────────
    let create = Command::Create {
        pool: address(1),
        reward_tokens: vec![address(2), address(3)],
    };
    let farm = match dispatcher
        .run(&mut node, &mut op, &create, Some(&alice))
        .await
        .unwrap()
    {
        Report::Deployed(a) => a,
        other => panic!("unexpected {other:?}"),
    };

    // ── 2. Start: allowances first, then the farm ──────────────────────
    let start = Command::Start {
        farm: farm.to_string(),
        start: 1_700_000_000_000,
        end: 1_700_086_400_000,
        tokens: vec![address(2), address(3)],
        rewards: vec![86_400_000, 172_800_000],
    };
    match dispatcher.run(&mut node, &mut op, &start, Some(&alice)).await.unwrap() {
        Report::Submitted(receipts) => {
            let methods: Vec<_> = receipts.iter().map(|r| r.method).collect();
            assert_eq!(
                methods,
                ["PSP22::increase_allowance", "PSP22::increase_allowance", "owner_start_new_farm"]
            );
        }
        other => panic!("unexpected {other:?}"),
    }

    // ── 3. Details reflect the schedule, no signer needed ──────────────
    let details = Command::Details {
        farm: farm.to_string(),
    };
    let value = match dispatcher.run(&mut node, &mut op, &details, None).await.unwrap() {
        Report::Query(q) => q.0.unwrap(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(value["pool_id"], address(1));
    assert_eq!(value["start"], 1_700_000_000_000u64);
    assert_eq!(value["end"], 1_700_086_400_000u64);
    assert_eq!(value["reward_tokens"][1], address(3));

    // ── 4. Stop ────────────────────────────────────────────────────────
    let stop = Command::Stop {
        farm: farm.to_string(),
    };
    dispatcher.run(&mut node, &mut op, &stop, Some(&alice)).await.unwrap();

    assert_eq!(node.log.len(), 5);
    assert!(node.log[4].ends_with("owner_stop_farm value=0"));
    assert!(op.1.is_empty(), "no value-bearing call was made");
}

#[tokio::test]
async fn wrap_azero_on_testnet_asks_before_sending() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&tmp, "testnet");
    let mut dispatcher = Dispatcher::new(&config);
    let mut node = FakeNode::default();
    let alice = SigningIdentity::from_phrase("//Alice").unwrap();
    let wrap = Command::WrapAzero {
        amount: 2_500_000_000_000,
        address: None,
    };

    let mut declined = Typed("no", vec![]);
    let report = dispatcher
        .run(&mut node, &mut declined, &wrap, Some(&alice))
        .await
        .unwrap();
    assert_eq!(report, Report::Cancelled);
    assert!(node.log.is_empty());
    assert_eq!(declined.1[0].human, "2.5");
    assert_eq!(declined.1[0].contract.as_str(), TESTNET_WRAPPED_AZERO);

    let mut accepted = Typed("y", vec![]);
    dispatcher
        .run(&mut node, &mut accepted, &wrap, Some(&alice))
        .await
        .unwrap();
    assert_eq!(
        node.log,
        vec![format!("call {TESTNET_WRAPPED_AZERO} deposit value=2500000000000")]
    );
}

#[tokio::test]
async fn missing_metadata_file_aborts_before_the_chain() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config(&tmp, "local");
    config.metadata.psp22 = tmp.path().join("missing.json");
    let mut dispatcher = Dispatcher::new(&config);

    let cmd = Command::IncreaseAllowance {
        farm: address(9),
        token: address(2),
        amount: 1,
    };
    let err = dispatcher.prepare(&cmd).unwrap_err();
    assert!(matches!(err, AdminError::MetadataNotFound(p) if p.ends_with("missing.json")));
}

#[tokio::test]
async fn address_from_another_network_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&tmp, "local");
    let mut dispatcher = Dispatcher::new(&config);
    let mut node = FakeNode::default();
    let alice = SigningIdentity::from_phrase("//Alice").unwrap();

    // prefix 0 (Polkadot) on a prefix-42 chain
    let polkadot = ChainAddress::from_account_id([9; 32], 0).to_string();
    let err = dispatcher
        .run(
            &mut node,
            &mut Typed("y", vec![]),
            &Command::Stop { farm: polkadot },
            Some(&alice),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidAddress(_)));
    assert!(node.log.is_empty());
}
