//! Strategies against a scripted node: input selection, address generation,
//! transfer preparation

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tangle_account::{
    default_addr_gen, default_prepare_transfers, AccountError, AccountResult, AddressGenerator, Client,
    DefaultInputSelection, Hash, InMemoryStore, ManualClock, NodeInfo, PartialSettings,
    PrepareTransfersOptions, SecurityLevel, SeedProvider, Settings, Store, StoredDepositRequest, Transfer,
    Transfers, Trytes,
};

fn test_seed() -> String { "TESTSEED9".repeat(9) }

/// Node double: balances by address, counts prepare calls.
#[derive(Default)]
struct ScriptedNode {
    balances: Mutex<HashMap<Hash, u64>>,
    prepare_calls: AtomicUsize,
    seeds_seen: Mutex<Vec<String>>,
}

impl ScriptedNode {
    fn fund(&self, address: Hash, balance: u64) {
        self.balances.lock().unwrap().insert(address, balance);
    }
}

#[async_trait]
impl Client for ScriptedNode {
    async fn prepare_transfers(&self, seed: &str, transfers: Transfers, _options: PrepareTransfersOptions) -> AccountResult<Vec<Trytes>> {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);
        self.seeds_seen.lock().unwrap().push(seed.to_string());
        Ok(transfers.iter().map(|t| t.address.clone()).collect())
    }

    async fn get_balances(&self, addresses: &[Hash]) -> AccountResult<Vec<u64>> {
        let balances = self.balances.lock().unwrap();
        Ok(addresses.iter().map(|a| balances.get(a).copied().unwrap_or(0)).collect())
    }

    async fn get_node_info(&self) -> AccountResult<NodeInfo> {
        Ok(NodeInfo { app_name: "scripted".into(), ..Default::default() })
    }
}

struct FailingSeed;

impl SeedProvider for FailingSeed {
    fn seed(&self) -> AccountResult<Trytes> { Err(AccountError::Seed("vault locked".into())) }
}

/// Stateful generator: hands out fixed addresses and counts calls.
struct CountingGenerator {
    calls: AtomicUsize,
}

impl AddressGenerator for CountingGenerator {
    fn generate(&self, index: u64, _security: SecurityLevel, _add_checksum: bool) -> AccountResult<Hash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{:9>81}", index))
    }
}

fn start() -> chrono::DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() }

struct Fixture {
    node: Arc<ScriptedNode>,
    clock: Arc<ManualClock>,
    settings: Settings,
}

fn fixture() -> Fixture {
    let node = Arc::new(ScriptedNode::default());
    let clock = Arc::new(ManualClock::new(start()));
    let settings = PartialSettings::new()
        .with_api(node.clone())
        .with_time_source(clock.clone())
        .with_store(Arc::new(InMemoryStore::new()))
        .with_seed(test_seed())
        .resolve()
        .expect("resolve");
    Fixture { node, clock, settings }
}

impl Fixture {
    /// Register a deposit request at `index` and fund its address.
    fn deposit(&self, index: u64, timeout_hours: i64, multi_use: bool, expected: Option<u64>, balance: u64) {
        let request = StoredDepositRequest {
            security_level: SecurityLevel::Medium,
            timeout_at: start() + Duration::hours(timeout_hours),
            multi_use,
            expected_amount: expected,
        };
        self.settings.store.add_deposit_request("alice", index, request).expect("store");
        let address = self.settings.addr_gen.generate(index, SecurityLevel::Medium, false).expect("address");
        self.node.fund(address, balance);
    }

    fn select(&self, value: u64, balance_check: bool) -> AccountResult<tangle_account::Selection> {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let ctx = self.settings.context("alice");
        rt.block_on(self.settings.input_selection.select(&ctx, value, balance_check))
    }
}

/// Test: Balance check reports only spendable value and selects nothing
#[test]
fn balance_check_reports_usable() {
    let f = fixture();
    f.deposit(1, 24, false, None, 50);
    f.deposit(2, 24, true, None, 500); // multi-use, held until timeout
    f.deposit(3, 24, false, Some(100), 99); // below expected

    let selection = f.select(0, true).expect("balance");
    assert_eq!(selection.value, 50);
    assert!(selection.inputs.is_empty());
    assert!(selection.removal_indices.is_empty());
}

/// Test: Inputs are taken in key-index order until the value is covered
#[test]
fn selects_in_index_order() {
    let f = fixture();
    f.deposit(4, 24, false, None, 30);
    f.deposit(1, 24, false, None, 20);
    f.deposit(7, 24, false, Some(10), 10);

    let selection = f.select(45, false).expect("select");
    assert_eq!(selection.value, 50);
    let indices: Vec<u64> = selection.inputs.iter().map(|i| i.key_index).collect();
    assert_eq!(indices, vec![1, 4]);
    assert_eq!(selection.removal_indices, vec![1, 4]);
    assert!(selection.inputs.iter().all(|i| i.security == SecurityLevel::Medium));
}

/// Test: Held requests become spendable once timed out; empty ones are dropped
#[test]
fn timeout_releases_held_requests() {
    let f = fixture();
    f.deposit(1, 2, true, None, 80);
    f.deposit(2, 2, false, Some(100), 0);

    assert!(matches!(
        f.select(10, false),
        Err(AccountError::InsufficientBalance { needed: 10, available: 0 })
    ));

    f.clock.advance(Duration::hours(3)).expect("advance");
    let selection = f.select(10, false).expect("select");
    assert_eq!(selection.value, 80);
    assert_eq!(selection.inputs.len(), 1);
    assert_eq!(selection.removal_indices, vec![1, 2]);
}

/// Test: No deposit requests at all
#[test]
fn no_requests() {
    let f = fixture();
    assert_eq!(f.select(0, true).expect("balance").value, 0);
    assert_eq!(f.select(0, false).expect("zero transfer"), tangle_account::Selection::default());
    assert!(matches!(
        f.select(1, false),
        Err(AccountError::InsufficientBalance { needed: 1, available: 0 })
    ));
}

/// Test: Default input selection works through the trait object alone
#[test]
fn input_selection_is_replaceable() {
    let settings = PartialSettings::new()
        .with_input_selection(Arc::new(DefaultInputSelection))
        .resolve()
        .expect("resolve");
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let ctx = settings.context("bob");
    assert_eq!(rt.block_on(settings.input_selection.select(&ctx, 0, true)).expect("select").value, 0);
}

/// Test: Default address generator is deterministic and checksum-aware
#[test]
fn default_addr_gen_deterministic() {
    let provider: Arc<dyn SeedProvider> = Arc::new(tangle_account::InMemorySeedProvider::new(test_seed()));
    let generator = default_addr_gen(provider);

    let a = generator.generate(3, SecurityLevel::Medium, false).expect("a");
    let b = generator.generate(3, SecurityLevel::Medium, false).expect("b");
    let with = generator.generate(3, SecurityLevel::Medium, true).expect("checksum");
    assert_eq!(a, b);
    assert_eq!(a.len(), 81);
    assert_eq!(&with[..81], a);
    assert_ne!(a, generator.generate(4, SecurityLevel::Medium, false).expect("next"));
    assert_ne!(a, generator.generate(3, SecurityLevel::High, false).expect("high"));
}

/// Test: Seed failures surface unchanged from the address generator
#[test]
fn default_addr_gen_seed_failure() {
    let generator = default_addr_gen(Arc::new(FailingSeed));
    match generator.generate(0, SecurityLevel::Low, false) {
        Err(AccountError::Seed(reason)) => assert_eq!(reason, "vault locked"),
        other => panic!("expected seed error, got {:?}", other),
    }
}

/// Test: Default preparer fetches the seed, then delegates to the node once
#[test]
fn default_prepare_transfers_delegates() {
    let node = Arc::new(ScriptedNode::default());
    let preparer = default_prepare_transfers(node.clone(), Arc::new(tangle_account::InMemorySeedProvider::new(test_seed())));

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let transfers = vec![Transfer::new("B".repeat(81), 0)];
    let trytes = rt.block_on(preparer(transfers, PrepareTransfersOptions::default())).expect("prepare");

    assert_eq!(trytes, vec!["B".repeat(81)]);
    assert_eq!(node.prepare_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*node.seeds_seen.lock().unwrap(), vec![test_seed()]);
}

/// Test: A seed failure aborts before the node is contacted
#[test]
fn default_prepare_transfers_seed_failure() {
    let node = Arc::new(ScriptedNode::default());
    let preparer = default_prepare_transfers(node.clone(), Arc::new(FailingSeed));

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let result = rt.block_on(preparer(Vec::new(), PrepareTransfersOptions::default()));

    assert!(matches!(result, Err(AccountError::Seed(_))));
    assert_eq!(node.prepare_calls.load(Ordering::SeqCst), 0);
}

/// Test: Settings prepare through the synthesized strategy with the caller's node
#[test]
fn settings_prepare_uses_caller_node() {
    let f = fixture();
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let transfers = vec![Transfer::new("C".repeat(81), 0)];
    rt.block_on(f.settings.prepare_transfers.prepare(transfers, PrepareTransfersOptions::default()))
        .expect("prepare");
    assert_eq!(f.node.prepare_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*f.node.seeds_seen.lock().unwrap(), vec![test_seed()]);
}

/// Test: A stateful struct generator drives input selection
#[test]
fn struct_address_generator() {
    let node = Arc::new(ScriptedNode::default());
    let generator = Arc::new(CountingGenerator { calls: AtomicUsize::new(0) });
    let store = Arc::new(InMemoryStore::new());
    let settings = PartialSettings::new()
        .with_api(node.clone())
        .with_addr_gen(generator.clone())
        .with_store(store.clone())
        .with_time_source(Arc::new(ManualClock::new(start())))
        .resolve()
        .expect("resolve");

    let request = StoredDepositRequest {
        security_level: SecurityLevel::Low,
        timeout_at: start() + Duration::hours(1),
        multi_use: false,
        expected_amount: None,
    };
    store.add_deposit_request("carol", 5, request).expect("store");
    node.fund(format!("{:9>81}", 5), 42);

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let ctx = settings.context("carol");
    let selection = rt.block_on(settings.input_selection.select(&ctx, 42, false)).expect("select");

    assert_eq!(selection.value, 42);
    assert_eq!(selection.inputs[0].security, SecurityLevel::Low);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

/// Node double answering every balance query with a single zero.
struct ShortNode;

#[async_trait]
impl Client for ShortNode {
    async fn prepare_transfers(&self, _seed: &str, _transfers: Transfers, _options: PrepareTransfersOptions) -> AccountResult<Vec<Trytes>> {
        Ok(Vec::new())
    }

    async fn get_balances(&self, _addresses: &[Hash]) -> AccountResult<Vec<u64>> { Ok(vec![0]) }

    async fn get_node_info(&self) -> AccountResult<NodeInfo> { Ok(NodeInfo::default()) }
}

/// Test: A balance list shorter than the request list is an error, not a partial classification
#[test]
fn short_balance_list_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let settings = PartialSettings::new()
        .with_api(Arc::new(ShortNode))
        .with_store(store.clone())
        .with_time_source(Arc::new(ManualClock::new(start())))
        .with_seed(test_seed())
        .resolve()
        .expect("resolve");
    for index in 0..3 {
        let expired = StoredDepositRequest {
            security_level: SecurityLevel::Medium,
            timeout_at: start() - Duration::hours(1),
            multi_use: false,
            expected_amount: None,
        };
        store.add_deposit_request("dave", index, expired).expect("store");
    }

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let ctx = settings.context("dave");
    for balance_check in [true, false] {
        match rt.block_on(settings.input_selection.select(&ctx, 0, balance_check)) {
            Err(AccountError::Api(reason)) => assert!(reason.contains("1 balances for 3")),
            other => panic!("expected api error, got {:?}", other),
        }
    }
    assert_eq!(store.get_deposit_requests("dave").expect("requests").len(), 3);
}

/// Test: Node balances that overflow when summed are reported, not panicked on
#[test]
fn overflowing_balances_rejected() {
    let f = fixture();
    f.deposit(1, 24, false, None, u64::MAX);
    f.deposit(2, 24, false, None, u64::MAX);

    assert!(matches!(f.select(0, true), Err(AccountError::Api(_))));
    assert!(matches!(f.select(5, false), Err(AccountError::Api(_))));
}
