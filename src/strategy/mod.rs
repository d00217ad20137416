//! Strategies - the three replaceable algorithms an account runs
//!
//! | Strategy | Trait | Default |
//! |----------|-------|---------|
//! | Input selection | `InputSelection` | `DefaultInputSelection` |
//! | Address generation | `AddressGenerator` | `default_addr_gen(provider)` |
//! | Transfer preparation | `TransferPreparer` | `default_prepare_transfers(api, provider)` |
//!
//! Plain closures implement `AddressGenerator` and `TransferPreparer`, so the
//! defaults are closures while custom strategies can be structs with state.

mod input_selection;

pub use input_selection::DefaultInputSelection;

use crate::api::Client;
use crate::bundle::{Input, PrepareTransfersOptions, Transfers};
use crate::core::trinary::{Hash, Trytes};
use crate::core::SecurityLevel;
use crate::error::AccountResult;
use crate::seed::SeedProvider;
use crate::settings::Settings;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use zeroize::Zeroizing;

/// What a strategy sees of the account it runs for.
#[derive(Clone, Copy)]
pub struct AccountContext<'a> {
    pub id: &'a str,
    pub settings: &'a Settings,
}

impl<'a> AccountContext<'a> {
    pub fn new(id: &'a str, settings: &'a Settings) -> Self { Self { id, settings } }
}

/// Outcome of input selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Usable balance (balance check) or sum of the selected inputs (transfer).
    pub value: u64,
    pub inputs: Vec<Input>,
    /// Key indices whose deposit requests can be dropped from the store.
    pub removal_indices: Vec<u64>,
}

/// Chooses the inputs funding a transfer, or reports the usable balance.
///
/// With `balance_check` set, implementations must not select or remove
/// anything. Inputs whose deposit condition is still pending must never be
/// selected.
#[async_trait]
pub trait InputSelection: Send + Sync {
    async fn select(&self, account: &AccountContext<'_>, transfer_value: u64, balance_check: bool) -> AccountResult<Selection>;
}

/// Derives the address at a key index. Must be deterministic for a given seed.
pub trait AddressGenerator: Send + Sync {
    fn generate(&self, index: u64, security: SecurityLevel, add_checksum: bool) -> AccountResult<Hash>;
}

impl<F> AddressGenerator for F
where
    F: Fn(u64, SecurityLevel, bool) -> AccountResult<Hash> + Send + Sync,
{
    fn generate(&self, index: u64, security: SecurityLevel, add_checksum: bool) -> AccountResult<Hash> {
        self(index, security, add_checksum)
    }
}

pub type PrepareFuture = BoxFuture<'static, AccountResult<Vec<Trytes>>>;

/// Turns transfers into signed transaction trytes. All or nothing.
#[async_trait]
pub trait TransferPreparer: Send + Sync {
    async fn prepare(&self, transfers: Transfers, options: PrepareTransfersOptions) -> AccountResult<Vec<Trytes>>;
}

#[async_trait]
impl<F> TransferPreparer for F
where
    F: Fn(Transfers, PrepareTransfersOptions) -> PrepareFuture + Send + Sync,
{
    async fn prepare(&self, transfers: Transfers, options: PrepareTransfersOptions) -> AccountResult<Vec<Trytes>> {
        self(transfers, options).await
    }
}

/// Address generator reading the seed from `provider` on every call.
pub fn default_addr_gen(
    provider: Arc<dyn SeedProvider>,
) -> impl Fn(u64, SecurityLevel, bool) -> AccountResult<Hash> + Send + Sync + 'static {
    move |index, security, add_checksum| {
        let seed = Zeroizing::new(provider.seed()?);
        crate::address::generate_address(&seed, index, security, add_checksum)
    }
}

/// Transfer preparer reading the seed from `provider`, then delegating to `api`.
pub fn default_prepare_transfers(
    api: Arc<dyn Client>,
    provider: Arc<dyn SeedProvider>,
) -> impl Fn(Transfers, PrepareTransfersOptions) -> PrepareFuture + Send + Sync + 'static {
    move |transfers: Transfers, options: PrepareTransfersOptions| -> PrepareFuture {
        let api = api.clone();
        let provider = provider.clone();
        Box::pin(async move {
            let seed = Zeroizing::new(provider.seed()?);
            api.prepare_transfers(&seed, transfers, options).await
        })
    }
}
