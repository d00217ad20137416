//! Account state persistence
//!
//! # Account State
//!
//! | Field | Description |
//! |-------|-------------|
//! | `key_index` | Last key index handed out for a deposit address |
//! | `deposit_requests` | Open deposit addresses by key index, with their conditions |
//! | `pending_transfers` | Sent bundles awaiting confirmation, by origin tail hash |

mod inmemory;

pub use inmemory::InMemoryStore;

use crate::core::trinary::{Hash, Trytes};
use crate::core::SecurityLevel;
use crate::error::AccountResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conditions attached to a deposit address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDepositRequest {
    pub security_level: SecurityLevel,
    /// After this instant the address may be swept regardless of conditions.
    pub timeout_at: DateTime<Utc>,
    /// Keep receiving until timeout; never spent early.
    pub multi_use: bool,
    /// Spendable before timeout once the balance reaches this amount.
    pub expected_amount: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransfer {
    pub bundle: Vec<Trytes>,
    /// Tails of the origin bundle and every reattachment.
    pub tails: Vec<Hash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub key_index: u64,
    pub deposit_requests: BTreeMap<u64, StoredDepositRequest>,
    pub pending_transfers: BTreeMap<Hash, PendingTransfer>,
}

impl AccountState {
    pub fn is_new(&self) -> bool {
        self.key_index == 0 && self.deposit_requests.is_empty() && self.pending_transfers.is_empty()
    }
}

/// Persistence backend for account state. Shared between concurrent account operations.
pub trait Store: Send + Sync {
    /// State of `id`, created empty on first access.
    fn load_account(&self, id: &str) -> AccountResult<AccountState>;
    fn remove_account(&self, id: &str) -> AccountResult<()>;
    fn import_account(&self, id: &str, state: AccountState) -> AccountResult<()>;
    fn export_account(&self, id: &str) -> AccountResult<AccountState>;

    fn read_index(&self, id: &str) -> AccountResult<u64>;
    fn write_index(&self, id: &str, index: u64) -> AccountResult<()>;

    fn add_deposit_request(&self, id: &str, index: u64, request: StoredDepositRequest) -> AccountResult<()>;
    fn remove_deposit_request(&self, id: &str, index: u64) -> AccountResult<()>;
    fn get_deposit_requests(&self, id: &str) -> AccountResult<BTreeMap<u64, StoredDepositRequest>>;

    fn add_pending_transfer(&self, id: &str, origin_tail: &str, bundle: Vec<Trytes>, spent_indices: &[u64]) -> AccountResult<()>;
    fn remove_pending_transfer(&self, id: &str, origin_tail: &str) -> AccountResult<()>;
    fn add_tail_hash(&self, id: &str, origin_tail: &str, new_tail: &str) -> AccountResult<()>;
    fn get_pending_transfers(&self, id: &str) -> AccountResult<BTreeMap<Hash, PendingTransfer>>;

    /// Number of stored accounts.
    fn len(&self) -> AccountResult<usize>;

    fn is_empty(&self) -> AccountResult<bool> { Ok(self.len()? == 0) }
}
