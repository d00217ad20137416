//! Process-local store. State is lost on drop.

use super::{AccountState, PendingTransfer, Store, StoredDepositRequest};
use crate::core::trinary::{Hash, Trytes};
use crate::error::{AccountError, AccountResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<HashMap<String, AccountState>>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    fn read(&self) -> AccountResult<RwLockReadGuard<'_, HashMap<String, AccountState>>> {
        self.accounts.read().map_err(|_| AccountError::Store("store lock".into()))
    }

    fn write(&self) -> AccountResult<RwLockWriteGuard<'_, HashMap<String, AccountState>>> {
        self.accounts.write().map_err(|_| AccountError::Store("store lock".into()))
    }

    fn update<T>(&self, id: &str, f: impl FnOnce(&mut AccountState) -> AccountResult<T>) -> AccountResult<T> {
        let mut guard = self.write()?;
        f(guard.entry(id.to_string()).or_default())
    }
}

impl Store for InMemoryStore {
    fn load_account(&self, id: &str) -> AccountResult<AccountState> {
        self.update(id, |state| Ok(state.clone()))
    }

    fn remove_account(&self, id: &str) -> AccountResult<()> {
        self.write()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AccountError::AccountNotFound(id.to_string()))
    }

    fn import_account(&self, id: &str, state: AccountState) -> AccountResult<()> {
        self.write()?.insert(id.to_string(), state);
        Ok(())
    }

    fn export_account(&self, id: &str) -> AccountResult<AccountState> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| AccountError::AccountNotFound(id.to_string()))
    }

    fn read_index(&self, id: &str) -> AccountResult<u64> {
        Ok(self.read()?.get(id).map(|s| s.key_index).unwrap_or(0))
    }

    fn write_index(&self, id: &str, index: u64) -> AccountResult<()> {
        self.update(id, |state| {
            state.key_index = index;
            Ok(())
        })
    }

    fn add_deposit_request(&self, id: &str, index: u64, request: StoredDepositRequest) -> AccountResult<()> {
        self.update(id, |state| {
            state.deposit_requests.insert(index, request);
            Ok(())
        })
    }

    fn remove_deposit_request(&self, id: &str, index: u64) -> AccountResult<()> {
        self.update(id, |state| {
            state.deposit_requests.remove(&index);
            Ok(())
        })
    }

    fn get_deposit_requests(&self, id: &str) -> AccountResult<BTreeMap<u64, StoredDepositRequest>> {
        Ok(self.read()?.get(id).map(|s| s.deposit_requests.clone()).unwrap_or_default())
    }

    fn add_pending_transfer(&self, id: &str, origin_tail: &str, bundle: Vec<Trytes>, spent_indices: &[u64]) -> AccountResult<()> {
        self.update(id, |state| {
            for index in spent_indices {
                state.deposit_requests.remove(index);
            }
            state.pending_transfers.insert(
                origin_tail.to_string(),
                PendingTransfer { bundle, tails: vec![origin_tail.to_string()] },
            );
            Ok(())
        })
    }

    fn remove_pending_transfer(&self, id: &str, origin_tail: &str) -> AccountResult<()> {
        self.update(id, |state| {
            state
                .pending_transfers
                .remove(origin_tail)
                .map(|_| ())
                .ok_or_else(|| AccountError::PendingTransferNotFound(origin_tail.to_string()))
        })
    }

    fn add_tail_hash(&self, id: &str, origin_tail: &str, new_tail: &str) -> AccountResult<()> {
        self.update(id, |state| {
            let pending = state
                .pending_transfers
                .get_mut(origin_tail)
                .ok_or_else(|| AccountError::PendingTransferNotFound(origin_tail.to_string()))?;
            pending.tails.push(new_tail.to_string());
            Ok(())
        })
    }

    fn get_pending_transfers(&self, id: &str) -> AccountResult<BTreeMap<Hash, PendingTransfer>> {
        Ok(self.read()?.get(id).map(|s| s.pending_transfers.clone()).unwrap_or_default())
    }

    fn len(&self) -> AccountResult<usize> {
        Ok(self.read()?.len())
    }
}
