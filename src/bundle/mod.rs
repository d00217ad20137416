//! Bundles - the atomic group of transactions making up one transfer
//!
//! Assembly order: outputs (one transaction per message fragment), inputs
//! (one transaction per key fragment), then the remainder output. The bundle
//! hash covers every transaction essence; input signatures cover the hash.
//!
//! # Transaction layout (trytes)
//!
//! | Field | Size |
//! |-------|------|
//! | signature / message fragment | 2187 |
//! | address | 81 |
//! | value | 27 |
//! | tag | 27 |
//! | timestamp | 9 |
//! | current index | 9 |
//! | last index | 9 |
//! | bundle hash | 81 |

use crate::address::{is_valid_checksum, signature_fragments, without_checksum};
use crate::core::consts::{tx, ADDRESS_WITH_CHECKSUM_TRYTES_SIZE, HASH_TRYTES_SIZE};
use crate::core::trinary::{hash_to_trytes, int_to_trytes, pad_trytes, validate_trytes, validate_trytes_len, Hash, Trytes};
use crate::core::SecurityLevel;
use crate::error::{AccountError, AccountResult};
use serde::{Deserialize, Serialize};

/// One output of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub address: Hash,
    pub value: u64,
    #[serde(default)]
    pub tag: Trytes,
    #[serde(default)]
    pub message: Trytes,
}

impl Transfer {
    pub fn new(address: impl Into<String>, value: u64) -> Self {
        Self { address: address.into(), value, tag: String::new(), message: String::new() }
    }
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self { self.tag = tag.into(); self }
    pub fn with_message(mut self, message: impl Into<String>) -> Self { self.message = message.into(); self }
}

pub type Transfers = Vec<Transfer>;

/// A funded address the account can spend from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub address: Hash,
    pub balance: u64,
    pub key_index: u64,
    pub security: SecurityLevel,
}

#[derive(Debug, Clone, Default)]
pub struct PrepareTransfersOptions {
    /// Inputs to spend; required when the transfers move value.
    pub inputs: Vec<Input>,
    /// Receives `inputs - outputs` when the inputs overshoot.
    pub remainder_address: Option<Hash>,
    /// Unix seconds; `None` stamps with the current system time.
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signature_message_fragment: Trytes,
    pub address: Hash,
    pub value: i64,
    pub tag: Trytes,
    pub timestamp: u64,
    pub current_index: u64,
    pub last_index: u64,
    pub bundle: Hash,
}

impl Transaction {
    fn essence(&self) -> AccountResult<Trytes> {
        Ok(format!(
            "{}{}{}{}{}{}",
            self.address,
            int_to_trytes(self.value, tx::VALUE)?,
            pad_trytes(&self.tag, tx::TAG),
            int_to_trytes(to_signed(self.timestamp)?, tx::TIMESTAMP)?,
            int_to_trytes(to_signed(self.current_index)?, tx::CURRENT_INDEX)?,
            int_to_trytes(to_signed(self.last_index)?, tx::LAST_INDEX)?,
        ))
    }

    pub fn to_trytes(&self) -> AccountResult<Trytes> {
        let mut out = pad_trytes(&self.signature_message_fragment, tx::SIGNATURE_MESSAGE_FRAGMENT);
        out.push_str(&self.essence()?);
        out.push_str(&pad_trytes(&self.bundle, tx::BUNDLE));
        debug_assert_eq!(out.len(), tx::TOTAL);
        Ok(out)
    }
}

fn to_signed(value: u64) -> AccountResult<i64> {
    i64::try_from(value).map_err(|_| AccountError::InvalidTransfer(format!("value {} out of range", value)))
}

/// Entry spanning `fragments.len()` transactions (at least one).
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub address: Hash,
    pub value: i64,
    pub tag: Trytes,
    pub timestamp: u64,
    pub length: usize,
    pub fragments: Vec<Trytes>,
}

#[derive(Debug, Clone, Default)]
pub struct Bundle {
    pub transactions: Vec<Transaction>,
}

impl Bundle {
    pub fn new() -> Self { Self::default() }

    /// Value goes on the first transaction of the entry, the rest carry zero.
    pub fn add_entry(&mut self, entry: BundleEntry) {
        for i in 0..entry.length.max(1) {
            self.transactions.push(Transaction {
                signature_message_fragment: entry.fragments.get(i).cloned().unwrap_or_default(),
                address: entry.address.clone(),
                value: if i == 0 { entry.value } else { 0 },
                tag: entry.tag.clone(),
                timestamp: entry.timestamp,
                current_index: 0,
                last_index: 0,
                bundle: String::new(),
            });
        }
    }

    pub fn total_value(&self) -> AccountResult<i64> {
        self.transactions
            .iter()
            .try_fold(0i64, |sum, t| sum.checked_add(t.value))
            .ok_or_else(|| AccountError::InvalidTransfer("bundle value overflows".into()))
    }

    /// Assign indices and stamp the bundle hash on every transaction.
    pub fn finalize(&mut self) -> AccountResult<Hash> {
        if self.transactions.is_empty() {
            return Err(AccountError::InvalidTransfer("empty bundle".into()));
        }
        let total = self.total_value()?;
        if total != 0 {
            return Err(AccountError::InvalidTransfer(format!("unbalanced bundle: {}", total)));
        }
        let last = (self.transactions.len() - 1) as u64;
        let mut hasher = blake3::Hasher::new();
        for (i, t) in self.transactions.iter_mut().enumerate() {
            t.current_index = i as u64;
            t.last_index = last;
            hasher.update(t.essence()?.as_bytes());
        }
        let hash = hash_to_trytes(hasher.finalize().as_bytes(), HASH_TRYTES_SIZE);
        for t in &mut self.transactions {
            t.bundle = hash.clone();
        }
        Ok(hash)
    }

    /// Fill the fragments of every spending transaction. Call after `finalize`.
    ///
    /// `inputs` must be in bundle order; each one claims the next spending
    /// entry for its address.
    pub fn sign_inputs(&mut self, seed: &str, inputs: &[Input]) -> AccountResult<()> {
        let mut cursor = 0;
        for input in inputs {
            let start = self.transactions[cursor..]
                .iter()
                .position(|t| t.address == input.address && t.value < 0)
                .map(|offset| cursor + offset)
                .ok_or_else(|| AccountError::InvalidTransfer(format!("input {} not in bundle", input.address)))?;
            let bundle_hash = self.transactions[start].bundle.clone();
            let fragments = signature_fragments(seed, input.key_index, input.security, &bundle_hash)?;
            for (offset, fragment) in fragments.into_iter().enumerate() {
                let t = self
                    .transactions
                    .get_mut(start + offset)
                    .ok_or_else(|| AccountError::InvalidTransfer("missing signature slot".into()))?;
                t.signature_message_fragment = fragment;
                cursor = start + offset + 1;
            }
        }
        Ok(())
    }

    /// Transaction trytes, head (last index) first.
    pub fn to_trytes(&self) -> AccountResult<Vec<Trytes>> {
        self.transactions.iter().rev().map(Transaction::to_trytes).collect()
    }
}

fn normalize_address(address: &str) -> AccountResult<Hash> {
    if address.len() == ADDRESS_WITH_CHECKSUM_TRYTES_SIZE && !is_valid_checksum(address) {
        return Err(AccountError::InvalidTransfer(format!("bad checksum on {}", address)));
    }
    let plain = without_checksum(address)?;
    validate_trytes_len(&plain, HASH_TRYTES_SIZE)?;
    Ok(plain)
}

fn message_fragments(message: &str) -> Vec<Trytes> {
    if message.is_empty() {
        return vec![String::new()];
    }
    message
        .as_bytes()
        .chunks(tx::SIGNATURE_MESSAGE_FRAGMENT)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect()
}

/// Assemble, finalize and sign a bundle. Returns nothing on any failure.
pub fn prepare_bundle(seed: &str, transfers: &[Transfer], options: &PrepareTransfersOptions) -> AccountResult<Vec<Trytes>> {
    if transfers.is_empty() {
        return Err(AccountError::InvalidTransfer("no transfers".into()));
    }
    let timestamp = options.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64);
    let mut bundle = Bundle::new();
    let mut total_out: u64 = 0;

    for transfer in transfers {
        validate_trytes(&transfer.tag)?;
        validate_trytes(&transfer.message)?;
        if transfer.tag.len() > tx::TAG {
            return Err(AccountError::InvalidTransfer(format!("tag longer than {} trytes", tx::TAG)));
        }
        let fragments = message_fragments(&transfer.message);
        bundle.add_entry(BundleEntry {
            address: normalize_address(&transfer.address)?,
            value: to_signed(transfer.value)?,
            tag: transfer.tag.clone(),
            timestamp,
            length: fragments.len(),
            fragments,
        });
        total_out = total_out
            .checked_add(transfer.value)
            .ok_or_else(|| AccountError::InvalidTransfer("output sum overflows".into()))?;
    }

    let mut inputs = Vec::new();
    if total_out > 0 {
        if options.inputs.is_empty() {
            return Err(AccountError::InvalidTransfer("value transfer without inputs".into()));
        }
        let total_in = options
            .inputs
            .iter()
            .try_fold(0u64, |sum, i| sum.checked_add(i.balance))
            .ok_or_else(|| AccountError::InvalidTransfer("input sum overflows".into()))?;
        if total_in < total_out {
            return Err(AccountError::InsufficientBalance { needed: total_out, available: total_in });
        }
        for input in &options.inputs {
            let address = normalize_address(&input.address)?;
            if inputs.iter().any(|seen: &Input| seen.address == address || seen.key_index == input.key_index) {
                return Err(AccountError::InvalidTransfer(format!("input {} listed twice", address)));
            }
            bundle.add_entry(BundleEntry {
                address: address.clone(),
                value: -to_signed(input.balance)?,
                tag: String::new(),
                timestamp,
                length: input.security.level() as usize,
                fragments: Vec::new(),
            });
            inputs.push(Input { address, ..input.clone() });
        }
        let remainder = total_in - total_out;
        if remainder > 0 {
            let address = options
                .remainder_address
                .as_deref()
                .ok_or_else(|| AccountError::InvalidTransfer(format!("remainder of {} needs an address", remainder)))?;
            bundle.add_entry(BundleEntry {
                address: normalize_address(address)?,
                value: to_signed(remainder)?,
                tag: String::new(),
                timestamp,
                length: 1,
                fragments: Vec::new(),
            });
        }
    }

    bundle.finalize()?;
    bundle.sign_inputs(seed, &inputs)?;
    bundle.to_trytes()
}
