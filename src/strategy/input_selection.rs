//! Default input selection over the account's deposit requests
//!
//! | Request state | Balance | Outcome |
//! |---------------|---------|---------|
//! | timed out | 0 | removed |
//! | timed out | > 0 | spendable |
//! | open, multi-use | any | held until timeout |
//! | open, expected amount | >= expected | spendable |
//! | open, expected amount | < expected | held |
//! | open, no condition | > 0 | spendable |

use super::{AccountContext, InputSelection, Selection};
use crate::bundle::Input;
use crate::error::{AccountError, AccountResult};
use crate::store::StoredDepositRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Spendable,
    Held,
    Depleted,
}

fn classify(request: &StoredDepositRequest, balance: u64, now: DateTime<Utc>) -> Candidate {
    if now >= request.timeout_at {
        return if balance == 0 { Candidate::Depleted } else { Candidate::Spendable };
    }
    if request.multi_use {
        return Candidate::Held;
    }
    match request.expected_amount {
        Some(expected) if balance >= expected => Candidate::Spendable,
        Some(_) => Candidate::Held,
        None if balance > 0 => Candidate::Spendable,
        None => Candidate::Held,
    }
}

/// Spends fulfilled or timed-out deposit addresses in key-index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInputSelection;

#[async_trait]
impl InputSelection for DefaultInputSelection {
    async fn select(&self, account: &AccountContext<'_>, transfer_value: u64, balance_check: bool) -> AccountResult<Selection> {
        let settings = account.settings;
        let requests = settings.store.get_deposit_requests(account.id)?;
        if requests.is_empty() {
            if !balance_check && transfer_value > 0 {
                return Err(AccountError::InsufficientBalance { needed: transfer_value, available: 0 });
            }
            return Ok(Selection::default());
        }

        let now = settings.time_source.time()?;
        let mut addresses = Vec::with_capacity(requests.len());
        for (index, request) in &requests {
            addresses.push(settings.addr_gen.generate(*index, request.security_level, false)?);
        }
        let balances = settings.api.get_balances(&addresses).await?;
        if balances.len() != addresses.len() {
            return Err(AccountError::Api(format!(
                "node returned {} balances for {} addresses",
                balances.len(),
                addresses.len()
            )));
        }

        let mut spendable = Vec::new();
        let mut removal_indices = Vec::new();
        for (((index, request), address), balance) in requests.iter().zip(addresses).zip(balances) {
            match classify(request, balance, now) {
                Candidate::Spendable => spendable.push(Input {
                    address,
                    balance,
                    key_index: *index,
                    security: request.security_level,
                }),
                Candidate::Depleted => removal_indices.push(*index),
                Candidate::Held => debug!("deposit request {} held (balance {})", index, balance),
            }
        }

        let usable = spendable
            .iter()
            .try_fold(0u64, |sum, i| sum.checked_add(i.balance))
            .ok_or_else(|| AccountError::Api("node balances overflow".into()))?;
        if balance_check {
            return Ok(Selection { value: usable, ..Default::default() });
        }
        if usable < transfer_value {
            warn!("account {}: need {}, usable {}", account.id, transfer_value, usable);
            return Err(AccountError::InsufficientBalance { needed: transfer_value, available: usable });
        }

        let mut value = 0u64;
        let mut inputs = Vec::new();
        for input in spendable {
            if value >= transfer_value {
                break;
            }
            // bounded by `usable`, which did not overflow
            value += input.balance;
            removal_indices.push(input.key_index);
            inputs.push(input);
        }
        removal_indices.sort_unstable();
        debug!("account {}: selected {} inputs worth {}", account.id, inputs.len(), value);
        Ok(Selection { value, inputs, removal_indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SecurityLevel;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() }

    fn request(timeout_in: i64, multi_use: bool, expected: Option<u64>) -> StoredDepositRequest {
        StoredDepositRequest {
            security_level: SecurityLevel::Medium,
            timeout_at: now() + Duration::hours(timeout_in),
            multi_use,
            expected_amount: expected,
        }
    }

    #[test]
    fn test_timed_out() {
        assert_eq!(classify(&request(-1, false, Some(10)), 0, now()), Candidate::Depleted);
        assert_eq!(classify(&request(-1, true, Some(10)), 3, now()), Candidate::Spendable);
        assert_eq!(classify(&request(0, true, None), 3, now()), Candidate::Spendable);
    }

    #[test]
    fn test_open_requests() {
        assert_eq!(classify(&request(1, true, None), 100, now()), Candidate::Held);
        assert_eq!(classify(&request(1, false, Some(50)), 49, now()), Candidate::Held);
        assert_eq!(classify(&request(1, false, Some(50)), 50, now()), Candidate::Spendable);
        assert_eq!(classify(&request(1, false, None), 1, now()), Candidate::Spendable);
        assert_eq!(classify(&request(1, false, None), 0, now()), Candidate::Held);
    }
}
