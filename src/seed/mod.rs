//! Seed providers - the only place seed material lives.
//!
//! Strategies ask a provider for the seed on every call and drop it right
//! after use. The resolver only passes providers around.

use crate::core::consts::HASH_TRYTES_SIZE;
use crate::core::trinary::{validate_trytes_len, Trytes};
use crate::error::{AccountError, AccountResult};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

/// Inert placeholder seed (81 x `9`). Never holds funds.
pub static EMPTY_SEED: Lazy<String> = Lazy::new(|| "9".repeat(HASH_TRYTES_SIZE));

/// Supplies the account seed on demand.
pub trait SeedProvider: Send + Sync {
    fn seed(&self) -> AccountResult<Trytes>;
}

/// Seed held in memory, wiped on drop.
pub struct InMemorySeedProvider {
    seed: Zeroizing<String>,
}

impl InMemorySeedProvider {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: Zeroizing::new(seed.into()) }
    }

    /// Like `new`, but rejects anything that is not an 81-tryte seed.
    pub fn checked(seed: impl Into<String>) -> AccountResult<Self> {
        let seed = Zeroizing::new(seed.into());
        validate_trytes_len(&seed, HASH_TRYTES_SIZE)?;
        Ok(Self { seed })
    }

    pub fn empty() -> Self { Self::new(EMPTY_SEED.as_str()) }
}

impl SeedProvider for InMemorySeedProvider {
    fn seed(&self) -> AccountResult<Trytes> {
        if self.seed.is_empty() {
            return Err(AccountError::Seed("no seed loaded".into()));
        }
        Ok((*self.seed).clone())
    }
}

impl std::fmt::Debug for InMemorySeedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySeedProvider").field("seed", &"<redacted>").finish()
    }
}
