//! Address derivation - seed + key index + security level -> 81-tryte address
//!
//! ```text
//! seed (81 trytes)
//!     │
//!     └── HMAC-SHA512("tangle-subseed", index) ──→ subseed
//!             │
//!             ├── SHA-512(subseed ‖ 0) ──→ key digest 0
//!             ├── SHA-512(subseed ‖ 1) ──→ key digest 1   (security >= 2)
//!             └── SHA-512(subseed ‖ 2) ──→ key digest 2   (security == 3)
//!                     │
//!                     └── trytes(digests) ──→ address (+ 9-tryte checksum)
//! ```
//!
//! Signature fragments are derived from the same subseed, so only the seed
//! holder can sign for an address.

use crate::core::consts::{tx, ADDRESS_CHECKSUM_TRYTES_SIZE, ADDRESS_WITH_CHECKSUM_TRYTES_SIZE, HASH_TRYTES_SIZE};
use crate::core::trinary::{hash_to_trytes, validate_trytes, validate_trytes_len, Hash, TrinaryError, Trytes};
use crate::core::SecurityLevel;
use crate::error::{AccountError, AccountResult};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

const SUBSEED_KEY: &[u8] = b"tangle-subseed";
const CHECKSUM_DOMAIN: &[u8] = b"tangle-checksum";
const SIGNATURE_DOMAIN: &[u8] = b"tangle-signature";

fn subseed(seed: &str, index: u64) -> AccountResult<Zeroizing<Vec<u8>>> {
    validate_trytes_len(seed, HASH_TRYTES_SIZE)?;
    let mut mac = Hmac::<Sha512>::new_from_slice(SUBSEED_KEY)
        .map_err(|e| AccountError::Seed(e.to_string()))?;
    mac.update(seed.as_bytes());
    mac.update(&index.to_be_bytes());
    Ok(Zeroizing::new(mac.finalize().into_bytes().to_vec()))
}

fn key_digests(subseed: &[u8], security: SecurityLevel) -> Vec<u8> {
    let mut digests = Vec::with_capacity(64 * security.level() as usize);
    for fragment in 0..security.level() {
        let mut hasher = Sha512::new();
        hasher.update(subseed);
        hasher.update([fragment]);
        digests.extend_from_slice(&hasher.finalize());
    }
    digests
}

/// Derive the address at `index`. Same inputs always give the same address.
pub fn generate_address(seed: &str, index: u64, security: SecurityLevel, add_checksum: bool) -> AccountResult<Hash> {
    let sub = subseed(seed, index)?;
    let address = hash_to_trytes(&key_digests(&sub, security), HASH_TRYTES_SIZE);
    if add_checksum {
        return Ok(with_checksum(&address)?);
    }
    Ok(address)
}

/// Derive `count` consecutive addresses starting at `start`.
pub fn generate_addresses(seed: &str, start: u64, count: u64, security: SecurityLevel, add_checksum: bool) -> AccountResult<Vec<Hash>> {
    (start..start + count)
        .map(|index| generate_address(seed, index, security, add_checksum))
        .collect()
}

/// 9-tryte checksum of an 81-tryte address.
pub fn checksum(address: &str) -> Result<Trytes, TrinaryError> {
    validate_trytes_len(address, HASH_TRYTES_SIZE)?;
    let mut input = CHECKSUM_DOMAIN.to_vec();
    input.extend_from_slice(address.as_bytes());
    Ok(hash_to_trytes(&input, ADDRESS_CHECKSUM_TRYTES_SIZE))
}

pub fn with_checksum(address: &str) -> Result<Hash, TrinaryError> {
    Ok(format!("{}{}", address, checksum(address)?))
}

/// Strip the checksum from a 90-tryte address; 81-tryte input passes through.
pub fn without_checksum(address: &str) -> Result<Hash, TrinaryError> {
    validate_trytes(address)?;
    match address.len() {
        HASH_TRYTES_SIZE => Ok(address.to_string()),
        ADDRESS_WITH_CHECKSUM_TRYTES_SIZE => Ok(address[..HASH_TRYTES_SIZE].to_string()),
        got => Err(TrinaryError::InvalidLength { expected: ADDRESS_WITH_CHECKSUM_TRYTES_SIZE, got }),
    }
}

pub fn is_valid_checksum(address: &str) -> bool {
    if address.len() != ADDRESS_WITH_CHECKSUM_TRYTES_SIZE {
        return false;
    }
    let (body, sum) = address.split_at(HASH_TRYTES_SIZE);
    checksum(body).map(|expected| expected == sum).unwrap_or(false)
}

/// Signature fragments (one per security level) for the key at `index` over `bundle_hash`.
pub(crate) fn signature_fragments(seed: &str, index: u64, security: SecurityLevel, bundle_hash: &str) -> AccountResult<Vec<Trytes>> {
    let sub = subseed(seed, index)?;
    let mut fragments = Vec::with_capacity(security.level() as usize);
    for fragment in 0..security.level() {
        let mut mac = Hmac::<Sha512>::new_from_slice(&sub)
            .map_err(|e| AccountError::Seed(e.to_string()))?;
        mac.update(SIGNATURE_DOMAIN);
        mac.update(bundle_hash.as_bytes());
        mac.update(&[fragment]);
        fragments.push(hash_to_trytes(&mac.finalize().into_bytes(), tx::SIGNATURE_MESSAGE_FRAGMENT));
    }
    Ok(fragments)
}
