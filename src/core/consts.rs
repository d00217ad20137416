//! Protocol sizes, resolver defaults and environment variable names
//!
//! Centralized registry so the resolver, the CLI and tests agree on every
//! baseline value.

/// Trytes in a hash, address or seed.
pub const HASH_TRYTES_SIZE: usize = 81;
/// Trytes in an address checksum.
pub const ADDRESS_CHECKSUM_TRYTES_SIZE: usize = 9;
pub const ADDRESS_WITH_CHECKSUM_TRYTES_SIZE: usize = HASH_TRYTES_SIZE + ADDRESS_CHECKSUM_TRYTES_SIZE;

/// Transaction layout (trytes)
pub mod tx {
    pub const SIGNATURE_MESSAGE_FRAGMENT: usize = 2187;
    pub const ADDRESS: usize = 81;
    pub const VALUE: usize = 27;
    pub const TAG: usize = 27;
    pub const TIMESTAMP: usize = 9;
    pub const CURRENT_INDEX: usize = 9;
    pub const LAST_INDEX: usize = 9;
    pub const BUNDLE: usize = 81;

    pub const TOTAL: usize =
        SIGNATURE_MESSAGE_FRAGMENT + ADDRESS + VALUE + TAG + TIMESTAMP + CURRENT_INDEX + LAST_INDEX + BUNDLE;
}

/// Baseline values used when a settings field is unset
pub mod defaults {
    pub const MWM: u64 = 14;
    pub const DEPTH: u64 = 3;
    pub const NODE_URI: &str = "http://localhost:14265";
    pub const TIMEOUT_SECS: u64 = 30;
}

/// Environment variables read by `SettingsConfig::from_env` and the CLI
pub mod env {
    pub const NODE: &str = "TANGLE_ACCOUNT_NODE";
    pub const MWM: &str = "TANGLE_ACCOUNT_MWM";
    pub const DEPTH: &str = "TANGLE_ACCOUNT_DEPTH";
    pub const SECURITY: &str = "TANGLE_ACCOUNT_SECURITY";
    pub const SEED: &str = "TANGLE_ACCOUNT_SEED";
    pub const LOG_JSON: &str = "TANGLE_ACCOUNT_LOG_JSON";
}

/// Node API
pub mod api {
    pub const VERSION_HEADER: &str = "X-IOTA-API-Version";
    pub const VERSION: &str = "1";
    pub const GET_BALANCES: &str = "getBalances";
    pub const GET_NODE_INFO: &str = "getNodeInfo";
}
