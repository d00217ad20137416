//! tangle-account: settings and strategy injection for trinary ledger accounts.
//!
//! # Architecture
//!
//! ```text
//! PartialSettings (caller)
//!   │
//!   └── default_settings() ──→ Settings (immutable, owned by the account)
//!           │
//!           ├── api               Client          (HTTP node client)
//!           ├── store             Store           (account state)
//!           ├── seed_provider     SeedProvider    (seed on demand)
//!           ├── time_source       TimeSource      (deposit timeouts)
//!           ├── event_machine     EventMachine    (lifecycle events)
//!           ├── plugins           Plugin by name
//!           │
//!           └── strategies
//!                 ├── input_selection    InputSelection
//!                 ├── addr_gen           AddressGenerator   ← seed_provider
//!                 └── prepare_transfers  TransferPreparer   ← api + seed_provider
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tangle_account::{default_settings, PartialSettings, SecurityLevel};
//!
//! let settings = default_settings(Some(
//!     PartialSettings::new()
//!         .with_seed(my_seed)
//!         .with_security_level(SecurityLevel::High),
//! ))?;
//!
//! let address = settings.addr_gen.generate(0, settings.security_level, true)?;
//! ```

pub mod address;
pub mod api;
pub mod bundle;
pub mod core;
pub mod error;
pub mod event;
pub mod logging;
pub mod plugin;
pub mod seed;
pub mod settings;
pub mod store;
pub mod strategy;
pub mod timesrc;

// =============================================================================
// Re-exports
// =============================================================================
pub use api::{Api, Client, HttpClientSettings, NodeInfo};
pub use bundle::{Input, PrepareTransfersOptions, Transfer, Transfers};
pub use crate::core::trinary::{Hash, Trytes};
pub use crate::core::SecurityLevel;
pub use error::{AccountError, AccountResult};
pub use event::{BroadcastEventMachine, DiscardEventMachine, Event, EventMachine};
pub use plugin::Plugin;
pub use seed::{InMemorySeedProvider, SeedProvider, EMPTY_SEED};
pub use settings::{default_settings, PartialSettings, Settings, SettingsConfig};
pub use store::{AccountState, InMemoryStore, Store, StoredDepositRequest};
pub use strategy::{
    default_addr_gen, default_prepare_transfers, AccountContext, AddressGenerator, DefaultInputSelection,
    InputSelection, Selection, TransferPreparer,
};
pub use timesrc::{ManualClock, SystemClock, TimeSource};
