//! Settings - everything an account needs, resolved once at setup
//!
//! Callers fill in what they care about on a `PartialSettings`; the resolver
//! supplies the rest. Defaulting is additive: a field the caller set is never
//! replaced.
//!
//! | Field | Unset when | Default |
//! |-------|-----------|---------|
//! | `api` | `None` | HTTP client for `http://localhost:14265` |
//! | `store` | `None` | fresh `InMemoryStore` |
//! | `seed_provider` | `None` | `InMemorySeedProvider` over `EMPTY_SEED` |
//! | `mwm` | `0` | 14 |
//! | `depth` | `0` | 3 |
//! | `security_level` | `None` | `Medium` |
//! | `time_source` | `None` | `SystemClock` |
//! | `input_selection` | `None` | `DefaultInputSelection` |
//! | `event_machine` | `None` | `DiscardEventMachine` |
//! | `addr_gen` | `None` | `default_addr_gen(seed_provider)` |
//! | `prepare_transfers` | `None` | `default_prepare_transfers(api, seed_provider)` |
//! | `plugins` | - | never defaulted |
//!
//! # Usage
//!
//! ```ignore
//! use tangle_account::{default_settings, PartialSettings};
//!
//! // Development baseline
//! let settings = default_settings(None)?;
//!
//! // Only depth set; everything else defaulted
//! let settings = default_settings(Some(PartialSettings::new().with_depth(5)))?;
//! assert_eq!(settings.mwm, 14);
//! ```

pub mod config;

pub use config::SettingsConfig;

use crate::api::{Api, Client, HttpClientSettings};
use crate::core::consts::defaults;
use crate::core::SecurityLevel;
use crate::error::{AccountError, AccountResult};
use crate::event::{DiscardEventMachine, EventMachine};
use crate::plugin::Plugin;
use crate::seed::{InMemorySeedProvider, SeedProvider};
use crate::store::{InMemoryStore, Store};
use crate::strategy::{
    default_addr_gen, default_prepare_transfers, AccountContext, AddressGenerator, DefaultInputSelection,
    InputSelection, TransferPreparer,
};
use crate::timesrc::{SystemClock, TimeSource};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Fully resolved account settings. Built by `default_settings`, read-only afterwards.
#[derive(Clone)]
pub struct Settings {
    pub api: Arc<dyn Client>,
    pub store: Arc<dyn Store>,
    pub seed_provider: Arc<dyn SeedProvider>,
    pub mwm: u64,
    pub depth: u64,
    pub security_level: SecurityLevel,
    pub time_source: Arc<dyn TimeSource>,
    pub input_selection: Arc<dyn InputSelection>,
    pub event_machine: Arc<dyn EventMachine>,
    pub plugins: HashMap<String, Arc<dyn Plugin>>,
    pub addr_gen: Arc<dyn AddressGenerator>,
    pub prepare_transfers: Arc<dyn TransferPreparer>,
}

/// Caller-provided settings. `None` and `0` mean "use the default".
#[derive(Clone, Default)]
pub struct PartialSettings {
    pub api: Option<Arc<dyn Client>>,
    pub store: Option<Arc<dyn Store>>,
    pub seed_provider: Option<Arc<dyn SeedProvider>>,
    pub mwm: u64,
    pub depth: u64,
    pub security_level: Option<SecurityLevel>,
    pub time_source: Option<Arc<dyn TimeSource>>,
    pub input_selection: Option<Arc<dyn InputSelection>>,
    pub event_machine: Option<Arc<dyn EventMachine>>,
    pub plugins: HashMap<String, Arc<dyn Plugin>>,
    pub addr_gen: Option<Arc<dyn AddressGenerator>>,
    pub prepare_transfers: Option<Arc<dyn TransferPreparer>>,
}

impl PartialSettings {
    pub fn new() -> Self { Self::default() }
    pub fn with_api(mut self, api: Arc<dyn Client>) -> Self { self.api = Some(api); self }
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self { self.store = Some(store); self }
    pub fn with_seed_provider(mut self, p: Arc<dyn SeedProvider>) -> Self { self.seed_provider = Some(p); self }
    pub fn with_seed(self, seed: impl Into<String>) -> Self { self.with_seed_provider(Arc::new(InMemorySeedProvider::new(seed))) }
    pub fn with_mwm(mut self, mwm: u64) -> Self { self.mwm = mwm; self }
    pub fn with_depth(mut self, depth: u64) -> Self { self.depth = depth; self }
    pub fn with_security_level(mut self, level: SecurityLevel) -> Self { self.security_level = Some(level); self }
    pub fn with_time_source(mut self, t: Arc<dyn TimeSource>) -> Self { self.time_source = Some(t); self }
    pub fn with_input_selection(mut self, s: Arc<dyn InputSelection>) -> Self { self.input_selection = Some(s); self }
    pub fn with_event_machine(mut self, e: Arc<dyn EventMachine>) -> Self { self.event_machine = Some(e); self }
    pub fn with_addr_gen(mut self, g: Arc<dyn AddressGenerator>) -> Self { self.addr_gen = Some(g); self }
    pub fn with_prepare_transfers(mut self, p: Arc<dyn TransferPreparer>) -> Self { self.prepare_transfers = Some(p); self }

    /// Adds a plugin under its own name, replacing any plugin of the same name.
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.insert(plugin.name().to_string(), plugin);
        self
    }

    pub fn resolve(self) -> AccountResult<Settings> { default_settings(Some(self)) }
}

fn or_default<T: ?Sized>(field: &str, value: Option<Arc<T>>, default: impl FnOnce() -> Arc<T>) -> Arc<T> {
    value.unwrap_or_else(|| {
        debug!("{} unset, using default", field);
        default()
    })
}

fn nonzero_or(field: &str, value: u64, default: u64) -> u64 {
    if value == 0 {
        debug!("{} unset, using {}", field, default);
        return default;
    }
    value
}

/// Resolve `partial` into complete settings; `None` yields the development baseline.
///
/// The baseline uses an inert empty seed and a local node; it must not hold
/// real funds. Fails only if the default HTTP client cannot be built.
///
/// A partial without `addr_gen` or `prepare_transfers` gets both built from
/// the resolved seed provider and api, the same as the baseline, so every
/// field except `plugins` is always populated.
pub fn default_settings(partial: Option<PartialSettings>) -> AccountResult<Settings> {
    let baseline = partial.is_none();
    let p = partial.unwrap_or_default();

    let security_level = p.security_level.unwrap_or_else(|| {
        debug!("security level unset, using {}", SecurityLevel::Medium);
        SecurityLevel::Medium
    });
    let depth = nonzero_or("depth", p.depth, defaults::DEPTH);
    let mwm = nonzero_or("mwm", p.mwm, defaults::MWM);

    let api = match p.api {
        Some(api) => api,
        None => {
            debug!("api unset, composing client for {}", defaults::NODE_URI);
            Arc::new(Api::compose(HttpClientSettings::default())?) as Arc<dyn Client>
        }
    };
    let store = or_default::<dyn Store>("store", p.store, || Arc::new(InMemoryStore::new()));
    let seed_provider = or_default::<dyn SeedProvider>("seed provider", p.seed_provider, || {
        Arc::new(InMemorySeedProvider::empty())
    });
    let time_source = or_default::<dyn TimeSource>("time source", p.time_source, || Arc::new(SystemClock));
    let input_selection = or_default::<dyn InputSelection>("input selection", p.input_selection, || {
        Arc::new(DefaultInputSelection)
    });
    let event_machine = or_default::<dyn EventMachine>("event machine", p.event_machine, || {
        Arc::new(DiscardEventMachine)
    });
    let addr_gen = or_default::<dyn AddressGenerator>("address generator", p.addr_gen, || {
        Arc::new(default_addr_gen(seed_provider.clone()))
    });
    let prepare_transfers = or_default::<dyn TransferPreparer>("transfer preparer", p.prepare_transfers, || {
        Arc::new(default_prepare_transfers(api.clone(), seed_provider.clone()))
    });

    let settings = Settings {
        api,
        store,
        seed_provider,
        mwm,
        depth,
        security_level,
        time_source,
        input_selection,
        event_machine,
        plugins: p.plugins,
        addr_gen,
        prepare_transfers,
    };
    info!(
        "settings resolved{}: mwm={} depth={} security={} plugins={}",
        if baseline { " (baseline)" } else { "" },
        settings.mwm,
        settings.depth,
        settings.security_level,
        settings.plugins.len()
    );
    Ok(settings)
}

impl Settings {
    pub fn context<'a>(&'a self, account_id: &'a str) -> AccountContext<'a> {
        AccountContext::new(account_id, self)
    }

    /// Sorted plugin names.
    pub fn plugin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Start every plugin in name order; stops at the first failure.
    pub async fn start_plugins(&self, account_id: &str) -> AccountResult<()> {
        let ctx = self.context(account_id);
        for name in self.plugin_names() {
            self.plugins[name].start(&ctx).await.map_err(|e| AccountError::Plugin {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            debug!("plugin {} started for {}", name, account_id);
        }
        Ok(())
    }

    /// Shut down every plugin; reports the first failure after trying all.
    pub async fn shutdown_plugins(&self) -> AccountResult<()> {
        let mut first_err = None;
        for name in self.plugin_names() {
            if let Err(e) = self.plugins[name].shutdown().await {
                first_err.get_or_insert(AccountError::Plugin { name: name.to_string(), reason: e.to_string() });
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Plain-data view for logs and the CLI. Never includes the seed.
    pub fn summary(&self) -> Value {
        json!({
            "node": self.api.endpoint(),
            "mwm": self.mwm,
            "depth": self.depth,
            "security_level": self.security_level.level(),
            "plugins": self.plugin_names(),
            "stored_accounts": self.store.len().ok(),
        })
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("node", &self.api.endpoint())
            .field("mwm", &self.mwm)
            .field("depth", &self.depth)
            .field("security_level", &self.security_level)
            .field("plugins", &self.plugin_names())
            .finish_non_exhaustive()
    }
}
