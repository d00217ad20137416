//! Plugins - long-running account companions (pollers, reattachers, ...)
//!
//! Plugins are keyed by name in `Settings::plugins` and are never defaulted.

use crate::error::AccountResult;
use crate::strategy::AccountContext;
use async_trait::async_trait;

#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique key in `Settings::plugins`.
    fn name(&self) -> &str;

    async fn start(&self, account: &AccountContext<'_>) -> AccountResult<()>;

    async fn shutdown(&self) -> AccountResult<()>;
}
