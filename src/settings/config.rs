//! Plain-data settings from JSON or environment variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TANGLE_ACCOUNT_NODE` | `node_uri` |
//! | `TANGLE_ACCOUNT_MWM` | `mwm` |
//! | `TANGLE_ACCOUNT_DEPTH` | `depth` |
//! | `TANGLE_ACCOUNT_SECURITY` | `security_level` (`1`-`3` or `low`/`medium`/`high`) |
//!
//! Anything not set stays unset and is defaulted by the resolver.

use super::PartialSettings;
use crate::api::{Api, HttpClientSettings};
use crate::core::consts::{defaults, env};
use crate::core::SecurityLevel;
use crate::error::{AccountError, AccountResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub node_uri: Option<String>,
    pub timeout_secs: Option<u64>,
    pub mwm: u64,
    pub depth: u64,
    pub security_level: Option<SecurityLevel>,
}

impl SettingsConfig {
    pub fn from_json_str(raw: &str) -> AccountResult<Self> {
        serde_json::from_str(raw).map_err(|e| AccountError::Config(format!("settings json: {}", e)))
    }

    pub fn from_env() -> AccountResult<Self> {
        let mut config = SettingsConfig::default();

        if let Ok(uri) = std::env::var(env::NODE) {
            config.node_uri = Some(uri);
        }
        if let Ok(raw) = std::env::var(env::MWM) {
            config.mwm = parse_u64(env::MWM, &raw)?;
        }
        if let Ok(raw) = std::env::var(env::DEPTH) {
            config.depth = parse_u64(env::DEPTH, &raw)?;
        }
        if let Ok(raw) = std::env::var(env::SECURITY) {
            config.security_level = Some(
                SecurityLevel::parse(&raw)
                    .ok_or_else(|| AccountError::Config(format!("{}: invalid security level '{}'", env::SECURITY, raw)))?,
            );
        }

        Ok(config)
    }

    /// Builds the node client only when a node or timeout was configured.
    pub fn into_partial(self) -> AccountResult<PartialSettings> {
        let mut partial = PartialSettings::new().with_mwm(self.mwm).with_depth(self.depth);
        partial.security_level = self.security_level;
        if self.node_uri.is_some() || self.timeout_secs.is_some() {
            let http = HttpClientSettings {
                uri: self.node_uri.unwrap_or_else(|| defaults::NODE_URI.to_string()),
                timeout_secs: self.timeout_secs.unwrap_or(defaults::TIMEOUT_SECS),
            };
            partial = partial.with_api(Arc::new(Api::compose(http)?));
        }
        Ok(partial)
    }
}

fn parse_u64(var: &str, raw: &str) -> AccountResult<u64> {
    raw.trim()
        .parse()
        .map_err(|e| AccountError::Config(format!("{}: '{}' ({})", var, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_partial_fields() {
        let config = SettingsConfig::from_json_str(r#"{"depth": 4, "security_level": 3}"#).unwrap();
        assert_eq!(config.depth, 4);
        assert_eq!(config.mwm, 0);
        assert_eq!(config.security_level, Some(SecurityLevel::High));
        assert!(config.node_uri.is_none());
    }

    #[test]
    fn test_json_rejects_zero_security() {
        assert!(SettingsConfig::from_json_str(r#"{"security_level": 0}"#).is_err());
    }

    #[test]
    fn test_into_partial_without_node_leaves_api_unset() {
        let partial = SettingsConfig { depth: 2, ..Default::default() }.into_partial().unwrap();
        assert!(partial.api.is_none());
        assert_eq!(partial.depth, 2);
    }

    #[test]
    fn test_into_partial_with_node() {
        let config = SettingsConfig { node_uri: Some("https://node.example:443".into()), ..Default::default() };
        let settings = config.into_partial().unwrap().resolve().unwrap();
        assert_eq!(settings.api.endpoint().as_deref(), Some("https://node.example/"));
    }

    #[test]
    fn test_into_partial_bad_node() {
        let config = SettingsConfig { node_uri: Some("::".into()), ..Default::default() };
        assert!(matches!(config.into_partial(), Err(AccountError::ClientConstruction(_))));
    }
}
