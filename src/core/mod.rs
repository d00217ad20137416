//! Shared building blocks: trinary encoding and protocol constants.

pub mod consts;
pub mod trinary;

pub use consts::HASH_TRYTES_SIZE;
pub use trinary::{Hash, TrinaryError, Trytes};

use serde::{Deserialize, Serialize};

/// Number of key fragments (and signature fragments) per address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl SecurityLevel {
    /// `0` is the unset level and yields `None`, as does anything above 3.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(SecurityLevel::Low),
            2 => Some(SecurityLevel::Medium),
            3 => Some(SecurityLevel::High),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 { *self as u8 }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Low => "low",
            SecurityLevel::Medium => "medium",
            SecurityLevel::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "low" => Some(SecurityLevel::Low),
            "2" | "medium" => Some(SecurityLevel::Medium),
            "3" | "high" => Some(SecurityLevel::High),
            _ => None,
        }
    }
}

impl Default for SecurityLevel {
    fn default() -> Self { Self::Medium }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = crate::AccountError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or(crate::AccountError::InvalidSecurityLevel(level))
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> u8 { level.level() }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_level_is_unset() {
        assert_eq!(SecurityLevel::from_level(0), None);
        assert_eq!(SecurityLevel::from_level(4), None);
        assert_eq!(SecurityLevel::from_level(2), Some(SecurityLevel::Medium));
    }

    #[test]
    fn test_parse_names_and_numbers() {
        assert_eq!(SecurityLevel::parse("HIGH"), Some(SecurityLevel::High));
        assert_eq!(SecurityLevel::parse(" 1 "), Some(SecurityLevel::Low));
        assert_eq!(SecurityLevel::parse("ultra"), None);
        assert_eq!(SecurityLevel::default().level(), 2);
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&SecurityLevel::High).unwrap();
        assert_eq!(json, "3");
        let level: SecurityLevel = serde_json::from_str("1").unwrap();
        assert_eq!(level, SecurityLevel::Low);
        assert!(serde_json::from_str::<SecurityLevel>("0").is_err());
    }
}
