//! Time sources - injected so deposit timeouts can be tested without waiting.
//!
//! | Source | Use |
//! |--------|-----|
//! | `SystemClock` | Wall clock (default) |
//! | `ManualClock` | Tests and simulations; time moves only when told |

use crate::error::{AccountError, AccountResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

pub trait TimeSource: Send + Sync {
    fn time(&self) -> AccountResult<DateTime<Utc>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn time(&self) -> AccountResult<DateTime<Utc>> { Ok(Utc::now()) }
}

#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self { Self { now: RwLock::new(now) } }

    pub fn set(&self, now: DateTime<Utc>) -> AccountResult<()> {
        *self.now.write().map_err(|_| AccountError::Time("clock lock".into()))? = now;
        Ok(())
    }

    pub fn advance(&self, by: Duration) -> AccountResult<DateTime<Utc>> {
        let mut guard = self.now.write().map_err(|_| AccountError::Time("clock lock".into()))?;
        *guard += by;
        Ok(*guard)
    }
}

impl TimeSource for ManualClock {
    fn time(&self) -> AccountResult<DateTime<Utc>> {
        self.now.read().map(|t| *t).map_err(|_| AccountError::Time("clock lock".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.time().unwrap();
        let b = clock.time().unwrap();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.time().unwrap(), start);
        let later = clock.advance(Duration::hours(2)).unwrap();
        assert_eq!(later, start + Duration::hours(2));
        assert_eq!(clock.time().unwrap(), later);
        clock.set(start).unwrap();
        assert_eq!(clock.time().unwrap(), start);
    }
}
