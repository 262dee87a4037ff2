//! Time source for temporal derivation and audit timestamps.

use chrono::{DateTime, NaiveDate, Utc};

/// Supplies the current instant. Injected so derivation is deterministic
/// under test.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;

  /// The current UTC calendar date.
  fn today(&self) -> NaiveDate { self.now().date_naive() }
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}
