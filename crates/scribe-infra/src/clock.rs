//! Wall clock and UUID identifiers.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use scribe_core::ports::{Clock, IdGenerator};

/// System time, truncated to microseconds so stamps survive a round trip
/// through PostgreSQL `timestamptz` unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

/// Random v4 UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_clock_has_microsecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_ids_parse_as_uuid() {
        let id = UuidIdGenerator.generate();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, UuidIdGenerator.generate());
    }
}
