//! UTC instants for presence changes and messages.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Wire rendering: RFC 3339, millisecond precision, `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_is_between_surrounding_reads() {
        let before = Utc::now();
        let ts = Timestamp::now();
        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &Utc::now());
    }

    #[test]
    fn wire_format_uses_millis_and_zulu() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            Timestamp::from_datetime(dt).to_rfc3339(),
            "2024-01-15T10:30:00.000Z"
        );
    }

    #[test]
    fn orders_chronologically() {
        let earlier = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let later = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap());
        assert!(earlier < later);
    }
}
